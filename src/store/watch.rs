//! Change notification for stores.
//!
//! Watchers register a path and receive the key of every change under it.
//! While the hub is frozen, changed keys are collected; the final thaw
//! delivers them as one batch in which every watcher fires at most once,
//! with the first pending key under its path.
//!
//! Changes raised while a batch is being delivered are queued and
//! delivered after it, never recursively.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::util::{key_matches, Quark};

/// Handle returned by [`ValueStore::watch`](super::ValueStore::watch).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

type WatchFn = Rc<RefCell<dyn FnMut(Quark)>>;

struct Watcher {
    id: WatchId,
    /// `None` watches every key, anonymous ones included.
    path: Option<String>,
    callback: WatchFn,
}

type Batch = SmallVec<[Quark; 4]>;

pub(crate) struct WatchHub {
    watchers: RefCell<Vec<Watcher>>,
    next_id: Cell<u64>,
    freeze: Cell<u32>,
    pending: RefCell<Batch>,
    queue: RefCell<VecDeque<Batch>>,
    dispatching: Cell<bool>,
}

impl WatchHub {
    pub(crate) fn new() -> Self {
        Self {
            watchers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            freeze: Cell::new(0),
            pending: RefCell::new(SmallVec::new()),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    pub(crate) fn watch(&self, path: Option<&str>, callback: impl FnMut(Quark) + 'static) -> WatchId {
        let id = WatchId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let callback: WatchFn = Rc::new(RefCell::new(callback));
        self.watchers.borrow_mut().push(Watcher {
            id,
            path: path.map(str::to_owned),
            callback,
        });
        id
    }

    pub(crate) fn unwatch(&self, id: WatchId) -> bool {
        let mut watchers = self.watchers.borrow_mut();
        let before = watchers.len();
        watchers.retain(|w| w.id != id);
        watchers.len() != before
    }

    #[cfg(test)]
    pub(crate) fn watcher_count(&self) -> usize {
        self.watchers.borrow().len()
    }

    pub(crate) fn freeze(&self) {
        self.freeze.set(self.freeze.get().saturating_add(1));
    }

    pub(crate) fn thaw(&self) {
        match self.freeze.get() {
            0 => {
                tracing::error!("thaw without matching freeze");
                debug_assert!(false, "thaw without matching freeze");
            }
            1 => {
                self.freeze.set(0);
                let batch = std::mem::take(&mut *self.pending.borrow_mut());
                if !batch.is_empty() {
                    tracing::debug!(keys = batch.len(), "delivering coalesced changes");
                    self.enqueue(batch);
                }
            }
            n => self.freeze.set(n - 1),
        }
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.freeze.get() > 0
    }

    /// Record a change of `key`.
    pub(crate) fn value_changed(&self, key: Quark) {
        if self.is_frozen() {
            let mut pending = self.pending.borrow_mut();
            if !pending.contains(&key) {
                pending.push(key);
            }
            return;
        }
        let mut batch = Batch::new();
        batch.push(key);
        self.enqueue(batch);
    }

    fn enqueue(&self, batch: Batch) {
        self.queue.borrow_mut().push_back(batch);
        if self.dispatching.get() {
            return;
        }
        self.dispatching.set(true);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(batch) => self.deliver(&batch),
                None => break,
            }
        }
        self.dispatching.set(false);
    }

    fn deliver(&self, batch: &[Quark]) {
        let targets: Vec<(WatchId, Quark, WatchFn)> = self
            .watchers
            .borrow()
            .iter()
            .filter_map(|w| {
                batch
                    .iter()
                    .find(|&&key| key_matches(key, w.path.as_deref()))
                    .map(|&key| (w.id, key, Rc::clone(&w.callback)))
            })
            .collect();

        for (id, key, callback) in targets {
            // Skip watchers removed by an earlier callback in this batch.
            if !self.watchers.borrow().iter().any(|w| w.id == id) {
                continue;
            }
            tracing::trace!(?id, %key, "notifying watcher");
            match callback.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(key),
                Err(_) => tracing::trace!(?id, "skipping watcher already running"),
            };
        }
    }
}
