//! Synchronous, registration-ordered signals.
//!
//! A [`Signal`] keeps a list of handlers and calls them in the order they
//! were connected. Emission snapshots the handler list first, so handlers
//! may connect or disconnect (themselves included) while being called.
//! A handler that is already running is not re-entered by a nested emit;
//! the nested call skips it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

/// Handle returned by [`Signal::connect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

/// A list of callbacks receiving `&E`.
pub struct Signal<E> {
    handlers: RefCell<SmallVec<[(HandlerId, Handler<E>); 2]>>,
    next_id: Cell<u64>,
}

/// Signal carried by every watchable object.
pub type ChangeSignal = Signal<()>;

impl<E> Signal<E> {
    /// Create a signal with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(SmallVec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Connect a handler; it runs after every previously connected one.
    pub fn connect<F>(&self, handler: F) -> HandlerId
    where
        F: FnMut(&E) + 'static,
    {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let handler: Handler<E> = Rc::new(RefCell::new(handler));
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Disconnect a handler. Returns `false` if it was not connected.
    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        match handlers.iter().position(|(hid, _)| *hid == id) {
            Some(pos) => {
                handlers.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Whether a handler is connected.
    pub fn is_connected(&self, id: HandlerId) -> bool {
        self.handlers.borrow().iter().any(|(hid, _)| *hid == id)
    }

    /// Number of connected handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Call every connected handler with `event`.
    pub fn emit(&self, event: &E) {
        let snapshot: SmallVec<[(HandlerId, Handler<E>); 4]> = self
            .handlers
            .borrow()
            .iter()
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect();

        for (id, handler) in snapshot {
            // Skip handlers disconnected by an earlier handler in this round.
            if !self.is_connected(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(event),
                Err(_) => tracing::trace!(?id, "skipping handler already running"),
            }
        }
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.handler_count())
            .finish()
    }
}
