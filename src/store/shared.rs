//! A store held as an object inside another store.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use super::ValueStore;
use crate::core::{ChangeSignal, Deserializable, Serializable, Watchable};
use crate::util::Result;
use crate::wire::{WireReader, WireWriter, STORE_TYPE_NAME};

/// Shared, interior-mutable wrapper that lets a [`ValueStore`] live as an
/// object value of another store.
///
/// Any change inside the wrapped store emits the wrapper's change signal,
/// so a parent store holding it notifies the key it is stored under.
pub struct SharedStore {
    inner: RefCell<ValueStore>,
    changed: Rc<ChangeSignal>,
}

impl SharedStore {
    pub fn new(store: ValueStore) -> Self {
        let changed = Rc::new(ChangeSignal::new());
        let signal = Rc::downgrade(&changed);
        store.watch_all(move |_| {
            if let Some(signal) = signal.upgrade() {
                signal.emit(&());
            }
        });
        Self {
            inner: RefCell::new(store),
            changed,
        }
    }

    pub fn empty() -> Self {
        Self::new(ValueStore::new())
    }

    /// Borrow the wrapped store.
    ///
    /// # Panics
    ///
    /// Panics while a [`with_mut`](Self::with_mut) closure is running.
    pub fn borrow(&self) -> Ref<'_, ValueStore> {
        self.inner.borrow()
    }

    pub fn with<R>(&self, f: impl FnOnce(&ValueStore) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Modify the wrapped store.
    ///
    /// Notifications are held back until `f` returns, so watchers may read
    /// the store through [`borrow`](Self::borrow) but must not modify it.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut ValueStore) -> R) -> R {
        self.inner.borrow().freeze();
        let result = f(&mut self.inner.borrow_mut());
        self.inner.borrow().thaw();
        result
    }

    /// Unwrap into the plain store when this is the only handle.
    pub fn into_inner(self) -> ValueStore {
        let Self { inner, .. } = self;
        inner.into_inner()
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<ValueStore> for SharedStore {
    fn from(store: ValueStore) -> Self {
        Self::new(store)
    }
}

impl Serializable for SharedStore {
    fn type_name(&self) -> &'static str {
        STORE_TYPE_NAME
    }

    fn serialize_payload(&self, writer: &mut WireWriter) -> Result<()> {
        self.inner.borrow().serialize_payload(writer)
    }

    fn duplicate(&self) -> Result<crate::core::ObjectRef> {
        Ok(Rc::new(Self::new(self.inner.borrow().duplicate()?)))
    }
}

impl Watchable for SharedStore {
    fn changed_signal(&self) -> &ChangeSignal {
        &self.changed
    }
}

impl Deserializable for SharedStore {
    const TYPE_NAME: &'static str = STORE_TYPE_NAME;

    fn deserialize(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self::new(ValueStore::deserialize_payload(reader)?))
    }
}

impl fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(store) => f.debug_tuple("SharedStore").field(&*store).finish(),
            Err(_) => f.write_str("SharedStore(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::core::object_as;

    #[test]
    fn test_nested_change_reaches_parent() {
        let child = Rc::new(SharedStore::empty());
        let mut parent = ValueStore::new();
        parent.set_object("/sub", Rc::clone(&child));

        let hits = Rc::new(RefCell::new(Vec::new()));
        let h = Rc::clone(&hits);
        parent.watch("/sub", move |k| h.borrow_mut().push(k.to_string()));

        child.with_mut(|s| {
            s.set_i32("a", 1);
            s.set_i32("b", 2);
        });
        assert_eq!(*hits.borrow(), vec!["/sub"]);
    }

    #[test]
    fn test_watcher_can_read_during_notification() {
        let child = Rc::new(SharedStore::empty());
        let seen = Rc::new(Cell::new(0));
        let (c, s) = (Rc::downgrade(&child), Rc::clone(&seen));
        child.changed_signal().connect(move |_| {
            if let Some(child) = c.upgrade() {
                s.set(child.borrow().get_i32("n").unwrap_or(-1));
            }
        });
        child.with_mut(|store| store.set_i32("n", 42));
        assert_eq!(seen.get(), 42);
    }

    #[test]
    fn test_nested_store_round_trip() {
        let mut inner = ValueStore::new();
        inner.set_string("title", "inner");
        let mut outer = ValueStore::new();
        outer.set_object("/nested", Rc::new(SharedStore::new(inner)));
        outer.set_i32("/n", 3);

        let back = ValueStore::deserialize(&outer.serialize().unwrap()).unwrap();
        let nested = back.get_object("/nested").unwrap();
        let nested = object_as::<SharedStore>(&nested).unwrap();
        assert_eq!(nested.borrow().get_str("title").unwrap(), "inner");
    }

    #[test]
    fn test_duplicate_is_independent() {
        let original = SharedStore::empty();
        original.with_mut(|s| s.set_i32("x", 1));
        let copy = Serializable::duplicate(&original).unwrap();
        original.with_mut(|s| s.set_i32("x", 2));

        let copy = object_as::<SharedStore>(&copy).unwrap();
        assert_eq!(copy.borrow().get_i32("x").unwrap(), 1);
    }
}
