//! The value store.

use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::watch::{WatchHub, WatchId};
use crate::core::{
    downcast_object, extract, FromValue, HandlerId, ObjectRef, StoreObject, Value, ValueKind,
};
use crate::util::{key_matches, replace_prefix, AsKey, Error, Quark, Result};

/// Typed values under hierarchical keys.
///
/// Keys are interned strings using `/` as a path separator, e.g.
/// `/0/data/title`. Values are primitives, strings or shared objects.
/// Object values are watched: when an object emits its change signal the
/// store notifies its own watchers of the object's key.
///
/// # Example
///
/// ```
/// use gwystore::ValueStore;
///
/// let mut store = ValueStore::new();
/// store.set_i32("/0/data/xres", 512);
/// store.set_string("/0/data/title", "Topography");
/// assert_eq!(store.get_i32("/0/data/xres").unwrap(), 512);
/// assert_eq!(store.foreach(Some("/0/data"), |_, _| {}), 2);
/// ```
pub struct ValueStore {
    pub(super) values: HashMap<Quark, Value>,
    /// One change-signal handler per object entry.
    subscriptions: HashMap<Quark, HandlerId>,
    hub: Rc<WatchHub>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            subscriptions: HashMap::new(),
            hub: Rc::new(WatchHub::new()),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains<K: AsKey>(&self, key: K) -> bool {
        key.existing_quark()
            .is_some_and(|q| self.values.contains_key(&q))
    }

    /// Kind of the value under `key`.
    pub fn value_kind<K: AsKey>(&self, key: K) -> Option<ValueKind> {
        self.get(key).map(Value::kind)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn get<K: AsKey>(&self, key: K) -> Option<&Value> {
        self.values.get(&key.existing_quark()?)
    }

    /// Get a value of a specific kind.
    ///
    /// Fails with [`Error::KeyNotFound`] or [`Error::TypeMismatch`]; the
    /// kinds never convert into each other.
    pub fn get_typed<T: FromValue, K: AsKey>(&self, key: K) -> Result<T> {
        let value = self
            .get(&key)
            .ok_or_else(|| Error::KeyNotFound(key.describe()))?;
        extract(&key.describe(), value)
    }

    pub fn get_bool<K: AsKey>(&self, key: K) -> Result<bool> {
        self.get_typed(key)
    }

    pub fn get_byte<K: AsKey>(&self, key: K) -> Result<u8> {
        self.get_typed(key)
    }

    pub fn get_i32<K: AsKey>(&self, key: K) -> Result<i32> {
        self.get_typed(key)
    }

    pub fn get_i64<K: AsKey>(&self, key: K) -> Result<i64> {
        self.get_typed(key)
    }

    pub fn get_f64<K: AsKey>(&self, key: K) -> Result<f64> {
        self.get_typed(key)
    }

    pub fn get_string<K: AsKey>(&self, key: K) -> Result<String> {
        self.get_typed(key)
    }

    /// Borrow a string value.
    pub fn get_str<K: AsKey>(&self, key: K) -> Result<&str> {
        match self.get(&key) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(Error::TypeMismatch {
                key: key.describe(),
                expected: ValueKind::String.name(),
                actual: other.kind().name(),
            }),
            None => Err(Error::KeyNotFound(key.describe())),
        }
    }

    pub fn get_object<K: AsKey>(&self, key: K) -> Result<ObjectRef> {
        self.get_typed(key)
    }

    /// Get an object value downcast to its concrete type.
    pub fn get_object_as<T: StoreObject, K: AsKey>(&self, key: K) -> Result<Rc<T>> {
        let object = self.get_object(&key)?;
        downcast_object::<T>(&object).ok_or_else(|| Error::TypeMismatch {
            key: key.describe(),
            expected: std::any::type_name::<T>(),
            actual: object.type_name(),
        })
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Create or replace the value under `key` and notify watchers.
    ///
    /// Replacing an object value disconnects from the old object before
    /// connecting to the new one. The empty key is rejected.
    pub fn set<K: AsKey>(&mut self, key: K, value: impl Into<Value>) {
        let quark = key.to_quark();
        if quark.as_str() == Some("") {
            tracing::error!("refusing to store a value under the empty key");
            debug_assert!(false, "empty store key");
            return;
        }
        self.unsubscribe(quark);
        let value = value.into();
        let is_object = matches!(value, Value::Object(_));
        self.values.insert(quark, value);
        if is_object {
            self.subscribe(quark);
        }
        self.hub.value_changed(quark);
    }

    pub fn set_bool<K: AsKey>(&mut self, key: K, value: bool) {
        self.set(key, value);
    }

    pub fn set_byte<K: AsKey>(&mut self, key: K, value: u8) {
        self.set(key, value);
    }

    pub fn set_i32<K: AsKey>(&mut self, key: K, value: i32) {
        self.set(key, value);
    }

    pub fn set_i64<K: AsKey>(&mut self, key: K, value: i64) {
        self.set(key, value);
    }

    pub fn set_f64<K: AsKey>(&mut self, key: K, value: f64) {
        self.set(key, value);
    }

    pub fn set_string<K: AsKey>(&mut self, key: K, value: impl Into<String>) {
        self.set(key, Value::String(value.into()));
    }

    pub fn set_object<K: AsKey, T: StoreObject>(&mut self, key: K, object: Rc<T>) {
        self.set(key, Value::Object(object));
    }

    // ========================================================================
    // Removal and renaming
    // ========================================================================

    /// Remove a value. Returns `false` if there was none.
    pub fn remove<K: AsKey>(&mut self, key: K) -> bool {
        let Some(quark) = key.existing_quark() else {
            return false;
        };
        if !self.values.contains_key(&quark) {
            return false;
        }
        self.unsubscribe(quark);
        self.values.remove(&quark);
        self.hub.value_changed(quark);
        true
    }

    /// Move the value under `old` to `new`.
    ///
    /// An existing value under `new` blocks the rename unless `force` is
    /// set, in which case it is removed first. Renaming a key to itself
    /// succeeds without change.
    pub fn rename<K1: AsKey, K2: AsKey>(&mut self, old: K1, new: K2, force: bool) -> bool {
        let Some(old_q) = old.existing_quark().filter(|q| self.values.contains_key(q)) else {
            return false;
        };
        let new_q = new.to_quark();
        if new_q == old_q {
            return true;
        }
        if new_q.as_str() == Some("") {
            tracing::error!("refusing to rename to the empty key");
            debug_assert!(false, "empty store key");
            return false;
        }
        if self.values.contains_key(&new_q) {
            if !force {
                return false;
            }
            self.remove(new_q);
        }

        self.unsubscribe(old_q);
        let Some(value) = self.values.remove(&old_q) else {
            return false;
        };
        let is_object = matches!(value, Value::Object(_));
        self.values.insert(new_q, value);
        if is_object {
            self.subscribe(new_q);
        }
        self.hub.value_changed(new_q);
        self.hub.value_changed(old_q);
        true
    }

    /// Remove every value whose key matches `prefix`; returns the count.
    ///
    /// Watchers see the removals as one coalesced batch.
    pub fn remove_by_prefix(&mut self, prefix: Option<&str>) -> usize {
        let keys = self.keys_with_prefix(prefix);
        self.freeze();
        for &key in &keys {
            self.remove(key);
        }
        self.thaw();
        keys.len()
    }

    /// Remove everything.
    pub fn clear(&mut self) -> usize {
        self.remove_by_prefix(None)
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// All keys; named keys sorted by name, then anonymous keys by id.
    pub fn keys(&self) -> Vec<Quark> {
        self.keys_with_prefix(None)
    }

    /// Keys matching `prefix`, ordered as [`ValueStore::keys`].
    ///
    /// `Some(p)` matches named keys equal to `p` or below `p/`;
    /// `Some("")` matches every named key; `None` matches every key.
    pub fn keys_with_prefix(&self, prefix: Option<&str>) -> Vec<Quark> {
        let mut keys: Vec<Quark> = self
            .values
            .keys()
            .copied()
            .filter(|&k| key_matches(k, prefix))
            .collect();
        keys.sort_by(|a, b| match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id().cmp(&b.id()),
        });
        keys
    }

    /// Call `f` for every value whose key matches `prefix`; returns the
    /// number of calls.
    pub fn foreach<F>(&self, prefix: Option<&str>, mut f: F) -> usize
    where
        F: FnMut(Quark, &Value),
    {
        let keys = self.keys_with_prefix(prefix);
        for &key in &keys {
            if let Some(value) = self.values.get(&key) {
                f(key, value);
            }
        }
        keys.len()
    }

    /// Iterate over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Quark, &Value)> + '_ {
        self.values.iter().map(|(&k, v)| (k, v))
    }

    // ========================================================================
    // Watching
    // ========================================================================

    /// Call `callback` with the key of every change at or below `path`.
    pub fn watch<F>(&self, path: &str, callback: F) -> WatchId
    where
        F: FnMut(Quark) + 'static,
    {
        self.hub.watch(Some(path), callback)
    }

    /// Call `callback` for every change, anonymous keys included.
    pub fn watch_all<F>(&self, callback: F) -> WatchId
    where
        F: FnMut(Quark) + 'static,
    {
        self.hub.watch(None, callback)
    }

    pub fn unwatch(&self, id: WatchId) -> bool {
        self.hub.unwatch(id)
    }

    /// Collect notifications until the matching [`ValueStore::thaw`].
    pub fn freeze(&self) {
        self.hub.freeze();
    }

    /// Undo one [`ValueStore::freeze`]; the last one delivers collected
    /// changes, each watcher at most once.
    pub fn thaw(&self) {
        self.hub.thaw();
    }

    pub fn is_frozen(&self) -> bool {
        self.hub.is_frozen()
    }

    // ========================================================================
    // Copying
    // ========================================================================

    /// Deep copy; objects are duplicated, never shared. Watchers are not
    /// copied.
    pub fn duplicate(&self) -> Result<ValueStore> {
        self.duplicate_where(|_| true)
    }

    /// Deep copy of the values matching any of `prefixes`.
    pub fn duplicate_by_prefix(&self, prefixes: &[&str]) -> Result<ValueStore> {
        self.duplicate_where(|key| prefixes.iter().any(|p| key_matches(key, Some(p))))
    }

    fn duplicate_where(&self, mut keep: impl FnMut(Quark) -> bool) -> Result<ValueStore> {
        let mut copy = ValueStore::new();
        for (&key, value) in &self.values {
            if keep(key) {
                copy.set(key, value.deep_copy()?);
            }
        }
        Ok(copy)
    }

    /// Copy values under `source_prefix` into `dest`, replacing the prefix
    /// with `dest_prefix`.
    ///
    /// With `deep` objects are duplicated, otherwise shared. Existing
    /// values in `dest` are replaced only with `force`. Returns the number
    /// of values copied.
    pub fn transfer(
        &self,
        dest: &mut ValueStore,
        source_prefix: &str,
        dest_prefix: &str,
        deep: bool,
        force: bool,
    ) -> Result<usize> {
        let mut copied = 0;
        dest.freeze();
        let result = self.transfer_into(dest, source_prefix, dest_prefix, deep, force, &mut copied);
        dest.thaw();
        result.map(|()| copied)
    }

    fn transfer_into(
        &self,
        dest: &mut ValueStore,
        source_prefix: &str,
        dest_prefix: &str,
        deep: bool,
        force: bool,
        copied: &mut usize,
    ) -> Result<()> {
        for key in self.keys_with_prefix(Some(source_prefix)) {
            let Some(name) = key.as_str() else { continue };
            let Some(new_name) = replace_prefix(name, source_prefix, dest_prefix) else {
                continue;
            };
            if new_name.is_empty() {
                tracing::warn!(key = name, "transfer would produce the empty key, skipped");
                continue;
            }
            if !force && dest.contains(new_name.as_str()) {
                continue;
            }
            let Some(value) = self.values.get(&key) else { continue };
            let value = if deep { value.deep_copy()? } else { value.clone() };
            dest.set(new_name.as_str(), value);
            *copied += 1;
        }
        Ok(())
    }

    // ========================================================================
    // Object subscriptions
    // ========================================================================

    fn subscribe(&mut self, key: Quark) {
        let Some(Value::Object(object)) = self.values.get(&key) else {
            return;
        };
        let hub: Weak<WatchHub> = Rc::downgrade(&self.hub);
        let id = object.changed_signal().connect(move |_| {
            if let Some(hub) = hub.upgrade() {
                hub.value_changed(key);
            }
        });
        if let Some(stale) = self.subscriptions.insert(key, id) {
            tracing::error!(%key, ?stale, "object entry was already subscribed");
        }
    }

    fn unsubscribe(&mut self, key: Quark) {
        let Some(id) = self.subscriptions.remove(&key) else {
            return;
        };
        if let Some(Value::Object(object)) = self.values.get(&key) {
            object.changed_signal().disconnect(id);
        }
    }

    #[cfg(test)]
    pub(crate) fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ValueStore {
    fn drop(&mut self) {
        for (key, id) in self.subscriptions.drain() {
            if let Some(Value::Object(object)) = self.values.get(&key) {
                object.changed_signal().disconnect(id);
            }
        }
    }
}

impl fmt::Debug for ValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in self.keys() {
            if let Some(value) = self.values.get(&key) {
                map.entry(&key.to_string(), value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Watchable;
    use crate::objects::{SiUnit, StringList};
    use std::cell::RefCell;

    fn recorder(store: &ValueStore, path: &str) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        store.watch(path, move |k| l.borrow_mut().push(k.to_string()));
        log
    }

    #[test]
    fn test_foobar_scenario() {
        let mut store = ValueStore::new();
        store.set_i32("foobar", 1133);
        store.set_i32("foobar", -100);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_i32("foobar").unwrap(), -100);

        store.set_f64("foobar", 1.13);
        assert!(matches!(
            store.get_i32("foobar"),
            Err(Error::TypeMismatch { expected: "int32", actual: "double", .. })
        ));
        assert_eq!(store.get_f64("foobar").unwrap(), 1.13);
        assert_eq!(store.value_kind("foobar"), Some(ValueKind::Double));
    }

    #[test]
    fn test_missing_key() {
        let store = ValueStore::new();
        assert!(matches!(
            store.get_i32("store-test-missing"),
            Err(Error::KeyNotFound(k)) if k == "store-test-missing"
        ));
        assert!(store.get("store-test-missing").is_none());
        assert!(!store.contains("store-test-missing"));
    }

    #[test]
    fn test_int_kinds_are_distinct() {
        let mut store = ValueStore::new();
        store.set_i64("n", 5);
        assert!(store.get_i32("n").is_err());
        assert_eq!(store.get_i64("n").unwrap(), 5);
    }

    #[test]
    fn test_remove_by_prefix_boundary() {
        let mut store = ValueStore::new();
        store.set_i32("pdf", 1);
        store.set_i32("pdf/f", 2);
        store.set_i32("pdfoo", 3);

        assert_eq!(store.remove_by_prefix(Some("pdf")), 2);
        assert!(!store.contains("pdf"));
        assert!(!store.contains("pdf/f"));
        assert!(store.contains("pdfoo"));
    }

    #[test]
    fn test_prefix_none_includes_anonymous() {
        let mut store = ValueStore::new();
        let anon = Quark::anonymous();
        store.set_bool(anon, true);
        store.set_bool("named", false);

        assert_eq!(store.foreach(Some(""), |_, _| {}), 1);
        assert_eq!(store.foreach(None, |_, _| {}), 2);
        assert_eq!(*store.keys().last().unwrap(), anon);
    }

    #[test]
    fn test_rename() {
        let mut store = ValueStore::new();
        store.set_i32("a", 1);
        store.set_i32("b", 2);

        assert!(!store.rename("a", "b", false));
        assert_eq!(store.get_i32("a").unwrap(), 1);
        assert_eq!(store.get_i32("b").unwrap(), 2);

        assert!(store.rename("a", "b", true));
        assert!(!store.contains("a"));
        assert_eq!(store.get_i32("b").unwrap(), 1);

        assert!(store.rename("b", "b", false));
        assert!(!store.rename("store-test-nothing", "c", true));
        assert!(store.rename("b", "c", false));
        assert_eq!(store.keys(), vec![Quark::intern("c")]);
    }

    #[test]
    fn test_watch_paths() {
        let mut store = ValueStore::new();
        let data = recorder(&store, "/0/data");
        store.set_i32("/0/data", 1);
        store.set_string("/0/data/title", "x");
        store.set_i32("/0/database", 3);
        store.remove("/0/data");
        assert_eq!(
            *data.borrow(),
            vec!["/0/data", "/0/data/title", "/0/data"]
        );
    }

    #[test]
    fn test_freeze_coalescing() {
        let mut store = ValueStore::new();
        let log = recorder(&store, "/0");
        store.freeze();
        for i in 0..10 {
            store.set_i32(format!("/0/meta/item{i}"), i);
        }
        assert!(log.borrow().is_empty());
        store.thaw();
        assert_eq!(*log.borrow(), vec!["/0/meta/item0"]);
    }

    #[test]
    fn test_remove_by_prefix_notifies_once() {
        let mut store = ValueStore::new();
        store.set_i32("/1/a", 1);
        store.set_i32("/1/b", 2);
        let log = recorder(&store, "/1");
        assert_eq!(store.remove_by_prefix(Some("/1")), 2);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_object_changes_are_forwarded() {
        let mut store = ValueStore::new();
        let unit = Rc::new(SiUnit::new("m"));
        store.set_object("/0/data/unit", Rc::clone(&unit));
        let log = recorder(&store, "/0/data");

        unit.set_unit_string("A");
        assert_eq!(*log.borrow(), vec!["/0/data/unit"]);
        assert_eq!(store.subscription_count(), 1);

        // Replacing the object disconnects from the old one.
        store.set_object("/0/data/unit", Rc::new(SiUnit::new("V")));
        assert_eq!(unit.changed_signal().handler_count(), 0);
        assert_eq!(store.subscription_count(), 1);
        log.borrow_mut().clear();
        unit.set_unit_string("s");
        assert!(log.borrow().is_empty());

        store.set_i32("/0/data/unit", 1);
        assert_eq!(store.subscription_count(), 0);
    }

    #[test]
    fn test_same_object_under_two_keys() {
        let mut store = ValueStore::new();
        let list = Rc::new(StringList::new());
        store.set_object("one", Rc::clone(&list));
        store.set_object("two", Rc::clone(&list));
        assert_eq!(list.changed_signal().handler_count(), 2);

        let all = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&all);
        store.watch_all(move |k| a.borrow_mut().push(k.to_string()));
        list.append("x");
        assert_eq!(*all.borrow(), vec!["one", "two"]);

        store.remove("one");
        assert_eq!(list.changed_signal().handler_count(), 1);
    }

    #[test]
    fn test_drop_disconnects() {
        let list = Rc::new(StringList::new());
        {
            let mut store = ValueStore::new();
            store.set_object("l", Rc::clone(&list));
            assert_eq!(list.changed_signal().handler_count(), 1);
        }
        assert_eq!(list.changed_signal().handler_count(), 0);
        list.append("still fine");
    }

    #[test]
    fn test_rename_moves_subscription() {
        let mut store = ValueStore::new();
        let unit = Rc::new(SiUnit::new("m"));
        store.set_object("u", Rc::clone(&unit));
        assert!(store.rename("u", "v", false));
        assert_eq!(unit.changed_signal().handler_count(), 1);

        let log = recorder(&store, "v");
        unit.set_unit_string("A");
        assert_eq!(*log.borrow(), vec!["v"]);
    }

    #[test]
    fn test_get_object_as() {
        let mut store = ValueStore::new();
        store.set_object("u", Rc::new(SiUnit::new("m")));
        assert_eq!(store.get_object_as::<SiUnit, _>("u").unwrap().unit_string(), "m");
        assert!(matches!(
            store.get_object_as::<StringList, _>("u"),
            Err(Error::TypeMismatch { actual: "SiUnit", .. })
        ));
    }

    #[test]
    fn test_duplicate_is_deep() {
        let mut store = ValueStore::new();
        let unit = Rc::new(SiUnit::new("m"));
        store.set_object("/0/unit", Rc::clone(&unit));
        store.set_string("/0/title", "t");

        let copy = store.duplicate().unwrap();
        assert_eq!(copy.get_str("/0/title").unwrap(), "t");
        let copied_unit = copy.get_object_as::<SiUnit, _>("/0/unit").unwrap();
        assert!(!Rc::ptr_eq(&unit, &copied_unit));
        assert_eq!(copied_unit.unit_string(), "m");
        assert!(copy.get("/0/unit").unwrap().equivalent(store.get("/0/unit").unwrap()));
    }

    #[test]
    fn test_duplicate_of_duplicate() {
        let mut store = ValueStore::new();
        let unit = Rc::new(SiUnit::new("V"));
        store.set_object("/0/unit", Rc::clone(&unit));
        store.set_object("/0/alias", Rc::clone(&unit));
        store.set_f64("/0/real", 2.5);

        let first = store.duplicate().unwrap();
        let second = first.duplicate().unwrap();
        assert_eq!(second.serialize().unwrap(), store.serialize().unwrap());

        let a = first.get_object_as::<SiUnit, _>("/0/unit").unwrap();
        let b = second.get_object_as::<SiUnit, _>("/0/unit").unwrap();
        assert!(!Rc::ptr_eq(&unit, &b));
        assert!(!Rc::ptr_eq(&a, &b));

        // Edits to the source stay out of both copies
        unit.set_unit_string("A");
        assert_eq!(b.unit_string(), "V");
        assert_eq!(second.get_object_as::<SiUnit, _>("/0/alias").unwrap().unit_string(), "V");
    }

    #[test]
    fn test_duplicate_by_prefix() {
        let mut store = ValueStore::new();
        store.set_i32("/0/data", 1);
        store.set_i32("/0/meta/x", 2);
        store.set_i32("/1/data", 3);
        let copy = store.duplicate_by_prefix(&["/0/meta", "/1"]).unwrap();
        assert_eq!(copy.keys().len(), 2);
        assert!(copy.contains("/0/meta/x"));
        assert!(copy.contains("/1/data"));
    }

    #[test]
    fn test_transfer() {
        let mut src = ValueStore::new();
        src.set_i32("/0/meta/a", 1);
        src.set_i32("/0/meta/b", 2);
        src.set_i32("/0/metadata", 9);
        let unit = Rc::new(SiUnit::new("m"));
        src.set_object("/0/meta/unit", Rc::clone(&unit));

        let mut dst = ValueStore::new();
        dst.set_i32("/5/meta/a", 100);
        let n = src.transfer(&mut dst, "/0/meta", "/5/meta", false, false).unwrap();
        assert_eq!(n, 2);
        assert_eq!(dst.get_i32("/5/meta/a").unwrap(), 100);
        assert_eq!(dst.get_i32("/5/meta/b").unwrap(), 2);
        assert!(!dst.contains("/5/metadata"));
        // Shallow: the object is shared.
        assert!(Rc::ptr_eq(&dst.get_object_as::<SiUnit, _>("/5/meta/unit").unwrap(), &unit));

        let n = src.transfer(&mut dst, "/0/meta", "/5/meta", true, true).unwrap();
        assert_eq!(n, 3);
        assert_eq!(dst.get_i32("/5/meta/a").unwrap(), 1);
        assert!(!Rc::ptr_eq(&dst.get_object_as::<SiUnit, _>("/5/meta/unit").unwrap(), &unit));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "empty store key")]
    fn test_empty_key_is_a_contract_violation() {
        let mut store = ValueStore::new();
        store.set_i32("", 1);
    }
}
