//! Named, sortable item collection.
//!
//! Items live in a stable `storage` array. Sort order is kept separately:
//! `ridx[pos]` is the storage index of the item at sort position `pos`, and
//! `idx` is its inverse, rebuilt lazily after mutations. Deleting swaps the
//! last storage slot into the hole, so storage order is not preserved but
//! sort order always is.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::item::{InventoryItem, ItemType};
use crate::core::{HandlerId, Signal};
use crate::util::{Error, Result};

/// Name used by [`Inventory::invent_name`] when no base name is given.
pub const UNTITLED_NAME: &str = "Untitled";

/// Change notification from an [`Inventory`]; positions are sort positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventoryEvent {
    Inserted(usize),
    Deleted(usize),
    Updated(usize),
    /// `new_order[new_pos] == old_pos` for every item.
    Reordered(Vec<usize>),
}

/// A collection of uniquely named items with an optional sort order.
pub struct Inventory<T: InventoryItem> {
    item_type: ItemType<T>,
    storage: Vec<T>,
    /// Storage index to sort position; valid when `needs_reindex` is false.
    idx: RefCell<Vec<usize>>,
    /// Sort position to storage index.
    ridx: Vec<usize>,
    names: HashMap<String, usize>,
    default_name: Option<String>,
    is_sorted: bool,
    needs_reindex: Cell<bool>,
    events: Signal<InventoryEvent>,
}

impl<T: InventoryItem> Inventory<T> {
    /// Create an empty inventory.
    pub fn new(item_type: ItemType<T>) -> Self {
        let is_sorted = item_type.can_compare();
        Self {
            item_type,
            storage: Vec::new(),
            idx: RefCell::new(Vec::new()),
            ridx: Vec::new(),
            names: HashMap::new(),
            default_name: None,
            is_sorted,
            needs_reindex: Cell::new(false),
            events: Signal::new(),
        }
    }

    /// Create an inventory from items, keeping their order.
    ///
    /// The inventory counts as sorted iff the items already are.
    pub fn with_items(item_type: ItemType<T>, items: Vec<T>) -> Result<Self> {
        let mut names = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let name = item.name().into_owned();
            if names.contains_key(&name) {
                tracing::warn!(name = %name, "duplicate item name in initial items");
                return Err(Error::DuplicateName(name));
            }
            names.insert(name, i);
        }

        let is_sorted = item_type.can_compare()
            && items
                .windows(2)
                .all(|w| item_type.compare(&w[0], &w[1]) != Some(Ordering::Greater));

        let n = items.len();
        Ok(Self {
            item_type,
            storage: items,
            idx: RefCell::new((0..n).collect()),
            ridx: (0..n).collect(),
            names,
            default_name: None,
            is_sorted,
            needs_reindex: Cell::new(false),
            events: Signal::new(),
        })
    }

    pub fn item_type(&self) -> &ItemType<T> {
        &self.item_type
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Whether the items are known to be in comparator order.
    pub fn is_sorted(&self) -> bool {
        self.is_sorted
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn get(&self, name: &str) -> Option<&T> {
        self.names.get(name).map(|&s| &self.storage[s])
    }

    /// Item at a sort position.
    pub fn get_nth(&self, pos: usize) -> Option<&T> {
        self.ridx.get(pos).map(|&s| &self.storage[s])
    }

    /// Sort position of a named item.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        let s = *self.names.get(name)?;
        Some(self.position_of_storage(s))
    }

    /// Exact match, else the default item, else the first item in storage
    /// order, else `None`.
    pub fn get_or_default(&self, name: Option<&str>) -> Option<&T> {
        if let Some(item) = name.and_then(|n| self.get(n)) {
            return Some(item);
        }
        if let Some(item) = self.default_item() {
            return Some(item);
        }
        self.storage.first()
    }

    /// Set the name of the default item. It need not exist yet.
    pub fn set_default_name(&mut self, name: Option<&str>) {
        self.default_name = name.map(str::to_owned);
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// The default item, if set and present.
    pub fn default_item(&self) -> Option<&T> {
        self.default_name.as_deref().and_then(|n| self.get(n))
    }

    /// First item in sort order matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.iter().find(|item| predicate(item))
    }

    /// Items in sort order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.ridx.iter().map(move |&s| &self.storage[s])
    }

    /// Item names in sort order.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|item| item.name().into_owned()).collect()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Insert an item; returns its sort position.
    ///
    /// In a sorted inventory the item goes after every item comparing
    /// less or equal; otherwise it is appended.
    pub fn insert(&mut self, item: T) -> Result<usize> {
        self.check_new_name(&item.name())?;
        let pos = if self.is_sorted && self.item_type.can_compare() {
            self.upper_bound(&item, &self.ridx)
        } else {
            self.ridx.len()
        };
        Ok(self.insert_at(item, pos))
    }

    /// Insert an item at an explicit sort position.
    ///
    /// The inventory stops counting as sorted if the neighbours are out of
    /// comparator order.
    pub fn insert_nth(&mut self, item: T, pos: usize) -> Result<usize> {
        self.check_new_name(&item.name())?;
        if pos > self.len() {
            tracing::warn!(pos, count = self.len(), "insert position out of bounds");
            return Err(Error::PositionOutOfBounds {
                index: pos,
                count: self.len(),
            });
        }

        if self.is_sorted {
            let before = pos
                .checked_sub(1)
                .and_then(|p| self.get_nth(p))
                .and_then(|prev| self.item_type.compare(prev, &item));
            let after = self
                .get_nth(pos)
                .and_then(|next| self.item_type.compare(&item, next));
            if before == Some(Ordering::Greater) || after == Some(Ordering::Greater) {
                self.is_sorted = false;
            }
        }
        Ok(self.insert_at(item, pos))
    }

    /// Delete a named item and return it.
    pub fn delete(&mut self, name: &str) -> Result<T> {
        let Some(&s) = self.names.get(name) else {
            tracing::warn!(name, "cannot delete missing item");
            return Err(Error::ItemNotFound(name.to_owned()));
        };
        let pos = self.position_of_storage(s);
        self.delete_at(s, pos)
    }

    /// Delete the item at a sort position and return it.
    pub fn delete_nth(&mut self, pos: usize) -> Result<T> {
        let Some(&s) = self.ridx.get(pos) else {
            tracing::warn!(pos, count = self.len(), "delete position out of bounds");
            return Err(Error::PositionOutOfBounds {
                index: pos,
                count: self.len(),
            });
        };
        self.delete_at(s, pos)
    }

    /// Rename an item, moving it if the new name breaks the sort order.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<()> {
        let Some(&s) = self.names.get(name) else {
            tracing::warn!(name, "cannot rename missing item");
            return Err(Error::ItemNotFound(name.to_owned()));
        };
        if self.item_type.fixed(&self.storage[s]) {
            tracing::warn!(name, "cannot rename fixed item");
            return Err(Error::FixedItem(name.to_owned()));
        }
        let Some(rename) = self.item_type.rename.as_ref() else {
            tracing::warn!(name, "item type cannot rename");
            return Err(Error::unsupported("rename"));
        };
        if name == new_name {
            return Ok(());
        }
        if self.names.contains_key(new_name) {
            tracing::warn!(name, new_name, "rename target already exists");
            return Err(Error::DuplicateName(new_name.to_owned()));
        }

        rename(&mut self.storage[s], new_name);
        self.names.remove(name);
        let actual = self.storage[s].name().into_owned();
        if actual != new_name {
            tracing::warn!(expected = new_name, actual = %actual, "rename produced a different name");
        }
        self.names.insert(actual, s);

        let pos = self.position_of_storage(s);
        let pos = self.reposition(s, pos);
        self.events.emit(&InventoryEvent::Updated(pos));
        Ok(())
    }

    /// Sort the items by the comparator.
    ///
    /// The sort is stable. Emits [`InventoryEvent::Reordered`] if anything
    /// moved.
    pub fn restore_order(&mut self) {
        if self.is_sorted {
            return;
        }
        let Some(compare) = self.item_type.compare.as_ref() else {
            return;
        };
        self.ensure_index();

        let mut new_ridx = self.ridx.clone();
        let storage = &self.storage;
        new_ridx.sort_by(|&a, &b| compare(&storage[a], &storage[b]));

        let new_order: Vec<usize> = {
            let idx = self.idx.borrow();
            new_ridx.iter().map(|&s| idx[s]).collect()
        };
        self.ridx = new_ridx;
        self.is_sorted = true;
        self.needs_reindex.set(true);

        if new_order.iter().enumerate().any(|(new, &old)| new != old) {
            self.events.emit(&InventoryEvent::Reordered(new_order));
        }
    }

    /// Stop assuming the items are sorted; later inserts append.
    pub fn forget_order(&mut self) {
        self.is_sorted = false;
    }

    /// Announce that a named item changed.
    pub fn item_updated(&self, name: &str) -> Result<()> {
        let Some(pos) = self.position_of(name) else {
            tracing::warn!(name, "cannot update missing item");
            return Err(Error::ItemNotFound(name.to_owned()));
        };
        self.events.emit(&InventoryEvent::Updated(pos));
        Ok(())
    }

    /// Announce that the item at a sort position changed.
    pub fn nth_item_updated(&self, pos: usize) -> Result<()> {
        if pos >= self.len() {
            return Err(Error::PositionOutOfBounds {
                index: pos,
                count: self.len(),
            });
        }
        self.events.emit(&InventoryEvent::Updated(pos));
        Ok(())
    }

    /// Copy an item under a new, unique name and insert the copy.
    ///
    /// The source is looked up as by [`Inventory::get_or_default`]. The new
    /// name defaults to the source name; either way it is made unique with
    /// [`Inventory::invent_name`]. Returns the sort position of the copy.
    pub fn new_item(&mut self, source: Option<&str>, new_name: Option<&str>) -> Result<usize> {
        let (Some(copy), Some(rename)) = (
            self.item_type.copy.as_ref(),
            self.item_type.rename.as_ref(),
        ) else {
            tracing::warn!("item type cannot copy and rename");
            return Err(Error::unsupported("new_item needs copy and rename"));
        };
        let Some(original) = self.get_or_default(source) else {
            let name = source.unwrap_or_default().to_owned();
            tracing::warn!(name = %name, "no item to copy");
            return Err(Error::ItemNotFound(name));
        };

        let source_name = original.name().into_owned();
        let name = self.invent_name(Some(new_name.unwrap_or(&source_name)));
        let mut item = copy(original)?;
        rename(&mut item, &name);
        self.insert(item)
    }

    /// Find a name not used by any item.
    ///
    /// Returns `base` itself if free; otherwise strips a trailing number
    /// and appends ` 2`, ` 3`, ... until the name is free.
    pub fn invent_name(&self, base: Option<&str>) -> String {
        let base = base.filter(|b| !b.is_empty()).unwrap_or(UNTITLED_NAME);
        if !self.contains(base) {
            return base.to_owned();
        }
        let stem = match base.rsplit_once(' ') {
            Some((stem, num))
                if !stem.is_empty() && !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) =>
            {
                stem
            }
            _ => base,
        };
        (2..)
            .map(|n| format!("{stem} {n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| stem.to_owned())
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Connect an observer; it receives every [`InventoryEvent`].
    pub fn connect<F>(&self, handler: F) -> HandlerId
    where
        F: FnMut(&InventoryEvent) + 'static,
    {
        self.events.connect(handler)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.events.disconnect(id)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn check_new_name(&self, name: &str) -> Result<()> {
        if self.names.contains_key(name) {
            tracing::warn!(name, "item already exists");
            return Err(Error::DuplicateName(name.to_owned()));
        }
        Ok(())
    }

    fn ensure_index(&self) {
        if !self.needs_reindex.get() {
            return;
        }
        let mut idx = self.idx.borrow_mut();
        idx.clear();
        idx.resize(self.ridx.len(), 0);
        for (pos, &s) in self.ridx.iter().enumerate() {
            idx[s] = pos;
        }
        self.needs_reindex.set(false);
    }

    fn position_of_storage(&self, s: usize) -> usize {
        self.ensure_index();
        self.idx.borrow()[s]
    }

    /// First position in `order` whose item compares greater than `item`.
    fn upper_bound(&self, item: &T, order: &[usize]) -> usize {
        let (mut lo, mut hi) = (0, order.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.item_type.compare(&self.storage[order[mid]], item) {
                Some(Ordering::Greater) => hi = mid,
                _ => lo = mid + 1,
            }
        }
        lo
    }

    fn insert_at(&mut self, item: T, pos: usize) -> usize {
        let s = self.storage.len();
        self.names.insert(item.name().into_owned(), s);
        self.storage.push(item);
        self.ridx.insert(pos, s);
        self.needs_reindex.set(true);
        tracing::trace!(pos, "inserted item");
        self.events.emit(&InventoryEvent::Inserted(pos));
        pos
    }

    fn delete_at(&mut self, s: usize, pos: usize) -> Result<T> {
        if self.item_type.fixed(&self.storage[s]) {
            let name = self.storage[s].name().into_owned();
            tracing::warn!(name = %name, "cannot delete fixed item");
            return Err(Error::FixedItem(name));
        }

        let last = self.storage.len() - 1;
        let last_pos = self.position_of_storage(last);

        self.ridx.remove(pos);
        if s != last {
            // The last storage slot moves into `s`.
            let moved_pos = if last_pos > pos { last_pos - 1 } else { last_pos };
            self.ridx[moved_pos] = s;
            let moved_name = self.storage[last].name().into_owned();
            self.names.insert(moved_name, s);
        }
        let removed_name = self.storage[s].name().into_owned();
        self.names.remove(&removed_name);
        let item = self.storage.swap_remove(s);
        self.needs_reindex.set(true);

        self.events.emit(&InventoryEvent::Deleted(pos));
        Ok(item)
    }

    /// Move the item at storage `s`, sort position `pos`, to where it
    /// belongs if the inventory is sorted. Returns its final position.
    fn reposition(&mut self, s: usize, pos: usize) -> usize {
        if !self.is_sorted {
            return pos;
        }
        let item = &self.storage[s];
        let out_of_order = {
            let prev = pos
                .checked_sub(1)
                .and_then(|p| self.get_nth(p))
                .and_then(|prev| self.item_type.compare(prev, item));
            let next = self
                .get_nth(pos + 1)
                .and_then(|next| self.item_type.compare(item, next));
            prev == Some(Ordering::Greater) || next == Some(Ordering::Greater)
        };
        if !out_of_order {
            return pos;
        }

        let mut rest = self.ridx.clone();
        rest.remove(pos);
        let new_pos = self.upper_bound(&self.storage[s], &rest);
        rest.insert(new_pos, s);

        // Positions between the old and new slot shift by one.
        let new_order: Vec<usize> = (0..rest.len())
            .map(|p| {
                if p == new_pos {
                    pos
                } else if new_pos < pos && p > new_pos && p <= pos {
                    p - 1
                } else if new_pos > pos && p >= pos && p < new_pos {
                    p + 1
                } else {
                    p
                }
            })
            .collect();

        self.ridx = rest;
        self.needs_reindex.set(true);
        self.events.emit(&InventoryEvent::Reordered(new_order));
        new_pos
    }

    #[cfg(test)]
    fn check_index_invariant(&self) {
        self.ensure_index();
        let idx = self.idx.borrow();
        assert_eq!(idx.len(), self.ridx.len());
        for (pos, &s) in self.ridx.iter().enumerate() {
            assert_eq!(idx[s], pos);
        }
        for (name, &s) in &self.names {
            assert_eq!(self.storage[s].name(), name.as_str());
        }
    }
}

impl<T: InventoryItem> std::fmt::Debug for Inventory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inventory")
            .field("names", &self.names())
            .field("is_sorted", &self.is_sorted)
            .field("default", &self.default_name)
            .finish()
    }
}
