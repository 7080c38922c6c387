//! Named item inventories.
//!
//! An [`Inventory`] holds uniquely named items, optionally kept in
//! comparator order, and reports insertions, deletions, updates and
//! reorderings to its observers. What an item can do (compare, rename,
//! copy, refuse deletion) is described per inventory by an [`ItemType`].

mod collection;
mod item;

pub use collection::{Inventory, InventoryEvent, UNTITLED_NAME};
pub use item::{codec_copy, CompareFn, CopyFn, FixedFn, InventoryItem, ItemType, RenameFn};
