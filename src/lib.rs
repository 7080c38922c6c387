//! # gwystore
//!
//! Data containers for scientific data processing: a hierarchical typed
//! value store, the self-describing binary format it is saved in, and
//! named, ordered inventories of reusable items.
//!
//! ## Modules
//!
//! - [`util`] - Errors, interned keys, path helpers
//! - [`core`] - Values, object capabilities, change signals
//! - [`wire`] - Binary wire format: writer, reader, type registry
//! - [`store`] - The value store and its watchers
//! - [`inventory`] - Named item collections with sort order
//! - [`objects`] - Built-in serializable object types
//! - [`config`] - Persistent settings
//!
//! ## Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use gwystore::ValueStore;
//!
//! let mut store = ValueStore::new();
//! let hits = Rc::new(Cell::new(0));
//! let h = Rc::clone(&hits);
//! store.watch("/0/data", move |_| h.set(h.get() + 1));
//!
//! store.set_f64("/0/data/real", 1e-6);
//! store.set_f64("/0/database", 1.0);
//! assert_eq!(hits.get(), 1);
//!
//! let bytes = store.serialize().unwrap();
//! let copy = ValueStore::deserialize(&bytes).unwrap();
//! assert_eq!(copy.get_f64("/0/data/real").unwrap(), 1e-6);
//! ```

pub mod util;
pub mod core;
pub mod wire;
pub mod store;
pub mod inventory;
pub mod objects;
pub mod config;

// Re-export commonly used types
pub use util::{Error, Quark, Result};
pub use core::{ObjectRef, Value, ValueKind};
pub use store::{SharedStore, ValueStore, WatchId};
pub use inventory::{Inventory, InventoryEvent, ItemType};
pub use config::Settings;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{AsKey, Error, Quark, Result};
    pub use crate::core::{
        downcast_object, object_as, Deserializable, ObjectRef, Serializable, StoreObject, Value,
        ValueKind, Watchable,
    };
    pub use crate::wire::{WireReader, WireWriter};
    pub use crate::store::{SharedStore, ValueStore, WatchId};
    pub use crate::inventory::{Inventory, InventoryEvent, InventoryItem, ItemType};
    pub use crate::objects::*;
    pub use crate::config::Settings;
}
