//! Hierarchical typed value store.
//!
//! - [`ValueStore`] - Values under `/`-separated keys with change watchers
//! - [`SharedStore`] - A store nested as an object value of another store
//!
//! Stores serialize to the wire format as `ValueStore` object frames, save
//! to `GWYO` files, and have a line-oriented text form for scalar entries.

mod file;
mod serial;
mod shared;
mod text;
mod value_store;
mod watch;

pub use shared::SharedStore;
pub use value_store::ValueStore;
pub use watch::WatchId;
