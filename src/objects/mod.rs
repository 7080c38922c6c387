//! Built-in serializable object types.
//!
//! - [`StringList`] - Ordered list of strings
//! - [`SiUnit`] - Physical unit
//! - [`DataLine`] - One-dimensional sampled data with units
//! - [`Preset`] - Named parameter set, the typical inventory item
//!
//! All of them are registered in the global
//! [`TypeRegistry`](crate::wire::TypeRegistry).

mod data_line;
mod preset;
mod si_unit;
mod string_list;

pub use data_line::DataLine;
pub use preset::Preset;
pub use si_unit::SiUnit;
pub use string_list::StringList;
