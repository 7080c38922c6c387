//! Utility types shared by every layer.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`Quark`] / [`AsKey`] - Interned keys
//! - Path helpers for the `/`-separated key convention

mod error;
mod path;
mod quark;

pub use error::*;
pub use path::*;
pub use quark::*;
