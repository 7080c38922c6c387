//! Core layer - values, object capabilities and signals.
//!
//! This module provides:
//! - [`Value`] / [`ValueKind`] - Tagged values held by a store
//! - [`Serializable`] / [`Watchable`] / [`StoreObject`] - Object capabilities
//! - [`Signal`] - Registration-ordered change notification

mod object;
mod signal;
mod value;

pub use object::{
    downcast_object, object_as, same_object, AsAny, Deserializable, ObjectRef, Serializable,
    StoreObject, Watchable,
};
pub use signal::{ChangeSignal, HandlerId, Signal};
pub(crate) use value::extract;
pub use value::{FromValue, Value, ValueKind};
