//! Object capabilities: serialization and change watching.
//!
//! Values stored as objects in a [`ValueStore`](crate::store::ValueStore)
//! must be both [`Serializable`] (so the store can persist and deep-copy
//! them) and [`Watchable`] (so the store can forward their changes to its
//! own watchers). [`StoreObject`] is the combination of the two and
//! [`ObjectRef`] the shared handle stores and callers pass around.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::core::ChangeSignal;
use crate::util::Result;
use crate::wire::{self, WireReader, WireWriter};

/// Dynamic downcasting support, implemented for every `'static` type.
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Convert a shared handle into `Rc<dyn Any>`.
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Types that encode themselves as a wire object frame.
pub trait Serializable: AsAny {
    /// Type name written in the object frame header; resolved through the
    /// [`TypeRegistry`](crate::wire::TypeRegistry) when decoding.
    fn type_name(&self) -> &'static str;

    /// Write the frame payload. The frame header (type name and payload
    /// size) is written by [`WireWriter::write_object`].
    fn serialize_payload(&self, writer: &mut WireWriter) -> Result<()>;

    /// Produce a deep copy.
    ///
    /// The default encodes `self` and decodes the bytes again, which is
    /// value-equivalent for any type whose decoder inverts its encoder.
    fn duplicate(&self) -> Result<ObjectRef> {
        let bytes = wire::encode_object(self)?;
        WireReader::new(&bytes).read_object()
    }

    /// Singletons are shared instead of copied by [`wire::duplicate_object`].
    fn is_singleton(&self) -> bool {
        false
    }
}

/// Types that announce their own changes.
pub trait Watchable {
    /// The signal emitted whenever the value changes.
    fn changed_signal(&self) -> &ChangeSignal;

    /// Emit the change signal.
    fn emit_changed(&self) {
        self.changed_signal().emit(&());
    }
}

/// Object that can be held by a store.
pub trait StoreObject: Serializable + Watchable {}

impl<T: Serializable + Watchable> StoreObject for T {}

impl fmt::Debug for dyn StoreObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreObject({})", self.type_name())
    }
}

/// Shared handle to a stored object.
pub type ObjectRef = Rc<dyn StoreObject>;

/// Types constructible from an object frame payload.
pub trait Deserializable: StoreObject + Sized {
    /// Type name matching [`Serializable::type_name`].
    const TYPE_NAME: &'static str;

    /// Decode from the payload reader of an object frame.
    fn deserialize(reader: &mut WireReader<'_>) -> Result<Self>;
}

/// Downcast a shared object to its concrete type.
pub fn downcast_object<T: StoreObject>(object: &ObjectRef) -> Option<Rc<T>> {
    Rc::clone(object).into_any_rc().downcast::<T>().ok()
}

/// Borrow a shared object as its concrete type.
pub fn object_as<T: StoreObject>(object: &ObjectRef) -> Option<&T> {
    let inner: &dyn StoreObject = &**object;
    inner.as_any().downcast_ref::<T>()
}

/// Whether two handles point to the same object.
#[inline]
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    Rc::ptr_eq(a, b)
}
