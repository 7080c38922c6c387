//! Self-describing binary wire format.
//!
//! Every value is little-endian and tagged by a single byte (see
//! [`TypeTag`]). Objects are framed as `[type-name][u32 size][payload]`,
//! so a decoder can skip types it does not understand. Struct payloads
//! are `[name][tag][value]` triples read through [`read_struct`].
//!
//! The same format is used for files and for deep copies of objects.

mod format;
mod reader;
mod registry;
mod structs;
mod writer;

pub use format::{
    TypeTag, DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_DEPTH, FILE_MAGIC, STORE_TYPE_NAME,
};
pub use reader::WireReader;
pub use registry::{global_registry, lookup_decoder, register_type, DecodeFn, TypeRegistry};
pub use structs::{read_struct, FieldSpec, FieldValue, StructFields};
pub use writer::WireWriter;

use std::rc::Rc;

use crate::core::{ObjectRef, Serializable};
use crate::util::Result;

/// Encode an object as a standalone frame.
pub fn encode_object<S: Serializable + ?Sized>(object: &S) -> Result<Vec<u8>> {
    let mut writer = WireWriter::new();
    writer.write_object(object)?;
    Ok(writer.into_bytes())
}

/// Decode a standalone object frame using the global registry.
pub fn decode_object(bytes: &[u8]) -> Result<ObjectRef> {
    WireReader::new(bytes).read_object()
}

/// Decode a standalone object frame using `registry`.
pub fn decode_object_with(bytes: &[u8], registry: &TypeRegistry) -> Result<ObjectRef> {
    WireReader::new(bytes).with_registry(registry).read_object()
}

/// Deep-copy an object; singletons are shared instead.
pub fn duplicate_object(object: &ObjectRef) -> Result<ObjectRef> {
    if object.is_singleton() {
        return Ok(Rc::clone(object));
    }
    object.duplicate()
}
