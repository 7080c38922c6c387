//! Named-field struct payloads.
//!
//! A struct payload is a sequence of `[name][tag][value]` triples. Decoding
//! checks each field against a list of [`FieldSpec`]s:
//!
//! - unknown field names are skipped with a warning,
//! - a known name carrying the wrong tag aborts the decode,
//! - absent fields are simply missing from the result.

use smallvec::SmallVec;

use super::format::TypeTag;
use super::reader::WireReader;
use super::writer::WireWriter;
use crate::core::ObjectRef;
use crate::util::{Error, Result};

/// A decoded struct field.
#[derive(Clone)]
pub enum FieldValue {
    Bool(bool),
    Byte(u8),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Object(ObjectRef),
    ByteArray(Vec<u8>),
    Int32Array(Vec<i32>),
    Int64Array(Vec<i64>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
    ObjectArray(Vec<ObjectRef>),
}

impl FieldValue {
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Bool(_) => TypeTag::Bool,
            Self::Byte(_) => TypeTag::Byte,
            Self::Int32(_) => TypeTag::Int32,
            Self::Int64(_) => TypeTag::Int64,
            Self::Double(_) => TypeTag::Double,
            Self::String(_) => TypeTag::String,
            Self::Object(_) => TypeTag::Object,
            Self::ByteArray(_) => TypeTag::ByteArray,
            Self::Int32Array(_) => TypeTag::Int32Array,
            Self::Int64Array(_) => TypeTag::Int64Array,
            Self::DoubleArray(_) => TypeTag::DoubleArray,
            Self::StringArray(_) => TypeTag::StringArray,
            Self::ObjectArray(_) => TypeTag::ObjectArray,
        }
    }

    /// Read the value following `tag`.
    pub fn read(reader: &mut WireReader<'_>, tag: TypeTag) -> Result<Self> {
        Ok(match tag {
            TypeTag::Bool => Self::Bool(reader.read_bool()?),
            TypeTag::Byte => Self::Byte(reader.read_u8()?),
            TypeTag::Int32 => Self::Int32(reader.read_i32()?),
            TypeTag::Int64 => Self::Int64(reader.read_i64()?),
            TypeTag::Double => Self::Double(reader.read_f64()?),
            TypeTag::String => Self::String(reader.read_string()?),
            TypeTag::Object => Self::Object(reader.read_object()?),
            TypeTag::ByteArray => Self::ByteArray(reader.read_u8_array()?),
            TypeTag::Int32Array => Self::Int32Array(reader.read_i32_array()?),
            TypeTag::Int64Array => Self::Int64Array(reader.read_i64_array()?),
            TypeTag::DoubleArray => Self::DoubleArray(reader.read_f64_array()?),
            TypeTag::StringArray => Self::StringArray(reader.read_string_array()?),
            TypeTag::ObjectArray => Self::ObjectArray(reader.read_object_array()?),
        })
    }

    /// Write as a `[name][tag][value]` triple.
    pub fn write_field(&self, writer: &mut WireWriter, name: &str) -> Result<()> {
        match self {
            Self::Bool(v) => writer.field_bool(name, *v),
            Self::Byte(v) => writer.field_u8(name, *v),
            Self::Int32(v) => writer.field_i32(name, *v),
            Self::Int64(v) => writer.field_i64(name, *v),
            Self::Double(v) => writer.field_f64(name, *v),
            Self::String(v) => writer.field_str(name, v),
            Self::Object(v) => writer.field_object(name, &**v),
            Self::ByteArray(v) => writer.field_u8_array(name, v),
            Self::Int32Array(v) => writer.field_i32_array(name, v),
            Self::Int64Array(v) => writer.field_i64_array(name, v),
            Self::DoubleArray(v) => writer.field_f64_array(name, v),
            Self::StringArray(v) => writer.field_str_array(name, v),
            Self::ObjectArray(v) => writer.field_object_array(name, v),
        }
    }
}

impl std::fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Byte(v) => write!(f, "Byte({v})"),
            Self::Int32(v) => write!(f, "Int32({v})"),
            Self::Int64(v) => write!(f, "Int64({v})"),
            Self::Double(v) => write!(f, "Double({v:?})"),
            Self::String(v) => write!(f, "String({v:?})"),
            Self::Object(o) => write!(f, "Object({})", o.type_name()),
            Self::ByteArray(v) => write!(f, "ByteArray[{}]", v.len()),
            Self::Int32Array(v) => write!(f, "Int32Array[{}]", v.len()),
            Self::Int64Array(v) => write!(f, "Int64Array[{}]", v.len()),
            Self::DoubleArray(v) => write!(f, "DoubleArray[{}]", v.len()),
            Self::StringArray(v) => write!(f, "StringArray{v:?}"),
            Self::ObjectArray(v) => write!(f, "ObjectArray[{}]", v.len()),
        }
    }
}

/// Expected name and tag of a struct field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub tag: TypeTag,
}

impl FieldSpec {
    pub const fn new(name: &'static str, tag: TypeTag) -> Self {
        Self { name, tag }
    }
}

/// Fields decoded by [`read_struct`], in payload order.
#[derive(Debug, Default)]
pub struct StructFields {
    fields: SmallVec<[(&'static str, FieldValue); 8]>,
}

macro_rules! scalar_getter {
    ($fn:ident, $variant:ident, $ty:ty) => {
        pub fn $fn(&self, name: &str) -> Option<$ty> {
            match self.get(name) {
                Some(FieldValue::$variant(v)) => Some(*v),
                _ => None,
            }
        }
    };
}

macro_rules! take_getter {
    ($fn:ident, $variant:ident, $ty:ty) => {
        pub fn $fn(&mut self, name: &str) -> Option<$ty> {
            match self.take(name) {
                Some(FieldValue::$variant(v)) => Some(v),
                _ => None,
            }
        }
    };
}

impl StructFields {
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Remove and return a field.
    pub fn take(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(n, _)| *n == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Names of the fields present.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(n, _)| *n)
    }

    scalar_getter!(bool, Bool, bool);
    scalar_getter!(u8, Byte, u8);
    scalar_getter!(i32, Int32, i32);
    scalar_getter!(i64, Int64, i64);
    scalar_getter!(f64, Double, f64);

    take_getter!(take_string, String, String);
    take_getter!(take_object, Object, ObjectRef);
    take_getter!(take_u8_array, ByteArray, Vec<u8>);
    take_getter!(take_i32_array, Int32Array, Vec<i32>);
    take_getter!(take_i64_array, Int64Array, Vec<i64>);
    take_getter!(take_f64_array, DoubleArray, Vec<f64>);
    take_getter!(take_string_array, StringArray, Vec<String>);
    take_getter!(take_object_array, ObjectArray, Vec<ObjectRef>);

    fn insert(&mut self, name: &'static str, value: FieldValue) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }
}

/// Decode a struct payload against field specs, consuming the reader.
pub fn read_struct(reader: &mut WireReader<'_>, specs: &[FieldSpec]) -> Result<StructFields> {
    let mut fields = StructFields::default();
    while !reader.is_at_end() {
        let name = reader.read_str()?;
        let tag = reader.read_tag()?;
        match specs.iter().find(|s| s.name == name) {
            Some(spec) => {
                if spec.tag != tag {
                    return Err(Error::FieldTypeMismatch {
                        field: name.to_owned(),
                        expected: spec.tag.as_char(),
                        actual: tag.as_char(),
                    });
                }
                let value = FieldValue::read(reader, tag)?;
                fields.insert(spec.name, value);
            }
            None => {
                tracing::warn!(field = name, %tag, "skipping unknown field");
                reader.skip_value(tag)?;
            }
        }
    }
    Ok(fields)
}
