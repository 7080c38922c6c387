//! Wire encoder.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use super::format::TypeTag;
use crate::core::{ObjectRef, Serializable, Value};
use crate::util::{Error, Result};

/// In-memory encoder producing the little-endian wire format.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// Write raw bytes.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }

    pub fn write_tag(&mut self, tag: TypeTag) -> Result<()> {
        self.buf.write_u8(tag.as_u8())?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.buf.write_u8(u8::from(value))?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.write_u8(value)?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.buf.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.buf.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.buf.write_i64::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.buf.write_f64::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write a NUL-terminated UTF-8 string.
    ///
    /// Strings with an interior NUL cannot be represented and are rejected.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        if let Some(at) = value.bytes().position(|b| b == 0) {
            return Err(Error::InvalidString {
                offset: self.buf.len() + at,
                reason: "interior NUL byte".into(),
            });
        }
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.write_u8(0)?;
        Ok(())
    }

    /// Write an array element count.
    fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count).map_err(|_| Error::FrameTooLarge(count))?;
        self.write_u32(count)
    }

    // ========================================================================
    // Arrays
    // ========================================================================

    pub fn write_u8_array(&mut self, values: &[u8]) -> Result<()> {
        self.write_count(values.len())?;
        self.write_bytes(values)
    }

    pub fn write_i32_array(&mut self, values: &[i32]) -> Result<()> {
        self.write_count(values.len())?;
        self.buf.reserve(values.len() * 4);
        for &v in values {
            self.buf.write_i32::<LittleEndian>(v)?;
        }
        Ok(())
    }

    pub fn write_i64_array(&mut self, values: &[i64]) -> Result<()> {
        self.write_count(values.len())?;
        self.buf.reserve(values.len() * 8);
        for &v in values {
            self.buf.write_i64::<LittleEndian>(v)?;
        }
        Ok(())
    }

    pub fn write_f64_array(&mut self, values: &[f64]) -> Result<()> {
        self.write_count(values.len())?;
        self.buf.reserve(values.len() * 8);
        for &v in values {
            self.buf.write_f64::<LittleEndian>(v)?;
        }
        Ok(())
    }

    pub fn write_string_array<S: AsRef<str>>(&mut self, values: &[S]) -> Result<()> {
        self.write_count(values.len())?;
        for v in values {
            self.write_string(v.as_ref())?;
        }
        Ok(())
    }

    pub fn write_object_array(&mut self, values: &[ObjectRef]) -> Result<()> {
        self.write_count(values.len())?;
        for v in values {
            self.write_object(&**v)?;
        }
        Ok(())
    }

    // ========================================================================
    // Objects and values
    // ========================================================================

    /// Write a complete object frame: type name, payload size, payload.
    ///
    /// The size is backpatched once the payload is written.
    pub fn write_object<S: Serializable + ?Sized>(&mut self, object: &S) -> Result<()> {
        let type_name = object.type_name();
        self.write_string(type_name)?;
        let size_pos = self.buf.len();
        self.write_u32(0)?;
        let start = self.buf.len();

        object.serialize_payload(self)?;

        let size = self.buf.len() - start;
        let size32 = u32::try_from(size).map_err(|_| Error::FrameTooLarge(size))?;
        LittleEndian::write_u32(&mut self.buf[size_pos..size_pos + 4], size32);
        tracing::trace!(type_name, size, "wrote object frame");
        Ok(())
    }

    /// Write the untagged encoding of a store value.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Bool(v) => self.write_bool(*v),
            Value::Byte(v) => self.write_u8(*v),
            Value::Int32(v) => self.write_i32(*v),
            Value::Int64(v) => self.write_i64(*v),
            Value::Double(v) => self.write_f64(*v),
            Value::String(v) => self.write_string(v),
            Value::Object(o) => self.write_object(&**o),
        }
    }

    // ========================================================================
    // Struct fields
    // ========================================================================

    fn field_header(&mut self, name: &str, tag: TypeTag) -> Result<()> {
        self.write_string(name)?;
        self.write_tag(tag)
    }

    pub fn field_bool(&mut self, name: &str, value: bool) -> Result<()> {
        self.field_header(name, TypeTag::Bool)?;
        self.write_bool(value)
    }

    pub fn field_u8(&mut self, name: &str, value: u8) -> Result<()> {
        self.field_header(name, TypeTag::Byte)?;
        self.write_u8(value)
    }

    pub fn field_i32(&mut self, name: &str, value: i32) -> Result<()> {
        self.field_header(name, TypeTag::Int32)?;
        self.write_i32(value)
    }

    pub fn field_i64(&mut self, name: &str, value: i64) -> Result<()> {
        self.field_header(name, TypeTag::Int64)?;
        self.write_i64(value)
    }

    pub fn field_f64(&mut self, name: &str, value: f64) -> Result<()> {
        self.field_header(name, TypeTag::Double)?;
        self.write_f64(value)
    }

    pub fn field_str(&mut self, name: &str, value: &str) -> Result<()> {
        self.field_header(name, TypeTag::String)?;
        self.write_string(value)
    }

    pub fn field_object<S: Serializable + ?Sized>(&mut self, name: &str, value: &S) -> Result<()> {
        self.field_header(name, TypeTag::Object)?;
        self.write_object(value)
    }

    pub fn field_u8_array(&mut self, name: &str, values: &[u8]) -> Result<()> {
        self.field_header(name, TypeTag::ByteArray)?;
        self.write_u8_array(values)
    }

    pub fn field_i32_array(&mut self, name: &str, values: &[i32]) -> Result<()> {
        self.field_header(name, TypeTag::Int32Array)?;
        self.write_i32_array(values)
    }

    pub fn field_i64_array(&mut self, name: &str, values: &[i64]) -> Result<()> {
        self.field_header(name, TypeTag::Int64Array)?;
        self.write_i64_array(values)
    }

    pub fn field_f64_array(&mut self, name: &str, values: &[f64]) -> Result<()> {
        self.field_header(name, TypeTag::DoubleArray)?;
        self.write_f64_array(values)
    }

    pub fn field_str_array<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> Result<()> {
        self.field_header(name, TypeTag::StringArray)?;
        self.write_string_array(values)
    }

    pub fn field_object_array(&mut self, name: &str, values: &[ObjectRef]) -> Result<()> {
        self.field_header(name, TypeTag::ObjectArray)?;
        self.write_object_array(values)
    }
}
