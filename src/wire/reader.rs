//! Wire decoder.
//!
//! [`WireReader`] is a bounds-checked cursor over an encoded buffer. Every
//! read either consumes exactly the bytes of one frame or fails without
//! panicking; object payloads are read through a sub-reader confined to
//! the payload bytes, so a decoder can never run past its own frame.

use byteorder::{ByteOrder, LittleEndian};

use super::format::{TypeTag, DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_DEPTH};
use super::registry::{self, TypeRegistry};
use crate::config::Settings;
use crate::core::{Deserializable, ObjectRef, Value};
use crate::util::{Error, Result};

/// Cursor over an encoded buffer.
#[derive(Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Absolute offset of `buf[0]` in the outermost buffer.
    base: usize,
    depth: usize,
    max_depth: usize,
    max_array_len: usize,
    registry: Option<&'a TypeRegistry>,
}

impl<'a> WireReader<'a> {
    /// Reader using the global type registry and default limits.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            base: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            registry: None,
        }
    }

    /// Resolve object types through `registry` instead of the global one.
    pub fn with_registry(mut self, registry: &'a TypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Apply codec limits from settings.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.max_depth = settings.max_nesting_depth;
        self.max_array_len = settings.max_array_len;
        self
    }

    /// Set the object nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Absolute offset of the cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Current object nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Consume `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::UnexpectedEof {
                offset: self.position(),
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Any non-zero byte decodes as `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    pub fn read_tag(&mut self) -> Result<TypeTag> {
        TypeTag::from_u8(self.read_u8()?)
    }

    /// Read a NUL-terminated string, borrowing from the buffer.
    pub fn read_str(&mut self) -> Result<&'a str> {
        let offset = self.position();
        let rest = &self.buf[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::InvalidString {
                offset,
                reason: "missing NUL terminator".into(),
            })?;
        let s = std::str::from_utf8(&rest[..len]).map_err(|e| Error::InvalidString {
            offset,
            reason: e.to_string(),
        })?;
        self.pos += len + 1;
        Ok(s)
    }

    pub fn read_string(&mut self) -> Result<String> {
        self.read_str().map(str::to_owned)
    }

    // ========================================================================
    // Arrays
    // ========================================================================

    /// Read an element count, checked against the remaining bytes so a
    /// corrupt count cannot trigger a huge allocation.
    fn read_count(&mut self, min_element_size: usize) -> Result<usize> {
        let offset = self.position();
        let count = self.read_u32()? as usize;
        if count > self.max_array_len {
            return Err(Error::FrameTooLarge(count));
        }
        let needed = count.saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(Error::UnexpectedEof {
                offset,
                needed,
                available: self.remaining(),
            });
        }
        Ok(count)
    }

    pub fn read_u8_array(&mut self) -> Result<Vec<u8>> {
        let count = self.read_count(1)?;
        Ok(self.take(count)?.to_vec())
    }

    pub fn read_i32_array(&mut self) -> Result<Vec<i32>> {
        let count = self.read_count(4)?;
        let bytes = self.take(count * 4)?;
        let mut out = vec![0i32; count];
        LittleEndian::read_i32_into(bytes, &mut out);
        Ok(out)
    }

    pub fn read_i64_array(&mut self) -> Result<Vec<i64>> {
        let count = self.read_count(8)?;
        let bytes = self.take(count * 8)?;
        let mut out = vec![0i64; count];
        LittleEndian::read_i64_into(bytes, &mut out);
        Ok(out)
    }

    pub fn read_f64_array(&mut self) -> Result<Vec<f64>> {
        let count = self.read_count(8)?;
        let bytes = self.take(count * 8)?;
        let mut out = vec![0f64; count];
        LittleEndian::read_f64_into(bytes, &mut out);
        Ok(out)
    }

    pub fn read_string_array(&mut self) -> Result<Vec<String>> {
        // Shortest string is the lone terminator.
        let count = self.read_count(1)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_string()?);
        }
        Ok(out)
    }

    pub fn read_object_array(&mut self) -> Result<Vec<ObjectRef>> {
        // Shortest frame is a one-byte name plus the size field.
        let count = self.read_count(5)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_object()?);
        }
        Ok(out)
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Read an object frame header and return the type name with a reader
    /// confined to the payload. The cursor moves past the whole frame.
    pub fn read_object_frame(&mut self) -> Result<(&'a str, WireReader<'a>)> {
        if self.depth >= self.max_depth {
            return Err(Error::NestingTooDeep(self.max_depth));
        }
        let type_name = self.read_str()?;
        let size = self.read_u32()? as usize;
        if size > self.remaining() {
            return Err(Error::PayloadOverrun {
                type_name: type_name.to_owned(),
                size,
                available: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += size;
        let payload = WireReader {
            buf: &self.buf[start..start + size],
            pos: 0,
            base: self.base + start,
            depth: self.depth + 1,
            max_depth: self.max_depth,
            max_array_len: self.max_array_len,
            registry: self.registry,
        };
        Ok((type_name, payload))
    }

    /// Read an object frame of a known type and return its payload reader.
    pub fn expect_object(&mut self, type_name: &str) -> Result<WireReader<'a>> {
        let (actual, payload) = self.read_object_frame()?;
        if actual != type_name {
            return Err(Error::ObjectTypeMismatch {
                expected: type_name.to_owned(),
                actual: actual.to_owned(),
            });
        }
        Ok(payload)
    }

    /// Decode an object frame of a statically known type.
    pub fn read_typed_object<T: Deserializable>(&mut self) -> Result<T> {
        let mut payload = self.expect_object(T::TYPE_NAME)?;
        let value = T::deserialize(&mut payload)?;
        payload.warn_trailing(T::TYPE_NAME);
        Ok(value)
    }

    /// Decode an object frame, resolving its type through the registry.
    pub fn read_object(&mut self) -> Result<ObjectRef> {
        let (type_name, mut payload) = self.read_object_frame()?;
        let decode = match self.registry {
            Some(reg) => reg.decoder(type_name),
            None => registry::lookup_decoder(type_name),
        }
        .ok_or_else(|| Error::UnknownType(type_name.to_owned()))?;

        tracing::trace!(type_name, depth = payload.depth, "decoding object");
        let object = decode(&mut payload)?;
        payload.warn_trailing(type_name);
        Ok(object)
    }

    /// Skip an object frame without decoding it; returns its type name.
    pub fn skip_object(&mut self) -> Result<&'a str> {
        let (type_name, _) = self.read_object_frame()?;
        Ok(type_name)
    }

    fn warn_trailing(&self, type_name: &str) {
        if !self.is_at_end() {
            tracing::warn!(
                type_name,
                trailing = self.remaining(),
                "ignoring trailing bytes in object payload"
            );
        }
    }

    // ========================================================================
    // Tagged values
    // ========================================================================

    /// Skip the value following a tag.
    pub fn skip_value(&mut self, tag: TypeTag) -> Result<()> {
        match tag {
            TypeTag::Bool | TypeTag::Byte => {
                self.take(1)?;
            }
            TypeTag::Int32 => {
                self.take(4)?;
            }
            TypeTag::Int64 | TypeTag::Double => {
                self.take(8)?;
            }
            TypeTag::String => {
                self.read_str()?;
            }
            TypeTag::Object => {
                self.skip_object()?;
            }
            TypeTag::ByteArray => {
                let n = self.read_count(1)?;
                self.take(n)?;
            }
            TypeTag::Int32Array => {
                let n = self.read_count(4)?;
                self.take(n * 4)?;
            }
            TypeTag::Int64Array | TypeTag::DoubleArray => {
                let n = self.read_count(8)?;
                self.take(n * 8)?;
            }
            TypeTag::StringArray => {
                let n = self.read_count(1)?;
                for _ in 0..n {
                    self.read_str()?;
                }
            }
            TypeTag::ObjectArray => {
                let n = self.read_count(5)?;
                for _ in 0..n {
                    self.skip_object()?;
                }
            }
        }
        Ok(())
    }

    /// Read the scalar or object value following a tag.
    ///
    /// Array tags have no store value counterpart and are rejected.
    pub fn read_value(&mut self, tag: TypeTag) -> Result<Value> {
        Ok(match tag {
            TypeTag::Bool => Value::Bool(self.read_bool()?),
            TypeTag::Byte => Value::Byte(self.read_u8()?),
            TypeTag::Int32 => Value::Int32(self.read_i32()?),
            TypeTag::Int64 => Value::Int64(self.read_i64()?),
            TypeTag::Double => Value::Double(self.read_f64()?),
            TypeTag::String => Value::String(self.read_string()?),
            TypeTag::Object => Value::Object(self.read_object()?),
            array => {
                return Err(Error::unsupported(format!(
                    "array tag {array} cannot be read as a store value"
                )))
            }
        })
    }
}

impl std::fmt::Debug for WireReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireReader")
            .field("len", &self.buf.len())
            .field("pos", &self.pos)
            .field("base", &self.base)
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireWriter;

    #[test]
    fn test_read_primitives() {
        let mut w = WireWriter::new();
        w.write_i32(-7).unwrap();
        w.write_i64(1 << 40).unwrap();
        w.write_f64(2.5).unwrap();
        w.write_string("héllo").unwrap();
        let bytes = w.into_bytes();

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_i32().unwrap(), -7);
        assert_eq!(r.read_i64().unwrap(), 1 << 40);
        assert_eq!(r.read_f64().unwrap(), 2.5);
        assert_eq!(r.read_str().unwrap(), "héllo");
        assert!(r.is_at_end());
    }

    #[test]
    fn test_nonzero_bool_is_true() {
        let mut r = WireReader::new(&[0, 1, 7]);
        assert!(!r.read_bool().unwrap());
        assert!(r.read_bool().unwrap());
        assert!(r.read_bool().unwrap());
    }

    #[test]
    fn test_truncated_reads_fail() {
        let mut r = WireReader::new(&[1, 2, 3]);
        let err = r.read_i32().unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEof {
                offset: 0,
                needed: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn test_missing_terminator() {
        let mut r = WireReader::new(b"abc");
        assert!(matches!(r.read_str(), Err(Error::InvalidString { .. })));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut r = WireReader::new(&[0xff, 0xfe, 0]);
        assert!(matches!(r.read_str(), Err(Error::InvalidString { .. })));
    }

    #[test]
    fn test_array_count_guard() {
        // Claims a billion doubles with only a few bytes behind it.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1_000_000_000u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 16]);
        let mut r = WireReader::new(&bytes);
        assert!(r.read_f64_array().is_err());
    }

    #[test]
    fn test_payload_overrun() {
        let mut bytes = b"Foo\0".to_vec();
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);
        let mut r = WireReader::new(&bytes);
        assert!(matches!(
            r.read_object_frame(),
            Err(Error::PayloadOverrun { size: 100, .. })
        ));
    }

    #[test]
    fn test_skip_unknown_object() {
        let mut bytes = b"NoSuchType\0".to_vec();
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3]);
        bytes.push(42);

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.skip_object().unwrap(), "NoSuchType");
        assert_eq!(r.read_u8().unwrap(), 42);

        let mut r = WireReader::new(&bytes);
        assert!(matches!(r.read_object(), Err(Error::UnknownType(name)) if name == "NoSuchType"));
    }

    #[test]
    fn test_nesting_limit() {
        // Frames nested three deep, the innermost empty.
        let mut inner = b"C\0".to_vec();
        inner.extend_from_slice(&0u32.to_le_bytes());
        let mut middle = b"B\0".to_vec();
        middle.extend_from_slice(&(inner.len() as u32).to_le_bytes());
        middle.extend_from_slice(&inner);
        let mut outer = b"A\0".to_vec();
        outer.extend_from_slice(&(middle.len() as u32).to_le_bytes());
        outer.extend_from_slice(&middle);

        let mut r = WireReader::new(&outer).with_max_depth(2);
        let (_, mut a) = r.read_object_frame().unwrap();
        let (_, mut b) = a.read_object_frame().unwrap();
        assert_eq!(b.depth(), 2);
        assert!(matches!(b.read_object_frame(), Err(Error::NestingTooDeep(2))));
    }
}
