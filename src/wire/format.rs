//! Wire format constants and type tags.

use std::fmt;

use crate::core::ValueKind;
use crate::util::{Error, Result};

/// Magic bytes at the start of a store file.
pub const FILE_MAGIC: &[u8; 4] = b"GWYO";

/// Default limit on object nesting when decoding.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default limit on array element counts when decoding.
pub const DEFAULT_MAX_ARRAY_LEN: usize = 1 << 28;

/// Type name of a serialized store.
pub const STORE_TYPE_NAME: &str = "ValueStore";

/// One-byte type tag preceding every tagged value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Bool = b'b',
    Byte = b'c',
    Int32 = b'i',
    Int64 = b'q',
    Double = b'd',
    String = b's',
    Object = b'o',
    ByteArray = b'C',
    Int32Array = b'I',
    Int64Array = b'Q',
    DoubleArray = b'D',
    StringArray = b'S',
    ObjectArray = b'O',
}

impl TypeTag {
    /// Parse a tag byte.
    pub fn from_u8(byte: u8) -> Result<Self> {
        Ok(match byte {
            b'b' => Self::Bool,
            b'c' => Self::Byte,
            b'i' => Self::Int32,
            b'q' => Self::Int64,
            b'd' => Self::Double,
            b's' => Self::String,
            b'o' => Self::Object,
            b'C' => Self::ByteArray,
            b'I' => Self::Int32Array,
            b'Q' => Self::Int64Array,
            b'D' => Self::DoubleArray,
            b'S' => Self::StringArray,
            b'O' => Self::ObjectArray,
            other => return Err(Error::UnknownTag(other)),
        })
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn as_char(self) -> char {
        self as u8 as char
    }

    /// Whether this is an array tag.
    pub fn is_array(self) -> bool {
        self.as_u8().is_ascii_uppercase()
    }

    /// Element tag of an array tag.
    pub fn element(self) -> Option<Self> {
        match self {
            Self::ByteArray => Some(Self::Byte),
            Self::Int32Array => Some(Self::Int32),
            Self::Int64Array => Some(Self::Int64),
            Self::DoubleArray => Some(Self::Double),
            Self::StringArray => Some(Self::String),
            Self::ObjectArray => Some(Self::Object),
            _ => None,
        }
    }

    /// Fixed encoded size of one element, `None` for variable-size kinds.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Byte => Some(1),
            Self::Int32 => Some(4),
            Self::Int64 | Self::Double => Some(8),
            _ => None,
        }
    }

    /// Tag used for a store value of `kind`.
    pub fn for_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Self::Bool,
            ValueKind::Byte => Self::Byte,
            ValueKind::Int32 => Self::Int32,
            ValueKind::Int64 => Self::Int64,
            ValueKind::Double => Self::Double,
            ValueKind::String => Self::String,
            ValueKind::Object => Self::Object,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_bytes() {
        for byte in *b"bciqdsoCIQDSO" {
            let tag = TypeTag::from_u8(byte).unwrap();
            assert_eq!(tag.as_u8(), byte);
        }
        assert!(matches!(TypeTag::from_u8(b'x'), Err(Error::UnknownTag(b'x'))));
    }

    #[test]
    fn test_array_tags() {
        assert!(TypeTag::DoubleArray.is_array());
        assert!(!TypeTag::Double.is_array());
        assert_eq!(TypeTag::StringArray.element(), Some(TypeTag::String));
        assert_eq!(TypeTag::Int32.element(), None);
    }
}
