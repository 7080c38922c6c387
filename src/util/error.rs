//! Error types for the gwystore library.

use thiserror::Error;

/// Main error type for store, codec and inventory operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Key is not present in the store
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Typed getter asked for a different kind than the one stored
    #[error("Type mismatch for '{key}': expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Inventory item not found by name
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Inventory already holds an item of this name
    #[error("Item already exists: {0}")]
    DuplicateName(String),

    /// Fixed items cannot be deleted or renamed
    #[error("Item is fixed: {0}")]
    FixedItem(String),

    /// Sort position out of bounds
    #[error("Position {index} out of bounds (count: {count})")]
    PositionOutOfBounds { index: usize, count: usize },

    /// Item type lacks a capability the operation needs
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Buffer ended before a frame was complete
    #[error("Unexpected end of data at offset {offset}: need {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// String frame without terminator, with invalid UTF-8, or with an interior NUL
    #[error("Invalid string at offset {offset}: {reason}")]
    InvalidString { offset: usize, reason: String },

    /// Type tag byte not known to the codec
    #[error("Unknown type tag 0x{0:02x}")]
    UnknownTag(u8),

    /// Object frame names a type with no registered decoder
    #[error("Unknown object type: {0}")]
    UnknownType(String),

    /// Object frame has a different type name than the caller expected
    #[error("Object type mismatch: expected {expected}, got {actual}")]
    ObjectTypeMismatch { expected: String, actual: String },

    /// A known struct field carries a different tag than declared
    #[error("Field '{field}' type mismatch: expected '{expected}', got '{actual}'")]
    FieldTypeMismatch {
        field: String,
        expected: char,
        actual: char,
    },

    /// Object payload size runs past the end of the enclosing buffer
    #[error("Object '{type_name}' payload of {size} bytes overruns buffer ({available} available)")]
    PayloadOverrun {
        type_name: String,
        size: usize,
        available: usize,
    },

    /// Objects nested deeper than the configured limit
    #[error("Object nesting exceeds depth limit {0}")]
    NestingTooDeep(usize),

    /// Decoded fields are individually well-formed but inconsistent
    #[error("Invalid {type_name} data: {reason}")]
    InvalidData {
        type_name: &'static str,
        reason: String,
    },

    /// Value too large for the wire format
    #[error("Frame too large: {0} bytes")]
    FrameTooLarge(usize),

    /// File does not start with the expected magic bytes
    #[error("Invalid file: expected magic bytes {0:?}")]
    InvalidMagic(&'static str),

    /// Text dump line could not be parsed
    #[error("Text parse error at line {line}: {reason}")]
    TextParse { line: usize, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings (de)serialization failed
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create an invalid-data error for a decoded object.
    pub fn invalid_data(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            type_name,
            reason: reason.into(),
        }
    }

    /// Whether this error came from corrupt or truncated encoded data.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof { .. }
                | Self::InvalidString { .. }
                | Self::UnknownTag(_)
                | Self::UnknownType(_)
                | Self::ObjectTypeMismatch { .. }
                | Self::FieldTypeMismatch { .. }
                | Self::PayloadOverrun { .. }
                | Self::NestingTooDeep(_)
                | Self::InvalidData { .. }
                | Self::InvalidMagic(_)
        )
    }
}

/// Result type alias for gwystore operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::TypeMismatch {
            key: "foobar".into(),
            expected: "int32",
            actual: "double",
        };
        let s = e.to_string();
        assert!(s.contains("foobar"));
        assert!(s.contains("int32"));
        assert!(s.contains("double"));

        let e = Error::PositionOutOfBounds { index: 5, count: 3 };
        assert!(e.to_string().contains("5"));
        assert!(e.to_string().contains("3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_decode_error());
    }

    #[test]
    fn test_decode_error_classification() {
        assert!(Error::UnknownTag(b'x').is_decode_error());
        assert!(Error::UnknownType("Foo".into()).is_decode_error());
        assert!(!Error::KeyNotFound("a".into()).is_decode_error());
    }
}
