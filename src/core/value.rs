//! Tagged values held by a store.

use std::fmt;

use crate::core::{ObjectRef, StoreObject};
use crate::util::{Error, Result};
use crate::wire;

/// Kind of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Byte,
    Int32,
    Int64,
    Double,
    String,
    Object,
}

impl ValueKind {
    /// Name used in error messages and text dumps.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Byte => "char",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Double => "double",
            Self::String => "string",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single stored value.
///
/// Objects are shared: cloning a `Value::Object` clones the handle, not
/// the object.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Object(ObjectRef),
}

impl Value {
    /// Kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Byte(_) => ValueKind::Byte,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Wrap an object.
    pub fn object<T: StoreObject>(object: std::rc::Rc<T>) -> Self {
        Self::Object(object)
    }

    /// The object handle, if this is an object value.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Value equivalence.
    ///
    /// Unlike `==`, which treats objects as equal only when they are the
    /// same object, this compares objects by their encoded bytes.
    pub fn equivalent(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => {
                if std::rc::Rc::ptr_eq(a, b) {
                    return true;
                }
                match (wire::encode_object(&**a), wire::encode_object(&**b)) {
                    (Ok(x), Ok(y)) => x == y,
                    _ => false,
                }
            }
            _ => self == other,
        }
    }

    /// Copy the value; objects are deep-copied unless they are singletons.
    pub fn deep_copy(&self) -> Result<Self> {
        match self {
            Self::Object(o) => Ok(Self::Object(wire::duplicate_object(o)?)),
            other => Ok(other.clone()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => std::rc::Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Byte(v) => write!(f, "Byte(0x{v:02x})"),
            Self::Int32(v) => write!(f, "Int32({v})"),
            Self::Int64(v) => write!(f, "Int64({v})"),
            Self::Double(v) => write!(f, "Double({v:?})"),
            Self::String(v) => write!(f, "String({v:?})"),
            Self::Object(o) => write!(f, "Object({})", o.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::Byte(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Self::Object(v)
    }
}

/// Types extractable from a [`Value`] of one specific kind.
pub trait FromValue: Sized {
    /// The kind this type is stored as.
    const KIND: ValueKind;

    /// Extract from a value of kind [`Self::KIND`]; `None` otherwise.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_from_value!(bool, Bool);
impl_from_value!(u8, Byte);
impl_from_value!(i32, Int32);
impl_from_value!(i64, Int64);
impl_from_value!(f64, Double);
impl_from_value!(String, String);
impl_from_value!(ObjectRef, Object);

/// Extract `T` from `value`, reporting a type mismatch against `key`.
pub(crate) fn extract<T: FromValue>(key: &str, value: &Value) -> Result<T> {
    T::from_value(value).ok_or_else(|| Error::TypeMismatch {
        key: key.to_owned(),
        expected: T::KIND.name(),
        actual: value.kind().name(),
    })
}
