//! Object type registry.
//!
//! Decoding an object frame needs a constructor for the type named in its
//! header. The registry maps type names to decode functions; encoding and
//! duplication go through the [`Serializable`](crate::core::Serializable)
//! trait and need no registration.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::OnceLock;

use parking_lot::RwLock;

use super::reader::WireReader;
use crate::core::{Deserializable, ObjectRef};
use crate::objects::{DataLine, Preset, SiUnit, StringList};
use crate::store::SharedStore;
use crate::util::Result;

/// Decode function for one object type; reads the frame payload.
pub type DecodeFn = fn(&mut WireReader<'_>) -> Result<ObjectRef>;

fn decode_as<T: Deserializable>(reader: &mut WireReader<'_>) -> Result<ObjectRef> {
    Ok(Rc::new(T::deserialize(reader)?))
}

/// Map from type name to decode function.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    decoders: HashMap<String, DecodeFn>,
}

impl TypeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in object type.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register::<StringList>();
        reg.register::<SiUnit>();
        reg.register::<DataLine>();
        reg.register::<Preset>();
        reg.register::<SharedStore>();
        reg
    }

    /// Register a type under its [`Deserializable::TYPE_NAME`].
    pub fn register<T: Deserializable>(&mut self) {
        self.register_fn(T::TYPE_NAME, decode_as::<T>);
    }

    /// Register a decode function; replaces any previous one for `name`.
    pub fn register_fn(&mut self, name: &str, decode: DecodeFn) {
        if self.decoders.insert(name.to_owned(), decode).is_some() {
            tracing::debug!(type_name = name, "replaced registered decoder");
        }
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.decoders.remove(name).is_some()
    }

    pub fn decoder(&self, name: &str) -> Option<DecodeFn> {
        self.decoders.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

/// The process-wide registry, pre-populated with the built-in types.
pub fn global_registry() -> &'static RwLock<TypeRegistry> {
    static REGISTRY: OnceLock<RwLock<TypeRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(TypeRegistry::with_builtins()))
}

/// Register a type in the global registry.
pub fn register_type<T: Deserializable>() {
    global_registry().write().register::<T>();
}

/// Look up a decoder in the global registry.
///
/// The function pointer is copied out so the lock is not held while the
/// decoder runs (decoders recurse into nested objects).
pub fn lookup_decoder(name: &str) -> Option<DecodeFn> {
    global_registry().read().decoder(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let reg = TypeRegistry::with_builtins();
        for name in ["StringList", "SiUnit", "DataLine", "Preset", "ValueStore"] {
            assert!(reg.contains(name), "missing {name}");
        }
        assert_eq!(reg.len(), 5);
        assert!(lookup_decoder("ValueStore").is_some());
        assert!(lookup_decoder("NoSuchType").is_none());
    }

    #[test]
    fn test_local_registry_isolation() {
        let mut reg = TypeRegistry::new();
        assert!(reg.is_empty());
        reg.register::<StringList>();
        assert_eq!(reg.type_names(), vec!["StringList"]);
        assert!(reg.unregister("StringList"));
        assert!(!reg.unregister("StringList"));
    }
}
