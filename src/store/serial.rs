//! Store serialization.
//!
//! A store is an object frame of type `ValueStore` whose payload is a run
//! of `[tag][key][value]` triples, written in key order so that equal
//! stores encode to equal bytes.

use std::rc::Rc;

use super::{SharedStore, ValueStore};
use crate::core::{ObjectRef, Serializable};
use crate::util::Result;
use crate::wire::{self, TypeTag, WireReader, WireWriter, STORE_TYPE_NAME};

impl ValueStore {
    /// Encode as a standalone object frame.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        wire::encode_object(self)
    }

    /// Decode a standalone object frame into a fresh store.
    pub fn deserialize(bytes: &[u8]) -> Result<ValueStore> {
        Self::read_from(&mut WireReader::new(bytes))
    }

    /// Read a `ValueStore` object frame.
    pub fn read_from(reader: &mut WireReader<'_>) -> Result<ValueStore> {
        let mut payload = reader.expect_object(STORE_TYPE_NAME)?;
        Self::deserialize_payload(&mut payload)
    }

    /// Rebuild a store from frame payload triples.
    ///
    /// Array-tagged entries have no store counterpart and are skipped with
    /// a warning; any other failure aborts the decode.
    pub fn deserialize_payload(reader: &mut WireReader<'_>) -> Result<ValueStore> {
        let mut store = ValueStore::new();
        while !reader.is_at_end() {
            let tag = reader.read_tag()?;
            let key = reader.read_str()?;
            if tag.is_array() {
                tracing::warn!(key, %tag, "skipping array entry in store payload");
                reader.skip_value(tag)?;
                continue;
            }
            let value = reader.read_value(tag)?;
            if key.is_empty() {
                tracing::warn!(%tag, "skipping store entry with empty key");
                continue;
            }
            store.set(key, value);
        }
        tracing::debug!(entries = store.len(), "decoded store");
        Ok(store)
    }
}

impl Serializable for ValueStore {
    fn type_name(&self) -> &'static str {
        STORE_TYPE_NAME
    }

    fn serialize_payload(&self, writer: &mut WireWriter) -> Result<()> {
        for key in self.keys() {
            let Some(value) = self.values.get(&key) else {
                continue;
            };
            let Some(name) = key.as_str() else {
                tracing::warn!(%key, "anonymous key cannot be serialized, skipped");
                continue;
            };
            writer.write_tag(TypeTag::for_kind(value.kind()))?;
            writer.write_string(name)?;
            writer.write_value(value)?;
        }
        Ok(())
    }

    fn duplicate(&self) -> Result<ObjectRef> {
        Ok(Rc::new(SharedStore::new(ValueStore::duplicate(self)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{DataLine, StringList};
    use crate::util::{Error, Quark};

    fn sample_store() -> ValueStore {
        let mut store = ValueStore::new();
        store.set_bool("/0/data/visible", true);
        store.set_byte("/0/mask/red", 0x41);
        store.set_i32("/0/data/xres", 256);
        store.set_i64("/0/data/timestamp", 1_700_000_000_000);
        store.set_f64("/0/data/real", 1.5e-6);
        store.set_string("/0/data/title", "Height");
        store.set_object("/0/line", Rc::new(DataLine::from_data(vec![1.0, 2.0], 1.0)));
        store.set_object("/filelist", Rc::new(StringList::from_strings(["a.gwy"])));
        store
    }

    #[test]
    fn test_round_trip() {
        let store = sample_store();
        let bytes = store.serialize().unwrap();
        let back = ValueStore::deserialize(&bytes).unwrap();

        assert_eq!(back.keys(), store.keys());
        for key in store.keys() {
            let a = store.get(key).unwrap();
            let b = back.get(key).unwrap();
            assert!(a.equivalent(b), "{key} differs: {a:?} vs {b:?}");
        }
        assert_eq!(back.serialize().unwrap(), bytes);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let mut a = ValueStore::new();
        a.set_i32("z", 1);
        a.set_i32("a", 2);
        let mut b = ValueStore::new();
        b.set_i32("a", 2);
        b.set_i32("z", 1);
        assert_eq!(a.serialize().unwrap(), b.serialize().unwrap());
    }

    #[test]
    fn test_anonymous_keys_skipped() {
        let mut store = ValueStore::new();
        store.set_i32(Quark::anonymous(), 1);
        store.set_i32("named", 2);
        let back = ValueStore::deserialize(&store.serialize().unwrap()).unwrap();
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn test_array_entries_skipped() {
        let mut w = WireWriter::new();
        w.write_string(STORE_TYPE_NAME).unwrap();
        w.write_u32(0).unwrap();
        let start = w.len();
        w.write_tag(TypeTag::DoubleArray).unwrap();
        w.write_string("arr").unwrap();
        w.write_f64_array(&[1.0, 2.0]).unwrap();
        w.write_tag(TypeTag::Int32).unwrap();
        w.write_string("n").unwrap();
        w.write_i32(7).unwrap();
        let mut bytes = w.into_bytes();
        let size = (bytes.len() - start) as u32;
        bytes[start - 4..start].copy_from_slice(&size.to_le_bytes());

        let store = ValueStore::deserialize(&bytes).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_i32("n").unwrap(), 7);
    }

    #[test]
    fn test_truncation_always_fails() {
        let bytes = sample_store().serialize().unwrap();
        for cut in 0..bytes.len() {
            assert!(
                ValueStore::deserialize(&bytes[..cut]).is_err(),
                "decoding {cut} of {} bytes succeeded",
                bytes.len()
            );
        }
    }

    #[test]
    fn test_unknown_object_type_is_fatal() {
        let mut w = WireWriter::new();
        w.write_tag(TypeTag::Object).unwrap();
        w.write_string("/x").unwrap();
        w.write_string("FutureType").unwrap();
        w.write_u32(0).unwrap();
        let payload = w.into_bytes();

        let err = ValueStore::deserialize_payload(&mut WireReader::new(&payload)).unwrap_err();
        assert!(matches!(err, Error::UnknownType(name) if name == "FutureType"));
    }

    #[test]
    fn test_wrong_frame_type() {
        let bytes = wire::encode_object(&StringList::new()).unwrap();
        assert!(matches!(
            ValueStore::deserialize(&bytes),
            Err(Error::ObjectTypeMismatch { .. })
        ));
    }
}
