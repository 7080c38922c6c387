//! Store files: the `GWYO` magic followed by the store's object frame.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::ValueStore;
use crate::config::Settings;
use crate::util::{Error, Result};
use crate::wire::{WireReader, FILE_MAGIC};

impl ValueStore {
    /// Write the store to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.serialize()?;
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(FILE_MAGIC)?;
        out.write_all(&bytes)?;
        out.flush()?;
        tracing::info!(path = %path.display(), entries = self.len(), size = bytes.len() + FILE_MAGIC.len(), "saved store");
        Ok(())
    }

    /// Read a store file with default decoding limits.
    pub fn load(path: impl AsRef<Path>) -> Result<ValueStore> {
        Self::load_with(path, &Settings::default())
    }

    /// Read a store file with the decoding limits from `settings`.
    pub fn load_with(path: impl AsRef<Path>, settings: &Settings) -> Result<ValueStore> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let store = Self::from_file_bytes(&data, settings)?;
        tracing::info!(path = %path.display(), entries = store.len(), "loaded store");
        Ok(store)
    }

    /// Decode the contents of a store file held in memory.
    pub fn from_file_bytes(data: &[u8], settings: &Settings) -> Result<ValueStore> {
        let body = data
            .strip_prefix(&FILE_MAGIC[..])
            .ok_or(Error::InvalidMagic("GWYO"))?;
        let mut reader = WireReader::new(body).with_settings(settings);
        let store = Self::read_from(&mut reader)?;
        if !reader.is_at_end() {
            tracing::warn!(trailing = reader.remaining(), "ignoring data after store frame");
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.gwy");

        let mut store = ValueStore::new();
        store.set_string("/0/data/title", "Topography");
        store.set_f64("/0/data/real", 2.5e-6);
        store.save(&path).unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..4], b"GWYO");

        let back = ValueStore::load(&path).unwrap();
        assert_eq!(back.get_str("/0/data/title").unwrap(), "Topography");
        assert_eq!(back.get_f64("/0/data/real").unwrap(), 2.5e-6);
    }

    #[test]
    fn test_bad_magic() {
        let bytes = ValueStore::new().serialize().unwrap();
        let err = ValueStore::from_file_bytes(&bytes, &Settings::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic(_)));
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ValueStore::load(dir.path().join("absent.gwy")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
