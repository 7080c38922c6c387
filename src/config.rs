//! Persistent codec and tool settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::util::Result;
use crate::wire::{DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_DEPTH};

/// Settings shared by the library and the `gwystore` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Decoding limits
    pub max_nesting_depth: usize,
    pub max_array_len: usize,

    // Dump output
    pub dump_max_string_len: usize,
    pub dump_show_objects: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_DEPTH,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            dump_max_string_len: 80,
            dump_show_objects: true,
        }
    }
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("gwystore");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::default_path()
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
    }

    /// Load settings from a file; missing fields take their defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings: Self = serde_json::from_str(&text)?;
        Ok(settings.validated())
    }

    /// Save settings to a file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        match Self::default_path() {
            Some(path) => self.save_to(path),
            None => {
                tracing::warn!("no config directory, settings not saved");
                Ok(())
            }
        }
    }

    fn validated(mut self) -> Self {
        // A zero depth would reject every object, the store included.
        if self.max_nesting_depth == 0 {
            tracing::warn!("max_nesting_depth must be positive, using default");
            self.max_nesting_depth = DEFAULT_MAX_DEPTH;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s: Settings = serde_json::from_str(r#"{"max_nesting_depth": 8}"#).unwrap();
        assert_eq!(s.max_nesting_depth, 8);
        assert_eq!(s.max_array_len, DEFAULT_MAX_ARRAY_LEN);
        assert!(s.dump_show_objects);
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let s = Settings {
            dump_max_string_len: 12,
            ..Settings::default()
        };
        s.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), s);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"max_nesting_depth": 0}"#).unwrap();
        assert_eq!(
            Settings::load_from(&path).unwrap().max_nesting_depth,
            DEFAULT_MAX_DEPTH
        );
    }
}
