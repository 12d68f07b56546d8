//! [`Config`]: the repository's single config file, typed access + writes.

use std::path::Path;

use bstr::{BStr, BString, ByteSlice};

use crate::error::ConfigError;
use crate::file::ConfigFile;
use crate::types;
use crate::{ConfigEntry, ConfigKey};

/// Typed, writable access to a repository's `.lit/config`.
pub struct Config {
    file: ConfigFile,
}

impl Config {
    /// Open (or lazily create, on first [`Self::set`]) the config file at
    /// `<lit_dir>/config`.
    pub fn open(lit_dir: &Path) -> Result<Self, ConfigError> {
        let file = ConfigFile::load(&lit_dir.join("config"))?;
        Ok(Config { file })
    }

    pub fn exists(&self) -> bool {
        self.file.exists()
    }

    /// Get the value for a key as a string.
    pub fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        Ok(self
            .file
            .get(&config_key)
            .and_then(|v| v.map(|v| v.to_str_lossy().to_string())))
    }

    /// Get all values for a multi-valued key, in file order.
    pub fn get_all_strings(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        Ok(self
            .file
            .get_all(&config_key)
            .into_iter()
            .map(|v| v.map(|v| v.to_str_lossy().to_string()).unwrap_or_default())
            .collect())
    }

    /// Get the value for a key as a boolean, per git's boolean coercion rules.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        match self.file.get(&config_key) {
            Some(value) => Ok(Some(types::parse_bool(value)?)),
            None => Ok(None),
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        Ok(self.get_bool(key)?.unwrap_or(default))
    }

    /// Set a value, writing the file to disk immediately.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        self.file.set(&config_key, BStr::new(value.as_bytes()));
        self.file.write()
    }

    /// Remove a key, writing the file to disk if it was present.
    pub fn unset(&mut self, key: &str) -> Result<bool, ConfigError> {
        let config_key = ConfigKey::parse(key)?;
        let removed = self.file.remove(&config_key);
        if removed {
            self.file.write()?;
        }
        Ok(removed)
    }

    /// Remove an entire subsection, e.g. `remote.<name>` when dropping a remote.
    pub fn remove_subsection(&mut self, section: &str, subsection: &str) -> Result<bool, ConfigError> {
        let removed = self
            .file
            .remove_section(BStr::new(section.as_bytes()), Some(BStr::new(subsection.as_bytes())));
        if removed {
            self.file.write()?;
        }
        Ok(removed)
    }

    /// All entries in the file, in file order.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        self.file.entries()
    }

    /// All keys (with values) under `section.<subsection>.*`, e.g. every
    /// `remote.origin.*` entry.
    pub fn subsection_entries(&self, section: &str, subsection: &str) -> Vec<ConfigEntry> {
        let section_lower = section.to_ascii_lowercase();
        let subsection_bstr = BString::from(subsection.as_bytes());
        self.file
            .entries()
            .into_iter()
            .filter(|e| {
                e.key.section.to_str_lossy() == section_lower
                    && e.key.subsection.as_ref() == Some(&subsection_bstr)
            })
            .collect()
    }
}
