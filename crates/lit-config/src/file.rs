//! The single `.lit/config` file, with formatting preserved across edits.

use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice, ByteVec};

use crate::error::ConfigError;
use crate::parse::{self, ConfigEvent};
use crate::{ConfigEntry, ConfigKey};

/// A parsed config file that preserves original formatting across edits.
pub struct ConfigFile {
    path: Option<PathBuf>,
    events: Vec<ConfigEvent>,
}

impl ConfigFile {
    /// Parse a config file from bytes.
    pub fn parse(content: &[u8], path: Option<&Path>) -> Result<Self, ConfigError> {
        let filename = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        let events = parse::parse_config(content, &filename)?;

        Ok(ConfigFile {
            path: path.map(|p| p.to_path_buf()),
            events,
        })
    }

    /// Load and parse a config file from disk. A missing file is reported as
    /// an empty config, not an error — callers that care use [`Self::exists`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read(path) {
            Ok(content) => Self::parse(&content, Some(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile {
                path: Some(path.to_path_buf()),
                events: Vec::new(),
            }),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.as_deref().is_some_and(Path::exists)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get all entries as [`ConfigEntry`] values.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        let mut entries = Vec::new();
        let mut current_section = BString::new(Vec::new());
        let mut current_subsection: Option<BString> = None;

        for event in &self.events {
            match event {
                ConfigEvent::SectionHeader { section, subsection, .. } => {
                    current_section = section.clone();
                    current_subsection = subsection.clone();
                }
                ConfigEvent::Entry { key, value, line_number, .. } => {
                    entries.push(ConfigEntry {
                        key: ConfigKey {
                            section: current_section.clone(),
                            subsection: current_subsection.clone(),
                            name: key.clone(),
                        },
                        value: value.clone(),
                        source_file: self.path.clone(),
                        line_number: Some(*line_number),
                    });
                }
                _ => {}
            }
        }

        entries
    }

    /// Get the last value for a key (matching git's last-one-wins semantics
    /// for repeated keys within the same file).
    pub fn get(&self, key: &ConfigKey) -> Option<Option<&BStr>> {
        let mut current_section = BString::new(Vec::new());
        let mut current_subsection: Option<BString> = None;
        let mut found = None;

        for event in &self.events {
            match event {
                ConfigEvent::SectionHeader { section, subsection, .. } => {
                    current_section = section.clone();
                    current_subsection = subsection.clone();
                }
                ConfigEvent::Entry { key: entry_key, value, .. } => {
                    if key.section == current_section
                        && key.subsection == current_subsection
                        && key.name == *entry_key
                    {
                        found = Some(value.as_deref().map(|v| v.as_bstr()));
                    }
                }
                _ => {}
            }
        }

        found
    }

    /// Get all values for a key, in file order (multi-valued keys, e.g.
    /// `remote.<name>.fetch`).
    pub fn get_all(&self, key: &ConfigKey) -> Vec<Option<&BStr>> {
        let mut results = Vec::new();
        let mut current_section = BString::new(Vec::new());
        let mut current_subsection: Option<BString> = None;

        for event in &self.events {
            match event {
                ConfigEvent::SectionHeader { section, subsection, .. } => {
                    current_section = section.clone();
                    current_subsection = subsection.clone();
                }
                ConfigEvent::Entry { key: entry_key, value, .. } => {
                    if key.section == current_section
                        && key.subsection == current_subsection
                        && key.name == *entry_key
                    {
                        results.push(value.as_deref().map(|v| v.as_bstr()));
                    }
                }
                _ => {}
            }
        }

        results
    }

    /// Set a value. Updates the last matching entry if the key exists;
    /// otherwise appends to the matching section, creating it if needed.
    pub fn set(&mut self, key: &ConfigKey, value: &BStr) {
        let mut current_section = BString::new(Vec::new());
        let mut current_subsection: Option<BString> = None;
        let mut last_match_idx: Option<usize> = None;
        let mut last_section_idx: Option<usize> = None;
        let mut last_entry_in_section_idx: Option<usize> = None;

        for (i, event) in self.events.iter().enumerate() {
            match event {
                ConfigEvent::SectionHeader { section, subsection, .. } => {
                    current_section = section.clone();
                    current_subsection = subsection.clone();
                    if key.section == current_section && key.subsection == current_subsection {
                        last_section_idx = Some(i);
                        last_entry_in_section_idx = None;
                    }
                }
                ConfigEvent::Entry { key: entry_key, .. } => {
                    if key.section == current_section && key.subsection == current_subsection {
                        last_entry_in_section_idx = Some(i);
                        if key.name == *entry_key {
                            last_match_idx = Some(i);
                        }
                    }
                }
                _ => {}
            }
        }

        let new_raw = format_entry(key.name.as_ref(), value);

        if let Some(idx) = last_match_idx {
            self.events[idx] = ConfigEvent::Entry {
                raw: new_raw,
                key: key.name.clone(),
                value: Some(value.to_owned()),
                line_number: 0,
            };
        } else if last_section_idx.is_some() {
            let insert_at = last_entry_in_section_idx.or(last_section_idx).unwrap() + 1;
            self.events.insert(
                insert_at,
                ConfigEvent::Entry {
                    raw: new_raw,
                    key: key.name.clone(),
                    value: Some(value.to_owned()),
                    line_number: 0,
                },
            );
        } else {
            let section_header = format_section_header(
                key.section.as_ref(),
                key.subsection.as_ref().map(|s| s.as_ref()),
            );
            self.events.push(ConfigEvent::SectionHeader {
                raw: section_header,
                section: key.section.clone(),
                subsection: key.subsection.clone(),
            });
            self.events.push(ConfigEvent::Entry {
                raw: new_raw,
                key: key.name.clone(),
                value: Some(value.to_owned()),
                line_number: 0,
            });
        }
    }

    /// Remove the first occurrence of a key. Returns true if found.
    pub fn remove(&mut self, key: &ConfigKey) -> bool {
        let mut current_section = BString::new(Vec::new());
        let mut current_subsection: Option<BString> = None;

        for (i, event) in self.events.iter().enumerate() {
            match event {
                ConfigEvent::SectionHeader { section, subsection, .. } => {
                    current_section = section.clone();
                    current_subsection = subsection.clone();
                }
                ConfigEvent::Entry { key: entry_key, .. } => {
                    if key.section == current_section
                        && key.subsection == current_subsection
                        && key.name == *entry_key
                    {
                        self.events.remove(i);
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// Remove an entire section, e.g. dropping a remote with `remote.<name>`.
    pub fn remove_section(&mut self, section: &BStr, subsection: Option<&BStr>) -> bool {
        let section_lower = BString::from(
            section
                .as_bytes()
                .iter()
                .map(|b| b.to_ascii_lowercase())
                .collect::<Vec<u8>>(),
        );
        let subsection_owned = subsection.map(|s| BString::from(s.as_bytes()));

        let mut in_target_section = false;
        let mut found = false;
        let mut to_remove = Vec::new();

        for (i, event) in self.events.iter().enumerate() {
            match event {
                ConfigEvent::SectionHeader { section: s, subsection: sub, .. } => {
                    if *s == section_lower && *sub == subsection_owned {
                        in_target_section = true;
                        found = true;
                        to_remove.push(i);
                    } else {
                        in_target_section = false;
                    }
                }
                _ => {
                    if in_target_section {
                        to_remove.push(i);
                    }
                }
            }
        }

        for idx in to_remove.into_iter().rev() {
            self.events.remove(idx);
        }

        found
    }

    /// Serialize back to bytes, preserving formatting of untouched lines.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for event in &self.events {
            match event {
                ConfigEvent::SectionHeader { raw, .. } => out.extend_from_slice(raw.as_ref()),
                ConfigEvent::Entry { raw, .. } => out.extend_from_slice(raw.as_ref()),
                ConfigEvent::Comment(raw) => out.extend_from_slice(raw.as_ref()),
                ConfigEvent::Blank(raw) => out.extend_from_slice(raw.as_ref()),
            }
        }
        out
    }

    /// Write to disk atomically via a lock file.
    pub fn write(&self) -> Result<(), ConfigError> {
        let path = self
            .path
            .as_deref()
            .expect("ConfigFile::write requires a path");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut lock = lit_utils::lockfile::LockFile::acquire(path)?;
        lock.write_all(&self.to_bytes())?;
        lock.commit()?;
        Ok(())
    }
}

impl std::fmt::Debug for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFile")
            .field("path", &self.path)
            .field("events_count", &self.events.len())
            .finish()
    }
}

fn format_entry(key: &BStr, value: &BStr) -> BString {
    let needs_quote = value.is_empty()
        || value.first() == Some(&b' ')
        || value.last() == Some(&b' ')
        || value.contains(&b';')
        || value.contains(&b'#')
        || value.contains(&b'\r');

    let mut out = BString::new(Vec::new());
    out.push_str(b"\t");
    out.push_str(key.as_bytes());
    out.push_str(b" = ");

    if needs_quote {
        out.push_byte(b'"');
    }
    for &b in value.as_bytes() {
        match b {
            b'\\' => out.push_str(b"\\\\"),
            b'"' => out.push_str(b"\\\""),
            b'\n' => out.push_str(b"\\n"),
            b'\t' => out.push_str(b"\\t"),
            _ => out.push_byte(b),
        }
    }
    if needs_quote {
        out.push_byte(b'"');
    }

    out.push_byte(b'\n');
    out
}

fn format_section_header(section: &BStr, subsection: Option<&BStr>) -> BString {
    let mut out = BString::new(Vec::new());
    out.push_byte(b'[');
    out.push_str(section.as_bytes());

    if let Some(sub) = subsection {
        out.push_str(b" \"");
        for &b in sub.as_bytes() {
            match b {
                b'\\' => out.push_str(b"\\\\"),
                b'"' => out.push_str(b"\\\""),
                _ => out.push_byte(b),
            }
        }
        out.push_byte(b'"');
    }

    out.push_str(b"]\n");
    out
}
