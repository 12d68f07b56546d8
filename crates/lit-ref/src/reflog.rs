//! Reflog entries and the per-ref log file under `.lit/logs/`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice, ByteVec};
use lit_hash::ObjectId;
use lit_utils::date::Signature;

use crate::error::RefError;
use crate::name::RefName;

/// A single reflog entry recording a ref value change.
///
/// Format: `<old-oid> <new-oid> <name> <<email>> <timestamp> <tz>\t<message>\n`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub old_oid: ObjectId,
    pub new_oid: ObjectId,
    pub identity: Signature,
    pub message: BString,
}

/// Walks a reflog line left to right, consuming fixed-width or
/// delimiter-bound fields as it goes.
struct FieldCursor<'a> {
    rest: &'a [u8],
}

impl<'a> FieldCursor<'a> {
    fn new(line: &'a [u8]) -> Self {
        Self { rest: line }
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], RefError> {
        if self.rest.len() < n {
            return Err(RefError::Parse(format!("reflog line too short for {what}")));
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Ok(head)
    }

    fn expect(&mut self, byte: u8, what: &'static str) -> Result<(), RefError> {
        match self.rest.first() {
            Some(&b) if b == byte => {
                self.rest = &self.rest[1..];
                Ok(())
            }
            _ => Err(RefError::Parse(format!("expected '{}' {what}", byte as char))),
        }
    }
}

fn parse_oid_field(bytes: &[u8]) -> Result<ObjectId, RefError> {
    let hex = std::str::from_utf8(bytes).map_err(|_| RefError::Parse("invalid UTF-8 in oid".into()))?;
    Ok(ObjectId::from_hex(hex)?)
}

impl ReflogEntry {
    /// Parse a reflog entry from a single line.
    pub fn parse(line: &BStr) -> Result<Self, RefError> {
        let mut cursor = FieldCursor::new(line.as_bytes());

        let old_oid = parse_oid_field(cursor.take(40, "old OID")?)?;
        cursor.expect(b' ', "after old OID")?;
        let new_oid = parse_oid_field(cursor.take(40, "new OID")?)?;
        cursor.expect(b' ', "after new OID")?;

        let (identity_part, message) = match cursor.rest.find_byte(b'\t') {
            Some(tab) => (&cursor.rest[..tab], &cursor.rest[tab + 1..]),
            None => (cursor.rest, &b""[..]),
        };

        let identity =
            Signature::parse(identity_part.as_bstr()).map_err(|e| RefError::Parse(format!("invalid identity in reflog: {e}")))?;

        let message = message.strip_suffix(b"\n").unwrap_or(message);

        Ok(Self {
            old_oid,
            new_oid,
            identity,
            message: BString::from(message),
        })
    }

    /// Serialize to reflog line format (without trailing newline).
    pub fn to_bytes(&self) -> BString {
        let mut out = BString::new(Vec::with_capacity(256));
        out.push_str(self.old_oid.to_hex().as_bytes());
        out.push(b' ');
        out.push_str(self.new_oid.to_hex().as_bytes());
        out.push(b' ');
        out.push_str(self.identity.to_bytes());
        out.push(b'\t');
        out.push_str(&self.message);
        out
    }
}

/// The reflog file path for a given ref name.
pub fn reflog_path(lit_dir: &Path, name: &RefName) -> PathBuf {
    lit_dir.join("logs").join(name.as_str())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, RefError> {
    fs::read(path).map_err(|e| RefError::IoPath { path: path.to_path_buf(), source: e })
}

fn write_bytes(path: &Path, data: &[u8]) -> Result<(), RefError> {
    fs::write(path, data).map_err(|e| RefError::IoPath { path: path.to_path_buf(), source: e })
}

fn ensure_parent(path: &Path) -> Result<(), RefError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RefError::IoPath { path: parent.to_path_buf(), source: e })?;
    }
    Ok(())
}

fn parse_entries(contents: &[u8]) -> Result<Vec<ReflogEntry>, RefError> {
    contents
        .split(|&b| b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| ReflogEntry::parse(line.as_bstr()))
        .collect()
}

fn serialize_entries(entries: &[ReflogEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(&entry.to_bytes());
        out.push(b'\n');
    }
    out
}

/// Read all reflog entries for a ref, newest first.
pub fn read_reflog(lit_dir: &Path, name: &RefName) -> Result<Vec<ReflogEntry>, RefError> {
    let path = reflog_path(lit_dir, name);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut entries = parse_entries(&read_bytes(&path)?)?;
    entries.reverse();
    Ok(entries)
}

/// Append a reflog entry for a ref.
pub fn append_reflog_entry(lit_dir: &Path, name: &RefName, entry: &ReflogEntry) -> Result<(), RefError> {
    let path = reflog_path(lit_dir, name);
    ensure_parent(&path)?;

    let mut line = entry.to_bytes();
    line.push(b'\n');

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| RefError::IoPath { path: path.clone(), source: e })?;

    file.write_all(&line).map_err(|e| RefError::IoPath { path, source: e })
}

/// Resolve `@{N}` — the Nth previous value, N=0 being the current value.
pub fn resolve_at_n(lit_dir: &Path, name: &RefName, n: usize) -> Result<Option<ObjectId>, RefError> {
    let entries = read_reflog(lit_dir, name)?;
    Ok(entries.get(n).map(|e| e.new_oid))
}

/// Resolve `@{date}` — the ref's value as of a given timestamp.
pub fn resolve_at_date(lit_dir: &Path, name: &RefName, timestamp: i64) -> Result<Option<ObjectId>, RefError> {
    let path = reflog_path(lit_dir, name);
    if !path.exists() {
        return Ok(None);
    }

    let contents = read_bytes(&path)?;
    let mut result = None;
    for line in contents.split(|&b| b == b'\n').filter(|l| !l.is_empty()) {
        let entry = ReflogEntry::parse(line.as_bstr())?;
        if entry.identity.date.timestamp > timestamp {
            break;
        }
        result = Some(entry.new_oid);
    }

    Ok(result)
}

/// Expire reflog entries older than `expire_timestamp`, always keeping the tip.
pub fn expire_reflog(lit_dir: &Path, name: &RefName, expire_timestamp: i64) -> Result<usize, RefError> {
    let path = reflog_path(lit_dir, name);
    if !path.exists() {
        return Ok(0);
    }

    let entries = parse_entries(&read_bytes(&path)?)?;
    let last_index = entries.len().saturating_sub(1);

    let (kept, dropped): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .enumerate()
        .partition(|(i, entry)| *i == last_index || entry.identity.date.timestamp >= expire_timestamp);

    let kept: Vec<ReflogEntry> = kept.into_iter().map(|(_, e)| e).collect();
    write_bytes(&path, &serialize_entries(&kept))?;
    Ok(dropped.len())
}

/// Delete a specific reflog entry by index (0 = most recent).
pub fn delete_reflog_entry(lit_dir: &Path, name: &RefName, index: usize) -> Result<(), RefError> {
    let path = reflog_path(lit_dir, name);
    if !path.exists() {
        return Err(RefError::NotFound(name.as_str().to_string()));
    }

    let mut entries = parse_entries(&read_bytes(&path)?)?;
    if entries.is_empty() {
        return Err(RefError::NotFound(format!("{}@{{{}}}", name.as_str(), index)));
    }

    let file_index = entries
        .len()
        .checked_sub(1 + index)
        .ok_or_else(|| RefError::NotFound(format!("{}@{{{}}}", name.as_str(), index)))?;
    entries.remove(file_index);

    write_bytes(&path, &serialize_entries(&entries))
}
