use std::cmp::Ordering;

use bstr::{BStr, BString, ByteSlice};
use lit_hash::{ObjectId, OID_BYTES};

use crate::ObjectError;

/// The permission bits and object kind recorded for a tree entry. Lit
/// stores these as ASCII octal in the tree's binary encoding, same as every
/// other on-disk integer in the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    Regular,
    Executable,
    Symlink,
    /// A submodule link. Lit has no submodule support, but a tree entry of
    /// this kind must still parse and round-trip byte-for-byte.
    Gitlink,
    Tree,
    /// Anything outside the five modes above, kept verbatim.
    Unknown(u32),
}

const REGULAR: u32 = 0o100644;
const EXECUTABLE: u32 = 0o100755;
const SYMLINK: u32 = 0o120000;
const GITLINK: u32 = 0o160000;
const TREE: u32 = 0o40000;

impl FileMode {
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        parse_octal(s)
            .map(Self::from_raw)
            .ok_or_else(|| ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into()))
    }

    pub fn from_raw(raw: u32) -> Self {
        match raw {
            REGULAR => Self::Regular,
            EXECUTABLE => Self::Executable,
            SYMLINK => Self::Symlink,
            GITLINK => Self::Gitlink,
            TREE => Self::Tree,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u32 {
        match *self {
            Self::Regular => REGULAR,
            Self::Executable => EXECUTABLE,
            Self::Symlink => SYMLINK,
            Self::Gitlink => GITLINK,
            Self::Tree => TREE,
            Self::Unknown(v) => v,
        }
    }

    /// No leading zeros, matching the on-disk encoding.
    pub fn as_bytes(&self) -> BString {
        BString::from(format!("{:o}", self.raw()))
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink)
    }

    pub fn is_gitlink(&self) -> bool {
        matches!(self, Self::Gitlink)
    }
}

fn parse_octal(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    s.iter().try_fold(0u32, |acc, &b| {
        if !(b'0'..=b'7').contains(&b) {
            return None;
        }
        acc.checked_mul(8)?.checked_add(u32::from(b - b'0'))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn cmp_entries(a: &TreeEntry, b: &TreeEntry) -> Ordering {
        path_sort_key(&a.name, a.mode.is_tree()).cmp(&path_sort_key(&b.name, b.mode.is_tree()))
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        Self::cmp_entries(self, other)
    }
}

/// Builds a comparable key equivalent to the entry's name with a trailing
/// `/` appended for directories, without actually allocating a new string
/// for the common case. Comparing two of these keys byte-by-byte reproduces
/// the effect of treating directory names as if they ended in `/`: `"foo"`
/// (a directory) sorts after `"foo-bar"` but before `"foo0"`, because `/`
/// (0x2F) falls between `-` (0x2D) and `0` (0x30) in byte order.
fn path_sort_key(name: &[u8], is_dir: bool) -> SortKey<'_> {
    SortKey { name, is_dir }
}

struct SortKey<'a> {
    name: &'a [u8],
    is_dir: bool,
}

impl PartialEq for SortKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for SortKey<'_> {}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.name.iter().copied();
        let mut b = other.name.iter().copied();
        loop {
            let byte_for = |next: Option<u8>, is_dir: bool| match next {
                Some(b) => Some(b),
                None if is_dir => Some(b'/'),
                None => None,
            };
            match (byte_for(a.next(), self.is_dir), byte_for(b.next(), other.is_dir)) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) if x != y => return x.cmp(&y),
                _ => continue,
            }
        }
    }
}

/// A directory listing: a sorted sequence of (mode, name, oid) entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

struct EntryCursor<'a> {
    content: &'a [u8],
    pos: usize,
}

impl<'a> EntryCursor<'a> {
    fn new(content: &'a [u8]) -> Self {
        EntryCursor { content, pos: 0 }
    }

    fn take_until(&mut self, needle: u8, what: &'static str) -> Result<&'a [u8], ObjectError> {
        let rel = self.content[self.pos..]
            .iter()
            .position(|&b| b == needle)
            .ok_or_else(|| ObjectError::InvalidTreeEntry { offset: self.pos, reason: format!("missing {what}") })?;
        let found = self.pos + rel;
        let slice = &self.content[self.pos..found];
        self.pos = found + 1;
        Ok(slice)
    }

    fn take_n(&mut self, n: usize) -> Result<&'a [u8], ObjectError> {
        if self.pos + n > self.content.len() {
            return Err(ObjectError::InvalidTreeEntry { offset: self.pos, reason: "truncated OID".into() });
        }
        let slice = &self.content[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn next_entry(&mut self) -> Result<Option<TreeEntry>, ObjectError> {
        if self.pos >= self.content.len() {
            return Ok(None);
        }

        let mode_field = self.take_until(b' ', "space after mode")?;
        let mode = FileMode::from_bytes(mode_field)
            .map_err(|_| ObjectError::InvalidTreeEntry { offset: self.pos, reason: "invalid mode".into() })?;

        let name = BString::from(self.take_until(0, "null after name")?);
        let oid = ObjectId::from_bytes(self.take_n(OID_BYTES)?)?;

        Ok(Some(TreeEntry { mode, name, oid }))
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a sequence of `<mode-ascii> <name>\0<oid-bytes>` records.
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut cursor = EntryCursor::new(content);
        let mut entries = Vec::new();
        while let Some(entry) = cursor.next_entry()? {
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Encode entries in canonical sort order.
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut sorted = self.entries.clone();
        sorted.sort();

        sorted.iter().fold(Vec::new(), |mut out, entry| {
            out.extend_from_slice(&entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
            out
        })
    }

    pub fn sort(&mut self) {
        self.entries.sort();
    }

    pub fn find(&self, name: &BStr) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name.as_bstr() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_mode_from_bytes_covers_every_known_mode() {
        assert_eq!(FileMode::from_bytes(b"100644").unwrap(), FileMode::Regular);
        assert_eq!(FileMode::from_bytes(b"100755").unwrap(), FileMode::Executable);
        assert_eq!(FileMode::from_bytes(b"120000").unwrap(), FileMode::Symlink);
        assert_eq!(FileMode::from_bytes(b"160000").unwrap(), FileMode::Gitlink);
        assert_eq!(FileMode::from_bytes(b"40000").unwrap(), FileMode::Tree);
    }

    #[test]
    fn file_mode_unknown_round_trips() {
        let mode = FileMode::from_raw(0o100000);
        assert_eq!(mode, FileMode::Unknown(0o100000));
        assert_eq!(FileMode::from_bytes(&mode.as_bytes()).unwrap(), mode);
    }

    #[test]
    fn file_mode_round_trips_through_bytes() {
        for mode in
            [FileMode::Regular, FileMode::Executable, FileMode::Symlink, FileMode::Gitlink, FileMode::Tree]
        {
            assert_eq!(FileMode::from_bytes(&mode.as_bytes()).unwrap(), mode);
        }
    }

    #[test]
    fn file_mode_predicates() {
        assert!(FileMode::Tree.is_tree());
        assert!(!FileMode::Regular.is_tree());
        assert!(FileMode::Regular.is_blob());
        assert!(FileMode::Executable.is_blob());
        assert!(!FileMode::Tree.is_blob());
        assert!(FileMode::Symlink.is_symlink());
        assert!(FileMode::Gitlink.is_gitlink());
    }

    fn entry(name: &str, is_dir: bool) -> TreeEntry {
        TreeEntry {
            mode: if is_dir { FileMode::Tree } else { FileMode::Regular },
            name: BString::from(name),
            oid: ObjectId::NULL,
        }
    }

    #[test]
    fn directory_sorts_after_same_named_prefix_with_dot() {
        assert_eq!(TreeEntry::cmp_entries(&entry("foo", true), &entry("foo.c", false)), Ordering::Greater);
    }

    #[test]
    fn directory_sorts_after_hyphenated_sibling() {
        assert_eq!(TreeEntry::cmp_entries(&entry("foo", true), &entry("foo-bar", false)), Ordering::Greater);
    }

    #[test]
    fn directory_sorts_before_sibling_starting_with_larger_byte() {
        assert_eq!(TreeEntry::cmp_entries(&entry("foo", true), &entry("foo0", false)), Ordering::Less);
    }

    #[test]
    fn parse_empty_tree() {
        assert!(Tree::parse(b"").unwrap().is_empty());
    }

    #[test]
    fn parse_single_entry() {
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        let mut data = Vec::new();
        data.extend_from_slice(b"100644 hello.txt\0");
        data.extend_from_slice(oid.as_bytes());

        let tree = Tree::parse(&data).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.entries[0].mode, FileMode::Regular);
        assert_eq!(tree.entries[0].name, "hello.txt");
        assert_eq!(tree.entries[0].oid, oid);
    }

    #[test]
    fn parse_rejects_truncated_oid() {
        let mut data = Vec::new();
        data.extend_from_slice(b"100644 hello.txt\0");
        data.extend_from_slice(&[0u8; 4]);
        assert!(Tree::parse(&data).is_err());
    }

    #[test]
    fn serialize_then_parse_round_trips_in_sorted_order() {
        let oid1 = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        let oid2 = ObjectId::from_hex("0000000000000000000000000000000000000001").unwrap();

        let tree = Tree {
            entries: vec![
                TreeEntry { mode: FileMode::Regular, name: BString::from("b.txt"), oid: oid1 },
                TreeEntry { mode: FileMode::Tree, name: BString::from("a-dir"), oid: oid2 },
            ],
        };

        let parsed = Tree::parse(&tree.serialize_content()).unwrap();
        assert_eq!(parsed.entries[0].name, "a-dir");
        assert_eq!(parsed.entries[1].name, "b.txt");
    }

    #[test]
    fn find_entry_by_name() {
        let tree = Tree {
            entries: vec![
                TreeEntry { mode: FileMode::Regular, name: BString::from("README.md"), oid: ObjectId::NULL },
                TreeEntry { mode: FileMode::Tree, name: BString::from("src"), oid: ObjectId::NULL },
            ],
        };
        assert!(tree.find(BStr::new("README.md")).is_some());
        assert!(tree.find(BStr::new("nonexistent")).is_none());
    }
}
