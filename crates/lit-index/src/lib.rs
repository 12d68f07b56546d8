//! The index (staging area).
//!
//! Reads and writes the binary DIRC-format index file that sits between the
//! working tree and the object database, plus the gitignore-style matcher
//! used to decide which working-tree paths are untracked-but-ignored.

pub mod entry;
pub mod ignore;
mod read;
mod write;

use std::path::Path;

use bstr::BStr;
use lit_hash::ObjectId;
use lit_odb::ObjectDatabase;

pub use entry::{EntryFlags, IndexEntry, StatData};
pub use error::IndexError;
pub use ignore::IgnoreStack;

mod error {
    use std::path::PathBuf;

    #[derive(Debug, thiserror::Error)]
    pub enum IndexError {
        #[error("invalid index header: {0}")]
        InvalidHeader(String),

        #[error("unsupported index version: {0}")]
        UnsupportedVersion(u32),

        #[error("index checksum mismatch")]
        ChecksumMismatch,

        #[error("invalid index entry at offset {offset}: {reason}")]
        InvalidEntry { offset: usize, reason: String },

        #[error("lock failed: {path}")]
        LockFailed { path: PathBuf },

        #[error(transparent)]
        Io(#[from] std::io::Error),

        #[error(transparent)]
        Odb(#[from] lit_odb::OdbError),
    }
}

/// Merge stage for index entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Resolved/clean entry (stage 0).
    Normal,
    /// Common ancestor version in a merge conflict (stage 1).
    Base,
    /// "Ours" version in a merge conflict (stage 2).
    Ours,
    /// "Theirs" version in a merge conflict (stage 3).
    Theirs,
}

impl Stage {
    pub fn as_u8(&self) -> u8 {
        match self {
            Stage::Normal => 0,
            Stage::Base => 1,
            Stage::Ours => 2,
            Stage::Theirs => 3,
        }
    }

    pub fn from_u8(n: u8) -> Result<Self, IndexError> {
        match n {
            0 => Ok(Stage::Normal),
            1 => Ok(Stage::Base),
            2 => Ok(Stage::Ours),
            3 => Ok(Stage::Theirs),
            _ => Err(IndexError::InvalidEntry {
                offset: 0,
                reason: format!("invalid stage: {n}"),
            }),
        }
    }
}

/// The staging area: a flat mapping from path (plus stage) to entry.
#[derive(Clone)]
pub struct Index {
    entries: Vec<IndexEntry>,
    checksum: ObjectId,
}

impl Index {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            checksum: ObjectId::NULL,
        }
    }

    /// Read the index from a file. Uses a memory-mapped view since index
    /// files can grow large in repositories with many tracked paths.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let file = std::fs::File::open(path.as_ref())?;
        let data = unsafe { memmap2::Mmap::map(&file)? };
        read::parse_index(&data)
    }

    /// Write the index to a file atomically (lock file + rename).
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        write::write_index(self, path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by path and stage.
    pub fn get(&self, path: &BStr, stage: Stage) -> Option<&IndexEntry> {
        self.entries
            .iter()
            .find(|e| e.path[..] == path[..] && e.stage == stage)
    }

    /// Get all entries for a path (all stages); used for conflict inspection.
    pub fn get_all(&self, path: &BStr) -> Vec<&IndexEntry> {
        self.entries
            .iter()
            .filter(|e| e.path[..] == path[..])
            .collect()
    }

    /// Add or replace an entry, keeping entries sorted by (path, stage).
    pub fn add(&mut self, entry: IndexEntry) {
        self.entries
            .retain(|e| !(e.path == entry.path && e.stage == entry.stage));

        let pos = self
            .entries
            .binary_search_by(|e| cmp_entries(e, &entry))
            .unwrap_or_else(|pos| pos);
        self.entries.insert(pos, entry);
    }

    /// Remove the entry at a path and stage. Returns true if one was removed.
    pub fn remove(&mut self, path: &BStr, stage: Stage) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.path[..] == path[..] && e.stage == stage));
        self.entries.len() < before
    }

    /// Remove every stage of a path (used when resolving a conflict by deletion).
    pub fn remove_all_stages(&mut self, path: &BStr) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.path[..] != path[..]);
        self.entries.len() < before
    }

    /// Does this path have any nonzero-stage (conflicted) entries?
    pub fn has_conflicts(&self, path: &BStr) -> bool {
        self.entries
            .iter()
            .any(|e| e.path[..] == path[..] && e.stage != Stage::Normal)
    }

    /// Every conflicted path, deduplicated.
    pub fn conflicted_paths(&self) -> Vec<&BStr> {
        let mut paths: Vec<&BStr> = self
            .entries
            .iter()
            .filter(|e| e.stage != Stage::Normal)
            .map(|e| e.path.as_ref())
            .collect();
        paths.dedup();
        paths
    }

    /// The three stages for a path: (base, ours, theirs).
    pub fn conflict_entries(
        &self,
        path: &BStr,
    ) -> (Option<&IndexEntry>, Option<&IndexEntry>, Option<&IndexEntry>) {
        let base = self.get(path, Stage::Base);
        let ours = self.get(path, Stage::Ours);
        let theirs = self.get(path, Stage::Theirs);
        (base, ours, theirs)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Construct a tree hierarchy from the current stage-0 entries.
    ///
    /// Pure: equal logical contents (path/mode/oid triples) always yield
    /// the same tree oid.
    pub fn write_tree(&self, odb: &ObjectDatabase) -> Result<ObjectId, IndexError> {
        write::write_tree_from_index(self, odb)
    }

    /// Replace the index with the flattened entries of a tree, all at stage 0.
    pub fn read_tree(&mut self, tree_oid: &ObjectId, odb: &ObjectDatabase) -> Result<(), IndexError> {
        self.entries.clear();
        flatten_tree(tree_oid, b"", odb, &mut self.entries)?;
        self.entries.sort_by(cmp_entries);
        Ok(())
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten_tree(
    tree_oid: &ObjectId,
    prefix: &[u8],
    odb: &ObjectDatabase,
    out: &mut Vec<IndexEntry>,
) -> Result<(), IndexError> {
    use lit_object::Object;

    let tree = match odb.read(tree_oid)? {
        Some(Object::Tree(t)) => t,
        Some(_) => {
            return Err(IndexError::InvalidHeader(format!(
                "{tree_oid} is not a tree"
            )))
        }
        None => {
            return Err(IndexError::InvalidHeader(format!(
                "missing tree object {tree_oid}"
            )))
        }
    };

    for entry in tree.iter() {
        let mut path = prefix.to_vec();
        path.extend_from_slice(&entry.name);

        if entry.mode.is_tree() {
            path.push(b'/');
            flatten_tree(&entry.oid, &path, odb, out)?;
        } else {
            out.push(IndexEntry {
                path: path.into(),
                oid: entry.oid,
                mode: entry.mode,
                stage: Stage::Normal,
                stat: StatData::default(),
                flags: EntryFlags::default(),
            });
        }
    }

    Ok(())
}

fn cmp_entries(a: &IndexEntry, b: &IndexEntry) -> std::cmp::Ordering {
    a.path.cmp(&b.path).then(a.stage.as_u8().cmp(&b.stage.as_u8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_object::{Blob, FileMode, Object};

    fn make_entry(path: &str, oid: ObjectId) -> IndexEntry {
        IndexEntry {
            path: path.into(),
            oid,
            mode: FileMode::Regular,
            stage: Stage::Normal,
            stat: StatData::default(),
            flags: EntryFlags::default(),
        }
    }

    #[test]
    fn add_keeps_sorted_order() {
        let mut index = Index::new();
        index.add(make_entry("b.txt", ObjectId::NULL));
        index.add(make_entry("a.txt", ObjectId::NULL));
        let paths: Vec<&[u8]> = index.iter().map(|e| e.path.as_slice()).collect();
        assert_eq!(paths, vec![b"a.txt".as_slice(), b"b.txt".as_slice()]);
    }

    #[test]
    fn add_replaces_same_path_and_stage() {
        let mut index = Index::new();
        index.add(make_entry("a.txt", ObjectId::NULL));
        let other = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        index.add(make_entry("a.txt", other));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(BStr::new(b"a.txt"), Stage::Normal).unwrap().oid, other);
    }

    #[test]
    fn conflict_detection() {
        let mut index = Index::new();
        let mut entry = make_entry("a.txt", ObjectId::NULL);
        entry.stage = Stage::Ours;
        index.add(entry);
        assert!(index.has_conflicts(BStr::new(b"a.txt")));
        assert_eq!(index.conflicted_paths(), vec![BStr::new(b"a.txt")]);
    }

    #[test]
    fn read_tree_round_trips_through_write_tree() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        let blob_oid = odb.write(&Object::Blob(Blob::new(b"x".to_vec()))).unwrap();

        let mut index = Index::new();
        index.add(make_entry("dir/a.txt", blob_oid));
        index.add(make_entry("b.txt", blob_oid));
        let tree_oid = index.write_tree(&odb).unwrap();

        let mut restored = Index::new();
        restored.read_tree(&tree_oid, &odb).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.write_tree(&odb).unwrap(), tree_oid);
    }
}
