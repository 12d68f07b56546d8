//! Content diffing: Myers line diff, unified-hunk formatting, tree-to-tree
//! diff, and binary detection.
//!
//! Operates purely on blob/tree content read from an [`lit_odb::ObjectDatabase`];
//! it has no knowledge of the index or the working tree. Rename/copy
//! detection and alternate output formats (stat, raw, word-diff, ...) are
//! out of scope — the only format produced is unified diff text.

pub mod algorithm;
pub mod binary;
pub mod format;
pub mod tree;

use bstr::BString;
use lit_hash::ObjectId;
use lit_object::FileMode;

/// Options controlling a diff computation.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Lines of context shown around each change.
    pub context_lines: usize,
    /// Restrict the diff to paths under one of these prefixes.
    pub pathspec: Option<Vec<BString>>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: 3,
            pathspec: None,
        }
    }
}

/// The full result of diffing two trees (or a tree and nothing).
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    pub files: Vec<FileDiff>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn num_files_changed(&self) -> usize {
        self.files.len()
    }

    pub fn insertions(&self) -> usize {
        self.files.iter().map(FileDiff::insertions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.files.iter().map(FileDiff::deletions).sum()
    }
}

/// How a single path changed between the two sides of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
    TypeChanged,
}

impl FileStatus {
    pub fn as_char(&self) -> char {
        match self {
            Self::Added => 'A',
            Self::Deleted => 'D',
            Self::Modified => 'M',
            Self::TypeChanged => 'T',
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single file's change between two trees.
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub status: FileStatus,
    pub old_path: Option<BString>,
    pub new_path: Option<BString>,
    pub old_mode: Option<FileMode>,
    pub new_mode: Option<FileMode>,
    pub old_oid: Option<ObjectId>,
    pub new_oid: Option<ObjectId>,
    pub hunks: Vec<Hunk>,
    pub is_binary: bool,
}

impl FileDiff {
    pub fn path(&self) -> &BString {
        self.new_path.as_ref().or(self.old_path.as_ref()).expect("a FileDiff always has at least one path")
    }

    pub fn insertions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Addition(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Deletion(_)))
            .count()
    }
}

/// A contiguous range of changed lines plus surrounding context.
#[derive(Debug, Clone)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub header: Option<BString>,
    pub lines: Vec<DiffLine>,
}

/// One line within a hunk.
#[derive(Debug, Clone)]
pub enum DiffLine {
    Context(BString),
    Addition(BString),
    Deletion(BString),
}

/// Errors produced while computing a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("failed to read object {oid}: {source}")]
    ObjectRead {
        oid: ObjectId,
        #[source]
        source: lit_odb::OdbError,
    },
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),
    #[error("expected {expected} object {oid}, found {actual}")]
    UnexpectedObjectType {
        oid: ObjectId,
        expected: &'static str,
        actual: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
