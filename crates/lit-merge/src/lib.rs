//! Three-way merge engine: diff3 content merge, tree merge, conflict model,
//! cherry-pick, and rebase sequencing.
//!
//! Operates on object IDs read from an [`lit_odb::ObjectDatabase`] plus an
//! in-memory [`lit_index::Index`]; it has no knowledge of refs or the
//! working tree layout (`lit-repo` owns `MERGE_HEAD`/`MERGE_MSG`/
//! `REBASE_STATE/` persistence and ref updates).

pub mod cherry_pick;
pub mod conflict;
pub mod content;
pub mod sequencer;
pub mod tree;

pub use cherry_pick::{cherry_pick, CherryPickResult};
pub use sequencer::Sequencer;
pub use tree::merge_trees;

use bstr::BString;
use lit_hash::ObjectId;
use lit_object::FileMode;

/// How to resolve a conflict automatically instead of leaving markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoResolve {
    /// Keep our side of every conflict.
    Ours,
    /// Keep their side of every conflict.
    Theirs,
    /// Concatenate both sides (ours then theirs).
    Union,
    /// Keep whichever side's contributing commit has the later committer
    /// date; ties fall back to theirs.
    Recent { ours_date: i64, theirs_date: i64 },
}

/// Options for merge-family operations.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Automatic conflict resolution; `None` leaves markers and stages.
    pub auto_resolve: Option<AutoResolve>,
}

/// Result of a merge (tree merge, cherry-pick, or single-file merge).
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The resulting tree, if the merge produced one cleanly.
    pub tree: Option<ObjectId>,
    pub is_clean: bool,
    pub conflicts: Vec<ConflictEntry>,
}

impl MergeResult {
    pub fn clean(tree: ObjectId) -> Self {
        Self { tree: Some(tree), is_clean: true, conflicts: Vec::new() }
    }

    pub fn conflicted(conflicts: Vec<ConflictEntry>) -> Self {
        Self { tree: None, is_clean: false, conflicts }
    }
}

/// A single path's conflict, recorded with up to three stages.
#[derive(Debug, Clone)]
pub struct ConflictEntry {
    pub path: BString,
    pub conflict_type: ConflictType,
    pub base: Option<ConflictSide>,
    pub ours: Option<ConflictSide>,
    pub theirs: Option<ConflictSide>,
}

/// The shape of a conflict, per the three-way tree merge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictType {
    /// Both sides modified the same file differently.
    Content,
    /// One side modified, the other deleted.
    ModifyDelete,
    /// Both sides added the same path with different content.
    AddAdd,
}

/// One side (base, ours, or theirs) of a conflict.
#[derive(Debug, Clone)]
pub struct ConflictSide {
    pub oid: ObjectId,
    pub mode: FileMode,
    pub path: BString,
}

/// Result of merging a single file's three versions.
#[derive(Debug, Clone)]
pub enum ContentMergeResult {
    Clean(Vec<u8>),
    Conflict { content: Vec<u8>, conflict_count: usize },
}

impl ContentMergeResult {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean(_))
    }

    pub fn content(&self) -> &[u8] {
        match self {
            Self::Clean(data) => data,
            Self::Conflict { content, .. } => content,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("no merge base found")]
    NoMergeBase,

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("expected {expected} object, got {actual} for {oid}")]
    UnexpectedObjectType { oid: ObjectId, expected: &'static str, actual: String },

    #[error(transparent)]
    Diff(#[from] lit_diff::DiffError),

    #[error(transparent)]
    Odb(#[from] lit_odb::OdbError),

    #[error(transparent)]
    Index(#[from] lit_index::IndexError),

    #[error(transparent)]
    RevWalk(#[from] lit_revwalk::RevWalkError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_merge_result() {
        let result = MergeResult::clean(ObjectId::NULL);
        assert!(result.is_clean);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.tree, Some(ObjectId::NULL));
    }

    #[test]
    fn conflicted_merge_result() {
        let conflicts = vec![ConflictEntry {
            path: BString::from("file.txt"),
            conflict_type: ConflictType::Content,
            base: None,
            ours: None,
            theirs: None,
        }];
        let result = MergeResult::conflicted(conflicts);
        assert!(!result.is_clean);
        assert_eq!(result.conflicts.len(), 1);
        assert!(result.tree.is_none());
    }

    #[test]
    fn content_merge_result_variants() {
        let clean = ContentMergeResult::Clean(b"hello\n".to_vec());
        assert!(clean.is_clean());

        let conflict = ContentMergeResult::Conflict {
            content: b"<<<<<<< ours\nfoo\n=======\nbar\n>>>>>>> theirs\n".to_vec(),
            conflict_count: 1,
        };
        assert!(!conflict.is_clean());
    }
}
