//! Commit-graph traversal: revision walking, merge-base computation, ASCII
//! graph drawing, object reachability, and commit pretty-printing.
//!
//! Operates purely on object IDs read from an [`lit_odb::ObjectDatabase`].
//! Ref resolution (branch names, `HEAD`, revision ranges) is `lit-repo`'s
//! job: it resolves refs to OIDs and pushes those into a [`RevWalk`].

pub mod graph_draw;
pub mod merge_base;
pub mod objects;
pub mod pretty;
pub mod walk;

pub use graph_draw::GraphDrawer;
pub use merge_base::{is_ancestor, merge_base, merge_base_one};
pub use objects::list_objects;
pub use pretty::{format_commit, BuiltinFormat, FormatOptions};
pub use walk::{RevWalk, SortOrder, WalkOptions};

use lit_hash::ObjectId;

#[derive(Debug, thiserror::Error)]
pub enum RevWalkError {
    #[error("object database error: {0}")]
    Odb(#[from] lit_odb::OdbError),

    #[error("object error: {0}")]
    Object(#[from] lit_object::ObjectError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid revision: {0}")]
    InvalidRevision(String),

    #[error("commit not found: {0}")]
    CommitNotFound(ObjectId),

    #[error("object {0} is not a commit")]
    NotACommit(ObjectId),

    #[error("no merge base between given commits")]
    NoMergeBase,
}
