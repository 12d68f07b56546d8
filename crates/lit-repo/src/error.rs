use std::path::PathBuf;

use bstr::BString;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a lit repository (or any of the parent directories): {0}")]
    NotFound(PathBuf),

    #[error("invalid lit directory: {path}: {reason}")]
    InvalidLitDir { path: PathBuf, reason: String },

    #[error("repository already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("bare repository has no working tree")]
    BareNoWorkTree,

    #[error("unable to read HEAD: {0}")]
    InvalidHead(String),

    #[error("branch is unborn: {0}")]
    UnbornBranch(String),

    #[error("HEAD is detached; this operation requires a branch")]
    DetachedHead,

    #[error("no stash entry at index {0}")]
    StashNotFound(usize),

    #[error("working tree has uncommitted changes: {0:?}")]
    Dirty(Vec<BString>),

    #[error("merge conflicts in: {0:?}")]
    Conflict(Vec<BString>),

    #[error("a merge is already in progress")]
    MergeInProgress,

    #[error("a rebase is already in progress")]
    RebaseInProgress,

    #[error("ref update rejected, not a fast-forward: {0}")]
    NonFastForward(String),

    #[error("a branch named '{0}' already exists")]
    BranchExists(String),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("cannot delete the currently checked-out branch: {0}")]
    BranchCheckedOut(String),

    #[error("a tag named '{0}' already exists")]
    TagExists(String),

    #[error("tag not found: {0}")]
    TagNotFound(String),

    #[error("pathspec '{0}' did not match any file known to lit")]
    PathspecNotFound(String),

    #[error("unknown revision or path not in the working tree: {0}")]
    RevisionNotFound(String),

    #[error(transparent)]
    Config(#[from] lit_config::ConfigError),

    #[error(transparent)]
    Odb(#[from] lit_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] lit_ref::RefError),

    #[error(transparent)]
    Index(#[from] lit_index::IndexError),

    #[error(transparent)]
    Diff(#[from] lit_diff::DiffError),

    #[error(transparent)]
    Merge(#[from] lit_merge::MergeError),

    #[error(transparent)]
    RevWalk(#[from] lit_revwalk::RevWalkError),

    #[error(transparent)]
    Transport(#[from] lit_transport::TransportError),

    #[error(transparent)]
    Hash(#[from] lit_hash::HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
