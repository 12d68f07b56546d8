//! Remote sync transport.
//!
//! Lit has no wire protocol: a remote is always a path on the local
//! filesystem (`file:///...`, `/abs/path`, `./relative/path`), and
//! `fetch`/`push`/`clone` work by opening the remote's object store and ref
//! store directly, the same way the local repository opens its own.

pub mod local;
pub mod url;

pub use local::RemoteRepo;
pub use url::RemoteUrl;

use std::path::PathBuf;

use lit_hash::ObjectId;
use lit_odb::ObjectDatabase;
use lit_ref::RefName;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("unsupported transport scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid remote url: {0}")]
    InvalidUrl(String),

    #[error("remote repository not found at {0}")]
    NotFound(PathBuf),

    #[error("non-fast-forward update rejected for {0}")]
    NonFastForward(String),

    #[error(transparent)]
    Ref(#[from] lit_ref::RefError),

    #[error(transparent)]
    Odb(#[from] lit_odb::OdbError),

    #[error(transparent)]
    RevWalk(#[from] lit_revwalk::RevWalkError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Copy every object reachable from `wanted` but not from `haves`, from one
/// object database to another. Returns the number of objects actually
/// written (objects already present at the destination are skipped).
pub fn copy_objects(from: &ObjectDatabase, to: &ObjectDatabase, wanted: &[ObjectId], haves: &[ObjectId]) -> Result<usize, TransportError> {
    let candidates = lit_revwalk::list_objects(from, wanted, haves)?;
    let mut copied = 0;
    for oid in candidates {
        if to.contains(&oid) {
            continue;
        }
        if let Some(obj) = from.read(&oid)? {
            to.write(&obj)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Fetch objects reachable from `wanted` (remote oids) into `local_odb`,
/// skipping anything reachable from `haves` (the local tips already known).
pub fn fetch(local_odb: &ObjectDatabase, remote: &RemoteRepo, wanted: &[ObjectId], haves: &[ObjectId]) -> Result<usize, TransportError> {
    copy_objects(remote.odb(), local_odb, wanted, haves)
}

/// Push objects reachable from `wanted` (local oids) to `remote`, skipping
/// anything the remote already has reachable from `haves`.
pub fn push(local_odb: &ObjectDatabase, remote: &RemoteRepo, wanted: &[ObjectId], haves: &[ObjectId]) -> Result<usize, TransportError> {
    copy_objects(local_odb, remote.odb(), wanted, haves)
}

/// Update a ref on the remote, refusing unless `new` is a descendant of the
/// expected current value (or `force` is set).
pub fn update_remote_ref(remote: &RemoteRepo, name: &RefName, expected: Option<ObjectId>, new: ObjectId, force: bool) -> Result<(), TransportError> {
    if let Some(old) = expected {
        if !force && old != new && !lit_revwalk::is_ancestor(remote.odb(), &old, &new)? {
            return Err(TransportError::NonFastForward(name.to_string()));
        }
    }
    remote.update_ref(name, expected, new, "push")
}

/// Everything `clone` needs from the remote: its full ref set, which branch
/// `HEAD` points at, and the object transfer count. Writing local refs,
/// `HEAD`, and checking out the working tree is `lit-repo`'s job.
#[derive(Debug, Clone)]
pub struct ClonedRefs {
    pub refs: Vec<(RefName, ObjectId)>,
    pub head_branch: Option<RefName>,
    pub objects_copied: usize,
}

/// Fetch every ref and every object reachable from them, for a fresh clone.
pub fn clone_into(local_odb: &ObjectDatabase, remote: &RemoteRepo) -> Result<ClonedRefs, TransportError> {
    let refs = remote.list_refs(None)?;
    let wanted: Vec<ObjectId> = refs.iter().map(|(_, oid)| *oid).collect();
    let objects_copied = copy_objects(remote.odb(), local_odb, &wanted, &[])?;
    let head_branch = remote.head_branch()?;
    Ok(ClonedRefs { refs, head_branch, objects_copied })
}
