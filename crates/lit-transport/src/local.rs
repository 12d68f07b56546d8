//! Access to a remote repository: opening its object store and ref store
//! directly on the local filesystem.
//!
//! There is no protocol peer to negotiate capabilities with — `fetch` and
//! `push` read and write the remote's `.lit/` layout the same way the
//! local repository's own commands do.

use std::path::{Path, PathBuf};

use lit_hash::ObjectId;
use lit_odb::ObjectDatabase;
use lit_ref::{FilesRefStore, RefName, RefStore, Reference};

use crate::TransportError;

/// A remote repository, opened directly from its on-disk layout.
#[derive(Debug)]
pub struct RemoteRepo {
    lit_dir: PathBuf,
    odb: ObjectDatabase,
    refs: FilesRefStore,
}

impl RemoteRepo {
    /// Open the remote at `path`, which must be a bare repository root or a
    /// directory containing a `.lit/` subdirectory.
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let lit_dir = resolve_lit_dir(path)?;
        let odb = ObjectDatabase::open(lit_dir.join("objects"));
        let refs = FilesRefStore::new(&lit_dir);
        Ok(Self { lit_dir, odb, refs })
    }

    pub fn lit_dir(&self) -> &Path {
        &self.lit_dir
    }

    pub fn odb(&self) -> &ObjectDatabase {
        &self.odb
    }

    pub fn refs(&self) -> &FilesRefStore {
        &self.refs
    }

    /// Every ref the remote advertises, resolved to a direct oid, with an
    /// optional `refs/...` prefix filter.
    pub fn list_refs(&self, prefix: Option<&str>) -> Result<Vec<(RefName, ObjectId)>, TransportError> {
        let mut out = Vec::new();
        for reference in self.refs.iter(prefix)? {
            let reference = reference?;
            if let Some(oid) = reference.target_oid() {
                out.push((reference.name().clone(), oid));
            } else if let Some(oid) = self.refs.resolve_to_oid(reference.name())? {
                out.push((reference.name().clone(), oid));
            }
        }
        Ok(out)
    }

    /// Resolve a single ref (`refs/heads/main`, `HEAD`, ...) to an oid.
    pub fn resolve(&self, name: &RefName) -> Result<Option<ObjectId>, TransportError> {
        Ok(self.refs.resolve_to_oid(name)?)
    }

    /// The branch `HEAD` points at, if it is a symbolic ref into
    /// `refs/heads/`. Used by `clone` to pick the new repo's default branch.
    pub fn head_branch(&self) -> Result<Option<RefName>, TransportError> {
        let head = RefName::new("HEAD")?;
        match self.refs.resolve(&head)? {
            Some(Reference::Symbolic { target, .. }) => Ok(Some(target)),
            _ => Ok(None),
        }
    }

    /// Create a compare-and-swap ref transaction against this remote's ref
    /// store (used by `push`).
    pub fn update_ref(&self, name: &RefName, expected: Option<ObjectId>, new: ObjectId, message: impl Into<String>) -> Result<(), TransportError> {
        let mut tx = lit_ref::RefTransaction::new();
        match expected {
            Some(old) => tx.update(name.clone(), old, new, message),
            None => tx.create(name.clone(), new, message),
        }
        self.refs.commit_transaction(tx)?;
        Ok(())
    }
}

/// Resolve `path` to a `.lit` directory: either `path/.lit` or `path`
/// itself if it already looks like a bare repository layout.
fn resolve_lit_dir(path: &Path) -> Result<PathBuf, TransportError> {
    if !path.exists() {
        return Err(TransportError::NotFound(path.to_path_buf()));
    }

    let dot_lit = path.join(".lit");
    if is_lit_dir(&dot_lit) {
        return Ok(dot_lit);
    }
    if is_lit_dir(path) {
        return Ok(path.to_path_buf());
    }

    Err(TransportError::NotFound(path.to_path_buf()))
}

fn is_lit_dir(path: &Path) -> bool {
    path.join("HEAD").is_file() && path.join("objects").is_dir() && path.join("refs").is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_object::{Blob, Object};

    fn init_bare(dir: &Path) {
        std::fs::create_dir_all(dir.join("objects")).unwrap();
        std::fs::create_dir_all(dir.join("refs/heads")).unwrap();
        std::fs::write(dir.join("HEAD"), b"ref: refs/heads/main\n").unwrap();
    }

    #[test]
    fn opens_bare_repo_at_its_root() {
        let dir = tempfile::tempdir().unwrap();
        init_bare(dir.path());

        let remote = RemoteRepo::open(dir.path()).unwrap();
        assert_eq!(remote.lit_dir(), dir.path());
    }

    #[test]
    fn opens_non_bare_repo_via_dot_lit() {
        let dir = tempfile::tempdir().unwrap();
        init_bare(&dir.path().join(".lit"));

        let remote = RemoteRepo::open(dir.path()).unwrap();
        assert_eq!(remote.lit_dir(), dir.path().join(".lit"));
    }

    #[test]
    fn open_fails_on_a_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = RemoteRepo::open(dir.path()).unwrap_err();
        assert!(matches!(err, TransportError::NotFound(_)));
    }

    #[test]
    fn list_refs_resolves_direct_targets() {
        let dir = tempfile::tempdir().unwrap();
        init_bare(dir.path());
        let remote = RemoteRepo::open(dir.path()).unwrap();

        let blob = remote.odb().write(&Object::Blob(Blob::new(b"hi\n".to_vec()))).unwrap();
        remote.refs().write_ref(&RefName::new("refs/heads/main").unwrap(), &blob).unwrap();

        let refs = remote.list_refs(Some("refs/heads/")).unwrap();
        assert_eq!(refs, vec![(RefName::new("refs/heads/main").unwrap(), blob)]);
    }

    #[test]
    fn head_branch_follows_the_symbolic_ref() {
        let dir = tempfile::tempdir().unwrap();
        init_bare(dir.path());
        let remote = RemoteRepo::open(dir.path()).unwrap();

        assert_eq!(remote.head_branch().unwrap(), Some(RefName::new("refs/heads/main").unwrap()));
    }

    #[test]
    fn update_ref_creates_then_compare_and_swaps() {
        let dir = tempfile::tempdir().unwrap();
        init_bare(dir.path());
        let remote = RemoteRepo::open(dir.path()).unwrap();

        let blob_a = remote.odb().write(&Object::Blob(Blob::new(b"a\n".to_vec()))).unwrap();
        let blob_b = remote.odb().write(&Object::Blob(Blob::new(b"b\n".to_vec()))).unwrap();
        let main = RefName::new("refs/heads/main").unwrap();

        remote.update_ref(&main, None, blob_a, "push").unwrap();
        assert_eq!(remote.resolve(&main).unwrap(), Some(blob_a));

        remote.update_ref(&main, Some(blob_a), blob_b, "push").unwrap();
        assert_eq!(remote.resolve(&main).unwrap(), Some(blob_b));
    }
}
