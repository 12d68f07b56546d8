pub(crate) mod loose;
pub(crate) mod transaction;

use std::path::{Path, PathBuf};

use lit_hash::ObjectId;
use lit_utils::date::Signature;

use loose::LooseRefs;

use crate::error::RefError;
use crate::name::RefName;
use crate::reflog::{self, ReflogEntry};
use crate::store::{RefStore, RefTransaction};
use crate::Reference;

/// Maximum depth for following symbolic ref chains.
const MAX_SYMREF_DEPTH: usize = 10;

/// Files-backend ref store: every ref is a loose file under `.lit/refs/`
/// (or a special ref at the repo-dir root, like `.lit/HEAD`). There is no
/// packed-refs equivalent — refs always resolve straight from the file
/// system.
#[derive(Debug)]
pub struct FilesRefStore {
    lit_dir: PathBuf,
    committer: Option<Signature>,
}

impl FilesRefStore {
    pub fn new(lit_dir: impl AsRef<Path>) -> Self {
        Self {
            lit_dir: lit_dir.as_ref().to_path_buf(),
            committer: None,
        }
    }

    /// Set the committer identity used for reflog entries.
    pub fn set_committer(&mut self, sig: Signature) {
        self.committer = Some(sig);
    }

    pub fn lit_dir(&self) -> &Path {
        &self.lit_dir
    }

    fn loose(&self) -> LooseRefs<'_> {
        LooseRefs::new(&self.lit_dir)
    }

    /// Write a single ref directly (non-transactional).
    pub fn write_ref(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
        self.loose().write(name, oid)
    }

    /// Write a symbolic ref directly (non-transactional).
    pub fn write_symbolic_ref(&self, name: &RefName, target: &RefName) -> Result<(), RefError> {
        self.loose().write_symbolic(name, target)
    }

    /// Delete a ref directly (non-transactional).
    pub fn delete_ref(&self, name: &RefName) -> Result<(), RefError> {
        self.loose().delete(name)
    }

    /// Commit a transaction atomically.
    pub fn commit_transaction(&self, transaction: RefTransaction) -> Result<(), RefError> {
        transaction::commit_transaction(&self.lit_dir, transaction, self.committer.as_ref())
    }
}

impl RefStore for FilesRefStore {
    fn resolve(&self, name: &RefName) -> Result<Option<Reference>, RefError> {
        self.loose().read(name)
    }

    fn resolve_to_oid(&self, name: &RefName) -> Result<Option<ObjectId>, RefError> {
        let loose = self.loose();
        let mut current = name.clone();

        for _ in 0..=MAX_SYMREF_DEPTH {
            match loose.read(&current)? {
                Some(Reference::Direct { target, .. }) => return Ok(Some(target)),
                Some(Reference::Symbolic { target, .. }) => current = target,
                None => return Ok(None),
            }
        }

        Err(RefError::SymrefLoop(name.to_string()))
    }

    fn iter(&self, prefix: Option<&str>) -> Result<Box<dyn Iterator<Item = Result<Reference, RefError>> + '_>, RefError> {
        let loose = self.loose();
        let mut refs: Vec<Result<Reference, RefError>> = loose
            .enumerate(prefix)?
            .into_iter()
            .filter_map(|(name, _)| loose.read(&name).transpose())
            .collect();

        refs.sort_by_cached_key(|r| match r {
            Ok(r) => r.name().clone(),
            Err(_) => RefName::new_unchecked(""),
        });

        Ok(Box::new(refs.into_iter()))
    }

    fn reflog(&self, name: &RefName) -> Result<Vec<ReflogEntry>, RefError> {
        reflog::read_reflog(&self.lit_dir, name)
    }

    fn append_reflog(&self, name: &RefName, entry: &ReflogEntry) -> Result<(), RefError> {
        reflog::append_reflog_entry(&self.lit_dir, name, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bstr::BString;
    use lit_utils::date::LitDate;

    fn test_store(dir: &Path) -> FilesRefStore {
        let mut store = FilesRefStore::new(dir);
        store.set_committer(Signature {
            name: BString::from("Test User"),
            email: BString::from("test@example.com"),
            date: LitDate::new(1234567890, 0),
        });
        store
    }

    #[test]
    fn resolve_direct_ref() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        store.write_ref(&name, &oid).unwrap();

        assert_eq!(store.resolve_to_oid(&name).unwrap().unwrap(), oid);
    }

    #[test]
    fn resolve_symbolic_ref_chain() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let main_name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        store.write_ref(&main_name, &oid).unwrap();

        let head = RefName::new("HEAD").unwrap();
        store.write_symbolic_ref(&head, &main_name).unwrap();

        assert_eq!(store.resolve_to_oid(&head).unwrap().unwrap(), oid);
    }

    #[test]
    fn resolve_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let name = RefName::new("refs/heads/nonexistent").unwrap();
        assert!(store.resolve_to_oid(&name).unwrap().is_none());
    }

    #[test]
    fn resolve_symref_loop_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let a = RefName::new("refs/heads/a").unwrap();
        let b = RefName::new("refs/heads/b").unwrap();
        store.write_symbolic_ref(&a, &b).unwrap();
        store.write_symbolic_ref(&b, &a).unwrap();

        assert!(matches!(store.resolve_to_oid(&a), Err(RefError::SymrefLoop(_))));
    }

    #[test]
    fn iterate_all_refs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        store.write_ref(&RefName::new("refs/heads/main").unwrap(), &oid).unwrap();
        store.write_ref(&RefName::new("refs/heads/feature").unwrap(), &oid).unwrap();
        store.write_ref(&RefName::new("refs/tags/v1.0").unwrap(), &oid).unwrap();

        let refs: Vec<_> = store.iter(None).unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].name().as_str(), "refs/heads/feature");
        assert_eq!(refs[1].name().as_str(), "refs/heads/main");
        assert_eq!(refs[2].name().as_str(), "refs/tags/v1.0");
    }

    #[test]
    fn iterate_with_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        store.write_ref(&RefName::new("refs/heads/main").unwrap(), &oid).unwrap();
        store.write_ref(&RefName::new("refs/tags/v1.0").unwrap(), &oid).unwrap();

        let refs: Vec<_> = store.iter(Some("refs/heads/")).unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name().as_str(), "refs/heads/main");
    }

    #[test]
    fn transaction_with_reflog() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        let mut tx = RefTransaction::new();
        tx.create(name.clone(), oid, "branch: Created from HEAD");
        store.commit_transaction(tx).unwrap();

        let entries = store.reflog(&name).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].old_oid.is_null());
        assert_eq!(entries[0].new_oid, oid);
    }

    #[test]
    fn dangling_symref() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let head = RefName::new("HEAD").unwrap();
        let target = RefName::new("refs/heads/main").unwrap();
        store.write_symbolic_ref(&head, &target).unwrap();

        let reference = store.resolve(&head).unwrap().unwrap();
        assert!(reference.is_symbolic());
        assert!(store.resolve_to_oid(&head).unwrap().is_none());
    }

    #[test]
    fn delete_ref_directly() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        store.write_ref(&name, &oid).unwrap();

        store.delete_ref(&name).unwrap();
        assert!(store.resolve(&name).unwrap().is_none());
    }
}
