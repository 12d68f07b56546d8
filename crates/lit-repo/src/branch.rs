//! Branch creation, deletion, renaming, and listing.
//!
//! Branches are just refs under `refs/heads/`; this module owns the
//! name-to-ref-name mapping and the guard against deleting/renaming the
//! currently checked-out branch.

use lit_hash::ObjectId;
use lit_ref::{RefName, RefStore, RefTransaction};
use lit_revwalk::is_ancestor;

use crate::{head_ref, RepoError, Repository};

/// One branch as reported by [`Repository::branch_list`].
#[derive(Debug, Clone)]
pub struct BranchInfo {
    pub name: String,
    pub oid: ObjectId,
    pub is_current: bool,
}

fn branch_ref(name: &str) -> Result<RefName, RepoError> {
    Ok(RefName::new(format!("refs/heads/{name}"))?)
}

impl Repository {
    /// Create a new branch named `name` pointing at `start`. Errors if the
    /// branch already exists.
    pub fn branch_create(&mut self, name: &str, start: ObjectId) -> Result<(), RepoError> {
        let target = branch_ref(name)?;
        if self.refs.resolve_to_oid(&target)?.is_some() {
            return Err(RepoError::BranchExists(name.to_string()));
        }
        let mut txn = RefTransaction::new();
        txn.create(target, start, format!("branch: created from {}", start.to_hex()));
        self.refs.commit_transaction(txn)?;
        tracing::debug!(branch = name, %start, "created branch");
        Ok(())
    }

    /// Delete a branch, refusing if it is the currently checked-out branch
    /// or (without `force`) if it is not merged into `HEAD`.
    pub fn branch_delete(&mut self, name: &str, force: bool) -> Result<ObjectId, RepoError> {
        let target = branch_ref(name)?;
        let oid = self.refs.resolve_to_oid(&target)?.ok_or_else(|| RepoError::BranchNotFound(name.to_string()))?;

        if let Some(current) = self.current_branch()? {
            if current == target {
                return Err(RepoError::BranchCheckedOut(name.to_string()));
            }
        }

        if !force {
            if let Some(head) = self.head_oid()? {
                if !is_ancestor(&self.odb, &oid, &head)? {
                    return Err(RepoError::NonFastForward(format!(
                        "branch '{name}' is not fully merged"
                    )));
                }
            }
        }

        let mut txn = RefTransaction::new();
        txn.delete(target, oid, format!("branch: deleted {name}"));
        self.refs.commit_transaction(txn)?;
        Ok(oid)
    }

    /// Rename a branch, updating `HEAD` if it was the current branch.
    pub fn branch_rename(&mut self, old: &str, new: &str) -> Result<(), RepoError> {
        let old_ref = branch_ref(old)?;
        let new_ref = branch_ref(new)?;
        let oid = self.refs.resolve_to_oid(&old_ref)?.ok_or_else(|| RepoError::BranchNotFound(old.to_string()))?;
        if self.refs.resolve_to_oid(&new_ref)?.is_some() {
            return Err(RepoError::BranchExists(new.to_string()));
        }

        let was_current = self.current_branch()?.is_some_and(|c| c == old_ref);

        let mut txn = RefTransaction::new();
        txn.create(new_ref.clone(), oid, format!("branch: renamed {old} to {new}"));
        txn.delete(old_ref, oid, format!("branch: renamed {old} to {new}"));
        self.refs.commit_transaction(txn)?;

        if was_current {
            self.refs.write_symbolic_ref(&head_ref()?, &new_ref)?;
        }
        Ok(())
    }

    /// List local branches, sorted by name.
    pub fn branch_list(&self) -> Result<Vec<BranchInfo>, RepoError> {
        let current = self.current_branch()?;
        let mut out = Vec::new();
        for reference in self.refs.iter(Some("refs/heads/"))? {
            let reference = reference?;
            let Some(oid) = reference.target_oid() else { continue };
            let is_current = current.as_ref() == Some(reference.name());
            out.push(BranchInfo {
                name: reference.name().short_name().to_string(),
                oid,
                is_current,
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::CommitOptions;
    use lit_utils::date::{LitDate, Signature};

    fn sig() -> Signature {
        Signature::new("A", "a@example.com", LitDate::new(1000, 0))
    }

    fn commit_opts() -> CommitOptions {
        CommitOptions { author: Some(sig()), committer: Some(sig()), extra_parents: Vec::new() }
    }

    #[test]
    fn branch_create_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hi\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        let oid = repo.commit("initial\n", commit_opts()).unwrap();

        repo.branch_create("feature", oid).unwrap();
        let branches = repo.branch_list().unwrap();
        assert!(branches.iter().any(|b| b.name == "feature" && b.oid == oid));
        assert!(!branches.iter().find(|b| b.name == "feature").unwrap().is_current);
    }

    #[test]
    fn branch_delete_refuses_current_branch() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hi\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        repo.commit("initial\n", commit_opts()).unwrap();

        let err = repo.branch_delete("main", false).unwrap_err();
        assert!(matches!(err, RepoError::BranchCheckedOut(_)));
    }

    #[test]
    fn branch_rename_updates_head_symref() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hi\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        repo.commit("initial\n", commit_opts()).unwrap();

        let before = repo.current_branch().unwrap().unwrap();
        repo.branch_rename(before.short_name().to_string().as_str(), "renamed").unwrap();
        let after = repo.current_branch().unwrap().unwrap();
        assert_eq!(after.short_name(), "renamed");
    }
}
