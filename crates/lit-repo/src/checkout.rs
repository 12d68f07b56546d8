//! Switching branches, detaching `HEAD`, and restoring individual paths.

use bstr::{BStr, ByteSlice};
use lit_hash::ObjectId;
use lit_index::{Index, Stage};
use lit_ref::{RefName, RefStore};

use crate::worktree::{checkout_index, remove_stale_files};
use crate::{head_ref, RepoError, Repository};

impl Repository {
    /// Switch `HEAD` to branch `name`, updating the index and working tree
    /// to match its tip. Refuses when the working tree has modifications
    /// that the switch would overwrite, unless `force`.
    pub fn switch_branch(&mut self, name: &str, force: bool) -> Result<(), RepoError> {
        let target = RefName::new(format!("refs/heads/{name}"))?;
        let oid = self.refs.resolve_to_oid(&target)?.ok_or_else(|| RepoError::BranchNotFound(name.to_string()))?;

        if !force {
            self.require_clean_worktree()?;
        }

        self.checkout_tree_and_index(oid)?;
        self.refs.write_symbolic_ref(&head_ref()?, &target)?;
        Ok(())
    }

    /// Detach `HEAD` at `oid`, updating the index and working tree.
    pub fn checkout_detached(&mut self, oid: ObjectId, force: bool) -> Result<(), RepoError> {
        if !force {
            self.require_clean_worktree()?;
        }
        self.checkout_tree_and_index(oid)?;
        self.refs.write_ref(&head_ref()?, &oid)?;
        Ok(())
    }

    /// Restore individual paths in the working tree (and index, if
    /// `update_index`) from `source` (defaults to `HEAD` when `None`).
    pub fn checkout_paths(&mut self, paths: &[&BStr], source: Option<ObjectId>, update_index: bool) -> Result<(), RepoError> {
        let work_tree = self.require_work_tree()?.to_path_buf();
        let source_index = match source {
            Some(oid) => {
                let tree = self.commit_tree(&oid)?;
                let mut idx = Index::new();
                idx.read_tree(&tree, &self.odb)?;
                idx
            }
            None => {
                let head = self.head_oid()?.ok_or(RepoError::UnbornBranch("HEAD".to_string()))?;
                let tree = self.commit_tree(&head)?;
                let mut idx = Index::new();
                idx.read_tree(&tree, &self.odb)?;
                idx
            }
        };

        let mut restored = Index::new();
        for path in paths {
            match source_index.get(path, Stage::Normal) {
                Some(entry) => restored.add(entry.clone()),
                None => return Err(RepoError::PathspecNotFound(path.to_str_lossy().into_owned())),
            }
        }
        checkout_index(&self.odb, &restored, &work_tree)?;

        if update_index {
            let index = self.index_mut()?;
            for entry in restored.iter() {
                index.add(entry.clone());
            }
            self.write_index()?;
        }
        Ok(())
    }

    fn checkout_tree_and_index(&mut self, oid: ObjectId) -> Result<(), RepoError> {
        let tree = self.commit_tree(&oid)?;
        let old_index = self.index()?.clone();
        let mut new_index = Index::new();
        new_index.read_tree(&tree, &self.odb)?;

        if let Some(work_tree) = self.work_tree().map(|p| p.to_path_buf()) {
            remove_stale_files(&old_index, &new_index, &work_tree)?;
            checkout_index(&self.odb, &new_index, &work_tree)?;
        }

        self.set_index(new_index);
        self.write_index()?;
        Ok(())
    }

    fn require_clean_worktree(&mut self) -> Result<(), RepoError> {
        let Some(work_tree) = self.work_tree().map(|p| p.to_path_buf()) else { return Ok(()) };
        let ignore = crate::worktree::load_ignore_stack(self.lit_dir(), &work_tree)?;
        let dirty: Vec<_> = crate::worktree::worktree_status(self.index()?, &work_tree, &ignore)?
            .into_iter()
            .filter(|e| e.status != crate::WorktreeStatus::Untracked)
            .map(|e| e.path)
            .collect();
        if !dirty.is_empty() {
            return Err(RepoError::Dirty(dirty));
        }
        Ok(())
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
    fn switch_branch_updates_head_and_worktree() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"v1\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        let base = repo.commit("base\n", commit_opts()).unwrap();

        repo.branch_create("feature", base).unwrap();
        std::fs::write(dir.path().join("b.txt"), b"v2\n").unwrap();
        repo.stage_file("b.txt").unwrap();
        repo.commit("on main\n", commit_opts()).unwrap();

        repo.switch_branch("feature", false).unwrap();
        assert!(!dir.path().join("b.txt").exists());
        assert_eq!(repo.current_branch().unwrap().unwrap().short_name(), "feature");
    }

    #[test]
    fn switch_branch_refuses_with_dirty_worktree() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"v1\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        let base = repo.commit("base\n", commit_opts()).unwrap();
        repo.branch_create("feature", base).unwrap();

        std::fs::write(dir.path().join("a.txt"), b"dirty\n").unwrap();
        let err = repo.switch_branch("feature", false).unwrap_err();
        assert!(matches!(err, RepoError::Dirty(_)));
    }
}
