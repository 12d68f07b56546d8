//! Stash: save the working tree and index state aside on `refs/stash`,
//! restorable later via `apply`/`pop`.

use bstr::BString;
use lit_hash::ObjectId;
use lit_index::{Index, IndexEntry, Stage};
use lit_merge::MergeOptions;
use lit_object::{Blob, Commit, FileMode, Object};
use lit_ref::reflog::{delete_reflog_entry, ReflogEntry};
use lit_ref::{RefName, RefStore};

use crate::merge::MergeOutcome;
use crate::{RepoError, Repository};

pub struct StashEntry {
    pub index: usize,
    pub oid: ObjectId,
    pub message: BString,
}

fn stash_ref() -> Result<RefName, RepoError> {
    Ok(RefName::new("refs/stash")?)
}

impl Repository {
    /// Save the current index and working-tree modifications onto
    /// `refs/stash`, then reset both back to `HEAD`.
    pub fn stash_push(&mut self, message: Option<&str>) -> Result<ObjectId, RepoError> {
        let head_oid = self.head_oid()?.ok_or(RepoError::UnbornBranch("HEAD".to_string()))?;
        let work_tree = self.require_work_tree()?.to_path_buf();
        let branch = self.current_branch()?.map(|r| r.as_str().trim_start_matches("refs/heads/").to_string());
        let branch_label = branch.unwrap_or_else(|| "HEAD".to_string());

        let sig = self.committer_signature()?;
        let index_snapshot = self.index()?.clone();
        let index_tree = index_snapshot.write_tree(&self.odb)?;
        let index_commit = Commit {
            tree: index_tree,
            parents: vec![head_oid],
            author: sig.clone(),
            committer: sig.clone(),
            encoding: None,
            gpgsig: None,
            extra_headers: Vec::new(),
            message: format!("index on {branch_label}\n").into(),
        };
        let index_oid = self.odb.write(&Object::Commit(index_commit))?;

        let worktree_entries = self.index()?.iter().filter(|e| e.stage == Stage::Normal).cloned().collect::<Vec<_>>();
        let worktree_tree = self.build_worktree_tree(&worktree_entries, &work_tree)?;

        let stash_message: BString = match message {
            Some(m) => format!("On {branch_label}: {m}\n").into(),
            None => format!("WIP on {branch_label}\n").into(),
        };
        let stash_commit = Commit {
            tree: worktree_tree,
            parents: vec![head_oid, index_oid],
            author: sig.clone(),
            committer: sig.clone(),
            encoding: None,
            gpgsig: None,
            extra_headers: Vec::new(),
            message: stash_message.clone(),
        };
        let stash_oid = self.odb.write(&Object::Commit(stash_commit))?;

        let name = stash_ref()?;
        let old = self.refs.resolve_to_oid(&name)?;
        self.refs.write_ref(&name, &stash_oid)?;
        self.refs.append_reflog(
            &name,
            &ReflogEntry { old_oid: old.unwrap_or(ObjectId::NULL), new_oid: stash_oid, identity: sig, message: stash_message },
        )?;

        self.reset(head_oid, crate::reset::ResetMode::Hard)?;
        Ok(stash_oid)
    }

    /// List stash entries, most recent first.
    pub fn stash_list(&self) -> Result<Vec<StashEntry>, RepoError> {
        let name = stash_ref()?;
        let entries = self.refs.reflog(&name)?;
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| StashEntry { index: i, oid: e.new_oid, message: e.message })
            .collect())
    }

    /// Apply a stash entry's changes onto the current `HEAD`, leaving the
    /// stash entry in place.
    pub fn stash_apply(&mut self, index: usize) -> Result<MergeOutcome, RepoError> {
        let stash_oid = self.stash_oid_at(index)?;
        self.merge(stash_oid, &MergeOptions::default(), format!("apply stash {index}\n"))
    }

    /// Apply a stash entry, then remove it.
    pub fn stash_pop(&mut self, index: usize) -> Result<MergeOutcome, RepoError> {
        let outcome = self.stash_apply(index)?;
        self.stash_drop(index)?;
        Ok(outcome)
    }

    /// Remove a stash entry without applying it.
    pub fn stash_drop(&mut self, index: usize) -> Result<(), RepoError> {
        let name = stash_ref()?;
        delete_reflog_entry(self.lit_dir(), &name, index)?;
        match self.refs.reflog(&name)?.first() {
            Some(top) => self.refs.write_ref(&name, &top.new_oid)?,
            None => self.refs.delete_ref(&name)?,
        }
        Ok(())
    }

    fn stash_oid_at(&self, index: usize) -> Result<ObjectId, RepoError> {
        self.stash_list()?
            .into_iter()
            .find(|e| e.index == index)
            .map(|e| e.oid)
            .ok_or(RepoError::StashNotFound(index))
    }

    /// Build a tree reflecting the index with each stage-0 entry's oid
    /// replaced by the working tree's current content, where a file is
    /// actually present on disk.
    fn build_worktree_tree(&self, entries: &[IndexEntry], work_tree: &std::path::Path) -> Result<ObjectId, RepoError> {
        let mut tree_index = Index::new();
        for entry in entries {
            let disk_path = work_tree.join(entry.path.to_string());
            if disk_path.is_file() {
                let content = std::fs::read(&disk_path)?;
                let mode = file_mode(&disk_path)?;
                let oid = self.odb.write(&Object::Blob(Blob::new(content)))?;
                tree_index.add(IndexEntry { path: entry.path.clone(), oid, mode, stage: Stage::Normal, stat: Default::default(), flags: Default::default() });
            } else {
                tree_index.add(entry.clone());
            }
        }
        Ok(tree_index.write_tree(&self.odb)?)
    }
}

fn file_mode(path: &std::path::Path) -> Result<FileMode, RepoError> {
    let meta = std::fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        return Ok(FileMode::Symlink);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 != 0 {
            return Ok(FileMode::Executable);
        }
    }
    Ok(FileMode::Regular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_utils::date::{LitDate, Signature};

    fn sig() -> Signature {
        Signature::new("A", "a@example.com", LitDate::new(1000, 0))
    }

    #[test]
    fn stash_push_restores_head_state_and_records_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::env::set_var("LIT_COMMITTER_NAME", "A");
        std::env::set_var("LIT_COMMITTER_EMAIL", "a@example.com");

        std::fs::write(dir.path().join("a.txt"), b"v1\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        repo.commit(
            "base\n",
            crate::commit::CommitOptions { author: Some(sig()), committer: Some(sig()), extra_parents: Vec::new() },
        )
        .unwrap();

        std::fs::write(dir.path().join("a.txt"), b"v2\n").unwrap();
        repo.stage_file("a.txt").unwrap();

        repo.stash_push(Some("wip")).unwrap();

        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"v1\n");
        let entries = repo.stash_list().unwrap();
        assert_eq!(entries.len(), 1);

        std::env::remove_var("LIT_COMMITTER_NAME");
        std::env::remove_var("LIT_COMMITTER_EMAIL");
    }
}
