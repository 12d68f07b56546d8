//! Combined status: HEAD-vs-index (staged changes) and index-vs-worktree
//! (unstaged changes plus untracked files).

use lit_diff::tree::diff_trees;
use lit_diff::DiffOptions;

use crate::worktree::{load_ignore_stack, worktree_status};
use crate::{RepoError, Repository, StatusEntry};

/// The full status report: what's staged, what's dirty in the working
/// tree, and what's untracked.
#[derive(Debug, Clone, Default)]
pub struct Status {
    pub staged: Vec<StagedEntry>,
    pub unstaged: Vec<StatusEntry>,
}

#[derive(Debug, Clone)]
pub struct StagedEntry {
    pub path: bstr::BString,
    pub status: lit_diff::FileStatus,
}

impl Repository {
    /// Compute the repository's status: `HEAD` tree vs the index (staged),
    /// and the index vs the working tree (unstaged + untracked).
    pub fn status(&mut self) -> Result<Status, RepoError> {
        let head_oid = self.head_oid()?;
        let head_tree = match head_oid {
            Some(oid) => Some(self.commit_tree(&oid)?),
            None => None,
        };

        let index_tree = self.index()?.clone().write_tree(&self.odb)?;

        let diff = diff_trees(&self.odb, head_tree.as_ref(), Some(&index_tree), &DiffOptions::default())?;
        let staged = diff.files.into_iter().map(|f| StagedEntry { path: f.path().clone(), status: f.status }).collect();

        let unstaged = match self.work_tree().map(|p| p.to_path_buf()) {
            Some(work_tree) => {
                let ignore = load_ignore_stack(&self.lit_dir, &work_tree)?;
                worktree_status(self.index()?, &work_tree, &ignore)?
            }
            None => Vec::new(),
        };

        Ok(Status { staged, unstaged })
    }

    pub(crate) fn commit_tree(&self, oid: &lit_hash::ObjectId) -> Result<lit_hash::ObjectId, RepoError> {
        match self.odb.read(oid)? {
            Some(lit_object::Object::Commit(c)) => Ok(c.tree),
            Some(other) => Err(RepoError::Odb(lit_odb::OdbError::Corrupt {
                oid: *oid,
                reason: format!("expected commit, found {}", other.object_type()),
            })),
            None => Err(RepoError::Odb(lit_odb::OdbError::NotFound(*oid))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_object::{Blob, Object};

    #[test]
    fn status_reports_staged_addition() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();

        let blob = repo.odb().write(&Object::Blob(Blob::new(b"hi\n".to_vec()))).unwrap();
        repo.index_mut().unwrap().add(lit_index::IndexEntry {
            path: "a.txt".into(),
            oid: blob,
            mode: lit_object::FileMode::Regular,
            stage: lit_index::Stage::Normal,
            stat: Default::default(),
            flags: Default::default(),
        });

        let status = repo.status().unwrap();
        assert_eq!(status.staged.len(), 1);
        assert_eq!(status.staged[0].status, lit_diff::FileStatus::Added);
    }

    #[test]
    fn status_reports_untracked_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("new.txt"), b"new\n").unwrap();

        let status = repo.status().unwrap();
        assert!(status.unstaged.iter().any(|e| e.path == "new.txt"));
    }
}
