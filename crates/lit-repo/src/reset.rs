//! `reset --soft` / `--mixed` / `--hard`.

use lit_hash::ObjectId;
use lit_ref::{RefStore, RefTransaction};

use crate::worktree::{checkout_index, remove_stale_files};
use crate::{head_ref, RepoError, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Move the branch ref only; index and working tree untouched.
    Soft,
    /// Move the branch ref and reset the index to match; working tree untouched.
    Mixed,
    /// Move the branch ref, reset the index, and overwrite the working tree.
    Hard,
}

impl Repository {
    /// Reset the current branch to `target`, per `mode`.
    pub fn reset(&mut self, target: ObjectId, mode: ResetMode) -> Result<(), RepoError> {
        let branch = head_ref()?;
        let resolved = self.refs.resolve(&branch)?;
        let mut txn = RefTransaction::new();
        match resolved {
            Some(lit_ref::Reference::Symbolic { target: branch_ref, .. }) => {
                match self.refs.resolve_to_oid(&branch_ref)? {
                    Some(old) => txn.update(branch_ref, old, target, "reset"),
                    None => txn.create(branch_ref, target, "reset"),
                }
                self.refs.commit_transaction(txn)?;
            }
            Some(lit_ref::Reference::Direct { .. }) => {
                self.refs.write_ref(&branch, &target)?;
            }
            None => return Err(RepoError::UnbornBranch("HEAD".to_string())),
        }

        if mode == ResetMode::Soft {
            return Ok(());
        }

        let tree = self.commit_tree(&target)?;
        let old_index = self.index()?.clone();
        let mut new_index = lit_index::Index::new();
        new_index.read_tree(&tree, &self.odb)?;

        if mode == ResetMode::Hard {
            if let Some(work_tree) = self.work_tree().map(|p| p.to_path_buf()) {
                remove_stale_files(&old_index, &new_index, &work_tree)?;
                checkout_index(&self.odb, &new_index, &work_tree)?;
            }
        }

        self.set_index(new_index);
        self.write_index()?;
        Ok(())
    }
}
