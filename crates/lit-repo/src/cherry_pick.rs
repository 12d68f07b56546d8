//! Cherry-picking a single commit onto `HEAD`.

use bstr::BString;
use lit_hash::ObjectId;
use lit_merge::conflict::{record_conflict_in_index, write_conflict_markers};
use lit_merge::MergeOptions;
use crate::commit::CommitOptions;
use crate::worktree::checkout_index;
use crate::{RepoError, Repository};

#[derive(Debug)]
pub enum CherryPickOutcome {
    Applied(ObjectId),
    Conflicted(Vec<BString>),
}

impl Repository {
    /// Apply the changes introduced by `commit_oid` on top of the current
    /// `HEAD`, recording a new commit with the original's message.
    pub fn cherry_pick(&mut self, commit_oid: ObjectId, options: &MergeOptions) -> Result<CherryPickOutcome, RepoError> {
        let onto = self.head_oid()?.ok_or(RepoError::UnbornBranch("HEAD".to_string()))?;
        let result = lit_merge::cherry_pick(&self.odb, &onto, &commit_oid, options)?;

        if result.merge.is_clean {
            let tree = result.merge.tree.expect("clean cherry-pick always has a tree");
            let mut index = lit_index::Index::new();
            index.read_tree(&tree, &self.odb)?;
            self.set_index(index);

            if let Some(work_tree) = self.work_tree().map(|p| p.to_path_buf()) {
                let snapshot = self.index()?.clone();
                checkout_index(&self.odb, &snapshot, &work_tree)?;
            }
            self.write_index()?;

            let original = self.read_commit(&commit_oid)?;
            let oid = self.commit(
                result.message,
                CommitOptions { author: Some(original.author), committer: None, extra_parents: Vec::new() },
            )?;
            Ok(CherryPickOutcome::Applied(oid))
        } else {
            std::fs::write(self.state_path("CHERRY_PICK_HEAD"), format!("{}\n", commit_oid.to_hex()))?;

            let index = self.index_mut()?;
            let mut paths = Vec::new();
            for conflict in &result.merge.conflicts {
                record_conflict_in_index(index, conflict);
                paths.push(conflict.path.clone());
            }
            self.write_index()?;

            if let Some(work_tree) = self.work_tree().map(|p| p.to_path_buf()) {
                for conflict in &result.merge.conflicts {
                    let content = self.render_conflict(conflict, "CHERRY_PICK_HEAD")?;
                    write_conflict_markers(&work_tree, conflict.path.as_ref(), &content)?;
                }
            }

            Ok(CherryPickOutcome::Conflicted(paths))
        }
    }
}
