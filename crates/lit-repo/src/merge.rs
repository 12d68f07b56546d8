//! Merging another commit into the current branch.

use bstr::BString;
use lit_hash::ObjectId;
use lit_merge::conflict::{record_conflict_in_index, write_conflict_markers};
use lit_merge::{merge_trees, MergeOptions};
use lit_object::Object;
use lit_ref::RefStore;
use lit_revwalk::{is_ancestor, merge_base_one};

use crate::commit::CommitOptions;
use crate::worktree::checkout_index;
use crate::{RepoError, Repository};

/// Outcome of a merge attempt.
#[derive(Debug)]
pub enum MergeOutcome {
    /// `theirs` was already reachable from `HEAD`; nothing to do.
    AlreadyUpToDate,
    /// `HEAD` was an ancestor of `theirs`; the branch ref was fast-forwarded.
    FastForward(ObjectId),
    /// A merge commit was created cleanly.
    Merged(ObjectId),
    /// The merge left conflicts recorded in the index and `MERGE_HEAD` set;
    /// the caller must resolve them and commit.
    Conflicted(Vec<BString>),
}

impl Repository {
    /// Merge `theirs` into the current branch.
    pub fn merge(&mut self, theirs: ObjectId, options: &MergeOptions, message: impl Into<BString>) -> Result<MergeOutcome, RepoError> {
        let ours = self.head_oid()?.ok_or(RepoError::UnbornBranch("HEAD".to_string()))?;

        if is_ancestor(&self.odb, &theirs, &ours)? {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        if is_ancestor(&self.odb, &ours, &theirs)? {
            return self.fast_forward(theirs).map(MergeOutcome::FastForward);
        }

        let base = merge_base_one(&self.odb, &ours, &theirs)?;
        let ours_tree = self.commit_tree(&ours)?;
        let theirs_tree = self.commit_tree(&theirs)?;

        let result = merge_trees(&self.odb, base.as_ref(), &ours_tree, &theirs_tree, options)?;

        if result.is_clean {
            let tree = result.tree.expect("clean merge always has a tree");
            let mut index = lit_index::Index::new();
            index.read_tree(&tree, &self.odb)?;
            self.set_index(index);

            if let Some(work_tree) = self.work_tree().map(|p| p.to_path_buf()) {
                let snapshot = self.index()?.clone();
                checkout_index(&self.odb, &snapshot, &work_tree)?;
            }
            self.write_index()?;

            let oid = self.commit(message, CommitOptions { author: None, committer: None, extra_parents: vec![theirs] })?;
            Ok(MergeOutcome::Merged(oid))
        } else {
            std::fs::write(self.state_path("MERGE_HEAD"), format!("{}\n", theirs.to_hex()))?;
            std::fs::write(self.state_path("MERGE_MSG"), message.into().to_vec())?;

            let index = self.index_mut()?;
            let mut paths = Vec::new();
            for conflict in &result.conflicts {
                record_conflict_in_index(index, conflict);
                paths.push(conflict.path.clone());
            }
            self.write_index()?;

            if let Some(work_tree) = self.work_tree().map(|p| p.to_path_buf()) {
                for conflict in &result.conflicts {
                    let content = self.render_conflict(conflict, "MERGE_HEAD")?;
                    write_conflict_markers(&work_tree, conflict.path.as_ref(), &content)?;
                }
            }

            Ok(MergeOutcome::Conflicted(paths))
        }
    }

    fn fast_forward(&mut self, theirs: ObjectId) -> Result<ObjectId, RepoError> {
        let branch = crate::head_ref()?;
        let target = match self.refs.resolve(&branch)? {
            Some(lit_ref::Reference::Symbolic { target, .. }) => target,
            _ => return Err(RepoError::DetachedHead),
        };
        let old = self.refs.resolve_to_oid(&target)?;
        let mut txn = lit_ref::RefTransaction::new();
        match old {
            Some(old) => txn.update(target, old, theirs, "merge: fast-forward"),
            None => txn.create(target, theirs, "merge: fast-forward"),
        }
        self.refs.commit_transaction(txn)?;

        let tree = self.commit_tree(&theirs)?;
        let mut index = lit_index::Index::new();
        index.read_tree(&tree, &self.odb)?;
        self.set_index(index);
        if let Some(work_tree) = self.work_tree().map(|p| p.to_path_buf()) {
            let snapshot = self.index()?.clone();
            checkout_index(&self.odb, &snapshot, &work_tree)?;
        }
        self.write_index()?;
        Ok(theirs)
    }

    /// Re-render a tree-merge conflict's marker content by reading its three
    /// blobs back from the object database (conflicts only carry oids).
    pub(crate) fn render_conflict(&self, conflict: &lit_merge::ConflictEntry, theirs_label: &str) -> Result<Vec<u8>, RepoError> {
        let read_side = |side: &Option<lit_merge::ConflictSide>| -> Result<Vec<u8>, RepoError> {
            match side {
                Some(s) => match self.odb.read(&s.oid)? {
                    Some(Object::Blob(b)) => Ok(b.serialize_content().to_vec()),
                    _ => Ok(Vec::new()),
                },
                None => Ok(Vec::new()),
            }
        };
        let base = read_side(&conflict.base)?;
        let ours = read_side(&conflict.ours)?;
        let theirs = read_side(&conflict.theirs)?;
        let labels = lit_merge::content::MergeLabels { ours: "HEAD", theirs: theirs_label };
        let result = lit_merge::content::merge_content(&base, &ours, &theirs, None, &labels);
        Ok(result.content().to_vec())
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

    fn opts() -> CommitOptions {
        CommitOptions { author: Some(sig()), committer: Some(sig()), extra_parents: Vec::new() }
    }

    #[test]
    fn fast_forward_merge_moves_branch() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"v1\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        let first = repo.commit("first\n", opts()).unwrap();

        std::fs::write(dir.path().join("b.txt"), b"v2\n").unwrap();
        repo.stage_file("b.txt").unwrap();
        let second = repo.commit("second\n", opts()).unwrap();

        repo.reset(first, crate::reset::ResetMode::Hard).unwrap();
        let outcome = repo.merge(second, &MergeOptions::default(), "merge\n").unwrap();
        assert!(matches!(outcome, MergeOutcome::FastForward(oid) if oid == second));
    }

    #[test]
    fn already_up_to_date_when_merging_an_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"v1\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        let first = repo.commit("first\n", opts()).unwrap();

        let outcome = repo.merge(first, &MergeOptions::default(), "merge\n").unwrap();
        assert!(matches!(outcome, MergeOutcome::AlreadyUpToDate));
    }
}
