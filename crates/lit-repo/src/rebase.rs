//! Replaying the current branch's commits onto another commit, driven by a
//! [`lit_merge::Sequencer`]. State survives across conflict stops under
//! `.lit/REBASE_STATE/`.

use bstr::BString;
use lit_hash::ObjectId;
use lit_merge::conflict::{record_conflict_in_index, write_conflict_markers};
use lit_merge::{cherry_pick, MergeOptions, Sequencer};

use crate::commit::CommitOptions;
use crate::worktree::checkout_index;
use crate::{RepoError, Repository};

#[derive(Debug)]
pub enum RebaseStepOutcome {
    Applied(ObjectId),
    Conflicted(Vec<BString>),
    Complete,
}

impl Repository {
    /// Begin rebasing `HEAD` onto `upstream`, persisting sequencer state and
    /// replaying commits until completion or the first conflict.
    pub fn rebase_start(&mut self, upstream: ObjectId) -> Result<RebaseStepOutcome, RepoError> {
        let head = self.head_oid()?.ok_or(RepoError::UnbornBranch("HEAD".to_string()))?;
        let sequencer = Sequencer::plan(&self.odb, &head, &upstream)?;
        self.save_sequencer(&sequencer)?;
        self.rebase_continue()
    }

    /// Resume an in-progress rebase: replay commits until completion or the
    /// next conflict.
    pub fn rebase_continue(&mut self) -> Result<RebaseStepOutcome, RepoError> {
        let mut sequencer = self.load_sequencer()?;

        loop {
            let Some(next) = sequencer.current() else {
                self.clear_rebase_state()?;
                return Ok(RebaseStepOutcome::Complete);
            };

            let onto = sequencer.onto();
            let result = cherry_pick(&self.odb, &onto, &next, &MergeOptions::default())?;

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

                let original = match self.odb.read(&next)? {
                    Some(lit_object::Object::Commit(c)) => c,
                    _ => return Err(RepoError::Odb(lit_odb::OdbError::NotFound(next))),
                };
                let new_oid = self.commit(
                    result.message,
                    CommitOptions { author: Some(original.author), committer: None, extra_parents: Vec::new() },
                )?;
                sequencer.advance_onto(new_oid);
                self.save_sequencer(&sequencer)?;
            } else {
                self.save_sequencer(&sequencer)?;
                std::fs::write(self.state_path("REBASE_HEAD"), format!("{}\n", next.to_hex()))?;

                let index = self.index_mut()?;
                let mut paths = Vec::new();
                for conflict in &result.merge.conflicts {
                    record_conflict_in_index(index, conflict);
                    paths.push(conflict.path.clone());
                }
                self.write_index()?;

                if let Some(work_tree) = self.work_tree().map(|p| p.to_path_buf()) {
                    for conflict in &result.merge.conflicts {
                        let content = self.render_conflict(conflict, "REBASE_HEAD")?;
                        write_conflict_markers(&work_tree, conflict.path.as_ref(), &content)?;
                    }
                }

                return Ok(RebaseStepOutcome::Conflicted(paths));
            }
        }
    }

    /// Abort an in-progress rebase, restoring the branch to its pre-rebase
    /// state.
    pub fn rebase_abort(&mut self) -> Result<(), RepoError> {
        let sequencer = self.load_sequencer()?;
        self.reset(sequencer.original_head(), crate::reset::ResetMode::Hard)?;
        self.clear_rebase_state()
    }

    fn rebase_state_dir(&self) -> std::path::PathBuf {
        self.lit_dir().join("REBASE_STATE")
    }

    fn save_sequencer(&self, sequencer: &Sequencer) -> Result<(), RepoError> {
        let dir = self.rebase_state_dir();
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("onto"), format!("{}\n", sequencer.onto().to_hex()))?;
        std::fs::write(dir.join("original-head"), format!("{}\n", sequencer.original_head().to_hex()))?;
        let todo: Vec<String> = sequencer.remaining().iter().map(|oid| oid.to_hex()).collect();
        std::fs::write(dir.join("todo"), todo.join("\n"))?;
        Ok(())
    }

    fn load_sequencer(&self) -> Result<Sequencer, RepoError> {
        let dir = self.rebase_state_dir();
        let onto = ObjectId::from_hex(std::fs::read_to_string(dir.join("onto"))?.trim())?;
        let original_head = ObjectId::from_hex(std::fs::read_to_string(dir.join("original-head"))?.trim())?;
        let todo_content = std::fs::read_to_string(dir.join("todo"))?;
        let todo: Result<Vec<ObjectId>, _> = todo_content.lines().filter(|l| !l.is_empty()).map(ObjectId::from_hex).collect();
        Ok(Sequencer::resume(onto, original_head, todo?))
    }

    fn clear_rebase_state(&self) -> Result<(), RepoError> {
        let dir = self.rebase_state_dir();
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        let _ = std::fs::remove_file(self.state_path("REBASE_HEAD"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_utils::date::{LitDate, Signature};

    fn sig(name: &str) -> Signature {
        Signature::new(name, format!("{name}@example.com"), LitDate::new(1000, 0))
    }

    fn opts(name: &str) -> CommitOptions {
        CommitOptions { author: Some(sig(name)), committer: Some(sig(name)), extra_parents: Vec::new() }
    }

    #[test]
    fn rebase_replays_commits_cleanly_onto_new_base() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();

        std::fs::write(dir.path().join("base.txt"), b"base\n").unwrap();
        repo.stage_file("base.txt").unwrap();
        let base = repo.commit("base\n", opts("A")).unwrap();

        std::fs::write(dir.path().join("upstream.txt"), b"up\n").unwrap();
        repo.stage_file("upstream.txt").unwrap();
        let upstream = repo.commit("upstream\n", opts("A")).unwrap();

        repo.reset(base, crate::reset::ResetMode::Hard).unwrap();
        std::fs::write(dir.path().join("feature.txt"), b"feature\n").unwrap();
        repo.stage_file("feature.txt").unwrap();
        repo.commit("feature\n", opts("B")).unwrap();

        let outcome = repo.rebase_start(upstream).unwrap();
        assert!(matches!(outcome, RebaseStepOutcome::Complete));
        assert!(dir.path().join("upstream.txt").exists());
        assert!(dir.path().join("feature.txt").exists());
    }
}
