//! Rebase sequencing: plan a linear replay of commits onto a new base, then
//! drive cherry-picks one at a time, exposing enough state for
//! `--continue`/`--abort` to work.
//!
//! No ref updates, no index or working-tree writes, no interactive actions
//! beyond plain replay: `lit-repo` owns `REBASE_STATE/` persistence and
//! drives each step by calling [`cherry_pick::cherry_pick`](crate::cherry_pick::cherry_pick)
//! with the commit this sequencer hands back.

use lit_hash::ObjectId;
use lit_odb::ObjectDatabase;
use lit_revwalk::{merge_base_one, RevWalk, SortOrder, WalkOptions};

use crate::MergeError;

/// A planned rebase: commits unique to `head` (relative to `upstream`),
/// queued oldest-first for replay onto `upstream`.
#[derive(Debug, Clone)]
pub struct Sequencer {
    onto: ObjectId,
    original_head: ObjectId,
    todo: Vec<ObjectId>,
    current: usize,
}

impl Sequencer {
    /// Plan a rebase of `head` onto `upstream`.
    pub fn plan(odb: &ObjectDatabase, head: &ObjectId, upstream: &ObjectId) -> Result<Self, MergeError> {
        if merge_base_one(odb, head, upstream)?.is_none() {
            return Err(MergeError::NoMergeBase);
        }

        let mut walk = RevWalk::new(odb);
        walk.set_options(WalkOptions { sort: SortOrder::Reverse, ..Default::default() });
        walk.push(*head)?;
        walk.hide(*upstream)?;

        let todo = walk.collect::<Result<Vec<ObjectId>, _>>()?;

        Ok(Self { onto: *upstream, original_head: *head, todo, current: 0 })
    }

    /// Rebuild a sequencer from persisted state (`lit-repo`'s
    /// `REBASE_STATE/`): `remaining_todo` is whatever commits have not yet
    /// been replayed.
    pub fn resume(onto: ObjectId, original_head: ObjectId, remaining_todo: Vec<ObjectId>) -> Self {
        Self { onto, original_head, todo: remaining_todo, current: 0 }
    }

    pub fn onto(&self) -> ObjectId {
        self.onto
    }

    /// The branch tip the rebase started from, for `--abort`.
    pub fn original_head(&self) -> ObjectId {
        self.original_head
    }

    pub fn todo(&self) -> &[ObjectId] {
        &self.todo
    }

    /// The commit to replay next, or `None` once the sequence is complete.
    pub fn current(&self) -> Option<ObjectId> {
        self.todo.get(self.current).copied()
    }

    /// Advance past the current commit once it has been successfully
    /// replayed (cleanly, or resolved after a conflict).
    pub fn advance(&mut self) {
        if self.current < self.todo.len() {
            self.current += 1;
        }
    }

    /// Advance past the current commit, retargeting subsequent cherry-picks
    /// onto the commit just created for it.
    pub fn advance_onto(&mut self, new_onto: ObjectId) {
        self.onto = new_onto;
        self.advance();
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.todo.len()
    }

    /// Commits not yet replayed, current one included.
    pub fn remaining(&self) -> &[ObjectId] {
        &self.todo[self.current.min(self.todo.len())..]
    }

    /// `(completed, total)` progress counters.
    pub fn progress(&self) -> (usize, usize) {
        (self.current.min(self.todo.len()), self.todo.len())
    }
}
