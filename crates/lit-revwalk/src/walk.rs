//! Core revision walk iterator.
//!
//! Operates purely on commit OIDs read from an [`lit_odb::ObjectDatabase`];
//! callers (`lit-repo`) resolve refs to starting OIDs before pushing them.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use lit_hash::ObjectId;
use lit_object::{Commit, Object};
use lit_odb::ObjectDatabase;

use crate::RevWalkError;

/// Sort order for commit traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// By committer date, newest first (default).
    #[default]
    Chronological,
    /// Topological: parents always appear after children.
    Topological,
    /// By author date, newest first.
    AuthorDate,
    /// Reverse chronological (oldest first).
    Reverse,
}

/// Options for revision walking.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub sort: SortOrder,
    pub first_parent_only: bool,
    pub max_count: Option<usize>,
    pub skip: Option<usize>,
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub author_pattern: Option<String>,
    pub committer_pattern: Option<String>,
    pub grep_pattern: Option<String>,
}

struct WalkEntry {
    oid: ObjectId,
    commit_date: i64,
    insertion_ctr: u64,
}

struct TopoState {
    indegree: HashMap<ObjectId, u32>,
    ready: VecDeque<ObjectId>,
    dates: HashMap<ObjectId, i64>,
}

/// Revision walk iterator over commits reachable from a set of starting
/// points, minus those reachable from a set of hidden points.
pub struct RevWalk<'a> {
    odb: &'a ObjectDatabase,
    queue: BinaryHeap<WalkEntry>,
    seen: HashSet<ObjectId>,
    hidden: HashSet<ObjectId>,
    sort: SortOrder,
    options: WalkOptions,
    insertion_ctr: u64,
    emitted: usize,
    skipped: usize,
    topo_state: Option<TopoState>,
    prepared: bool,
    reverse_buffer: Option<Vec<ObjectId>>,
}

impl<'a> RevWalk<'a> {
    pub fn new(odb: &'a ObjectDatabase) -> Self {
        Self {
            odb,
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
            hidden: HashSet::new(),
            sort: SortOrder::default(),
            options: WalkOptions::default(),
            insertion_ctr: 0,
            emitted: 0,
            skipped: 0,
            topo_state: None,
            prepared: false,
            reverse_buffer: None,
        }
    }

    /// Add a starting commit (a positive reference, e.g. a branch tip).
    pub fn push(&mut self, oid: ObjectId) -> Result<(), RevWalkError> {
        if self.seen.contains(&oid) {
            return Ok(());
        }
        let commit = self.read_commit(&oid)?;
        self.seen.insert(oid);
        self.enqueue(oid, commit.committer.date.timestamp, commit.author.date.timestamp);
        Ok(())
    }

    /// Exclude a commit and all its ancestors from the walk (`^A`).
    pub fn hide(&mut self, oid: ObjectId) -> Result<(), RevWalkError> {
        let mut stack = vec![oid];
        while let Some(current) = stack.pop() {
            if !self.hidden.insert(current) {
                continue;
            }
            if let Ok(commit) = self.read_commit(&current) {
                for parent in &commit.parents {
                    if !self.hidden.contains(parent) {
                        stack.push(*parent);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.options.sort = sort;
    }

    pub fn set_options(&mut self, options: WalkOptions) {
        self.sort = options.sort;
        self.options = options;
    }

    fn enqueue(&mut self, oid: ObjectId, commit_date: i64, author_date: i64) {
        let sort_date = match self.sort {
            SortOrder::AuthorDate => author_date,
            _ => commit_date,
        };
        self.queue.push(WalkEntry {
            oid,
            commit_date: sort_date,
            insertion_ctr: self.insertion_ctr,
        });
        self.insertion_ctr += 1;
    }

    fn read_commit(&self, oid: &ObjectId) -> Result<Commit, RevWalkError> {
        let obj = self
            .odb
            .read(oid)?
            .ok_or(RevWalkError::CommitNotFound(*oid))?;
        match obj {
            Object::Commit(c) => Ok(c),
            _ => Err(RevWalkError::NotACommit(*oid)),
        }
    }

    fn parents_of(&self, commit: &Commit) -> Vec<ObjectId> {
        if self.options.first_parent_only {
            commit.parents.first().copied().into_iter().collect()
        } else {
            commit.parents.clone()
        }
    }

    fn prepare_topo(&mut self) -> Result<(), RevWalkError> {
        if self.prepared {
            return Ok(());
        }
        self.prepared = true;

        let mut indegree: HashMap<ObjectId, u32> = HashMap::new();
        let mut dates: HashMap<ObjectId, i64> = HashMap::new();
        let mut bfs: VecDeque<ObjectId> = VecDeque::new();
        let mut visited: HashSet<ObjectId> = HashSet::new();
        let mut all_commits: Vec<ObjectId> = Vec::new();

        while let Some(entry) = self.queue.pop() {
            if visited.insert(entry.oid) {
                bfs.push_back(entry.oid);
            }
        }

        while let Some(oid) = bfs.pop_front() {
            if self.hidden.contains(&oid) {
                continue;
            }
            let commit = self.read_commit(&oid)?;
            dates.insert(oid, commit.committer.date.timestamp);
            let parents = self.parents_of(&commit);

            indegree.entry(oid).or_insert(0);
            for parent in &parents {
                if !self.hidden.contains(parent) {
                    *indegree.entry(*parent).or_insert(0) += 1;
                    if visited.insert(*parent) {
                        bfs.push_back(*parent);
                    }
                }
            }
            all_commits.push(oid);
        }

        let mut tips: Vec<ObjectId> = all_commits
            .iter()
            .filter(|oid| indegree.get(oid).copied().unwrap_or(0) == 0)
            .copied()
            .collect();
        tips.sort_by(|a, b| dates.get(b).copied().unwrap_or(0).cmp(&dates.get(a).copied().unwrap_or(0)));

        self.topo_state = Some(TopoState {
            indegree,
            ready: tips.into(),
            dates,
        });
        Ok(())
    }

    fn next_topo(&mut self) -> Result<Option<ObjectId>, RevWalkError> {
        if !self.prepared {
            self.prepare_topo()?;
        }

        let oid = match self.topo_state.as_mut() {
            Some(state) if !state.ready.is_empty() => state.ready.pop_front().unwrap(),
            _ => return Ok(None),
        };

        let commit = self.read_commit(&oid)?;
        let parents: Vec<ObjectId> = self
            .parents_of(&commit)
            .into_iter()
            .filter(|p| !self.hidden.contains(p))
            .collect();

        let state = self.topo_state.as_mut().unwrap();
        let mut newly_ready: Vec<(ObjectId, i64)> = Vec::new();
        for parent in &parents {
            if let Some(deg) = state.indegree.get_mut(parent) {
                *deg = deg.saturating_sub(1);
                if *deg == 0 {
                    newly_ready.push((*parent, state.dates.get(parent).copied().unwrap_or(0)));
                }
            }
        }
        newly_ready.sort_by(|a, b| b.1.cmp(&a.1));
        for (parent, _) in newly_ready {
            state.ready.push_back(parent);
        }

        Ok(Some(oid))
    }

    fn next_date_order(&mut self) -> Result<Option<ObjectId>, RevWalkError> {
        while let Some(entry) = self.queue.pop() {
            let oid = entry.oid;
            if self.hidden.contains(&oid) {
                continue;
            }

            let commit = self.read_commit(&oid)?;
            for parent in self.parents_of(&commit) {
                if self.seen.insert(parent) && !self.hidden.contains(&parent) {
                    if let Ok(parent_commit) = self.read_commit(&parent) {
                        self.enqueue(
                            parent,
                            parent_commit.committer.date.timestamp,
                            parent_commit.author.date.timestamp,
                        );
                    }
                }
            }

            return Ok(Some(oid));
        }
        Ok(None)
    }

    fn next_raw(&mut self) -> Result<Option<ObjectId>, RevWalkError> {
        match self.sort {
            SortOrder::Reverse => {
                if self.reverse_buffer.is_none() {
                    let mut buffer = Vec::new();
                    while let Some(oid) = self.next_date_order()? {
                        buffer.push(oid);
                    }
                    self.reverse_buffer = Some(buffer);
                }
                Ok(self.reverse_buffer.as_mut().unwrap().pop())
            }
            SortOrder::Topological => self.next_topo(),
            _ => self.next_date_order(),
        }
    }

    fn passes_date_filter(&self, commit: &Commit) -> bool {
        let commit_date = commit.committer.date.timestamp;
        if let Some(since) = self.options.since {
            if commit_date < since {
                return false;
            }
        }
        if let Some(until) = self.options.until {
            if commit_date > until {
                return false;
            }
        }
        true
    }

    fn passes_pattern_filter(&self, commit: &Commit) -> bool {
        if let Some(ref pattern) = self.options.author_pattern {
            let author = commit.author.name.to_string();
            let email = commit.author.email.to_string();
            if !author.contains(pattern.as_str()) && !email.contains(pattern.as_str()) {
                return false;
            }
        }
        if let Some(ref pattern) = self.options.committer_pattern {
            let committer = commit.committer.name.to_string();
            let email = commit.committer.email.to_string();
            if !committer.contains(pattern.as_str()) && !email.contains(pattern.as_str()) {
                return false;
            }
        }
        if let Some(ref pattern) = self.options.grep_pattern {
            let msg = commit.message.to_string();
            if !msg.contains(pattern.as_str()) {
                return false;
            }
        }
        true
    }
}

impl Iterator for RevWalk<'_> {
    type Item = Result<ObjectId, RevWalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(max) = self.options.max_count {
            if self.emitted >= max {
                return None;
            }
        }

        let needs_full_commit = self.options.author_pattern.is_some()
            || self.options.committer_pattern.is_some()
            || self.options.grep_pattern.is_some()
            || self.options.since.is_some()
            || self.options.until.is_some();

        loop {
            let oid = match self.next_raw() {
                Ok(Some(oid)) => oid,
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            };

            if needs_full_commit {
                let commit = match self.read_commit(&oid) {
                    Ok(c) => c,
                    Err(e) => return Some(Err(e)),
                };
                if !self.passes_date_filter(&commit) || !self.passes_pattern_filter(&commit) {
                    continue;
                }
            }

            if let Some(skip) = self.options.skip {
                if self.skipped < skip {
                    self.skipped += 1;
                    continue;
                }
            }

            self.emitted += 1;
            return Some(Ok(oid));
        }
    }
}

impl PartialEq for WalkEntry {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid
    }
}

impl Eq for WalkEntry {}

impl PartialOrd for WalkEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WalkEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.commit_date
            .cmp(&other.commit_date)
            .then_with(|| other.insertion_ctr.cmp(&self.insertion_ctr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_object::Blob;
    use lit_utils::date::{LitDate, Signature};

    fn sig(name: &str, ts: i64) -> Signature {
        Signature {
            name: name.into(),
            email: format!("{name}@example.com").into(),
            date: LitDate::new(ts, 0),
        }
    }

    fn commit(odb: &ObjectDatabase, tree: ObjectId, parents: Vec<ObjectId>, ts: i64) -> ObjectId {
        let c = Commit {
            tree,
            parents,
            author: sig("a", ts),
            committer: sig("a", ts),
            encoding: None,
            gpgsig: None,
            extra_headers: Vec::new(),
            message: "msg".into(),
        };
        odb.write(&Object::Commit(c)).unwrap()
    }

    fn empty_tree(odb: &ObjectDatabase) -> ObjectId {
        odb.write(&Object::Tree(lit_object::Tree::new())).unwrap()
    }

    #[test]
    fn chronological_walk_linear_history() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        let _ = Object::Blob(Blob::new(vec![]));
        let tree = empty_tree(&odb);
        let c1 = commit(&odb, tree, vec![], 100);
        let c2 = commit(&odb, tree, vec![c1], 200);
        let c3 = commit(&odb, tree, vec![c2], 300);

        let mut walk = RevWalk::new(&odb);
        walk.push(c3).unwrap();
        let oids: Vec<ObjectId> = walk.map(|r| r.unwrap()).collect();
        assert_eq!(oids, vec![c3, c2, c1]);
    }

    #[test]
    fn hide_excludes_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        let tree = empty_tree(&odb);
        let c1 = commit(&odb, tree, vec![], 100);
        let c2 = commit(&odb, tree, vec![c1], 200);
        let c3 = commit(&odb, tree, vec![c2], 300);

        let mut walk = RevWalk::new(&odb);
        walk.push(c3).unwrap();
        walk.hide(c1).unwrap();
        let oids: Vec<ObjectId> = walk.map(|r| r.unwrap()).collect();
        assert_eq!(oids, vec![c3, c2]);
    }

    #[test]
    fn max_count_limits_output() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        let tree = empty_tree(&odb);
        let c1 = commit(&odb, tree, vec![], 100);
        let c2 = commit(&odb, tree, vec![c1], 200);

        let mut walk = RevWalk::new(&odb);
        walk.set_options(WalkOptions {
            max_count: Some(1),
            ..Default::default()
        });
        walk.push(c2).unwrap();
        let oids: Vec<ObjectId> = walk.map(|r| r.unwrap()).collect();
        assert_eq!(oids, vec![c2]);
    }

    #[test]
    fn topological_order_respects_parent_after_child() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        let tree = empty_tree(&odb);
        let c1 = commit(&odb, tree, vec![], 100);
        let c2a = commit(&odb, tree, vec![c1], 200);
        let c2b = commit(&odb, tree, vec![c1], 201);
        let merge = commit(&odb, tree, vec![c2a, c2b], 300);

        let mut walk = RevWalk::new(&odb);
        walk.set_sort(SortOrder::Topological);
        walk.push(merge).unwrap();
        let oids: Vec<ObjectId> = walk.map(|r| r.unwrap()).collect();
        assert_eq!(oids[0], merge);
        assert_eq!(oids[3], c1);
    }

    #[test]
    fn grep_pattern_filters_messages() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        let tree = empty_tree(&odb);
        let c1 = odb
            .write(&Object::Commit(Commit {
                tree,
                parents: vec![],
                author: sig("a", 100),
                committer: sig("a", 100),
                encoding: None,
                gpgsig: None,
                extra_headers: Vec::new(),
                message: "fix bug".into(),
            }))
            .unwrap();
        let c2 = odb
            .write(&Object::Commit(Commit {
                tree,
                parents: vec![c1],
                author: sig("a", 200),
                committer: sig("a", 200),
                encoding: None,
                gpgsig: None,
                extra_headers: Vec::new(),
                message: "add feature".into(),
            }))
            .unwrap();

        let mut walk = RevWalk::new(&odb);
        walk.set_options(WalkOptions {
            grep_pattern: Some("bug".to_string()),
            ..Default::default()
        });
        walk.push(c2).unwrap();
        let oids: Vec<ObjectId> = walk.map(|r| r.unwrap()).collect();
        assert_eq!(oids, vec![c1]);
    }
}
