//! Creating commits from the current index.

use bstr::BString;
use lit_hash::ObjectId;
use lit_object::{Commit, Object};
use lit_ref::{RefStore, RefTransaction};
use lit_utils::date::Signature;

use crate::{head_ref, RepoError, Repository};

/// Options overriding the default author/committer/date for a commit.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
    /// Extra parents, for recording a merge commit. The current `HEAD` (if
    /// any) is always included as the first parent.
    pub extra_parents: Vec<ObjectId>,
}

impl Repository {
    /// Record a new commit from the current index, advancing the current
    /// branch (or creating it, if `HEAD` is unborn).
    pub fn commit(&mut self, message: impl Into<BString>, options: CommitOptions) -> Result<ObjectId, RepoError> {
        let index = self.index()?.clone();
        let tree = index.write_tree(&self.odb)?;

        let head_oid = self.head_oid()?;
        let mut parents: Vec<ObjectId> = head_oid.into_iter().collect();
        parents.extend(options.extra_parents);

        let author = match options.author {
            Some(sig) => sig,
            None => self.author_signature()?,
        };
        let committer = match options.committer {
            Some(sig) => sig,
            None => self.committer_signature()?,
        };

        let message = message.into();
        let summary = first_line(&message);

        let commit = Commit {
            tree,
            parents,
            author,
            committer,
            encoding: None,
            gpgsig: None,
            extra_headers: Vec::new(),
            message,
        };
        let oid = self.odb.write(&Object::Commit(commit))?;

        let branch = head_ref()?;
        let target = match self.refs.resolve(&branch)? {
            Some(lit_ref::Reference::Symbolic { target, .. }) => target,
            _ => return Err(RepoError::DetachedHead),
        };

        let mut txn = RefTransaction::new();
        match self.refs.resolve_to_oid(&target)? {
            Some(old) => txn.update(target, old, oid, format!("commit: {summary}")),
            None => txn.create(target, oid, format!("commit (initial): {summary}")),
        }
        self.refs.commit_transaction(txn)?;

        tracing::debug!(%oid, %summary, "recorded commit");
        Ok(oid)
    }
}

fn first_line(message: &BString) -> String {
    message
        .to_vec()
        .split(|&b| b == b'\n')
        .next()
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .unwrap_or_default()
}
