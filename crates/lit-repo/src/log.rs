//! History traversal: resolving starting points and driving a
//! [`lit_revwalk::RevWalk`] over them.

use lit_hash::ObjectId;
use lit_object::{Commit, Object};
use lit_ref::{RefName, RefStore};
use lit_revwalk::pretty::{format_commit, BuiltinFormat, FormatOptions};
use lit_revwalk::{RevWalk, WalkOptions};

use crate::{RepoError, Repository};

/// One entry produced by a log walk: the commit itself plus its OID.
pub struct LogEntry {
    pub oid: ObjectId,
    pub commit: Commit,
}

impl Repository {
    /// Walk history starting from `start` (e.g. `HEAD`'s OID), applying
    /// `options`.
    pub fn log(&self, starts: &[ObjectId], excludes: &[ObjectId], options: WalkOptions) -> Result<Vec<LogEntry>, RepoError> {
        let mut walk = RevWalk::new(&self.odb);
        walk.set_options(options);
        for oid in starts {
            walk.push(*oid)?;
        }
        for oid in excludes {
            walk.hide(*oid)?;
        }

        let mut entries = Vec::new();
        for result in walk {
            let oid = result?;
            let commit = self.read_commit(&oid)?;
            entries.push(LogEntry { oid, commit });
        }
        Ok(entries)
    }

    /// Resolve a ref name (e.g. `refs/heads/main`) to its tip commit OID.
    pub fn resolve_ref_to_oid(&self, name: &RefName) -> Result<Option<ObjectId>, RepoError> {
        Ok(self.refs.resolve_to_oid(name)?)
    }

    pub(crate) fn read_commit(&self, oid: &ObjectId) -> Result<Commit, RepoError> {
        match self.odb.read(oid)? {
            Some(Object::Commit(c)) => Ok(c),
            Some(_) => Err(RepoError::Odb(lit_odb::OdbError::Corrupt {
                oid: *oid,
                reason: "expected commit".to_string(),
            })),
            None => Err(RepoError::Odb(lit_odb::OdbError::NotFound(*oid))),
        }
    }
}

impl LogEntry {
    pub fn render(&self, format: BuiltinFormat, options: &FormatOptions) -> String {
        format_commit(&self.commit, &self.oid, format, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::CommitOptions;
    use lit_utils::date::{LitDate, Signature};

    fn sig(name: &str, ts: i64) -> Signature {
        Signature::new(name, format!("{name}@example.com"), LitDate::new(ts, 0))
    }

    #[test]
    fn log_returns_commits_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"v1\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        let first = repo
            .commit("first\n", CommitOptions { author: Some(sig("A", 1000)), committer: Some(sig("A", 1000)), extra_parents: Vec::new() })
            .unwrap();

        std::fs::write(dir.path().join("a.txt"), b"v2\n").unwrap();
        repo.stage_file("a.txt").unwrap();
        let second = repo
            .commit("second\n", CommitOptions { author: Some(sig("A", 2000)), committer: Some(sig("A", 2000)), extra_parents: Vec::new() })
            .unwrap();

        let entries = repo.log(&[second], &[], WalkOptions::default()).unwrap();
        let oids: Vec<ObjectId> = entries.iter().map(|e| e.oid).collect();
        assert_eq!(oids, vec![second, first]);
    }
}
