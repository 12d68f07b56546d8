//! Remote management and fetch/push/clone orchestration.
//!
//! Remotes are always local filesystem paths (see `lit-transport`); this
//! module owns the `remote.<name>.url` / `branch.<name>.{remote,merge}`
//! config keys and the `refs/remotes/<name>/*` tracking refs.

use lit_hash::ObjectId;
use lit_ref::{RefName, RefStore, RefTransaction};
use lit_transport::{clone_into, fetch, push, update_remote_ref, RemoteRepo, RemoteUrl};

use crate::worktree::checkout_index;
use crate::{InitOptions, RepoError, Repository};

impl Repository {
    /// Record a remote's URL under `remote.<name>.url`.
    pub fn remote_add(&mut self, name: &str, url: &str) -> Result<(), RepoError> {
        Ok(self.config_mut().set(&format!("remote.{name}.url"), url)?)
    }

    /// Drop a remote's config section and its tracking refs.
    pub fn remote_remove(&mut self, name: &str) -> Result<(), RepoError> {
        self.config_mut().remove_subsection("remote", name)?;
        let prefix = format!("refs/remotes/{name}/");
        let stale: Vec<RefName> = self.refs.iter(Some(&prefix))?.filter_map(Result::ok).map(|r| r.name().clone()).collect();
        for name in stale {
            self.refs.delete_ref(&name)?;
        }
        Ok(())
    }

    /// List configured remote names.
    pub fn remote_list(&self) -> Vec<String> {
        self.config()
            .entries()
            .into_iter()
            .filter(|e| e.key.section.as_slice() == b"remote" && e.key.name.as_slice() == b"url")
            .filter_map(|e| e.key.subsection.map(|s| s.to_string()))
            .collect()
    }

    fn remote_url(&self, name: &str) -> Result<String, RepoError> {
        self.config()
            .get_string(&format!("remote.{name}.url"))?
            .ok_or_else(|| RepoError::InvalidLitDir { path: self.lit_dir().to_path_buf(), reason: format!("no such remote: {name}") })
    }

    fn open_remote(&self, name: &str) -> Result<RemoteRepo, RepoError> {
        let raw = self.remote_url(name)?;
        let base = self.work_tree().unwrap_or(self.lit_dir()).to_path_buf();
        let url = RemoteUrl::parse(&raw, &base)?;
        Ok(RemoteRepo::open(url.path())?)
    }

    /// Fetch every ref from `name`, updating `refs/remotes/<name>/*`.
    pub fn fetch_remote(&mut self, name: &str) -> Result<usize, RepoError> {
        let remote = self.open_remote(name)?;
        let remote_refs = remote.list_refs(None)?;
        let wanted: Vec<ObjectId> = remote_refs.iter().map(|(_, oid)| *oid).collect();
        let haves = self.local_tips()?;

        let copied = fetch(&self.odb, &remote, &wanted, &haves)?;

        let mut txn = RefTransaction::new();
        for (remote_name, oid) in &remote_refs {
            let Some(branch) = remote_name.as_str().strip_prefix("refs/heads/") else { continue };
            let tracking = RefName::new(format!("refs/remotes/{name}/{branch}"))?;
            match self.refs.resolve_to_oid(&tracking)? {
                Some(old) if old != *oid => txn.update(tracking, old, *oid, format!("fetch {name}")),
                None => txn.create(tracking, *oid, format!("fetch {name}")),
                _ => {}
            }
        }
        self.refs.commit_transaction(txn)?;
        Ok(copied)
    }

    /// Push the current branch to `name`, rejecting non-fast-forward updates
    /// unless `force` is set.
    pub fn push_remote(&mut self, name: &str, force: bool) -> Result<usize, RepoError> {
        let branch = self.current_branch()?.ok_or(RepoError::DetachedHead)?;
        let local_oid = self.refs.resolve_to_oid(&branch)?.ok_or(RepoError::UnbornBranch(branch.to_string()))?;
        let remote = self.open_remote(name)?;

        let expected = remote.resolve(&branch)?;
        let haves: Vec<ObjectId> = expected.into_iter().collect();
        let copied = push(&self.odb, &remote, &[local_oid], &haves)?;
        update_remote_ref(&remote, &branch, expected, local_oid, force)?;
        Ok(copied)
    }

    /// Clone `url` into a brand-new repository at `dest`.
    pub fn clone_from(url: &str, dest: impl AsRef<std::path::Path>) -> Result<Self, RepoError> {
        let dest = dest.as_ref();
        let base = std::env::current_dir()?;
        let remote_url = RemoteUrl::parse(url, &base)?;
        let remote = RemoteRepo::open(remote_url.path())?;

        let mut repo = Self::init_opts(dest, &InitOptions::default())?;
        repo.remote_add("origin", url)?;

        let cloned = clone_into(repo.odb(), &remote)?;

        let mut txn = RefTransaction::new();
        for (name, oid) in &cloned.refs {
            let Some(branch) = name.as_str().strip_prefix("refs/heads/") else { continue };
            let tracking = RefName::new(format!("refs/remotes/origin/{branch}"))?;
            txn.create(tracking, *oid, "clone");
        }
        repo.refs.commit_transaction(txn)?;

        if let Some(head_branch) = &cloned.head_branch {
            if let Some(oid) = cloned.refs.iter().find(|(n, _)| n == head_branch).map(|(_, oid)| *oid) {
                let mut txn = RefTransaction::new();
                txn.create(head_branch.clone(), oid, "clone");
                repo.refs.commit_transaction(txn)?;
                repo.refs.write_symbolic_ref(&crate::head_ref()?, head_branch)?;

                let tree = repo.commit_tree(&oid)?;
                let mut index = lit_index::Index::new();
                index.read_tree(&tree, repo.odb())?;
                repo.set_index(index);
                if let Some(work_tree) = repo.work_tree().map(|p| p.to_path_buf()) {
                    let snapshot = repo.index()?.clone();
                    checkout_index(repo.odb(), &snapshot, &work_tree)?;
                }
                repo.write_index()?;
            }
        }

        Ok(repo)
    }

    fn local_tips(&self) -> Result<Vec<ObjectId>, RepoError> {
        Ok(self.refs.iter(None)?.filter_map(Result::ok).filter_map(|r| r.target_oid()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_add_and_list_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        repo.remote_add("origin", "/tmp/somewhere").unwrap();
        assert_eq!(repo.remote_list(), vec!["origin".to_string()]);
    }

    #[test]
    fn clone_from_copies_refs_and_checks_out_working_tree() {
        let remote_dir = tempfile::tempdir().unwrap();
        let mut remote_repo = Repository::init(remote_dir.path()).unwrap();
        std::env::set_var("LIT_AUTHOR_NAME", "A");
        std::env::set_var("LIT_AUTHOR_EMAIL", "a@example.com");
        std::env::set_var("LIT_COMMITTER_NAME", "A");
        std::env::set_var("LIT_COMMITTER_EMAIL", "a@example.com");
        std::fs::write(remote_dir.path().join("a.txt"), b"hi\n").unwrap();
        remote_repo.stage_file("a.txt").unwrap();
        remote_repo.commit("initial\n", crate::commit::CommitOptions::default()).unwrap();

        let clone_dir = tempfile::tempdir().unwrap();
        let url = format!("file://{}", remote_dir.path().join(".lit").display());
        let cloned = Repository::clone_from(&url, clone_dir.path()).unwrap();
        assert!(clone_dir.path().join("a.txt").exists());
        assert!(!cloned.is_unborn().unwrap());

        std::env::remove_var("LIT_AUTHOR_NAME");
        std::env::remove_var("LIT_AUTHOR_EMAIL");
        std::env::remove_var("LIT_COMMITTER_NAME");
        std::env::remove_var("LIT_COMMITTER_EMAIL");
    }
}
