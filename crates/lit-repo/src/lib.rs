//! Repository facade: discovery, initialization, and the single entry
//! point every other subsystem (odb, refs, config, index, diff, merge,
//! revwalk, transport) is driven through.

mod discover;
mod env;
mod error;
mod init;
mod worktree;

pub mod branch;
pub mod checkout;
pub mod cherry_pick;
pub mod commit;
pub mod log;
pub mod merge;
pub mod rebase;
pub mod remote;
pub mod reset;
pub mod stage;
pub mod stash;
pub mod status;
pub mod tag;

pub use error::RepoError;
pub use worktree::{StatusEntry, WorktreeStatus};

use std::path::{Path, PathBuf};

use lit_config::Config;
use lit_hash::ObjectId;
use lit_index::Index;
use lit_odb::ObjectDatabase;
use lit_ref::{FilesRefStore, RefName, RefStore, Reference};
use lit_utils::date::Signature;

/// Type of repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    /// Normal repo with a working tree, `.lit/` alongside it.
    Normal,
    /// Bare repo: no working tree, the layout lives at the top level.
    Bare,
}

/// Result of locating a repository, before it is fully opened.
#[derive(Debug)]
pub struct DiscoveredRepo {
    pub lit_dir: PathBuf,
    pub work_tree: Option<PathBuf>,
    pub kind: RepositoryKind,
}

/// Options for repository initialization.
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub bare: bool,
    pub default_branch: Option<String>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self { bare: false, default_branch: None }
    }
}

/// The central repository handle tying together the object database, ref
/// store, config, and (lazily loaded) index.
pub struct Repository {
    lit_dir: PathBuf,
    work_tree: Option<PathBuf>,
    odb: ObjectDatabase,
    refs: FilesRefStore,
    config: Config,
    index: Option<Index>,
    index_path: PathBuf,
    kind: RepositoryKind,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("lit_dir", &self.lit_dir)
            .field("work_tree", &self.work_tree)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Open an existing repository. `path` may be the `.lit` directory, a
    /// bare repository root, or a working tree root containing `.lit/`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref();
        let discovered = if discover::is_lit_dir(path) {
            discover::open_lit_dir(path)?
        } else if path.join(".lit").exists() {
            discover::open_lit_dir_from_work_tree(path)?
        } else {
            return Err(RepoError::NotFound(path.to_path_buf()));
        };
        Self::from_discovered(discovered)
    }

    /// Discover a repository starting from `start`, walking up.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, RepoError> {
        Self::from_discovered(discover::discover_lit_dir(start.as_ref())?)
    }

    pub fn init(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        Self::from_discovered(init::init_repository(path.as_ref(), &InitOptions::default())?)
    }

    pub fn init_bare(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let opts = InitOptions { bare: true, ..Default::default() };
        Self::from_discovered(init::init_repository(path.as_ref(), &opts)?)
    }

    pub fn init_opts(path: impl AsRef<Path>, opts: &InitOptions) -> Result<Self, RepoError> {
        Self::from_discovered(init::init_repository(path.as_ref(), opts)?)
    }

    fn from_discovered(discovered: DiscoveredRepo) -> Result<Self, RepoError> {
        let DiscoveredRepo { lit_dir, work_tree, kind } = discovered;

        let odb = ObjectDatabase::open(lit_dir.join("objects"));
        let refs = FilesRefStore::new(&lit_dir);
        let config = Config::open(&lit_dir)?;
        let index_path = lit_dir.join("index");

        tracing::debug!(lit_dir = %lit_dir.display(), ?kind, "opened repository");

        Ok(Repository { lit_dir, work_tree, odb, refs, config, index: None, index_path, kind })
    }

    // --- Path accessors ---

    pub fn lit_dir(&self) -> &Path {
        &self.lit_dir
    }

    pub fn work_tree(&self) -> Option<&Path> {
        self.work_tree.as_deref()
    }

    pub fn kind(&self) -> RepositoryKind {
        self.kind
    }

    pub fn is_bare(&self) -> bool {
        self.kind == RepositoryKind::Bare
    }

    /// The working tree root, or an error for a bare repository.
    pub fn require_work_tree(&self) -> Result<&Path, RepoError> {
        self.work_tree.as_deref().ok_or(RepoError::BareNoWorkTree)
    }

    // --- Subsystem accessors ---

    pub fn odb(&self) -> &ObjectDatabase {
        &self.odb
    }

    pub fn refs(&self) -> &FilesRefStore {
        &self.refs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn index(&mut self) -> Result<&Index, RepoError> {
        if self.index.is_none() {
            self.load_index()?;
        }
        Ok(self.index.as_ref().unwrap())
    }

    pub fn index_mut(&mut self) -> Result<&mut Index, RepoError> {
        if self.index.is_none() {
            self.load_index()?;
        }
        Ok(self.index.as_mut().unwrap())
    }

    pub fn set_index(&mut self, index: Index) {
        self.index = Some(index);
    }

    pub fn write_index(&self) -> Result<(), RepoError> {
        if let Some(ref idx) = self.index {
            idx.write_to(&self.index_path)?;
        }
        Ok(())
    }

    pub fn reload_index(&mut self) -> Result<&Index, RepoError> {
        self.index = None;
        self.load_index()?;
        Ok(self.index.as_ref().unwrap())
    }

    fn load_index(&mut self) -> Result<(), RepoError> {
        let idx = if self.index_path.exists() { Index::read_from(&self.index_path)? } else { Index::new() };
        self.index = Some(idx);
        Ok(())
    }

    // --- Identity ---

    pub fn author_signature(&self) -> Result<Signature, RepoError> {
        Ok(lit_config::resolve_author(&self.config)?)
    }

    pub fn committer_signature(&self) -> Result<Signature, RepoError> {
        Ok(lit_config::resolve_committer(&self.config)?)
    }

    // --- Ref convenience ---

    pub fn head_oid(&self) -> Result<Option<ObjectId>, RepoError> {
        Ok(self.refs.resolve_to_oid(&head_ref()?)?)
    }

    /// The current branch's ref name (`refs/heads/main`), or `None` if
    /// `HEAD` is detached.
    pub fn current_branch(&self) -> Result<Option<RefName>, RepoError> {
        match self.refs.resolve(&head_ref()?)? {
            Some(Reference::Symbolic { target, .. }) => Ok(Some(target)),
            _ => Ok(None),
        }
    }

    /// True if `HEAD` points (directly or symbolically) at a ref with no
    /// commits yet.
    pub fn is_unborn(&self) -> Result<bool, RepoError> {
        match self.refs.resolve(&head_ref()?)? {
            Some(Reference::Symbolic { target, .. }) => Ok(self.refs.resolve_to_oid(&target)?.is_none()),
            Some(Reference::Direct { .. }) => Ok(false),
            None => Ok(true),
        }
    }

    /// Path to a special single-file ref-like state marker under `.lit/`
    /// (`MERGE_HEAD`, `MERGE_MSG`, `ORIG_HEAD`'s sibling files, ...).
    pub fn state_path(&self, name: &str) -> PathBuf {
        self.lit_dir.join(name)
    }
}

pub(crate) fn head_ref() -> Result<RefName, RepoError> {
    Ok(RefName::new("HEAD")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let repo = Repository::open(dir.path()).unwrap();
        assert!(!repo.is_bare());
        assert!(repo.is_unborn().unwrap());
        assert_eq!(repo.current_branch().unwrap().unwrap().as_str(), "refs/heads/main");
    }

    #[test]
    fn discover_walks_up_from_a_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        let repo = Repository::discover(&nested).unwrap();
        assert_eq!(repo.work_tree(), Some(std::fs::canonicalize(dir.path()).unwrap().as_path()));
    }

    #[test]
    fn author_signature_requires_identity() {
        let dir = tempfile::tempdir().unwrap();
        std::env::remove_var("LIT_AUTHOR_NAME");
        std::env::remove_var("LIT_AUTHOR_EMAIL");
        let repo = Repository::init(dir.path()).unwrap();
        assert!(repo.author_signature().is_err());
    }

    #[test]
    fn index_lazily_loads_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        assert_eq!(repo.index().unwrap().len(), 0);

        let odb_dir_blob = repo.odb().write(&lit_object::Object::Blob(lit_object::Blob::new(b"x\n".to_vec()))).unwrap();
        repo.index_mut().unwrap().add(lit_index::IndexEntry {
            path: "a.txt".into(),
            oid: odb_dir_blob,
            mode: lit_object::FileMode::Regular,
            stage: lit_index::Stage::Normal,
            stat: Default::default(),
            flags: Default::default(),
        });
        repo.write_index().unwrap();

        let reloaded = repo.reload_index().unwrap();
        assert_eq!(reloaded.len(), 1);
    }
}
