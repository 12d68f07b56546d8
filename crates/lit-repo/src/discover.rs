//! Locate a repository's `.lit` directory.
//!
//! Walks up from a starting directory looking for a `.lit/` subdirectory
//! (normal repository) or a directory that is itself a lit control
//! directory (bare repository, per spec: "a bare repository has no
//! working tree and stores the same layout at the top level"). There are
//! no linked worktrees and no `gitdir:` file redirects to chase.

use std::path::{Path, PathBuf};

use crate::env::EnvOverrides;
use crate::{DiscoveredRepo, RepoError, RepositoryKind};

pub fn discover_lit_dir(start: &Path) -> Result<DiscoveredRepo, RepoError> {
    discover_lit_dir_with_env(start, &EnvOverrides::from_env())
}

pub fn discover_lit_dir_with_env(start: &Path, env: &EnvOverrides) -> Result<DiscoveredRepo, RepoError> {
    if let Some(ref lit_dir) = env.lit_dir {
        let lit_dir = if lit_dir.is_absolute() { lit_dir.clone() } else { start.join(lit_dir) };
        return open_lit_dir(&lit_dir);
    }

    let start = std::fs::canonicalize(start).map_err(|_| RepoError::NotFound(start.to_path_buf()))?;

    let mut current = start.clone();
    loop {
        let dot_lit = current.join(".lit");
        if is_lit_dir(&dot_lit) {
            return Ok(DiscoveredRepo { lit_dir: dot_lit, work_tree: Some(current), kind: RepositoryKind::Normal });
        }

        if is_lit_dir(&current) {
            return Ok(DiscoveredRepo { lit_dir: current, work_tree: None, kind: RepositoryKind::Bare });
        }

        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return Err(RepoError::NotFound(start)),
        }
    }
}

/// Open a known lit directory path directly.
pub fn open_lit_dir(lit_dir: &Path) -> Result<DiscoveredRepo, RepoError> {
    let lit_dir = std::fs::canonicalize(lit_dir).map_err(|_| RepoError::NotFound(lit_dir.to_path_buf()))?;

    if !is_lit_dir(&lit_dir) {
        return Err(RepoError::InvalidLitDir { path: lit_dir, reason: "missing HEAD, objects/, or refs/".to_string() });
    }

    if let Some(parent) = lit_dir.parent() {
        if parent.join(".lit") == lit_dir {
            return Ok(DiscoveredRepo { work_tree: Some(parent.to_path_buf()), lit_dir, kind: RepositoryKind::Normal });
        }
    }

    Ok(DiscoveredRepo { lit_dir, work_tree: None, kind: RepositoryKind::Bare })
}

/// Open a `.lit` dir when the caller already knows the working tree root.
pub fn open_lit_dir_from_work_tree(work_tree: &Path) -> Result<DiscoveredRepo, RepoError> {
    let dot_lit = work_tree.join(".lit");
    if !is_lit_dir(&dot_lit) {
        return Err(RepoError::NotFound(work_tree.to_path_buf()));
    }
    let dot_lit = std::fs::canonicalize(&dot_lit).map_err(|_| RepoError::NotFound(dot_lit.clone()))?;
    let work_tree = std::fs::canonicalize(work_tree).map_err(|_| RepoError::NotFound(work_tree.to_path_buf()))?;
    Ok(DiscoveredRepo { lit_dir: dot_lit, work_tree: Some(work_tree), kind: RepositoryKind::Normal })
}

pub fn is_lit_dir(path: &Path) -> bool {
    path.join("HEAD").is_file() && path.join("objects").is_dir() && path.join("refs").is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_bare(dir: &Path) {
        std::fs::create_dir_all(dir.join("objects")).unwrap();
        std::fs::create_dir_all(dir.join("refs/heads")).unwrap();
        std::fs::write(dir.join("HEAD"), b"ref: refs/heads/main\n").unwrap();
    }

    #[test]
    fn discovers_dot_lit_from_nested_subdirectory() {
        let root = tempfile::tempdir().unwrap();
        init_bare(&root.path().join(".lit"));
        let nested = root.path().join("src/nested");
        std::fs::create_dir_all(&nested).unwrap();

        let discovered = discover_lit_dir(&nested).unwrap();
        assert_eq!(discovered.kind, RepositoryKind::Normal);
        assert_eq!(discovered.work_tree, Some(std::fs::canonicalize(root.path()).unwrap()));
    }

    #[test]
    fn discovers_bare_repo_at_its_own_root() {
        let dir = tempfile::tempdir().unwrap();
        init_bare(dir.path());

        let discovered = discover_lit_dir(dir.path()).unwrap();
        assert_eq!(discovered.kind, RepositoryKind::Bare);
        assert!(discovered.work_tree.is_none());
    }

    #[test]
    fn discovery_fails_outside_any_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_lit_dir(dir.path()).is_err());
    }

    #[test]
    fn lit_dir_env_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        init_bare(&dir.path().join("elsewhere"));
        let env = EnvOverrides { lit_dir: Some(dir.path().join("elsewhere")) };

        let discovered = discover_lit_dir_with_env(dir.path(), &env).unwrap();
        assert_eq!(discovered.lit_dir, std::fs::canonicalize(dir.path().join("elsewhere")).unwrap());
    }
}
