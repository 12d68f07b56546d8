use std::fs;
use std::path::Path;

use crate::{DiscoveredRepo, InitOptions, RepoError, RepositoryKind};

/// Initialize a new repository, creating the standard `.lit/` structure:
/// `HEAD`, `config`, `objects/`, `refs/heads/`, `refs/tags/`, `info/exclude`.
///
/// Re-running on a directory that already has a `HEAD` file is a safe
/// no-op — existing data is never overwritten.
pub fn init_repository(path: &Path, options: &InitOptions) -> Result<DiscoveredRepo, RepoError> {
    let path = if path.is_relative() { std::env::current_dir()?.join(path) } else { path.to_path_buf() };

    let (lit_dir, work_tree) = if options.bare { (path.clone(), None) } else { (path.join(".lit"), Some(path.clone())) };

    if lit_dir.join("HEAD").is_file() {
        return Ok(DiscoveredRepo {
            lit_dir,
            work_tree,
            kind: if options.bare { RepositoryKind::Bare } else { RepositoryKind::Normal },
        });
    }

    fs::create_dir_all(&lit_dir)?;
    fs::create_dir_all(lit_dir.join("objects"))?;
    fs::create_dir_all(lit_dir.join("refs").join("heads"))?;
    fs::create_dir_all(lit_dir.join("refs").join("tags"))?;
    fs::create_dir_all(lit_dir.join("info"))?;

    let default_branch = options.default_branch.as_deref().unwrap_or("main");
    fs::write(lit_dir.join("HEAD"), format!("ref: refs/heads/{default_branch}\n"))?;

    let config_content = if options.bare {
        "[core]\n\tbare = true\n"
    } else {
        "[core]\n\tbare = false\n"
    };
    fs::write(lit_dir.join("config"), config_content)?;

    fs::write(lit_dir.join("info").join("exclude"), "# lit ls-files --others --exclude-from=.lit/info/exclude\n")?;

    Ok(DiscoveredRepo {
        lit_dir,
        work_tree,
        kind: if options.bare { RepositoryKind::Bare } else { RepositoryKind::Normal },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_standard_layout() {
        let dir = tempfile::tempdir().unwrap();
        let discovered = init_repository(dir.path(), &InitOptions::default()).unwrap();

        assert_eq!(discovered.kind, RepositoryKind::Normal);
        let lit_dir = dir.path().join(".lit");
        assert!(lit_dir.join("HEAD").is_file());
        assert!(lit_dir.join("objects").is_dir());
        assert!(lit_dir.join("refs/heads").is_dir());
        assert_eq!(std::fs::read_to_string(lit_dir.join("HEAD")).unwrap(), "ref: refs/heads/main\n");
    }

    #[test]
    fn init_bare_has_no_work_tree_and_layout_at_root() {
        let dir = tempfile::tempdir().unwrap();
        let opts = InitOptions { bare: true, ..Default::default() };
        let discovered = init_repository(dir.path(), &opts).unwrap();

        assert_eq!(discovered.kind, RepositoryKind::Bare);
        assert!(discovered.work_tree.is_none());
        assert!(dir.path().join("objects").is_dir());
    }

    #[test]
    fn init_honors_custom_default_branch() {
        let dir = tempfile::tempdir().unwrap();
        let opts = InitOptions { default_branch: Some("trunk".to_string()), ..Default::default() };
        init_repository(dir.path(), &opts).unwrap();

        let head = std::fs::read_to_string(dir.path().join(".lit/HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/trunk\n");
    }

    #[test]
    fn reinitializing_is_a_safe_no_op() {
        let dir = tempfile::tempdir().unwrap();
        init_repository(dir.path(), &InitOptions::default()).unwrap();
        std::fs::write(dir.path().join(".lit/HEAD"), "ref: refs/heads/custom\n").unwrap();
        init_repository(dir.path(), &InitOptions::default()).unwrap();
        let head = std::fs::read_to_string(dir.path().join(".lit/HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/custom\n");
    }
}
