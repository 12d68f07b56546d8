//! Staging working-tree files into the index (`add`) and removing them
//! (`rm` / `reset <path>`).

use std::path::Path;

use bstr::{BStr, BString};
use lit_index::{IndexEntry, Stage};
use lit_object::{Blob, FileMode, Object};

use crate::worktree::hash_worktree_file;
use crate::{RepoError, Repository};

impl Repository {
    /// Stage a single working-tree file: write its current content as a
    /// blob and record it at stage 0, replacing any conflict stages.
    pub fn stage_file(&mut self, rel_path: &str) -> Result<(), RepoError> {
        let work_tree = self.require_work_tree()?.to_path_buf();
        let disk_path = work_tree.join(rel_path);
        let mode = file_mode(&disk_path)?;
        let content = std::fs::read(&disk_path)?;
        let oid = self.odb.write(&Object::Blob(Blob::new(content)))?;

        let path = BString::from(rel_path);
        let index = self.index_mut()?;
        index.remove_all_stages(path.as_ref() as &BStr);
        index.add(IndexEntry {
            path,
            oid,
            mode,
            stage: Stage::Normal,
            stat: Default::default(),
            flags: Default::default(),
        });
        Ok(())
    }

    /// Stage every tracked-or-untracked path under the working tree that
    /// is not excluded by `.litignore`/`info/exclude`.
    pub fn stage_all(&mut self) -> Result<(), RepoError> {
        let work_tree = self.require_work_tree()?.to_path_buf();
        let ignore = crate::worktree::load_ignore_stack(&self.lit_dir, &work_tree)?;
        let mut paths = Vec::new();
        collect_paths(&work_tree, &work_tree, &ignore, &mut paths)?;
        for path in paths {
            self.stage_file(&path)?;
        }
        Ok(())
    }

    /// Remove a path from the index (used by `rm --cached` / unstaging).
    pub fn unstage_path(&mut self, rel_path: &str) -> Result<bool, RepoError> {
        let path = BString::from(rel_path);
        Ok(self.index_mut()?.remove_all_stages(path.as_ref() as &BStr))
    }
}

fn file_mode(path: &Path) -> Result<FileMode, RepoError> {
    let meta = std::fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        return Ok(FileMode::Symlink);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 != 0 {
            return Ok(FileMode::Executable);
        }
    }
    Ok(FileMode::Regular)
}

fn collect_paths(root: &Path, dir: &Path, ignore: &lit_index::IgnoreStack, out: &mut Vec<String>) -> Result<(), RepoError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == ".lit" {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap();
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        let is_dir = path.is_dir();
        if ignore.is_ignored(BStr::new(rel_str.as_bytes()), is_dir) {
            continue;
        }
        if is_dir {
            collect_paths(root, &path, ignore, out)?;
        } else {
            out.push(rel_str);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_file_writes_blob_and_index_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello\n").unwrap();

        repo.stage_file("a.txt").unwrap();

        let index = repo.index().unwrap();
        let entry = index.get(BStr::new(b"a.txt"), Stage::Normal).unwrap();
        assert!(hash_worktree_file(&dir.path().join("a.txt")).unwrap() == entry.oid);
    }

    #[test]
    fn stage_all_picks_up_every_non_ignored_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a\n").unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.txt"), b"b\n").unwrap();
        std::fs::write(dir.path().join(".litignore"), b"ignored.txt\n").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), b"skip\n").unwrap();

        repo.stage_all().unwrap();

        let index = repo.index().unwrap();
        assert!(index.get(BStr::new(b"a.txt"), Stage::Normal).is_some());
        assert!(index.get(BStr::new(b"sub/b.txt"), Stage::Normal).is_some());
        assert!(index.get(BStr::new(b"ignored.txt"), Stage::Normal).is_none());
    }

    #[test]
    fn unstage_path_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello\n").unwrap();
        repo.stage_file("a.txt").unwrap();

        assert!(repo.unstage_path("a.txt").unwrap());
        assert!(repo.index().unwrap().get(BStr::new(b"a.txt"), Stage::Normal).is_none());
    }
}
