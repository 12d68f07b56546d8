//! Working tree synchronization: writing tree/index content out to disk,
//! and diffing the working tree against the index (status).
//!
//! `lit-diff` deliberately stops at tree-to-tree diffing; everything here
//! that touches actual files on disk belongs to the repository layer.

use std::fs;
use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice};
use lit_hash::hasher::Hasher;
use lit_hash::ObjectId;
use lit_index::ignore::IgnoreStack;
use lit_index::{Index, Stage};
use lit_object::{FileMode, Object};
use lit_odb::ObjectDatabase;

use crate::RepoError;

/// One path's status relative to the index and/or HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorktreeStatus {
    Untracked,
    Modified,
    Deleted,
    Added,
}

#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub path: BString,
    pub status: WorktreeStatus,
}

/// Write every stage-0 index entry's blob content out to `work_tree`,
/// creating parent directories as needed. Used by checkout, reset --hard,
/// and the non-bare half of clone.
pub fn checkout_index(odb: &ObjectDatabase, index: &Index, work_tree: &Path) -> Result<(), RepoError> {
    for entry in index.iter() {
        if entry.stage != Stage::Normal {
            continue;
        }
        let dest = work_tree.join(path_to_os(entry.path.as_bstr()));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let Some(Object::Blob(blob)) = odb.read(&entry.oid)? else {
            continue;
        };
        write_worktree_file(&dest, blob.serialize_content(), entry.mode)?;
    }
    Ok(())
}

/// Remove working-tree files that are tracked (present in `old_index`) but
/// no longer present in `new_index` — used when switching branches or
/// resetting hard to a tree with fewer files.
pub fn remove_stale_files(old_index: &Index, new_index: &Index, work_tree: &Path) -> Result<(), RepoError> {
    for entry in old_index.iter() {
        if entry.stage != Stage::Normal {
            continue;
        }
        if new_index.get(entry.path.as_bstr(), Stage::Normal).is_none() {
            let path = work_tree.join(path_to_os(entry.path.as_bstr()));
            let _ = fs::remove_file(path);
        }
    }
    Ok(())
}

fn write_worktree_file(dest: &Path, content: &[u8], mode: FileMode) -> Result<(), RepoError> {
    if mode == FileMode::Symlink {
        let target = content.to_str_lossy().into_owned();
        let _ = fs::remove_file(dest);
        #[cfg(unix)]
        std::os::unix::fs::symlink(target, dest)?;
        #[cfg(not(unix))]
        fs::write(dest, target)?;
        return Ok(());
    }

    fs::write(dest, content)?;

    #[cfg(unix)]
    if mode == FileMode::Executable {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(dest)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(dest, perms)?;
    }

    Ok(())
}

fn path_to_os(path: &BStr) -> PathBuf {
    PathBuf::from(path.to_str_lossy().into_owned())
}

/// Hash a working-tree file's current content as a blob, without writing it
/// to the object database. Used to cheaply tell whether a tracked file
/// differs from its staged version.
pub fn hash_worktree_file(path: &Path) -> Result<ObjectId, RepoError> {
    let content = fs::read(path)?;
    let header = format!("blob {}\0", content.len());
    let mut full = header.into_bytes();
    full.extend_from_slice(&content);
    Ok(Hasher::digest(&full)?)
}

/// Compare the working tree against the index: additions the index doesn't
/// know about (untracked), tracked files whose content or presence changed
/// (modified/deleted), honoring `.litignore`/`info/exclude`.
pub fn worktree_status(index: &Index, work_tree: &Path, ignore: &IgnoreStack) -> Result<Vec<StatusEntry>, RepoError> {
    let mut entries = Vec::new();
    let mut tracked: std::collections::HashSet<BString> = std::collections::HashSet::new();

    for entry in index.iter() {
        if entry.stage != Stage::Normal {
            continue;
        }
        tracked.insert(entry.path.clone());
        let disk_path = work_tree.join(path_to_os(entry.path.as_bstr()));
        if !disk_path.exists() {
            entries.push(StatusEntry { path: entry.path.clone(), status: WorktreeStatus::Deleted });
            continue;
        }
        if disk_path.is_dir() {
            continue;
        }
        let current_oid = hash_worktree_file(&disk_path)?;
        if current_oid != entry.oid {
            entries.push(StatusEntry { path: entry.path.clone(), status: WorktreeStatus::Modified });
        }
    }

    walk_untracked(work_tree, work_tree, &tracked, ignore, &mut entries)?;
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn walk_untracked(
    root: &Path,
    dir: &Path,
    tracked: &std::collections::HashSet<BString>,
    ignore: &IgnoreStack,
    out: &mut Vec<StatusEntry>,
) -> Result<(), RepoError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name == ".lit" {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap();
        let rel_bstr = BString::from(rel.to_string_lossy().replace('\\', "/"));
        let is_dir = path.is_dir();

        if ignore.is_ignored(rel_bstr.as_bstr(), is_dir) {
            continue;
        }

        if is_dir {
            walk_untracked(root, &path, tracked, ignore, out)?;
        } else if !tracked.contains(&rel_bstr) {
            out.push(StatusEntry { path: rel_bstr, status: WorktreeStatus::Untracked });
        }
    }
    Ok(())
}

/// Load the layered ignore stack for a work tree: `.lit/info/exclude` then
/// every `.litignore` found while walking (added lazily per-directory by
/// the caller is unnecessary here since `walk_untracked` only needs the
/// repo-root-level excludes plus `.litignore` files it encounters).
pub fn load_ignore_stack(lit_dir: &Path, work_tree: &Path) -> Result<IgnoreStack, RepoError> {
    let mut stack = IgnoreStack::new();
    stack.add_file(&lit_dir.join("info/exclude"))?;
    stack.add_file(&work_tree.join(".litignore"))?;
    Ok(stack)
}
