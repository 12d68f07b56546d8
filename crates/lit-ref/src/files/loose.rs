//! Loose ref files: `.lit/refs/**` and the special refs at `.lit/HEAD` etc.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use lit_hash::ObjectId;
use lit_utils::lockfile::LockFile;

use crate::error::RefError;
use crate::name::RefName;
use crate::Reference;

/// Special refs that live directly at the repo-dir root rather than under `refs/`.
const SPECIAL_REFS: &[&str] = &[
    "HEAD",
    "MERGE_HEAD",
    "CHERRY_PICK_HEAD",
    "REVERT_HEAD",
    "ORIG_HEAD",
    "FETCH_HEAD",
    "REBASE_HEAD",
];

/// How a loose ref file's contents were classified before parsing.
enum RawRef<'a> {
    Oid(&'a [u8]),
    Symbolic(&'a [u8]),
}

fn classify(trimmed: &[u8]) -> RawRef<'_> {
    match trimmed.strip_prefix(b"ref: ") {
        Some(target) => RawRef::Symbolic(target.trim()),
        None => RawRef::Oid(trimmed),
    }
}

/// A view over the loose-ref tree rooted at a repo directory. Bundles the
/// root path so callers stop threading it through every function.
pub(crate) struct LooseRefs<'a> {
    root: &'a Path,
}

impl<'a> LooseRefs<'a> {
    pub(crate) fn new(root: &'a Path) -> Self {
        Self { root }
    }

    pub(crate) fn path_for(&self, name: &RefName) -> PathBuf {
        self.root.join(name.as_str())
    }

    pub(crate) fn read(&self, name: &RefName) -> Result<Option<Reference>, RefError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read(&path).map_err(|e| RefError::IoPath { path: path.clone(), source: e })?;
        let trimmed = contents.trim();

        Ok(Some(match classify(trimmed) {
            RawRef::Symbolic(target) => {
                let target_str =
                    std::str::from_utf8(target).map_err(|_| RefError::Parse("invalid UTF-8 in symbolic ref target".into()))?;
                Reference::Symbolic {
                    name: name.clone(),
                    target: RefName::new(target_str)?,
                }
            }
            RawRef::Oid(hex_bytes) => {
                let hex = std::str::from_utf8(hex_bytes).map_err(|_| RefError::Parse("invalid UTF-8 in ref OID".into()))?;
                Reference::Direct {
                    name: name.clone(),
                    target: ObjectId::from_hex(hex)?,
                }
            }
        }))
    }

    fn write_line(&self, name: &RefName, line: String) -> Result<(), RefError> {
        let path = self.path_for(name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RefError::IoPath { path: parent.to_path_buf(), source: e })?;
        }

        let mut lock = LockFile::acquire(&path)?;
        lock.write_all(line.as_bytes()).map_err(|e| RefError::IoPath { path: path.clone(), source: e })?;
        lock.commit()?;
        Ok(())
    }

    pub(crate) fn write(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
        self.check_conflict(name)?;
        self.write_line(name, format!("{}\n", oid.to_hex()))
    }

    pub(crate) fn write_symbolic(&self, name: &RefName, target: &RefName) -> Result<(), RefError> {
        self.write_line(name, format!("ref: {target}\n"))
    }

    pub(crate) fn delete(&self, name: &RefName) -> Result<(), RefError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|e| RefError::IoPath { path: path.clone(), source: e })?;
        self.prune_empty_ancestors(path.parent());
        Ok(())
    }

    /// Remove now-empty directories between a deleted ref's parent and `refs/`.
    fn prune_empty_ancestors(&self, start: Option<&Path>) {
        let refs_dir = self.root.join("refs");
        let mut dir = start.map(Path::to_path_buf);

        while let Some(d) = dir {
            if d == refs_dir || d == *self.root {
                return;
            }
            let is_empty = d.read_dir().map(|mut entries| entries.next().is_none()).unwrap_or(false);
            if !is_empty {
                return;
            }
            let _ = fs::remove_dir(&d);
            dir = d.parent().map(Path::to_path_buf);
        }
    }

    /// Reject creating a ref whose path would shadow, or be shadowed by, an
    /// existing file/directory (e.g. `refs/heads/a` as a file vs `refs/heads/a/b`).
    fn check_conflict(&self, name: &RefName) -> Result<(), RefError> {
        let ref_path = self.path_for(name);

        let blocked = name
            .as_str()
            .split('/')
            .scan(self.root.to_path_buf(), |prefix, component| {
                prefix.push(component);
                Some(prefix.clone())
            })
            .take_while(|candidate| *candidate != ref_path)
            .find(|candidate| candidate.is_file());

        if let Some(conflict) = blocked {
            return Err(RefError::DirectoryConflict {
                name: name.to_string(),
                conflict: conflict.strip_prefix(self.root).unwrap_or(&conflict).display().to_string(),
            });
        }

        if ref_path.is_dir() {
            return Err(RefError::DirectoryConflict {
                name: name.to_string(),
                conflict: format!("{} (is a directory)", ref_path.strip_prefix(self.root).unwrap_or(&ref_path).display()),
            });
        }

        Ok(())
    }

    /// Enumerate loose refs under a prefix, sorted by name.
    pub(crate) fn enumerate(&self, prefix: Option<&str>) -> Result<Vec<(RefName, PathBuf)>, RefError> {
        let refs_base = self.root.join("refs");
        let search_dir = match prefix {
            Some(p) => {
                let sub = p.strip_prefix("refs/").unwrap_or(p);
                if sub.is_empty() { refs_base.clone() } else { refs_base.join(sub) }
            }
            None => refs_base.clone(),
        };

        let mut result = Vec::new();
        if search_dir.is_dir() {
            self.walk(&search_dir, prefix, &mut result)?;
        }

        if matches!(prefix, None | Some("")) {
            for special in SPECIAL_REFS {
                let path = self.root.join(special);
                if path.is_file() {
                    if let Ok(name) = RefName::new(*special) {
                        result.push((name, path));
                    }
                }
            }
        }

        result.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(result)
    }

    /// Breadth-first walk of a ref subtree using an explicit stack, so deeply
    /// nested namespaces don't grow the call stack.
    fn walk(&self, start: &Path, prefix: Option<&str>, out: &mut Vec<(RefName, PathBuf)>) -> Result<(), RefError> {
        let mut pending = vec![start.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(e) => e,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(RefError::IoPath { path: dir, source: e }),
            };

            for entry in entries {
                let entry = entry.map_err(|e| RefError::IoPath { path: dir.clone(), source: e })?;
                let path = entry.path();

                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                if !path.is_file() {
                    continue;
                }

                let rel_path = path
                    .strip_prefix(self.root)
                    .map_err(|_| RefError::Parse("cannot determine ref name from path".into()))?;
                let name_str = rel_path.to_str().ok_or_else(|| RefError::Parse("non-UTF-8 ref path".into()))?;

                if name_str.ends_with(".lock") {
                    continue;
                }
                let Ok(name) = RefName::new(name_str) else { continue };
                if prefix.is_some_and(|p| !name.as_str().starts_with(p)) {
                    continue;
                }
                out.push((name, path));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_direct_ref() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();
        let refs_dir = lit_dir.join("refs/heads");
        fs::create_dir_all(&refs_dir).unwrap();
        fs::write(refs_dir.join("main"), "da39a3ee5e6b4b0d3255bfef95601890afd80709\n").unwrap();

        let refs = LooseRefs::new(lit_dir);
        let name = RefName::new("refs/heads/main").unwrap();
        let reference = refs.read(&name).unwrap().unwrap();

        match reference {
            Reference::Direct { target, .. } => {
                assert_eq!(target, ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap());
            }
            _ => panic!("expected Direct reference"),
        }
    }

    #[test]
    fn read_symbolic_ref() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();
        fs::write(lit_dir.join("HEAD"), "ref: refs/heads/main\n").unwrap();

        let refs = LooseRefs::new(lit_dir);
        let name = RefName::new("HEAD").unwrap();
        let reference = refs.read(&name).unwrap().unwrap();

        match reference {
            Reference::Symbolic { target, .. } => assert_eq!(target.as_str(), "refs/heads/main"),
            _ => panic!("expected Symbolic reference"),
        }
    }

    #[test]
    fn read_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let refs = LooseRefs::new(dir.path());
        let name = RefName::new("refs/heads/nonexistent").unwrap();
        assert!(refs.read(&name).unwrap().is_none());
    }

    #[test]
    fn write_and_read_ref() {
        let dir = tempfile::tempdir().unwrap();
        let refs = LooseRefs::new(dir.path());
        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        refs.write(&name, &oid).unwrap();

        match refs.read(&name).unwrap().unwrap() {
            Reference::Direct { target, .. } => assert_eq!(target, oid),
            _ => panic!("expected Direct reference"),
        }
    }

    #[test]
    fn write_and_read_symref() {
        let dir = tempfile::tempdir().unwrap();
        let refs = LooseRefs::new(dir.path());
        let name = RefName::new("HEAD").unwrap();
        let target = RefName::new("refs/heads/main").unwrap();

        refs.write_symbolic(&name, &target).unwrap();

        match refs.read(&name).unwrap().unwrap() {
            Reference::Symbolic { target: found, .. } => assert_eq!(found, target),
            _ => panic!("expected Symbolic reference"),
        }
    }

    #[test]
    fn delete_ref() {
        let dir = tempfile::tempdir().unwrap();
        let refs = LooseRefs::new(dir.path());
        let name = RefName::new("refs/heads/main").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        refs.write(&name, &oid).unwrap();
        assert!(refs.read(&name).unwrap().is_some());

        refs.delete(&name).unwrap();
        assert!(refs.read(&name).unwrap().is_none());
    }

    #[test]
    fn delete_prunes_empty_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let lit_dir = dir.path();
        let refs = LooseRefs::new(lit_dir);
        let name = RefName::new("refs/heads/feature/deep/branch").unwrap();
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        refs.write(&name, &oid).unwrap();
        refs.delete(&name).unwrap();

        assert!(!lit_dir.join("refs/heads/feature").exists());
        assert!(lit_dir.join("refs").exists());
    }

    #[test]
    fn enumerate_refs() {
        let dir = tempfile::tempdir().unwrap();
        let refs = LooseRefs::new(dir.path());
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        refs.write(&RefName::new("refs/heads/main").unwrap(), &oid).unwrap();
        refs.write(&RefName::new("refs/heads/feature").unwrap(), &oid).unwrap();
        refs.write(&RefName::new("refs/tags/v1.0").unwrap(), &oid).unwrap();

        assert_eq!(refs.enumerate(Some("refs/")).unwrap().len(), 3);
        assert_eq!(refs.enumerate(Some("refs/heads/")).unwrap().len(), 2);
        assert_eq!(refs.enumerate(Some("refs/tags/")).unwrap().len(), 1);
    }

    #[test]
    fn dir_file_conflict_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let refs = LooseRefs::new(dir.path());
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        refs.write(&RefName::new("refs/heads/a").unwrap(), &oid).unwrap();
        let result = refs.write(&RefName::new("refs/heads/a/b").unwrap(), &oid);
        assert!(matches!(result, Err(RefError::DirectoryConflict { .. })));
    }
}
