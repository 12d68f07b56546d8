use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{LockError, UtilError};
use crate::Result;

const LOCK_SUFFIX: &str = ".lock";

/// Whether the guarded file handle is still open or has been settled
/// (committed or rolled back). Folding this into one field instead of an
/// `Option<File>` plus a `committed: bool` makes "committed but still
/// holding the handle open" unrepresentable.
enum Guard {
    Held(File),
    Settled,
}

/// An exclusively-held staging file: write to `<path>.lock`, then either
/// [`commit`](LockFile::commit) it into place with an atomic rename or
/// [`rollback`](LockFile::rollback) (also the `Drop` behavior) to discard it.
/// Two lock attempts on the same path never interleave their writes, since
/// the second `acquire` fails outright rather than waiting.
pub struct LockFile {
    path: PathBuf,
    lock_path: PathBuf,
    guard: Guard,
}

fn lock_path_for(target: &Path) -> PathBuf {
    let mut raw = target.as_os_str().to_owned();
    raw.push(LOCK_SUFFIX);
    PathBuf::from(raw)
}

impl LockFile {
    /// Create `<path>.lock` exclusively, failing if it already exists.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_path = lock_path_for(&path);

        let opened = OpenOptions::new().write(true).create_new(true).open(&lock_path);
        let file = opened.map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => {
                UtilError::Lock(LockError::AlreadyLocked { path: lock_path.clone() })
            }
            _ => UtilError::Lock(LockError::Create { path: lock_path.clone(), source: e }),
        })?;

        Ok(Self { path, lock_path, guard: Guard::Held(file) })
    }

    /// Like [`acquire`](Self::acquire), but a held lock is `Ok(None)` rather
    /// than an error.
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Option<Self>> {
        match Self::acquire(path) {
            Ok(lock) => Ok(Some(lock)),
            Err(UtilError::Lock(LockError::AlreadyLocked { .. })) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn file_mut(&mut self) -> Option<&mut File> {
        match &mut self.guard {
            Guard::Held(file) => Some(file),
            Guard::Settled => None,
        }
    }

    /// The path this lock guards (without the `.lock` suffix).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn wrap_io(&self, source: io::Error) -> UtilError {
        UtilError::Lock(LockError::Commit { path: self.lock_path.clone(), source })
    }

    /// Flush, fsync, and atomically rename the lock file onto its target.
    pub fn commit(mut self) -> Result<()> {
        let flush_result = if let Guard::Held(file) = &mut self.guard {
            Some(file.flush().and_then(|_| file.sync_all()))
        } else {
            None
        };
        self.guard = Guard::Settled;

        if let Some(r) = flush_result {
            r.map_err(|e| self.wrap_io(e))?;
        }

        fs::rename(&self.lock_path, &self.path).map_err(|e| self.wrap_io(e))
    }

    /// Discard the lock file without touching the target. Equivalent to
    /// letting the `LockFile` drop, but surfaces I/O errors instead of
    /// swallowing them.
    pub fn rollback(mut self) -> Result<()> {
        self.guard = Guard::Settled;
        match fs::remove_file(&self.lock_path) {
            Ok(()) => Ok(()),
            Err(_) if !self.lock_path.exists() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Write for LockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut().ok_or_else(|| io::Error::other("lock file already closed"))?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file_mut().ok_or_else(|| io::Error::other("lock file already closed"))?.flush()
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if matches!(self.guard, Guard::Held(_)) {
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_replaces_target_and_removes_lock() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("test.txt");
        fs::write(&target, b"old content").unwrap();

        let mut lock = LockFile::acquire(&target).unwrap();
        assert!(lock.lock_path().exists());
        lock.write_all(b"new content").unwrap();
        lock.commit().unwrap();

        assert!(!dir.path().join("test.txt.lock").exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "new content");
    }

    #[test]
    fn rollback_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("test.txt");
        fs::write(&target, b"original").unwrap();

        let mut lock = LockFile::acquire(&target).unwrap();
        lock.write_all(b"should not persist").unwrap();
        lock.rollback().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
        assert!(!dir.path().join("test.txt.lock").exists());
    }

    #[test]
    fn dropping_without_commit_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("test.txt");
        fs::write(&target, b"original").unwrap();

        {
            let mut lock = LockFile::acquire(&target).unwrap();
            lock.write_all(b"dropped content").unwrap();
        }

        assert!(!dir.path().join("test.txt.lock").exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
    }

    #[test]
    fn second_acquire_on_held_lock_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("test.txt");
        fs::write(&target, b"content").unwrap();

        let _lock1 = LockFile::acquire(&target).unwrap();
        match LockFile::acquire(&target) {
            Err(UtilError::Lock(LockError::AlreadyLocked { .. })) => {}
            other => panic!("expected AlreadyLocked, got {other:?}"),
        }
    }

    #[test]
    fn try_acquire_on_held_lock_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("test.txt");
        fs::write(&target, b"content").unwrap();

        let _lock1 = LockFile::acquire(&target).unwrap();
        assert!(LockFile::try_acquire(&target).unwrap().is_none());
    }

    #[test]
    fn lock_can_create_a_brand_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new_file.txt");

        let mut lock = LockFile::acquire(&target).unwrap();
        lock.write_all(b"created via lock").unwrap();
        lock.commit().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "created via lock");
    }
}
