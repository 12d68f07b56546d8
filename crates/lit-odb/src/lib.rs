//! Unified object database.
//!
//! A thin, cache-fronted facade over the loose object store plus short-oid
//! prefix resolution. Lit keeps no packfiles and no alternates directories:
//! every object lives loose under `objects/`.

pub mod prefix;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lit_hash::ObjectId;
use lit_object::cache::ObjectCache;
use lit_object::{Object, ObjectType};

pub use error::OdbError;

mod error {
    use lit_hash::ObjectId;

    #[derive(Debug, thiserror::Error)]
    pub enum OdbError {
        #[error("object not found: {0}")]
        NotFound(ObjectId),

        #[error("ambiguous object name: {prefix} matches {count} objects")]
        Ambiguous { prefix: String, count: usize },

        #[error("corrupt object {oid}: {reason}")]
        Corrupt { oid: ObjectId, reason: String },

        #[error(transparent)]
        Loose(#[from] lit_loose::LooseError),

        #[error(transparent)]
        Io(#[from] std::io::Error),
    }
}

/// Lightweight object info (header only, no content).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub obj_type: ObjectType,
    pub size: usize,
}

/// Unified object database: loose storage plus an in-memory read cache.
#[derive(Debug)]
pub struct ObjectDatabase {
    loose: lit_loose::LooseObjectStore,
    cache: Mutex<ObjectCache>,
    objects_dir: PathBuf,
}

impl ObjectDatabase {
    /// Open the object database at the given objects directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        let objects_dir = objects_dir.as_ref().to_path_buf();
        Self {
            loose: lit_loose::LooseObjectStore::open(&objects_dir),
            cache: Mutex::new(ObjectCache::new(1024)),
            objects_dir,
        }
    }

    /// Read an object by OID.
    pub fn read(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError> {
        Ok(self.loose.read(oid)?)
    }

    /// Read an object, consulting the cache before touching disk.
    pub fn read_cached(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError> {
        {
            let mut cache = self.cache.lock().unwrap();
            if let Some(obj) = cache.get(oid) {
                return Ok(Some(obj.clone()));
            }
        }

        let obj = self.read(oid)?;

        if let Some(ref obj) = obj {
            let mut cache = self.cache.lock().unwrap();
            cache.insert(*oid, obj.clone());
        }

        Ok(obj)
    }

    /// Read just the header (type + size) without full decompression.
    pub fn read_header(&self, oid: &ObjectId) -> Result<Option<ObjectInfo>, OdbError> {
        Ok(self
            .loose
            .read_header(oid)?
            .map(|(obj_type, size)| ObjectInfo { obj_type, size }))
    }

    /// Check whether an object exists.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.loose.contains(oid)
    }

    /// Write a new object. No-op (returns the existing OID) if already present.
    pub fn write(&self, obj: &Object) -> Result<ObjectId, OdbError> {
        Ok(self.loose.write(obj)?)
    }

    /// Write raw content with a known type.
    pub fn write_raw(&self, obj_type: ObjectType, content: &[u8]) -> Result<ObjectId, OdbError> {
        Ok(self.loose.write_raw(obj_type, content)?)
    }

    /// Resolve a hex prefix (>=4 chars) to a full OID, or fail ambiguous/not-found.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<ObjectId, OdbError> {
        prefix::resolve_prefix(self, prefix)
    }

    /// Iterate over every known object OID (for fsck/count-objects).
    pub fn iter_all_oids(&self) -> Result<impl Iterator<Item = Result<ObjectId, OdbError>> + '_, OdbError> {
        Ok(self.loose.iter()?.map(|r| r.map_err(OdbError::from)))
    }

    /// The objects directory backing this database.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_object::Blob;

    #[test]
    fn write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        let obj = Object::Blob(Blob::new(b"odb test".to_vec()));
        let oid = odb.write(&obj).unwrap();
        assert!(odb.contains(&oid));
        assert_eq!(odb.read(&oid).unwrap().unwrap(), obj);
    }

    #[test]
    fn read_cached_populates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        let obj = Object::Blob(Blob::new(b"cache me".to_vec()));
        let oid = odb.write(&obj).unwrap();

        let first = odb.read_cached(&oid).unwrap().unwrap();
        let second = odb.read_cached(&oid).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_object_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        assert!(odb.read(&ObjectId::NULL).unwrap().is_none());
    }
}
