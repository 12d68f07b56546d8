//! Loose object storage: read, write, and enumerate zlib-compressed objects.
//!
//! Each loose object lives at `objects/XX/YYYY...` where `XX` is the first
//! byte of the OID in hex and `YYYY...` is the rest. The file content is
//! zlib-compressed `"<type> <size>\0<content>"`.

mod enumerate;
mod read;
mod stream;
mod write;

pub use enumerate::LooseObjectIter;
pub use stream::LooseObjectStream;

use lit_hash::ObjectId;
use std::path::{Path, PathBuf};

/// Interface to a repository's loose object directory.
#[derive(Debug)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    compression_level: flate2::Compression,
}

impl LooseObjectStore {
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression_level: flate2::Compression::default(),
        }
    }

    /// Set the zlib compression level (0-9).
    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = flate2::Compression::new(level);
    }

    /// The on-disk path a given OID would live at.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.loose_path())
    }
}

/// Errors from loose object operations.
#[derive(Debug, thiserror::Error)]
pub enum LooseError {
    #[error("corrupt loose object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("decompression error for {oid}: {source}")]
    Decompress {
        oid: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hash mismatch for {path}: expected {expected}, got {actual}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("object parse error: {0}")]
    Object(#[from] lit_object::ObjectError),

    #[error("hash error: {0}")]
    Hash(#[from] lit_hash::HashError),
}
