//! Foundation utilities shared by every layer of the lit core: path
//! normalization, the lock-file protocol used by the index/refs/config
//! stores, identity/timestamp parsing, and gitignore-style glob matching.

pub mod date;
pub mod error;
pub mod lockfile;
pub mod path;
pub mod wildmatch;

pub use bstr::{BStr, BString, ByteSlice, ByteVec};
pub use error::{LockError, UtilError};

pub type Result<T> = std::result::Result<T, UtilError>;