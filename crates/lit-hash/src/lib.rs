//! Object identity for the lit version control core.
//!
//! Every stored object is identified by the SHA-1 digest of its serialized
//! header and content (`"<type> <len>\0<payload>"`). This crate owns that
//! identity type (`ObjectId`), hex encoding/decoding, and a streaming hasher
//! with collision detection.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use oid::ObjectId;

/// Length in bytes of a raw object id.
pub const OID_BYTES: usize = 20;
/// Length in hex characters of an object id.
pub const OID_HEX_LEN: usize = OID_BYTES * 2;
