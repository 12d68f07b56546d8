//! The object model: blob, tree, commit, and tag — parsing from and
//! serializing to their canonical on-disk representation, plus the header
//! framing and LRU cache shared by the object database.

mod blob;
mod commit;
pub mod header;
mod tag;
mod tree;
pub mod cache;

pub use blob::Blob;
pub use commit::Commit;
pub use tag::Tag;
pub use tree::{FileMode, Tree, TreeEntry};

use bstr::BString;
use lit_hash::HashError;
pub use lit_hash::ObjectId;

/// Errors produced when parsing or serializing an object.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid object type: {0}")]
    InvalidType(BString),

    #[error("invalid object header: {0}")]
    InvalidHeader(String),

    #[error("truncated object: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid tree entry at offset {offset}: {reason}")]
    InvalidTreeEntry { offset: usize, reason: String },

    #[error("invalid commit: missing '{field}' header")]
    MissingCommitField { field: &'static str },

    #[error("invalid tag: missing '{field}' header")]
    MissingTagField { field: &'static str },

    #[error("invalid file mode: {0}")]
    InvalidFileMode(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// The four object kinds lit stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    /// Parse from the type token in an object header.
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        match s {
            b"blob" => Ok(Self::Blob),
            b"tree" => Ok(Self::Tree),
            b"commit" => Ok(Self::Commit),
            b"tag" => Ok(Self::Tag),
            _ => Err(ObjectError::InvalidType(BString::from(s))),
        }
    }

    /// The canonical byte representation used in headers.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Blob => b"blob",
            Self::Tree => b"tree",
            Self::Commit => b"commit",
            Self::Tag => b"tag",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        })
    }
}

impl std::str::FromStr for ObjectType {
    type Err = ObjectError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

/// A fully parsed object of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// Parse from raw bytes including the `"<type> <size>\0"` header.
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let (obj_type, content_size, header_len) = header::parse_header(data)?;
        let content = &data[header_len..];
        if content.len() < content_size {
            return Err(ObjectError::Truncated {
                expected: content_size,
                actual: content.len(),
            });
        }
        Self::parse_content(obj_type, &content[..content_size])
    }

    /// Parse content bytes of a known type (no header).
    pub fn parse_content(obj_type: ObjectType, content: &[u8]) -> Result<Self, ObjectError> {
        match obj_type {
            ObjectType::Blob => Ok(Self::Blob(Blob::parse(content)?)),
            ObjectType::Tree => Ok(Self::Tree(Tree::parse(content)?)),
            ObjectType::Commit => Ok(Self::Commit(Commit::parse(content)?)),
            ObjectType::Tag => Ok(Self::Tag(Tag::parse(content)?)),
        }
    }

    /// Serialize to the canonical on-disk form (header + content).
    pub fn serialize(&self) -> Vec<u8> {
        let content = self.serialize_content();
        let hdr = header::write_header(self.object_type(), content.len());
        let mut out = Vec::with_capacity(hdr.len() + content.len());
        out.extend_from_slice(&hdr);
        out.extend_from_slice(&content);
        out
    }

    /// Serialize just the content, without the header.
    pub fn serialize_content(&self) -> Vec<u8> {
        match self {
            Self::Blob(b) => b.serialize_content().to_vec(),
            Self::Tree(t) => t.serialize_content(),
            Self::Commit(c) => c.serialize_content(),
            Self::Tag(t) => t.serialize_content(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Blob(_) => ObjectType::Blob,
            Self::Tree(_) => ObjectType::Tree,
            Self::Commit(_) => ObjectType::Commit,
            Self::Tag(_) => ObjectType::Tag,
        }
    }

    /// Compute the OID this object would have on disk.
    pub fn compute_oid(&self) -> Result<ObjectId, HashError> {
        let content = self.serialize_content();
        lit_hash::hasher::Hasher::hash_object(
            std::str::from_utf8(self.object_type().as_bytes()).unwrap(),
            &content,
        )
    }

    /// Size of the content, excluding the header.
    pub fn content_size(&self) -> usize {
        match self {
            Self::Blob(b) => b.data.len(),
            Self::Tree(t) => t.serialize_content().len(),
            Self::Commit(c) => c.serialize_content().len(),
            Self::Tag(t) => t.serialize_content().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_from_bytes() {
        assert_eq!(ObjectType::from_bytes(b"blob").unwrap(), ObjectType::Blob);
        assert_eq!(ObjectType::from_bytes(b"tree").unwrap(), ObjectType::Tree);
        assert_eq!(
            ObjectType::from_bytes(b"commit").unwrap(),
            ObjectType::Commit
        );
        assert_eq!(ObjectType::from_bytes(b"tag").unwrap(), ObjectType::Tag);
        assert!(ObjectType::from_bytes(b"unknown").is_err());
    }

    #[test]
    fn object_type_display() {
        assert_eq!(ObjectType::Blob.to_string(), "blob");
        assert_eq!(ObjectType::Commit.to_string(), "commit");
    }

    #[test]
    fn object_type_from_str() {
        assert_eq!("tree".parse::<ObjectType>().unwrap(), ObjectType::Tree);
        assert!("invalid".parse::<ObjectType>().is_err());
    }

    #[test]
    fn object_type_as_bytes() {
        assert_eq!(ObjectType::Blob.as_bytes(), b"blob");
        assert_eq!(ObjectType::Tag.as_bytes(), b"tag");
    }

    #[test]
    fn blob_roundtrip_through_object() {
        let obj = Object::Blob(Blob::new(b"hello\n".to_vec()));
        let serialized = obj.serialize();
        let parsed = Object::parse(&serialized).unwrap();
        assert_eq!(obj, parsed);
        assert_eq!(
            obj.compute_oid().unwrap().to_hex(),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }
}
