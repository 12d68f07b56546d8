use crate::{HashError, ObjectId};

/// Streaming SHA-1 computation with collision detection.
///
/// Wraps `sha1_checked` behind a narrow interface: feed data incrementally
/// with [`update`](Hasher::update) or the [`std::io::Write`] impl, then
/// finalize into an [`ObjectId`].
pub struct Hasher(Box<sha1_checked::Sha1>);

impl Hasher {
    pub fn new() -> Self {
        use digest::Digest;
        Self(Box::new(sha1_checked::Sha1::new()))
    }

    /// Feed data into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        use digest::Digest;
        self.0.update(data);
    }

    /// Finalize and return the resulting object id.
    ///
    /// Returns an error if collision detection fires — a signal that the
    /// object store itself may be under attack, not a normal failure mode.
    pub fn finalize(self) -> Result<ObjectId, HashError> {
        let result = self.0.try_finalize();
        if result.has_collision() {
            return Err(HashError::Sha1Collision);
        }
        ObjectId::from_bytes(result.hash().as_slice())
    }

    /// Hash a byte slice in one call.
    pub fn digest(data: &[u8]) -> Result<ObjectId, HashError> {
        let mut h = Self::new();
        h.update(data);
        h.finalize()
    }

    /// Hash a git-style object: `"{type} {len}\0{content}"`.
    pub fn hash_object(obj_type: &str, data: &[u8]) -> Result<ObjectId, HashError> {
        let header = format!("{obj_type} {}\0", data.len());
        let mut h = Self::new();
        h.update(header.as_bytes());
        h.update(data);
        h.finalize()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_empty() {
        let oid = Hasher::digest(b"").unwrap();
        // SHA-1 of the empty string.
        assert_eq!(oid.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn hash_object_matches_git_blob_convention() {
        let oid = Hasher::hash_object("blob", b"hello\n").unwrap();
        // `printf 'hello\n' | git hash-object --stdin`
        assert_eq!(oid.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut h = Hasher::new();
        h.update(b"hel");
        h.update(b"lo");
        let incremental = h.finalize().unwrap();
        let oneshot = Hasher::digest(b"hello").unwrap();
        assert_eq!(incremental, oneshot);
    }
}
