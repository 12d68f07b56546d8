use std::fmt;
use std::str::FromStr;

use crate::hex::{hex_decode, hex_to_string};
use crate::{HashError, OID_BYTES, OID_HEX_LEN};

/// A content-addressed object identifier: the SHA-1 digest of an object's
/// serialized header and payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OID_BYTES]);

impl ObjectId {
    /// The null (all-zeros) OID, used as a sentinel for "ref does not exist yet".
    pub const NULL: Self = Self([0u8; OID_BYTES]);

    /// Construct from raw digest bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != OID_BYTES {
            return Err(HashError::InvalidHashLength {
                expected: OID_BYTES,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; OID_BYTES];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Construct from a 40-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        if hex.len() != OID_HEX_LEN {
            return Err(HashError::InvalidHexLength {
                expected: OID_HEX_LEN,
                actual: hex.len(),
            });
        }
        let mut bytes = [0u8; OID_BYTES];
        hex_decode(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; OID_BYTES] {
        &self.0
    }

    /// Whether this is the null OID.
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex_to_string(&self.0)
    }

    /// First byte of the digest (used to fan out loose object directories).
    pub fn first_byte(&self) -> u8 {
        self.0[0]
    }

    /// Whether this OID's hex form starts with `prefix` (case-insensitively).
    pub fn starts_with_hex(&self, prefix: &str) -> bool {
        self.to_hex().starts_with(&prefix.to_ascii_lowercase())
    }

    /// Loose object path component: `"xx/yyyy..."`.
    pub fn loose_path(&self) -> String {
        let hex = self.to_hex();
        format!("{}/{}", &hex[..2], &hex[2..])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.to_hex()[..8])
    }
}

impl FromStr for ObjectId {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const HEX: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

    #[test]
    fn from_hex_roundtrip() {
        let oid = ObjectId::from_hex(HEX).unwrap();
        assert_eq!(oid.to_string(), HEX);
        let parsed: ObjectId = oid.to_string().parse().unwrap();
        assert_eq!(parsed, oid);
    }

    #[test]
    fn debug_shows_short_hash() {
        let oid = ObjectId::from_hex(HEX).unwrap();
        assert_eq!(format!("{oid:?}"), "ObjectId(da39a3ee)");
    }

    #[test]
    fn ordering_and_hashmap_key() {
        let a = ObjectId::from_hex("0000000000000000000000000000000000000001").unwrap();
        let b = ObjectId::from_hex("0000000000000000000000000000000000000002").unwrap();
        assert!(a < b);
        let mut map = HashMap::new();
        map.insert(a, "value");
        assert_eq!(map.get(&a), Some(&"value"));
    }

    #[test]
    fn null_oid() {
        assert!(ObjectId::NULL.is_null());
        let non_null = ObjectId::from_hex(HEX).unwrap();
        assert!(!non_null.is_null());
    }

    #[test]
    fn from_bytes_wrong_length() {
        let err = ObjectId::from_bytes(&[0; 10]).unwrap_err();
        assert!(matches!(
            err,
            HashError::InvalidHashLength {
                expected: 20,
                actual: 10
            }
        ));
    }

    #[test]
    fn invalid_hex_length() {
        let err = ObjectId::from_hex("abcd").unwrap_err();
        assert!(matches!(err, HashError::InvalidHexLength { .. }));
    }

    #[test]
    fn case_insensitive_decode() {
        let lower = ObjectId::from_hex(HEX).unwrap();
        let upper = ObjectId::from_hex(&HEX.to_ascii_uppercase()).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn starts_with_hex_prefix() {
        let oid = ObjectId::from_hex(HEX).unwrap();
        assert!(oid.starts_with_hex("da39"));
        assert!(oid.starts_with_hex("DA39"));
        assert!(!oid.starts_with_hex("abcd"));
    }

    #[test]
    fn loose_path() {
        let oid = ObjectId::from_hex(HEX).unwrap();
        assert_eq!(oid.loose_path(), format!("da/{}", &HEX[2..]));
    }
}
