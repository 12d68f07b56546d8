//! OID prefix resolution (short hex -> full OID with ambiguity detection).

use lit_hash::{ObjectId, OID_HEX_LEN};

use crate::{ObjectDatabase, OdbError};

/// Minimum prefix length (matches C git's MINIMUM_ABBREV).
const MINIMUM_ABBREV: usize = 4;

/// Resolve a hex prefix to a full OID.
///
/// Returns `Ambiguous` if more than one object matches, `NotFound` if
/// none does.
pub fn resolve_prefix(odb: &ObjectDatabase, prefix: &str) -> Result<ObjectId, OdbError> {
    if prefix.len() < MINIMUM_ABBREV {
        return Err(OdbError::Ambiguous {
            prefix: prefix.to_string(),
            count: 0,
        });
    }

    if !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(OdbError::NotFound(ObjectId::NULL));
    }

    if prefix.len() == OID_HEX_LEN {
        let oid = ObjectId::from_hex(prefix).map_err(|_| OdbError::NotFound(ObjectId::NULL))?;
        return if odb.contains(&oid) {
            Ok(oid)
        } else {
            Err(OdbError::NotFound(oid))
        };
    }

    let mut matches: Vec<ObjectId> = Vec::new();
    for result in odb.iter_all_oids()? {
        let oid = result?;
        if oid.starts_with_hex(prefix) {
            matches.push(oid);
        }
    }

    matches.sort();
    matches.dedup();

    match matches.len() {
        0 => Err(OdbError::NotFound(ObjectId::NULL)),
        1 => Ok(matches[0]),
        n => Err(OdbError::Ambiguous {
            prefix: prefix.to_string(),
            count: n,
        }),
    }
}
