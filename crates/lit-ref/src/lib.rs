//! Reference store: HEAD, branches, tags, and remote-tracking refs.
//!
//! Every ref is a loose file under `.lit/refs/` or a special ref at the
//! repo-dir root (`.lit/HEAD`, `.lit/MERGE_HEAD`, ...) — there is no
//! packed-refs format. [`FilesRefStore`] is the (only) backend; the
//! [`RefStore`] trait is kept pluggable at the seam the teacher put it,
//! even though lit ships a single implementation.

mod error;
pub mod files;
mod name;
pub mod reflog;
mod store;

pub use error::RefError;
pub use files::FilesRefStore;
pub use name::RefName;
pub use reflog::ReflogEntry;
pub use store::{RefStore, RefTransaction, RefUpdate, RefUpdateAction};

/// A git reference: either direct (points straight at an object) or
/// symbolic (points at another ref, e.g. `HEAD` -> `refs/heads/main`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Direct {
        name: RefName,
        target: lit_hash::ObjectId,
    },
    Symbolic {
        name: RefName,
        target: RefName,
    },
}

impl Reference {
    pub fn name(&self) -> &RefName {
        match self {
            Reference::Direct { name, .. } => name,
            Reference::Symbolic { name, .. } => name,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Reference::Symbolic { .. })
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Reference::Direct { .. })
    }

    pub fn target_oid(&self) -> Option<lit_hash::ObjectId> {
        match self {
            Reference::Direct { target, .. } => Some(*target),
            Reference::Symbolic { .. } => None,
        }
    }

    pub fn symbolic_target(&self) -> Option<&RefName> {
        match self {
            Reference::Symbolic { target, .. } => Some(target),
            Reference::Direct { .. } => None,
        }
    }

    /// Resolve to a direct OID, following one symbolic hop through `store`.
    pub fn peel_to_oid(&self, store: &dyn RefStore) -> Result<lit_hash::ObjectId, RefError> {
        match self {
            Reference::Direct { target, .. } => Ok(*target),
            Reference::Symbolic { target, .. } => store
                .resolve_to_oid(target)?
                .ok_or_else(|| RefError::NotFound(target.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_reference_accessors() {
        let name = RefName::new("refs/heads/main").unwrap();
        let oid = lit_hash::ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        let r = Reference::Direct { name: name.clone(), target: oid };
        assert!(r.is_direct());
        assert!(!r.is_symbolic());
        assert_eq!(r.target_oid(), Some(oid));
        assert_eq!(r.name(), &name);
    }

    #[test]
    fn symbolic_reference_accessors() {
        let name = RefName::new("HEAD").unwrap();
        let target = RefName::new("refs/heads/main").unwrap();
        let r = Reference::Symbolic { name, target: target.clone() };
        assert!(r.is_symbolic());
        assert_eq!(r.symbolic_target(), Some(&target));
        assert_eq!(r.target_oid(), None);
    }

    #[test]
    fn peel_symbolic_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesRefStore::new(dir.path());

        let main = RefName::new("refs/heads/main").unwrap();
        let oid = lit_hash::ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        store.write_ref(&main, &oid).unwrap();

        let head = Reference::Symbolic {
            name: RefName::new("HEAD").unwrap(),
            target: main,
        };
        assert_eq!(head.peel_to_oid(&store).unwrap(), oid);
    }
}
