//! `RefStore` trait and the atomic, CAS-based `RefTransaction`.

use lit_hash::ObjectId;

use crate::error::RefError;
use crate::name::RefName;
use crate::reflog::ReflogEntry;
use crate::Reference;

/// Pluggable reference storage backend.
///
/// The default (and only) implementation is [`crate::FilesRefStore`], which
/// stores every ref as a loose file under `.lit/refs/`.
pub trait RefStore: Send + Sync {
    /// Resolve a ref name to a [`Reference`] (Direct or Symbolic), one hop.
    fn resolve(&self, name: &RefName) -> Result<Option<Reference>, RefError>;

    /// Resolve a ref name to its final OID, following symbolic chains.
    fn resolve_to_oid(&self, name: &RefName) -> Result<Option<ObjectId>, RefError>;

    /// Iterate refs with an optional prefix filter, sorted by full name.
    fn iter(
        &self,
        prefix: Option<&str>,
    ) -> Result<Box<dyn Iterator<Item = Result<Reference, RefError>> + '_>, RefError>;

    /// Read the reflog for a ref.
    fn reflog(&self, name: &RefName) -> Result<Vec<ReflogEntry>, RefError>;

    /// Append a reflog entry for a ref.
    fn append_reflog(&self, name: &RefName, entry: &ReflogEntry) -> Result<(), RefError>;
}

/// Atomic batch of ref updates: all succeed or all fail.
pub struct RefTransaction {
    pub(crate) updates: Vec<RefUpdate>,
}

/// A single update within a transaction.
pub struct RefUpdate {
    pub name: RefName,
    pub action: RefUpdateAction,
    pub reflog_message: Option<String>,
}

/// The action to perform on a ref within a transaction.
pub enum RefUpdateAction {
    /// Create a new ref (fails if it already exists).
    Create { new_target: ObjectId },
    /// Update an existing ref with a compare-and-swap check.
    Update {
        old_target: ObjectId,
        new_target: ObjectId,
    },
    /// Delete a ref with a compare-and-swap check.
    Delete { old_target: ObjectId },
    /// Point a symbolic ref at another ref.
    SetSymbolic { target: RefName },
}

impl RefTransaction {
    pub fn new() -> Self {
        Self { updates: Vec::new() }
    }

    pub fn update(&mut self, name: RefName, old: ObjectId, new: ObjectId, message: impl Into<String>) {
        self.updates.push(RefUpdate {
            name,
            action: RefUpdateAction::Update {
                old_target: old,
                new_target: new,
            },
            reflog_message: Some(message.into()),
        });
    }

    pub fn create(&mut self, name: RefName, target: ObjectId, message: impl Into<String>) {
        self.updates.push(RefUpdate {
            name,
            action: RefUpdateAction::Create { new_target: target },
            reflog_message: Some(message.into()),
        });
    }

    pub fn delete(&mut self, name: RefName, old: ObjectId, message: impl Into<String>) {
        self.updates.push(RefUpdate {
            name,
            action: RefUpdateAction::Delete { old_target: old },
            reflog_message: Some(message.into()),
        });
    }

    pub fn set_symbolic(&mut self, name: RefName, target: RefName, message: impl Into<String>) {
        self.updates.push(RefUpdate {
            name,
            action: RefUpdateAction::SetSymbolic { target },
            reflog_message: Some(message.into()),
        });
    }

    pub fn updates(&self) -> &[RefUpdate] {
        &self.updates
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

impl Default for RefTransaction {
    fn default() -> Self {
        Self::new()
    }
}
