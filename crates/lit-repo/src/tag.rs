//! Lightweight and annotated tags under `refs/tags/`.

use bstr::BString;
use lit_hash::ObjectId;
use lit_object::{Object, ObjectType, Tag};
use lit_ref::{RefName, RefStore, RefTransaction};
use lit_utils::date::Signature;

use crate::{RepoError, Repository};

/// One tag as reported by [`Repository::tag_list`].
#[derive(Debug, Clone)]
pub struct TagInfo {
    pub name: String,
    /// The tag object's own OID for an annotated tag, or the target commit's
    /// OID for a lightweight tag.
    pub oid: ObjectId,
    pub is_annotated: bool,
}

fn tag_ref(name: &str) -> Result<RefName, RepoError> {
    Ok(RefName::new(format!("refs/tags/{name}"))?)
}

impl Repository {
    /// Create a lightweight tag pointing directly at `target`.
    pub fn tag_create_lightweight(&mut self, name: &str, target: ObjectId) -> Result<(), RepoError> {
        let ref_name = tag_ref(name)?;
        if self.refs.resolve_to_oid(&ref_name)?.is_some() {
            return Err(RepoError::TagExists(name.to_string()));
        }
        let mut txn = RefTransaction::new();
        txn.create(ref_name, target, format!("tag: {name}"));
        self.refs.commit_transaction(txn)?;
        Ok(())
    }

    /// Create an annotated tag object pointing at `target`, then a ref
    /// pointing at the tag object.
    pub fn tag_create_annotated(
        &mut self,
        name: &str,
        target: ObjectId,
        target_type: ObjectType,
        message: impl Into<BString>,
        tagger: Signature,
    ) -> Result<ObjectId, RepoError> {
        let ref_name = tag_ref(name)?;
        if self.refs.resolve_to_oid(&ref_name)?.is_some() {
            return Err(RepoError::TagExists(name.to_string()));
        }

        let tag = Tag {
            target,
            target_type,
            tag_name: name.into(),
            tagger: Some(tagger),
            message: message.into(),
            gpgsig: None,
        };
        let tag_oid = self.odb.write(&Object::Tag(tag))?;

        let mut txn = RefTransaction::new();
        txn.create(ref_name, tag_oid, format!("tag: {name}"));
        self.refs.commit_transaction(txn)?;
        Ok(tag_oid)
    }

    /// Delete a tag.
    pub fn tag_delete(&mut self, name: &str) -> Result<ObjectId, RepoError> {
        let ref_name = tag_ref(name)?;
        let oid = self.refs.resolve_to_oid(&ref_name)?.ok_or_else(|| RepoError::TagNotFound(name.to_string()))?;
        let mut txn = RefTransaction::new();
        txn.delete(ref_name, oid, format!("tag: deleted {name}"));
        self.refs.commit_transaction(txn)?;
        Ok(oid)
    }

    /// List tags, sorted by name. Annotated tags are peeled to report
    /// whether their target is annotated; `oid` is always the ref's direct
    /// target (the tag object for annotated tags).
    pub fn tag_list(&self) -> Result<Vec<TagInfo>, RepoError> {
        let mut out = Vec::new();
        for reference in self.refs.iter(Some("refs/tags/"))? {
            let reference = reference?;
            let Some(oid) = reference.target_oid() else { continue };
            let is_annotated = matches!(self.odb.read(&oid)?, Some(Object::Tag(_)));
            out.push(TagInfo { name: reference.name().short_name().to_string(), oid, is_annotated });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    /// Resolve a tag to the commit it ultimately points at, peeling through
    /// an annotated tag object if needed.
    pub fn tag_peel_to_commit(&self, name: &str) -> Result<ObjectId, RepoError> {
        let ref_name = tag_ref(name)?;
        let oid = self.refs.resolve_to_oid(&ref_name)?.ok_or_else(|| RepoError::TagNotFound(name.to_string()))?;
        match self.odb.read(&oid)? {
            Some(Object::Tag(tag)) => Ok(tag.target),
            _ => Ok(oid),
        }
    }
}
