//! Cherry-pick: apply a single commit's changes onto another commit.
//!
//! Treats the commit's first parent as the merge base and the commit
//! itself as "theirs", then three-way merges against the target as
//! "ours". No ref updates or commit creation here: the caller (`lit-repo`)
//! takes the resulting tree and message and builds the new commit.

use lit_hash::ObjectId;
use lit_object::{Commit, Object};
use lit_odb::ObjectDatabase;

use crate::tree::merge_trees;
use crate::{MergeError, MergeOptions, MergeResult};

/// The outcome of a cherry-pick: the tree merge result plus the message to
/// carry onto the resulting commit (the cherry-picked commit's own message).
#[derive(Debug, Clone)]
pub struct CherryPickResult {
    pub merge: MergeResult,
    pub message: String,
}

/// Cherry-pick `commit_oid` onto `onto`.
pub fn cherry_pick(odb: &ObjectDatabase, onto: &ObjectId, commit_oid: &ObjectId, options: &MergeOptions) -> Result<CherryPickResult, MergeError> {
    let commit = read_commit(odb, commit_oid)?;
    let base_oid = *commit.parents.first().ok_or(MergeError::NoMergeBase)?;
    let base_commit = read_commit(odb, &base_oid)?;
    let onto_commit = read_commit(odb, onto)?;

    let merge = merge_trees(odb, Some(&base_commit.tree), &onto_commit.tree, &commit.tree, options)?;

    Ok(CherryPickResult { merge, message: commit.message.to_string() })
}

fn read_commit(odb: &ObjectDatabase, oid: &ObjectId) -> Result<Commit, MergeError> {
    match odb.read(oid)? {
        Some(Object::Commit(commit)) => Ok(commit),
        Some(other) => Err(MergeError::UnexpectedObjectType { oid: *oid, expected: "commit", actual: other.object_type().to_string() }),
        None => Err(MergeError::ObjectNotFound(*oid)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bstr::BString;
    use lit_object::{Blob, FileMode, Tree, TreeEntry};
    use lit_utils::date::{LitDate, Signature};

    fn sig() -> Signature {
        Signature { name: "a".into(), email: "a@example.com".into(), date: LitDate::new(1, 0) }
    }

    fn write_commit(odb: &ObjectDatabase, tree: ObjectId, parents: Vec<ObjectId>, message: &str) -> ObjectId {
        odb.write(&Object::Commit(Commit {
            tree,
            parents,
            author: sig(),
            committer: sig(),
            encoding: None,
            gpgsig: None,
            extra_headers: Vec::new(),
            message: message.into(),
        }))
        .unwrap()
    }

    fn write_tree_with(odb: &ObjectDatabase, name: &str, data: &[u8]) -> ObjectId {
        let blob = odb.write(&Object::Blob(Blob::new(data.to_vec()))).unwrap();
        odb.write(&Object::Tree(Tree { entries: vec![TreeEntry { mode: FileMode::Regular, name: BString::from(name), oid: blob }] })).unwrap()
    }

    #[test]
    fn cherry_pick_clean_applies_commit_diff() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());

        let root_tree = write_tree_with(&odb, "a.txt", b"base\n");
        let root = write_commit(&odb, root_tree, vec![], "root");

        let picked_tree = write_tree_with(&odb, "a.txt", b"picked\n");
        let picked = write_commit(&odb, picked_tree, vec![root], "add picked change");

        let onto_tree = write_tree_with(&odb, "b.txt", b"unrelated\n");
        let onto = write_commit(&odb, onto_tree, vec![root], "unrelated work");

        let result = cherry_pick(&odb, &onto, &picked, &MergeOptions::default()).unwrap();
        assert!(result.merge.is_clean);
        assert_eq!(result.message, "add picked change");
    }

    #[test]
    fn cherry_pick_root_commit_has_no_merge_base() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());

        let tree = write_tree_with(&odb, "a.txt", b"content\n");
        let root = write_commit(&odb, tree, vec![], "root");
        let onto = write_commit(&odb, tree, vec![], "other root");

        let err = cherry_pick(&odb, &onto, &root, &MergeOptions::default()).unwrap_err();
        assert!(matches!(err, MergeError::NoMergeBase));
    }
}
