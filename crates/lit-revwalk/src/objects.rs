//! Object listing: enumerate objects reachable from a set of commits but
//! not from another set — the "have" computation `fetch`/`push` need to
//! find what to transfer.

use std::collections::HashSet;

use lit_hash::ObjectId;
use lit_object::Object;
use lit_odb::ObjectDatabase;

use crate::RevWalkError;

/// List all objects (commits, trees, blobs) reachable from `include` but
/// not reachable from `exclude`.
pub fn list_objects(
    odb: &ObjectDatabase,
    include: &[ObjectId],
    exclude: &[ObjectId],
) -> Result<Vec<ObjectId>, RevWalkError> {
    let mut excluded = HashSet::new();
    for oid in exclude {
        collect_reachable(odb, oid, &mut excluded)?;
    }

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for oid in include {
        collect_reachable_into(odb, oid, &mut seen, &excluded, &mut result)?;
    }

    Ok(result)
}

fn collect_reachable(odb: &ObjectDatabase, start: &ObjectId, seen: &mut HashSet<ObjectId>) -> Result<(), RevWalkError> {
    let mut stack = vec![*start];
    while let Some(oid) = stack.pop() {
        if !seen.insert(oid) {
            continue;
        }
        let obj = match odb.read(&oid)? {
            Some(obj) => obj,
            None => continue,
        };
        push_children(&obj, &mut stack);
    }
    Ok(())
}

fn collect_reachable_into(
    odb: &ObjectDatabase,
    start: &ObjectId,
    seen: &mut HashSet<ObjectId>,
    excluded: &HashSet<ObjectId>,
    result: &mut Vec<ObjectId>,
) -> Result<(), RevWalkError> {
    let mut stack = vec![*start];
    while let Some(oid) = stack.pop() {
        if !seen.insert(oid) || excluded.contains(&oid) {
            continue;
        }
        let obj = match odb.read(&oid)? {
            Some(obj) => obj,
            None => continue,
        };
        result.push(oid);
        push_children(&obj, &mut stack);
    }
    Ok(())
}

fn push_children(obj: &Object, stack: &mut Vec<ObjectId>) {
    match obj {
        Object::Commit(commit) => {
            stack.push(commit.tree);
            stack.extend(&commit.parents);
        }
        Object::Tree(tree) => {
            stack.extend(tree.entries.iter().map(|e| e.oid));
        }
        Object::Blob(_) => {}
        Object::Tag(tag) => stack.push(tag.target),
    }
}
