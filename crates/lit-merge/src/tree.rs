//! Three-way tree merge.
//!
//! Diffs `base..ours` and `base..theirs` flat (lit-diff's tree diff already
//! recurses into subtrees), applies the per-path decision table to the
//! union of changed paths, and rebuilds the merged tree bottom-up. No
//! rename/copy detection: a path changed on one side and untouched on the
//! other is taken as-is, a path changed identically on both sides is taken
//! as-is, and a path changed differently on both sides is content-merged or
//! reported as a conflict.

use std::collections::{BTreeMap, HashMap};

use bstr::BString;
use lit_diff::tree::diff_trees;
use lit_diff::{DiffOptions, FileDiff, FileStatus};
use lit_hash::ObjectId;
use lit_object::{Blob, FileMode, Object, Tree, TreeEntry};
use lit_odb::ObjectDatabase;

use crate::content::{merge_content, MergeLabels};
use crate::{AutoResolve, ConflictEntry, ConflictSide, ConflictType, ContentMergeResult, MergeError, MergeOptions, MergeResult};

/// Merge `ours` and `theirs` against their common `base` (`None` for a
/// merge with an empty ancestor, e.g. cherry-picking a root commit).
pub fn merge_trees(
    odb: &ObjectDatabase,
    base: Option<&ObjectId>,
    ours: &ObjectId,
    theirs: &ObjectId,
    options: &MergeOptions,
) -> Result<MergeResult, MergeError> {
    let diff_opts = DiffOptions::default();
    let ours_changes = index_by_path(diff_trees(odb, base, Some(ours), &diff_opts)?.files);
    let theirs_changes = index_by_path(diff_trees(odb, base, Some(theirs), &diff_opts)?.files);

    let mut flat = match base {
        Some(oid) => flatten_tree(odb, oid)?,
        None => BTreeMap::new(),
    };

    let mut paths: Vec<BString> = ours_changes.keys().chain(theirs_changes.keys()).cloned().collect();
    paths.sort();
    paths.dedup();

    let mut conflicts = Vec::new();

    for path in &paths {
        let o = ours_changes.get(path);
        let t = theirs_changes.get(path);

        match (o, t) {
            (Some(o), None) => apply_change(&mut flat, path, o),
            (None, Some(t)) => apply_change(&mut flat, path, t),
            (Some(o), Some(t)) => {
                if final_state(o) == final_state(t) {
                    apply_change(&mut flat, path, o);
                } else {
                    resolve_conflict(odb, &mut flat, path, o, t, options, &mut conflicts)?;
                }
            }
            (None, None) => unreachable!("path came from one of the two change maps"),
        }
    }

    if conflicts.is_empty() {
        Ok(MergeResult::clean(write_flat_map_as_tree(odb, &flat)?))
    } else {
        Ok(MergeResult::conflicted(conflicts))
    }
}

fn index_by_path(files: Vec<FileDiff>) -> HashMap<BString, FileDiff> {
    files.into_iter().map(|f| (f.path().clone(), f)).collect()
}

fn final_state(diff: &FileDiff) -> Option<(ObjectId, FileMode)> {
    match diff.status {
        FileStatus::Deleted => None,
        _ => Some((
            diff.new_oid.expect("a non-deletion diff carries a new object id"),
            diff.new_mode.expect("a non-deletion diff carries a new mode"),
        )),
    }
}

fn apply_change(flat: &mut BTreeMap<BString, (ObjectId, FileMode)>, path: &BString, diff: &FileDiff) {
    match final_state(diff) {
        Some(state) => {
            flat.insert(path.clone(), state);
        }
        None => {
            flat.remove(path);
        }
    }
}

fn is_blob_mode(mode: Option<FileMode>) -> bool {
    mode.is_some_and(|m| m.is_blob())
}

/// Whether to prefer `ours` when a conflict is resolved at the whole-file
/// level (modify/delete, or a non-text conflict that cannot be diff3'd).
/// `Union` has no whole-file analogue, so it falls back to `ours`.
fn prefer_ours(resolution: AutoResolve) -> bool {
    match resolution {
        AutoResolve::Ours | AutoResolve::Union => true,
        AutoResolve::Theirs => false,
        AutoResolve::Recent { ours_date, theirs_date } => ours_date > theirs_date,
    }
}

fn resolve_conflict(
    odb: &ObjectDatabase,
    flat: &mut BTreeMap<BString, (ObjectId, FileMode)>,
    path: &BString,
    o: &FileDiff,
    t: &FileDiff,
    options: &MergeOptions,
    conflicts: &mut Vec<ConflictEntry>,
) -> Result<(), MergeError> {
    let base_entry = flat.get(path).copied();
    let ours_present = o.status != FileStatus::Deleted;
    let theirs_present = t.status != FileStatus::Deleted;

    if !ours_present || !theirs_present {
        if let Some(resolution) = options.auto_resolve {
            apply_change(flat, path, if prefer_ours(resolution) { o } else { t });
        } else {
            conflicts.push(make_conflict(path, ConflictType::ModifyDelete, base_entry, o, t));
        }
        return Ok(());
    }

    let conflict_type = if base_entry.is_none() { ConflictType::AddAdd } else { ConflictType::Content };
    let text_mergeable = is_blob_mode(o.new_mode) && is_blob_mode(t.new_mode) && !o.is_binary && !t.is_binary;

    if text_mergeable {
        let base_content = match base_entry {
            Some((oid, _)) => read_blob(odb, &oid)?,
            None => Vec::new(),
        };
        let ours_content = read_blob(odb, &o.new_oid.expect("blob diff carries new_oid"))?;
        let theirs_content = read_blob(odb, &t.new_oid.expect("blob diff carries new_oid"))?;

        let merged = merge_content(&base_content, &ours_content, &theirs_content, options.auto_resolve, &MergeLabels::default());

        match merged {
            ContentMergeResult::Clean(content) => {
                let oid = odb.write(&Object::Blob(Blob::new(content)))?;
                let mode = if o.new_mode == t.new_mode { o.new_mode.unwrap() } else { FileMode::Regular };
                flat.insert(path.clone(), (oid, mode));
            }
            ContentMergeResult::Conflict { .. } => {
                conflicts.push(make_conflict(path, conflict_type, base_entry, o, t));
            }
        }
        return Ok(());
    }

    if let Some(resolution) = options.auto_resolve {
        apply_change(flat, path, if prefer_ours(resolution) { o } else { t });
    } else {
        conflicts.push(make_conflict(path, conflict_type, base_entry, o, t));
    }
    Ok(())
}

fn make_conflict(path: &BString, conflict_type: ConflictType, base_entry: Option<(ObjectId, FileMode)>, o: &FileDiff, t: &FileDiff) -> ConflictEntry {
    ConflictEntry {
        path: path.clone(),
        conflict_type,
        base: base_entry.map(|(oid, mode)| ConflictSide { oid, mode, path: path.clone() }),
        ours: side_from_diff(o, path),
        theirs: side_from_diff(t, path),
    }
}

fn side_from_diff(diff: &FileDiff, path: &BString) -> Option<ConflictSide> {
    final_state(diff).map(|(oid, mode)| ConflictSide { oid, mode, path: path.clone() })
}

fn read_tree(odb: &ObjectDatabase, oid: &ObjectId) -> Result<Tree, MergeError> {
    match odb.read(oid)? {
        Some(Object::Tree(tree)) => Ok(tree),
        Some(other) => Err(MergeError::UnexpectedObjectType { oid: *oid, expected: "tree", actual: other.object_type().to_string() }),
        None => Err(MergeError::ObjectNotFound(*oid)),
    }
}

fn read_blob(odb: &ObjectDatabase, oid: &ObjectId) -> Result<Vec<u8>, MergeError> {
    match odb.read(oid)? {
        Some(Object::Blob(blob)) => Ok(blob.data),
        Some(other) => Err(MergeError::UnexpectedObjectType { oid: *oid, expected: "blob", actual: other.object_type().to_string() }),
        None => Err(MergeError::ObjectNotFound(*oid)),
    }
}

fn flatten_tree(odb: &ObjectDatabase, oid: &ObjectId) -> Result<BTreeMap<BString, (ObjectId, FileMode)>, MergeError> {
    let mut map = BTreeMap::new();
    flatten_into(odb, oid, &BString::from(""), &mut map)?;
    Ok(map)
}

fn flatten_into(
    odb: &ObjectDatabase,
    oid: &ObjectId,
    prefix: &BString,
    map: &mut BTreeMap<BString, (ObjectId, FileMode)>,
) -> Result<(), MergeError> {
    let tree = read_tree(odb, oid)?;
    for entry in &tree.entries {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            let mut p = prefix.clone();
            p.push(b'/');
            p.extend_from_slice(&entry.name);
            p
        };

        if entry.mode.is_tree() {
            flatten_into(odb, &entry.oid, &path, map)?;
        } else {
            map.insert(path, (entry.oid, entry.mode));
        }
    }
    Ok(())
}

fn write_flat_map_as_tree(odb: &ObjectDatabase, flat: &BTreeMap<BString, (ObjectId, FileMode)>) -> Result<ObjectId, MergeError> {
    let entries: Vec<(BString, ObjectId, FileMode)> = flat.iter().map(|(path, (oid, mode))| (path.clone(), *oid, *mode)).collect();
    if entries.is_empty() {
        return Ok(odb.write(&Object::Tree(Tree::new()))?);
    }
    build_tree_level(odb, &entries, 0)
}

/// Build one tree level from a lexicographically-sorted run of flat entries
/// sharing the same `prefix_len`-byte parent path. Entries under a common
/// next path segment are contiguous because `/` (0x2F) sorts below every
/// other path-name byte lit allows, so grouping by scanning forward is
/// sufficient.
fn build_tree_level(odb: &ObjectDatabase, entries: &[(BString, ObjectId, FileMode)], prefix_len: usize) -> Result<ObjectId, MergeError> {
    let mut tree_entries = Vec::new();
    let mut i = 0;

    while i < entries.len() {
        let rest = &entries[i].0.as_slice()[prefix_len..];

        match rest.iter().position(|&b| b == b'/') {
            None => {
                let (_, oid, mode) = &entries[i];
                tree_entries.push(TreeEntry { mode: *mode, name: BString::from(rest), oid: *oid });
                i += 1;
            }
            Some(slash_idx) => {
                let name = BString::from(&rest[..slash_idx]);
                let mut j = i + 1;
                while j < entries.len() {
                    let rest_j = &entries[j].0.as_slice()[prefix_len..];
                    if rest_j.len() > slash_idx && &rest_j[..slash_idx] == name.as_slice() && rest_j[slash_idx] == b'/' {
                        j += 1;
                    } else {
                        break;
                    }
                }
                let subtree = build_tree_level(odb, &entries[i..j], prefix_len + slash_idx + 1)?;
                tree_entries.push(TreeEntry { mode: FileMode::Tree, name, oid: subtree });
                i = j;
            }
        }
    }

    tree_entries.sort_by(TreeEntry::cmp_entries);
    Ok(odb.write(&Object::Tree(Tree { entries: tree_entries }))?)
}
