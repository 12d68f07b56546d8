//! Conflict recording in the index and working tree.
//!
//! When a merge produces conflicts, this module writes conflict markers to
//! the working tree and records stage entries (1=base, 2=ours, 3=theirs) in
//! the index.

use std::fs;
use std::path::Path;

use bstr::{BStr, BString};
use lit_hash::ObjectId;
use lit_index::{EntryFlags, Index, IndexEntry, Stage, StatData};
use lit_object::{Blob, FileMode, Object};
use lit_odb::ObjectDatabase;

use crate::{ConflictEntry, MergeError};

/// Write conflict markers to a file in the working tree.
pub fn write_conflict_markers(work_tree: &Path, path: &BStr, content: &[u8]) -> Result<(), MergeError> {
    write_file(work_tree, path, content)
}

/// Write clean merged content to a file in the working tree.
pub fn write_merged_content(work_tree: &Path, path: &BStr, content: &[u8]) -> Result<(), MergeError> {
    write_file(work_tree, path, content)
}

fn write_file(work_tree: &Path, path: &BStr, content: &[u8]) -> Result<(), MergeError> {
    let file_path = work_tree.join(path.to_string());
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(())
}

/// Record conflict stages (1=base, 2=ours, 3=theirs) in the index.
///
/// Removes any existing stage-0 entry for the path and adds the stage
/// entries present on the given conflict.
pub fn record_conflict_in_index(index: &mut Index, conflict: &ConflictEntry) {
    let path: &BStr = conflict.path.as_ref();
    index.remove(path, Stage::Normal);

    if let Some(ref base) = conflict.base {
        index.add(stage_entry(conflict.path.clone(), base.oid, base.mode, Stage::Base));
    }
    if let Some(ref ours) = conflict.ours {
        index.add(stage_entry(conflict.path.clone(), ours.oid, ours.mode, Stage::Ours));
    }
    if let Some(ref theirs) = conflict.theirs {
        index.add(stage_entry(conflict.path.clone(), theirs.oid, theirs.mode, Stage::Theirs));
    }
}

fn stage_entry(path: BString, oid: ObjectId, mode: FileMode, stage: Stage) -> IndexEntry {
    IndexEntry { path, oid, mode, stage, stat: StatData::default(), flags: EntryFlags::default() }
}

/// Record a clean merge result in the index (stage 0).
///
/// Writes the blob to the object database, clears any conflict stages, and
/// sets a single stage-0 entry.
pub fn record_clean_merge_in_index(
    index: &mut Index,
    odb: &ObjectDatabase,
    path: &BStr,
    content: &[u8],
    mode: FileMode,
) -> Result<ObjectId, MergeError> {
    let oid = odb.write(&Object::Blob(Blob::new(content.to_vec())))?;

    index.remove(path, Stage::Base);
    index.remove(path, Stage::Ours);
    index.remove(path, Stage::Theirs);
    index.add(stage_entry(BString::from(path), oid, mode, Stage::Normal));

    Ok(oid)
}

/// Remove all conflict stages for a path and add a resolved stage-0 entry.
///
/// This is what `add <file>` does after the working-tree copy has been
/// hand-resolved.
pub fn resolve_conflict(index: &mut Index, path: &BStr, oid: ObjectId, mode: FileMode) {
    index.remove(path, Stage::Base);
    index.remove(path, Stage::Ours);
    index.remove(path, Stage::Theirs);
    index.add(stage_entry(BString::from(path), oid, mode, Stage::Normal));
}
