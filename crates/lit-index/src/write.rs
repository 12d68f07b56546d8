//! Index file writing and tree construction.

use std::io::Write as _;
use std::path::Path;

use lit_hash::hasher::Hasher;
use lit_hash::ObjectId;
use lit_object::{FileMode, ObjectType, Tree, TreeEntry};
use lit_odb::ObjectDatabase;
use lit_utils::lockfile::LockFile;

use crate::entry::IndexEntry;
use crate::{Index, IndexError, Stage};

const INDEX_SIGNATURE: &[u8; 4] = b"DIRC";

/// Write the index to a file atomically via the lock-file protocol.
pub fn write_index(index: &Index, path: &Path) -> Result<(), IndexError> {
    let mut lock = LockFile::acquire(path).map_err(|_| IndexError::LockFailed {
        path: path.to_path_buf(),
    })?;

    let data = serialize_index(index)?;
    lock.write_all(&data)?;
    lock.commit().map_err(|_| IndexError::LockFailed {
        path: path.to_path_buf(),
    })?;

    Ok(())
}

fn serialize_index(index: &Index) -> Result<Vec<u8>, IndexError> {
    let mut buf = Vec::new();

    buf.extend_from_slice(INDEX_SIGNATURE);
    buf.extend_from_slice(&2u32.to_be_bytes());
    buf.extend_from_slice(&(index.entries.len() as u32).to_be_bytes());

    for entry in index.iter() {
        write_entry(&mut buf, entry);
    }

    let checksum = Hasher::digest(&buf).map_err(|_| {
        IndexError::InvalidHeader("checksum computation failed".into())
    })?;
    buf.extend_from_slice(checksum.as_bytes());

    Ok(buf)
}

fn write_entry(buf: &mut Vec<u8>, entry: &IndexEntry) {
    let entry_start = buf.len();

    buf.extend_from_slice(&entry.stat.ctime_secs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.ctime_nsecs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.mtime_secs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.mtime_nsecs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.dev.to_be_bytes());
    buf.extend_from_slice(&entry.stat.ino.to_be_bytes());
    buf.extend_from_slice(&entry.mode.raw().to_be_bytes());
    buf.extend_from_slice(&entry.stat.uid.to_be_bytes());
    buf.extend_from_slice(&entry.stat.gid.to_be_bytes());
    buf.extend_from_slice(&entry.stat.size.to_be_bytes());

    buf.extend_from_slice(entry.oid.as_bytes());

    let name_len = std::cmp::min(entry.path.len(), 0xFFF) as u16;
    let mut flags: u16 = name_len;
    flags |= (entry.stage.as_u8() as u16) << 12;
    if entry.flags.assume_valid() {
        flags |= 0x8000;
    }
    buf.extend_from_slice(&flags.to_be_bytes());

    buf.extend_from_slice(&entry.path);

    let entry_size = (40 + 20 + 2 + entry.path.len() + 8) & !7;
    let current_len = buf.len() - entry_start;
    let padding = entry_size - current_len;
    for _ in 0..padding {
        buf.push(0);
    }
}

/// Build a tree hierarchy from the index's stage-0 entries.
///
/// Pure with respect to logical content: equal paths/modes/oids always
/// produce the same tree oid, regardless of stat data.
pub fn write_tree_from_index(index: &Index, odb: &ObjectDatabase) -> Result<ObjectId, IndexError> {
    let entries: Vec<&IndexEntry> = index.iter().filter(|e| e.stage == Stage::Normal).collect();

    if entries.is_empty() {
        let tree = Tree::new();
        let tree_bytes = tree.serialize_content();
        return Ok(odb.write_raw(ObjectType::Tree, &tree_bytes)?);
    }

    build_tree(&entries, b"", odb)
}

fn build_tree(
    entries: &[&IndexEntry],
    prefix: &[u8],
    odb: &ObjectDatabase,
) -> Result<ObjectId, IndexError> {
    let mut tree_entries: Vec<TreeEntry> = Vec::new();
    let mut i = 0;

    while i < entries.len() {
        let entry = entries[i];
        let path = &entry.path[prefix.len()..];

        if let Some(slash_pos) = path.iter().position(|&b| b == b'/') {
            let dir_name = &path[..slash_pos];
            let subtree_end = entries[i..]
                .iter()
                .position(|e| {
                    let p = &e.path[prefix.len()..];
                    !p.starts_with(dir_name) || (p.len() > slash_pos && p[slash_pos] != b'/')
                })
                .map(|pos| i + pos)
                .unwrap_or(entries.len());

            let subtree_entries = &entries[i..subtree_end];

            let mut new_prefix = prefix.to_vec();
            new_prefix.extend_from_slice(dir_name);
            new_prefix.push(b'/');

            let subtree_oid = build_tree(subtree_entries, &new_prefix, odb)?;

            tree_entries.push(TreeEntry {
                mode: FileMode::Tree,
                name: dir_name.into(),
                oid: subtree_oid,
            });

            i = subtree_end;
        } else {
            tree_entries.push(TreeEntry {
                mode: entry.mode,
                name: path.into(),
                oid: entry.oid,
            });
            i += 1;
        }
    }

    let mut tree = Tree::new();
    tree.entries = tree_entries;
    tree.sort();
    let tree_bytes = tree.serialize_content();
    Ok(odb.write_raw(ObjectType::Tree, &tree_bytes)?)
}
