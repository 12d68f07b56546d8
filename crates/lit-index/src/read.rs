//! Index file reading (version 2 only).

use bstr::BString;
use lit_hash::ObjectId;
use lit_object::FileMode;

use crate::entry::{EntryFlags, IndexEntry, StatData};
use crate::{Index, IndexError, Stage};

const INDEX_SIGNATURE: &[u8; 4] = b"DIRC";

/// Offset of the flexible data portion in the on-disk cache entry struct:
/// ctime(8) + mtime(8) + dev(4) + ino(4) + mode(4) + uid(4) + gid(4) + size(4).
const ONDISK_OFFSET_DATA: usize = 40;
const SHA1_SIZE: usize = 20;

/// Parse an index file from raw bytes.
pub fn parse_index(data: &[u8]) -> Result<Index, IndexError> {
    if data.len() < 12 {
        return Err(IndexError::InvalidHeader("index file too short".into()));
    }

    verify_checksum(data)?;

    let mut cursor = 0;

    let sig = &data[cursor..cursor + 4];
    if sig != INDEX_SIGNATURE {
        return Err(IndexError::InvalidHeader(format!(
            "bad signature: expected DIRC, got {sig:?}"
        )));
    }
    cursor += 4;

    let version = read_u32(&data[cursor..]);
    cursor += 4;
    if version != 2 {
        return Err(IndexError::UnsupportedVersion(version));
    }

    let entry_count = read_u32(&data[cursor..]) as usize;
    cursor += 4;

    let content_end = data.len() - 20;
    let mut entries = Vec::with_capacity(entry_count);

    for _ in 0..entry_count {
        let (entry, new_cursor) = parse_entry(data, cursor, content_end)?;
        entries.push(entry);
        cursor = new_cursor;
    }

    let checksum = ObjectId::from_bytes(&data[data.len() - 20..])
        .map_err(|_| IndexError::InvalidHeader("invalid checksum".into()))?;

    Ok(Index {
        entries,
        checksum,
    })
}

/// `((ONDISK_OFFSET_DATA + hash_size + flags_size + name_len + 8) & ~7)`, C git's formula.
fn ondisk_entry_size(name_len: usize) -> usize {
    let data_size = SHA1_SIZE + 2 + name_len;
    (ONDISK_OFFSET_DATA + data_size + 8) & !7
}

fn parse_entry(
    data: &[u8],
    start: usize,
    content_end: usize,
) -> Result<(IndexEntry, usize), IndexError> {
    let mut cursor = start;

    if cursor + 62 > content_end {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "entry too short".into(),
        });
    }

    let stat = StatData {
        ctime_secs: read_u32(&data[cursor..]),
        ctime_nsecs: read_u32(&data[cursor + 4..]),
        mtime_secs: read_u32(&data[cursor + 8..]),
        mtime_nsecs: read_u32(&data[cursor + 12..]),
        dev: read_u32(&data[cursor + 16..]),
        ino: read_u32(&data[cursor + 20..]),
        uid: read_u32(&data[cursor + 28..]),
        gid: read_u32(&data[cursor + 32..]),
        size: read_u32(&data[cursor + 36..]),
    };
    let mode_raw = read_u32(&data[cursor + 24..]);
    cursor += 40;

    let oid = ObjectId::from_bytes(&data[cursor..cursor + 20]).map_err(|_| {
        IndexError::InvalidEntry {
            offset: start,
            reason: "invalid OID".into(),
        }
    })?;
    cursor += 20;

    let flags_raw = read_u16(&data[cursor..]);
    cursor += 2;

    let stage_bits = ((flags_raw >> 12) & 0x03) as u8;

    let stage = Stage::from_u8(stage_bits).map_err(|_| IndexError::InvalidEntry {
        offset: start,
        reason: format!("invalid stage: {stage_bits}"),
    })?;

    let path_start = cursor;
    let nul_pos = data[path_start..content_end]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| IndexError::InvalidEntry {
            offset: start,
            reason: "missing NUL in path".into(),
        })?;
    let path = BString::from(&data[path_start..path_start + nul_pos]);

    let entry_size = ondisk_entry_size(nul_pos);
    cursor = (start + entry_size).min(content_end);

    let mode = FileMode::from_raw(mode_raw);
    let flags = if flags_raw & 0x8000 != 0 {
        EntryFlags::ASSUME_VALID
    } else {
        EntryFlags::empty()
    };

    let entry = IndexEntry {
        path,
        oid,
        mode,
        stage,
        stat,
        flags,
    };

    Ok((entry, cursor))
}

fn verify_checksum(data: &[u8]) -> Result<(), IndexError> {
    if data.len() < 20 {
        return Err(IndexError::ChecksumMismatch);
    }

    let content = &data[..data.len() - 20];
    let stored_checksum = &data[data.len() - 20..];

    let computed = lit_hash::hasher::Hasher::digest(content).map_err(|_| IndexError::ChecksumMismatch)?;

    if computed.as_bytes() != stored_checksum {
        return Err(IndexError::ChecksumMismatch);
    }

    Ok(())
}

fn read_u32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

fn read_u16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}
