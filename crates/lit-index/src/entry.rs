//! The staging area's per-path record: [`IndexEntry`] ties a path to an
//! object, a merge stage, cached filesystem stat data, and a handful of
//! on-disk flags.

use bstr::BString;
use lit_hash::ObjectId;
use lit_object::FileMode;

use crate::Stage;

/// A single staged path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Repo-root-relative, forward-slash separated path.
    pub path: BString,
    pub oid: ObjectId,
    pub mode: FileMode,
    /// 0 for a clean merge; 1-3 identify which side of a conflict this
    /// record belongs to.
    pub stage: Stage,
    pub stat: StatData,
    pub flags: EntryFlags,
}

/// Filesystem metadata snapshotted at stage time, cached so a later `status`
/// can skip rehashing a file whose stat data hasn't moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatData {
    pub ctime_secs: u32,
    pub ctime_nsecs: u32,
    pub mtime_secs: u32,
    pub mtime_nsecs: u32,
    pub dev: u32,
    pub ino: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

bitflags::bitflags! {
    /// Which fields of two [`StatData`] snapshots disagree.
    ///
    /// A zero-valued `StatDiff` means "treat the two snapshots as the same
    /// file" — callers collapse it to a bool with [`StatDiff::is_empty`]
    /// when they don't care which field moved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatDiff: u8 {
        const SIZE    = 0b0000_0001;
        const MTIME   = 0b0000_0010;
        const CTIME   = 0b0000_0100;
        const INODE   = 0b0000_1000;
        const DEVICE  = 0b0001_0000;
        const OWNER   = 0b0010_0000;
    }
}

impl StatData {
    #[cfg(unix)]
    pub fn capture(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            ctime_secs: meta.ctime() as u32,
            ctime_nsecs: meta.ctime_nsec() as u32,
            mtime_secs: meta.mtime() as u32,
            mtime_nsecs: meta.mtime_nsec() as u32,
            dev: meta.dev() as u32,
            ino: meta.ino() as u32,
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.len() as u32,
        }
    }

    #[cfg(not(unix))]
    pub fn capture(meta: &std::fs::Metadata) -> Self {
        use std::time::UNIX_EPOCH;
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .unwrap_or_default();
        Self {
            ctime_secs: mtime.as_secs() as u32,
            ctime_nsecs: mtime.subsec_nanos(),
            mtime_secs: mtime.as_secs() as u32,
            mtime_nsecs: mtime.subsec_nanos(),
            dev: 0,
            ino: 0,
            uid: 0,
            gid: 0,
            size: meta.len() as u32,
        }
    }

    #[deprecated(note = "use capture")]
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        Self::capture(meta)
    }

    /// Compare against freshly-read metadata, reporting exactly which
    /// fields moved. Zero/zero fields (unavailable on the current platform,
    /// e.g. `ino`/`dev` outside Unix) never count as a mismatch on their
    /// own — mirrors C git's `ie_match_stat` treating those as "unknown,
    /// not dirty."
    pub fn diff(&self, meta: &std::fs::Metadata) -> StatDiff {
        let other = Self::capture(meta);
        let mut diff = StatDiff::empty();

        if self.size != other.size {
            diff |= StatDiff::SIZE;
        }
        if self.mtime_secs != other.mtime_secs || self.mtime_nsecs != other.mtime_nsecs {
            diff |= StatDiff::MTIME;
        }
        if self.ctime_secs != other.ctime_secs || self.ctime_nsecs != other.ctime_nsecs {
            diff |= StatDiff::CTIME;
        }
        if self.ino != 0 && other.ino != 0 && self.ino != other.ino {
            diff |= StatDiff::INODE;
        }
        if self.dev != 0 && other.dev != 0 && self.dev != other.dev {
            diff |= StatDiff::DEVICE;
        }
        if self.uid != 0 && other.uid != 0 && self.uid != other.uid {
            diff |= StatDiff::OWNER;
        }
        if self.gid != 0 && other.gid != 0 && self.gid != other.gid {
            diff |= StatDiff::OWNER;
        }

        diff
    }

    /// Convenience wrapper over [`diff`](Self::diff) for call sites that
    /// only need a yes/no answer.
    pub fn matches(&self, meta: &std::fs::Metadata) -> bool {
        self.diff(meta).is_empty()
    }
}

bitflags::bitflags! {
    /// On-disk entry flags, packed into the high bits of the 16-bit
    /// flags/name-length word in the DIRC format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EntryFlags: u8 {
        /// CE_VALID: trust the cached stat data unconditionally, skipping
        /// the usual dirty-check.
        const ASSUME_VALID = 0b0000_0001;
    }
}

impl EntryFlags {
    pub fn assume_valid(self) -> bool {
        self.contains(EntryFlags::ASSUME_VALID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_data_default_has_no_diff_against_itself() {
        let stat = StatData::default();
        assert_eq!(stat.size, 0);
        assert_eq!(stat.mtime_secs, 0);
    }

    #[test]
    fn entry_flags_default_is_not_assume_valid() {
        let flags = EntryFlags::default();
        assert!(!flags.assume_valid());
    }

    #[test]
    fn entry_flags_round_trips_through_bits() {
        let flags = EntryFlags::ASSUME_VALID;
        assert!(flags.assume_valid());
        assert_eq!(flags.bits(), 0b1);
    }

    #[test]
    fn stat_diff_empty_means_unchanged() {
        assert!(StatDiff::empty().is_empty());
        assert!(!(StatDiff::SIZE | StatDiff::MTIME).is_empty());
    }
}
