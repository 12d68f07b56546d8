//! Commit/tag timestamps: `<unix-seconds> <±HHMM>`, the only date representation
//! the object format and identity line need.

use bstr::{BStr, BString, ByteSlice, ByteVec};

use crate::error::UtilError;
use crate::Result;

/// A timestamp paired with the timezone offset it was authored in.
///
/// `tz_offset` is stored in minutes east of UTC (e.g. `-300` for `-0500`), so
/// arithmetic on it doesn't need to re-split hours and minutes every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LitDate {
    pub timestamp: i64,
    pub tz_offset: i32,
}

/// Decimal tz notation (`-0500`) to minutes east of UTC (`-300`).
fn tz_decimal_to_minutes(tz: i32) -> i32 {
    let sign = if tz < 0 { -1 } else { 1 };
    let abs = tz.unsigned_abs() as i32;
    sign * (abs / 100 * 60 + abs % 100)
}

/// Minutes east of UTC back to decimal tz notation.
fn minutes_to_tz_decimal(minutes: i32) -> i32 {
    let sign = if minutes < 0 { -1 } else { 1 };
    let abs = minutes.unsigned_abs() as i32;
    sign * (abs / 60 * 100 + abs % 60)
}

impl LitDate {
    pub fn new(timestamp: i64, tz_offset_minutes: i32) -> Self {
        Self {
            timestamp,
            tz_offset: tz_offset_minutes,
        }
    }

    /// The current instant, in the process's local timezone.
    pub fn now() -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self {
            timestamp,
            tz_offset: local_offset_minutes(timestamp),
        }
    }

    /// Parse git's raw object format: `"<seconds> <±HHMM>"`, or a bare `"<seconds>"`.
    pub fn parse_raw(input: &str) -> Result<Self> {
        let input = input.trim();
        let mut parts = input.splitn(2, ' ');
        let ts_str = parts
            .next()
            .ok_or_else(|| UtilError::DateParse("empty date string".into()))?;
        let timestamp: i64 = ts_str
            .parse()
            .map_err(|_| UtilError::DateParse(format!("invalid timestamp: '{ts_str}'")))?;

        let tz_offset = match parts.next() {
            Some(tz_str) => {
                let tz_str = tz_str.trim();
                let tz: i32 = tz_str
                    .parse()
                    .map_err(|_| UtilError::DateParse(format!("invalid timezone: '{tz_str}'")))?;
                tz_decimal_to_minutes(tz)
            }
            None => 0,
        };

        Ok(Self {
            timestamp,
            tz_offset,
        })
    }

    /// Format as git's raw object format: `"<seconds> <±HHMM>"`.
    pub fn format_raw(&self) -> String {
        format!(
            "{} {:+05}",
            self.timestamp,
            minutes_to_tz_decimal(self.tz_offset)
        )
    }

    /// Format as `"YYYY-MM-DD HH:MM:SS ±HHMM"` in the timestamp's own offset, for
    /// human-facing output (`log`, `show`).
    pub fn format_iso(&self) -> String {
        let local_secs = self.timestamp + i64::from(self.tz_offset) * 60;
        let (year, month, day, hour, min, sec) = civil_from_timestamp(local_secs);
        format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{min:02}:{sec:02} {:+05}",
            minutes_to_tz_decimal(self.tz_offset)
        )
    }

    /// Format as `"N <unit> ago"` relative to `now`, falling back to [`format_iso`]
    /// past a year.
    pub fn format_relative(&self, now: i64) -> String {
        let diff = now - self.timestamp;
        if diff < 0 {
            return "in the future".to_string();
        }
        let diff = diff as u64;
        const MINUTE: u64 = 60;
        const HOUR: u64 = 60 * MINUTE;
        const DAY: u64 = 24 * HOUR;
        const WEEK: u64 = 7 * DAY;
        const MONTH: u64 = 30 * DAY;
        const YEAR: u64 = 365 * DAY;

        if diff < 2 {
            "just now".to_string()
        } else if diff < MINUTE {
            format!("{diff} seconds ago")
        } else if diff < 2 * MINUTE {
            "1 minute ago".to_string()
        } else if diff < HOUR {
            format!("{} minutes ago", diff / MINUTE)
        } else if diff < 2 * HOUR {
            "1 hour ago".to_string()
        } else if diff < DAY {
            format!("{} hours ago", diff / HOUR)
        } else if diff < 2 * DAY {
            "1 day ago".to_string()
        } else if diff < WEEK {
            format!("{} days ago", diff / DAY)
        } else if diff < 2 * WEEK {
            "1 week ago".to_string()
        } else if diff < MONTH {
            format!("{} weeks ago", diff / WEEK)
        } else if diff < 2 * MONTH {
            "1 month ago".to_string()
        } else if diff < YEAR {
            format!("{} months ago", diff / MONTH)
        } else {
            self.format_iso()
        }
    }
}

/// Days since the Unix epoch to a `(year, month, day)` civil date, and back,
/// using Howard Hinnant's `civil_from_days` / `days_from_civil` — the same
/// proleptic-Gregorian algorithm `libc++`'s `<chrono>` uses, reimplemented
/// here so this crate doesn't need a date library just to print commit dates.
fn civil_from_timestamp(secs: i64) -> (i64, u32, u32, u32, u32, u32) {
    let days = secs.div_euclid(86400);
    let time_of_day = secs.rem_euclid(86400);
    let hour = (time_of_day / 3600) as u32;
    let min = ((time_of_day % 3600) / 60) as u32;
    let sec = (time_of_day % 60) as u32;

    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // [0, 399]
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32; // [1, 31]
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32; // [1, 12]
    let year = if m <= 2 { y + 1 } else { y };

    (year, m, d, hour, min, sec)
}

/// The process's local UTC offset, in minutes, at the given instant.
#[cfg(unix)]
fn local_offset_minutes(timestamp: i64) -> i32 {
    unsafe {
        let t = timestamp as libc::time_t;
        let mut tm: libc::tm = std::mem::zeroed();
        if libc::localtime_r(&t, &mut tm).is_null() {
            return 0;
        }
        (tm.tm_gmtoff / 60) as i32
    }
}

#[cfg(not(unix))]
fn local_offset_minutes(_timestamp: i64) -> i32 {
    0
}

/// Author/committer identity with timestamp, as it appears on a commit or tag's
/// `author`/`committer`/`tagger` line: `Name <email> <seconds> <±HHMM>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub date: LitDate,
}

impl Signature {
    pub fn new(name: impl Into<BString>, email: impl Into<BString>, date: LitDate) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            date,
        }
    }

    /// Parse `"Name <email> seconds tz"`.
    pub fn parse(input: &BStr) -> Result<Self> {
        let input = input.as_bytes();

        let gt_pos = input
            .iter()
            .rposition(|&b| b == b'>')
            .ok_or_else(|| UtilError::DateParse("missing '>' in signature".into()))?;
        let lt_pos = input[..gt_pos]
            .iter()
            .rposition(|&b| b == b'<')
            .ok_or_else(|| UtilError::DateParse("missing '<' in signature".into()))?;

        let name = input[..lt_pos].trim();
        let email = &input[lt_pos + 1..gt_pos];
        let date_str = input[gt_pos + 1..].trim();
        let date_str = std::str::from_utf8(date_str)
            .map_err(|_| UtilError::DateParse("non-UTF-8 date in signature".into()))?;

        Ok(Self {
            name: BString::from(name),
            email: BString::from(email),
            date: LitDate::parse_raw(date_str)?,
        })
    }

    /// Format as `"Name <email> seconds tz"`.
    pub fn to_bytes(&self) -> BString {
        let mut out = BString::new(Vec::new());
        out.push_str(&self.name);
        out.push_str(b" <");
        out.push_str(&self.email);
        out.push_str(b"> ");
        out.push_str(self.date.format_raw().as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_raw() {
        let d = LitDate::parse_raw("1234567890 +0000").unwrap();
        assert_eq!(d.timestamp, 1234567890);
        assert_eq!(d.tz_offset, 0);
    }

    #[test]
    fn parse_raw_negative_tz() {
        let d = LitDate::parse_raw("1234567890 -0500").unwrap();
        assert_eq!(d.tz_offset, -300);
    }

    #[test]
    fn parse_raw_positive_tz_with_minutes() {
        let d = LitDate::parse_raw("1234567890 +0530").unwrap();
        assert_eq!(d.tz_offset, 330);
    }

    #[test]
    fn format_raw_roundtrip() {
        let d = LitDate::new(1234567890, -300);
        let formatted = d.format_raw();
        assert_eq!(formatted, "1234567890 -0500");
        let parsed = LitDate::parse_raw(&formatted).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn format_iso_epoch() {
        let d = LitDate::new(0, 0);
        assert_eq!(d.format_iso(), "1970-01-01 00:00:00 +0000");
    }

    #[test]
    fn format_iso_known_timestamp() {
        // 2025-01-15T12:00:00Z
        let d = LitDate::new(1736942400, 0);
        assert_eq!(d.format_iso(), "2025-01-15 12:00:00 +0000");
    }

    #[test]
    fn format_iso_with_offset() {
        let d = LitDate::new(1736942400, -300); // -05:00
        assert_eq!(d.format_iso(), "2025-01-15 07:00:00 -0500");
    }

    #[test]
    fn relative_just_now() {
        let d = LitDate::new(1000, 0);
        assert_eq!(d.format_relative(1000), "just now");
    }

    #[test]
    fn relative_minutes_and_hours() {
        let d = LitDate::new(1000, 0);
        assert_eq!(d.format_relative(1000 + 300), "5 minutes ago");
        assert_eq!(d.format_relative(1000 + 3 * 3600), "3 hours ago");
    }

    #[test]
    fn relative_future() {
        let d = LitDate::new(2000, 0);
        assert_eq!(d.format_relative(1000), "in the future");
    }

    #[test]
    fn signature_parse() {
        let input = BStr::new(b"John Doe <john@example.com> 1234567890 +0000");
        let sig = Signature::parse(input).unwrap();
        assert_eq!(sig.name, BString::from("John Doe"));
        assert_eq!(sig.email, BString::from("john@example.com"));
        assert_eq!(sig.date.timestamp, 1234567890);
    }

    #[test]
    fn signature_roundtrip() {
        let sig = Signature::new("Jane Doe", "jane@example.com", LitDate::new(1234567890, -300));
        let bytes = sig.to_bytes();
        assert_eq!(
            bytes,
            BString::from("Jane Doe <jane@example.com> 1234567890 -0500")
        );
        let parsed = Signature::parse(bytes.as_ref()).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn tz_conversion_roundtrip() {
        assert_eq!(tz_decimal_to_minutes(530), 330);
        assert_eq!(minutes_to_tz_decimal(330), 530);
        assert_eq!(tz_decimal_to_minutes(-500), -300);
        assert_eq!(minutes_to_tz_decimal(-300), -500);
        assert_eq!(tz_decimal_to_minutes(0), 0);
        assert_eq!(minutes_to_tz_decimal(0), 0);
    }
}
