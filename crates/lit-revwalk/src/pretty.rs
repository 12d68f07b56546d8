//! Built-in commit pretty-printing formats for `log`/`show`.
//!
//! No custom `%`-format-string support: only the two fixed shapes log
//! consumers need.

use lit_hash::ObjectId;
use lit_object::Commit;

/// A fixed commit rendering shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFormat {
    /// `<abbrev-oid> <summary>`, one line.
    Oneline,
    /// `commit <oid>` header, author/date, blank line, indented message.
    Medium,
}

/// How many hex characters to show for abbreviated object IDs.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    pub abbrev_len: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { abbrev_len: 7 }
    }
}

pub fn format_commit(commit: &Commit, oid: &ObjectId, format: BuiltinFormat, options: &FormatOptions) -> String {
    match format {
        BuiltinFormat::Oneline => format_oneline(commit, oid, options),
        BuiltinFormat::Medium => format_medium(commit, oid, options),
    }
}

fn abbrev(oid: &ObjectId, options: &FormatOptions) -> String {
    let hex = oid.to_hex();
    hex[..options.abbrev_len.min(hex.len())].to_string()
}

fn summary(commit: &Commit) -> String {
    commit.message.to_string().lines().next().unwrap_or("").to_string()
}

fn format_oneline(commit: &Commit, oid: &ObjectId, options: &FormatOptions) -> String {
    format!("{} {}", abbrev(oid, options), summary(commit))
}

fn format_medium(commit: &Commit, oid: &ObjectId, _options: &FormatOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!("commit {}\n", oid.to_hex()));
    if commit.parents.len() > 1 {
        let merge_line = commit.parents.iter().map(|p| p.to_hex()[..7].to_string()).collect::<Vec<_>>().join(" ");
        out.push_str(&format!("Merge: {}\n", merge_line));
    }
    out.push_str(&format!("Author: {} <{}>\n", commit.author.name, commit.author.email));
    out.push_str(&format!("Date:   {}\n", commit.author.date.format_iso()));
    out.push('\n');
    for line in commit.message.to_string().lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_utils::date::{LitDate, Signature};

    fn sample(message: &str, parents: Vec<ObjectId>) -> Commit {
        Commit {
            tree: ObjectId::NULL,
            parents,
            author: Signature { name: "Ada".into(), email: "ada@example.com".into(), date: LitDate::new(1_000_000, 60) },
            committer: Signature { name: "Ada".into(), email: "ada@example.com".into(), date: LitDate::new(1_000_000, 60) },
            encoding: None,
            gpgsig: None,
            extra_headers: Vec::new(),
            message: message.into(),
        }
    }

    fn oid(byte: u8) -> ObjectId {
        let mut bytes = [0u8; 20];
        bytes[19] = byte;
        ObjectId::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn oneline_shows_abbrev_and_summary() {
        let commit = sample("Fix bug\n\nLonger body.", vec![]);
        let id = oid(1);
        let text = format_commit(&commit, &id, BuiltinFormat::Oneline, &FormatOptions::default());
        assert!(text.starts_with(&id.to_hex()[..7]));
        assert!(text.ends_with("Fix bug"));
    }

    #[test]
    fn medium_includes_author_and_indented_body() {
        let commit = sample("Add feature", vec![]);
        let id = oid(2);
        let text = format_commit(&commit, &id, BuiltinFormat::Medium, &FormatOptions::default());
        assert!(text.contains("Author: Ada <ada@example.com>"));
        assert!(text.contains("    Add feature"));
        assert!(!text.contains("Merge:"));
    }

    #[test]
    fn medium_shows_merge_line_for_multi_parent() {
        let commit = sample("Merge branch", vec![oid(3), oid(4)]);
        let id = oid(5);
        let text = format_commit(&commit, &id, BuiltinFormat::Medium, &FormatOptions::default());
        assert!(text.contains("Merge:"));
    }
}
