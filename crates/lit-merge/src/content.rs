//! Three-way text merge (diff3 style) on line sequences.
//!
//! Diffs base→ours and base→theirs, then interleaves the two change sets:
//! regions changed on only one side are taken from that side, identical
//! changes on both sides are taken as-is, and differing overlapping changes
//! become a conflict region bounded by `<<<<<<<`/`=======`/`>>>>>>>` markers.

use lit_diff::algorithm::{diff_edits, split_lines, Edit, EditOp};

use crate::{AutoResolve, ContentMergeResult};

/// Labels placed after the `<<<<<<<`/`>>>>>>>` markers (and `|||||||` base
/// marker, unused here since only the two-way marker style is produced).
#[derive(Debug, Clone)]
pub struct MergeLabels<'a> {
    pub ours: &'a str,
    pub theirs: &'a str,
}

impl<'a> Default for MergeLabels<'a> {
    fn default() -> Self {
        Self { ours: "ours", theirs: "theirs" }
    }
}

pub fn merge_content(
    base: &[u8],
    ours: &[u8],
    theirs: &[u8],
    auto_resolve: Option<AutoResolve>,
    labels: &MergeLabels<'_>,
) -> ContentMergeResult {
    if ours == theirs {
        return ContentMergeResult::Clean(ours.to_vec());
    }
    if base == ours {
        return ContentMergeResult::Clean(theirs.to_vec());
    }
    if base == theirs {
        return ContentMergeResult::Clean(ours.to_vec());
    }

    let base_lines = split_lines(base);
    let ours_lines = split_lines(ours);
    let theirs_lines = split_lines(theirs);

    let hunks_ours = collect_change_regions(&diff_edits(&base_lines, &ours_lines));
    let hunks_theirs = collect_change_regions(&diff_edits(&base_lines, &theirs_lines));

    merge_regions(&base_lines, &ours_lines, &theirs_lines, &hunks_ours, &hunks_theirs, auto_resolve, labels)
}

/// A contiguous region of changes relative to the base.
#[derive(Debug, Clone)]
struct ChangeRegion {
    base_start: usize,
    base_len: usize,
    new_start: usize,
    new_len: usize,
}

fn collect_change_regions(edits: &[Edit]) -> Vec<ChangeRegion> {
    let mut regions = Vec::new();
    let mut i = 0;

    while i < edits.len() {
        if edits[i].op == EditOp::Equal {
            i += 1;
            continue;
        }

        let base_start = edits[i].old_index;
        let new_start = edits[i].new_index;
        let mut base_end = base_start;
        let mut new_end = new_start;

        while i < edits.len() && edits[i].op != EditOp::Equal {
            match edits[i].op {
                EditOp::Delete => base_end = edits[i].old_index + 1,
                EditOp::Insert => new_end = edits[i].new_index + 1,
                EditOp::Equal => unreachable!(),
            }
            i += 1;
        }

        regions.push(ChangeRegion { base_start, base_len: base_end - base_start, new_start, new_len: new_end - new_start });
    }

    regions
}

fn merge_regions(
    base_lines: &[&[u8]],
    ours_lines: &[&[u8]],
    theirs_lines: &[&[u8]],
    hunks_ours: &[ChangeRegion],
    hunks_theirs: &[ChangeRegion],
    auto_resolve: Option<AutoResolve>,
    labels: &MergeLabels<'_>,
) -> ContentMergeResult {
    let mut output: Vec<u8> = Vec::new();
    let mut conflict_count = 0;

    let mut base_pos = 0;
    let mut oi = 0;
    let mut ti = 0;

    while oi < hunks_ours.len() || ti < hunks_theirs.len() {
        let o_region = hunks_ours.get(oi);
        let t_region = hunks_theirs.get(ti);

        match (o_region, t_region) {
            (Some(o), Some(t)) => {
                let o_end = o.base_start + o.base_len;
                let t_end = t.base_start + t.base_len;

                if o_end < t.base_start || (o_end == t.base_start && o.base_start < t.base_start) {
                    emit_base_lines(&mut output, base_lines, base_pos, o.base_start);
                    emit_lines(&mut output, ours_lines, o.new_start, o.new_len);
                    base_pos = o_end;
                    oi += 1;
                } else if t_end < o.base_start || (t_end == o.base_start && t.base_start < o.base_start) {
                    emit_base_lines(&mut output, base_lines, base_pos, t.base_start);
                    emit_lines(&mut output, theirs_lines, t.new_start, t.new_len);
                    base_pos = t_end;
                    ti += 1;
                } else {
                    let ours_content = collect_lines(ours_lines, o.new_start, o.new_len);
                    let theirs_content = collect_lines(theirs_lines, t.new_start, t.new_len);

                    let overlap_base_start = o.base_start.min(t.base_start);
                    let overlap_base_end = o_end.max(t_end);

                    emit_base_lines(&mut output, base_lines, base_pos, overlap_base_start);

                    if ours_content == theirs_content {
                        output.extend_from_slice(&ours_content);
                    } else if let Some(resolution) = auto_resolve {
                        output.extend_from_slice(&resolve_region(resolution, &ours_content, &theirs_content));
                    } else {
                        conflict_count += 1;
                        emit_conflict(&mut output, &ours_content, &theirs_content, labels);
                    }

                    base_pos = overlap_base_end;
                    oi += 1;
                    ti += 1;
                }
            }
            (Some(o), None) => {
                let o_end = o.base_start + o.base_len;
                emit_base_lines(&mut output, base_lines, base_pos, o.base_start);
                emit_lines(&mut output, ours_lines, o.new_start, o.new_len);
                base_pos = o_end;
                oi += 1;
            }
            (None, Some(t)) => {
                let t_end = t.base_start + t.base_len;
                emit_base_lines(&mut output, base_lines, base_pos, t.base_start);
                emit_lines(&mut output, theirs_lines, t.new_start, t.new_len);
                base_pos = t_end;
                ti += 1;
            }
            (None, None) => unreachable!(),
        }
    }

    emit_base_lines(&mut output, base_lines, base_pos, base_lines.len());

    if conflict_count > 0 {
        ContentMergeResult::Conflict { content: output, conflict_count }
    } else {
        ContentMergeResult::Clean(output)
    }
}

fn resolve_region(resolution: AutoResolve, ours: &[u8], theirs: &[u8]) -> Vec<u8> {
    match resolution {
        AutoResolve::Ours => ours.to_vec(),
        AutoResolve::Theirs => theirs.to_vec(),
        AutoResolve::Union => {
            let mut out = ours.to_vec();
            out.extend_from_slice(theirs);
            out
        }
        AutoResolve::Recent { ours_date, theirs_date } => {
            if ours_date > theirs_date { ours.to_vec() } else { theirs.to_vec() }
        }
    }
}

fn emit_base_lines(output: &mut Vec<u8>, base_lines: &[&[u8]], from: usize, to: usize) {
    for i in from..to {
        if i < base_lines.len() {
            output.extend_from_slice(base_lines[i]);
        }
    }
}

fn emit_lines(output: &mut Vec<u8>, lines: &[&[u8]], start: usize, count: usize) {
    for i in start..start + count {
        if i < lines.len() {
            output.extend_from_slice(lines[i]);
        }
    }
}

fn collect_lines(lines: &[&[u8]], start: usize, count: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    for i in start..start + count {
        if i < lines.len() {
            buf.extend_from_slice(lines[i]);
        }
    }
    buf
}

fn emit_conflict(output: &mut Vec<u8>, ours_content: &[u8], theirs_content: &[u8], labels: &MergeLabels<'_>) {
    output.extend_from_slice(b"<<<<<<< ");
    output.extend_from_slice(labels.ours.as_bytes());
    output.push(b'\n');
    output.extend_from_slice(ours_content);
    output.extend_from_slice(b"=======\n");
    output.extend_from_slice(theirs_content);
    output.extend_from_slice(b">>>>>>> ");
    output.extend_from_slice(labels.theirs.as_bytes());
    output.push(b'\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_labels() -> MergeLabels<'static> {
        MergeLabels { ours: "HEAD", theirs: "feature" }
    }

    #[test]
    fn identical_ours_theirs() {
        let base = b"line1\nline2\n";
        let ours = b"line1\nline2\nline3\n";
        let theirs = b"line1\nline2\nline3\n";
        let result = merge_content(base, ours, theirs, None, &default_labels());
        assert!(result.is_clean());
        assert_eq!(result.content(), ours);
    }

    #[test]
    fn only_ours_changed() {
        let base = b"line1\nline2\n";
        let ours = b"line1\nmodified\n";
        let theirs = b"line1\nline2\n";
        let result = merge_content(base, ours, theirs, None, &default_labels());
        assert!(result.is_clean());
        assert_eq!(result.content(), ours);
    }

    #[test]
    fn non_overlapping_changes() {
        let base = b"line1\nline2\nline3\nline4\n";
        let ours = b"modified1\nline2\nline3\nline4\n";
        let theirs = b"line1\nline2\nline3\nmodified4\n";
        let result = merge_content(base, ours, theirs, None, &default_labels());
        assert!(result.is_clean());
        let content = String::from_utf8_lossy(result.content());
        assert!(content.contains("modified1"));
        assert!(content.contains("modified4"));
    }

    #[test]
    fn overlapping_conflict_has_markers() {
        let base = b"line1\nline2\nline3\n";
        let ours = b"line1\nours_change\nline3\n";
        let theirs = b"line1\ntheirs_change\nline3\n";
        let result = merge_content(base, ours, theirs, None, &default_labels());
        assert!(!result.is_clean());
        let content = String::from_utf8_lossy(result.content());
        assert!(content.contains("<<<<<<< HEAD"));
        assert!(content.contains("======="));
        assert!(content.contains(">>>>>>> feature"));
        assert!(content.contains("ours_change"));
        assert!(content.contains("theirs_change"));
    }

    #[test]
    fn auto_resolve_ours_picks_our_region() {
        let base = b"line1\nline2\nline3\n";
        let ours = b"line1\nours_change\nline3\n";
        let theirs = b"line1\ntheirs_change\nline3\n";
        let result = merge_content(base, ours, theirs, Some(AutoResolve::Ours), &default_labels());
        assert!(result.is_clean());
        assert_eq!(result.content(), ours);
    }

    #[test]
    fn auto_resolve_union_concatenates_both_sides() {
        let base = b"line1\nline2\nline3\n";
        let ours = b"line1\nours_change\nline3\n";
        let theirs = b"line1\ntheirs_change\nline3\n";
        let result = merge_content(base, ours, theirs, Some(AutoResolve::Union), &default_labels());
        assert!(result.is_clean());
        let content = String::from_utf8_lossy(result.content());
        assert!(content.contains("ours_change"));
        assert!(content.contains("theirs_change"));
    }

    #[test]
    fn auto_resolve_recent_picks_later_timestamp() {
        let base = b"line1\nline2\nline3\n";
        let ours = b"line1\nours_change\nline3\n";
        let theirs = b"line1\ntheirs_change\nline3\n";
        let result = merge_content(
            base,
            ours,
            theirs,
            Some(AutoResolve::Recent { ours_date: 100, theirs_date: 200 }),
            &default_labels(),
        );
        assert!(result.is_clean());
        assert_eq!(result.content(), theirs);
    }

    #[test]
    fn both_sides_identical_changes() {
        let base = b"line1\noriginal\nline3\n";
        let ours = b"line1\nsame_change\nline3\n";
        let theirs = b"line1\nsame_change\nline3\n";
        let result = merge_content(base, ours, theirs, None, &default_labels());
        assert!(result.is_clean());
    }

    #[test]
    fn empty_base_both_add_is_conflict() {
        let base = b"";
        let ours = b"ours line\n";
        let theirs = b"theirs line\n";
        let result = merge_content(base, ours, theirs, None, &default_labels());
        assert!(!result.is_clean());
    }
}
