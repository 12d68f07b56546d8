//! Line-level diff: edit scripts and hunk construction.

mod myers;

use crate::Hunk;

/// A single operation in an edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Equal,
    Insert,
    Delete,
}

/// One step of an edit script, indexing into the old and new line arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub op: EditOp,
    pub old_index: usize,
    pub new_index: usize,
}

/// Diff two line arrays, producing a raw edit script.
pub fn diff_edits(old: &[&[u8]], new: &[&[u8]]) -> Vec<Edit> {
    myers::diff(old, new, false)
}

/// Diff two byte buffers line-by-line and group the result into hunks with
/// `context_lines` of surrounding context.
pub fn diff_lines(old: &[u8], new: &[u8], context_lines: usize) -> Vec<Hunk> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let edits = diff_edits(&old_lines, &new_lines);
    edits_to_hunks(&edits, &old_lines, &new_lines, context_lines)
}

/// Group a raw edit script into hunks, merging change ranges that fall
/// within `2 * context_lines` of each other.
fn edits_to_hunks(
    edits: &[Edit],
    old_lines: &[&[u8]],
    new_lines: &[&[u8]],
    context_lines: usize,
) -> Vec<Hunk> {
    // Find indices of non-equal edits.
    let change_indices: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, e)| e.op != EditOp::Equal)
        .map(|(i, _)| i)
        .collect();

    if change_indices.is_empty() {
        return Vec::new();
    }

    // Group change indices into ranges, merging when the gap between two
    // changes is small enough that their context windows would overlap.
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = change_indices[0];
    let mut end = change_indices[0];

    for &idx in &change_indices[1..] {
        if idx - end <= 2 * context_lines {
            end = idx;
        } else {
            ranges.push((start, end));
            start = idx;
            end = idx;
        }
    }
    ranges.push((start, end));

    let mut hunks = Vec::with_capacity(ranges.len());
    for (range_start, range_end) in ranges {
        let ctx_start = range_start.saturating_sub(context_lines);
        let ctx_end = (range_end + context_lines + 1).min(edits.len());

        let mut lines = Vec::with_capacity(ctx_end - ctx_start);
        let mut old_start = None;
        let mut new_start = None;
        let mut old_count = 0;
        let mut new_count = 0;

        for edit in &edits[ctx_start..ctx_end] {
            match edit.op {
                EditOp::Equal => {
                    old_start.get_or_insert(edit.old_index);
                    new_start.get_or_insert(edit.new_index);
                    old_count += 1;
                    new_count += 1;
                    lines.push(crate::DiffLine::Context(bstr::BString::from(
                        old_lines[edit.old_index],
                    )));
                }
                EditOp::Delete => {
                    old_start.get_or_insert(edit.old_index);
                    old_count += 1;
                    lines.push(crate::DiffLine::Deletion(bstr::BString::from(
                        old_lines[edit.old_index],
                    )));
                }
                EditOp::Insert => {
                    new_start.get_or_insert(edit.new_index);
                    new_count += 1;
                    lines.push(crate::DiffLine::Addition(bstr::BString::from(
                        new_lines[edit.new_index],
                    )));
                }
            }
        }

        hunks.push(Hunk {
            old_start: old_start.map(|i| i + 1).unwrap_or(0),
            old_count,
            new_start: new_start.map(|i| i + 1).unwrap_or(0),
            new_count,
            header: None,
            lines,
        });
    }

    hunks
}

/// Split a byte buffer into lines, keeping line-ending bytes attached. The
/// final line is kept even without a trailing newline.
pub fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut start = 0;
    for (i, &b) in data.iter().enumerate() {
        if b == b'\n' {
            lines.push(&data[start..=i]);
            start = i + 1;
        }
    }
    if start < data.len() {
        lines.push(&data[start..]);
    }
    lines
}

/// Hash a line for O(1) equality pre-checks (DJB2a-style, matching xdiff's
/// line hashing so identical content never has to be byte-compared twice).
fn line_hash(line: &[u8]) -> u64 {
    let mut hash: u64 = 5381;
    for &b in line {
        hash = (hash << 5).wrapping_add(hash) ^ u64::from(b);
    }
    hash
}
