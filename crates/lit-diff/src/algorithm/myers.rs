//! Myers O(ND) diff algorithm (Eugene Myers, 1986).
//!
//! Finds a shortest edit script between two sequences of lines. Common
//! prefix and suffix are trimmed before the core algorithm runs, and lines
//! are compared by precomputed hash for O(1) equality checks.

use super::{line_hash, Edit, EditOp};

/// Diff two sequences of lines, returning the edit script.
///
/// `minimal` requests the shortest possible script at extra cost; Lit
/// always passes `false` since the corpus never needs the minimal variant,
/// but the parameter is kept so callers can opt in later.
pub fn diff(old: &[&[u8]], new: &[&[u8]], minimal: bool) -> Vec<Edit> {
    if old.is_empty() && new.is_empty() {
        return Vec::new();
    }
    if old.is_empty() {
        return (0..new.len())
            .map(|i| Edit {
                op: EditOp::Insert,
                old_index: 0,
                new_index: i,
            })
            .collect();
    }
    if new.is_empty() {
        return (0..old.len())
            .map(|i| Edit {
                op: EditOp::Delete,
                old_index: i,
                new_index: 0,
            })
            .collect();
    }

    let old_hashes: Vec<u64> = old.iter().map(|l| line_hash(l)).collect();
    let new_hashes: Vec<u64> = new.iter().map(|l| line_hash(l)).collect();

    // Trim common prefix.
    let mut prefix_len = 0;
    while prefix_len < old.len()
        && prefix_len < new.len()
        && old_hashes[prefix_len] == new_hashes[prefix_len]
        && old[prefix_len] == new[prefix_len]
    {
        prefix_len += 1;
    }

    // Trim common suffix (within the remaining range).
    let mut suffix_len = 0;
    while suffix_len < old.len() - prefix_len
        && suffix_len < new.len() - prefix_len
        && old_hashes[old.len() - 1 - suffix_len] == new_hashes[new.len() - 1 - suffix_len]
        && old[old.len() - 1 - suffix_len] == new[new.len() - 1 - suffix_len]
    {
        suffix_len += 1;
    }

    let old_mid = &old[prefix_len..old.len() - suffix_len];
    let new_mid = &new[prefix_len..new.len() - suffix_len];

    let mut edits = Vec::with_capacity(prefix_len + suffix_len);
    for i in 0..prefix_len {
        edits.push(Edit {
            op: EditOp::Equal,
            old_index: i,
            new_index: i,
        });
    }

    let inner = myers_inner(old_mid, new_mid, minimal);
    for e in inner {
        edits.push(Edit {
            op: e.op,
            old_index: e.old_index + prefix_len,
            new_index: e.new_index + prefix_len,
        });
    }

    for i in 0..suffix_len {
        edits.push(Edit {
            op: EditOp::Equal,
            old_index: old.len() - suffix_len + i,
            new_index: new.len() - suffix_len + i,
        });
    }

    edits
}

/// Core Myers algorithm on a range with no common prefix/suffix.
fn myers_inner(old: &[&[u8]], new: &[&[u8]], _minimal: bool) -> Vec<Edit> {
    let n = old.len();
    let m = new.len();

    if n == 0 && m == 0 {
        return Vec::new();
    }
    if n == 0 {
        return (0..m)
            .map(|i| Edit {
                op: EditOp::Insert,
                old_index: 0,
                new_index: i,
            })
            .collect();
    }
    if m == 0 {
        return (0..n)
            .map(|i| Edit {
                op: EditOp::Delete,
                old_index: i,
                new_index: 0,
            })
            .collect();
    }

    let max_d = n + m;
    let offset = max_d;
    let mut v = vec![0isize; 2 * max_d + 1];
    let mut trace: Vec<Vec<isize>> = Vec::with_capacity(max_d + 1);

    'outer: for d in 0..=max_d as isize {
        trace.push(v.clone());

        for k in (-d..=d).step_by(2) {
            let idx = (k + offset as isize) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;

            while (x as usize) < n && (y as usize) < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }

            v[idx] = x;

            if x as usize >= n && y as usize >= m {
                break 'outer;
            }
        }
    }

    backtrack(old, new, &trace, offset)
}

/// Walk the trace array in reverse to reconstruct the edit path.
fn backtrack(old: &[&[u8]], new: &[&[u8]], trace: &[Vec<isize>], offset: usize) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut x = old.len() as isize;
    let mut y = new.len() as isize;

    for d in (0..trace.len()).rev() {
        let v = &trace[d];
        let k = x - y;
        let idx = (k + offset as isize) as usize;

        let prev_k = if k == -(d as isize) || (k != d as isize && v[idx - 1] < v[idx + 1]) {
            k + 1
        } else {
            k - 1
        };
        let prev_idx = (prev_k + offset as isize) as usize;
        let prev_x = v[prev_idx];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            edits.push(Edit {
                op: EditOp::Equal,
                old_index: x as usize,
                new_index: y as usize,
            });
        }

        if d > 0 {
            if x == prev_x {
                y -= 1;
                edits.push(Edit {
                    op: EditOp::Insert,
                    old_index: x as usize,
                    new_index: y as usize,
                });
            } else {
                x -= 1;
                edits.push(Edit {
                    op: EditOp::Delete,
                    old_index: x as usize,
                    new_index: y as usize,
                });
            }
        }
    }

    edits.reverse();
    edits
}
