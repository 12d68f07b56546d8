//! ASCII graph drawing for `log --graph`.
//!
//! Draws commit history as ASCII art alongside commit messages, tracking
//! active branch columns: straight edges are `|`, merges branch into new
//! columns joined by `-`.

use lit_hash::ObjectId;

/// Draws ASCII graph lines for commit history, one commit at a time.
pub struct GraphDrawer {
    columns: Vec<Option<ObjectId>>,
}

impl GraphDrawer {
    pub fn new() -> Self {
        Self { columns: Vec::new() }
    }

    /// Draw the graph lines preceding a commit: the `*` marker line, plus
    /// any merge-edge and continuation lines its parents require.
    pub fn draw_commit(&mut self, oid: &ObjectId, parents: &[ObjectId]) -> Vec<String> {
        let mut lines = Vec::new();
        let col = self.find_column(oid);

        let mut commit_line = String::new();
        for (i, slot) in self.columns.iter().enumerate() {
            if i == col {
                commit_line.push('*');
            } else if slot.is_some() {
                commit_line.push('|');
            } else {
                commit_line.push(' ');
            }
            if i + 1 < self.columns.len() {
                commit_line.push(' ');
            }
        }
        lines.push(commit_line);

        match parents.len() {
            0 => {
                if col < self.columns.len() {
                    self.columns[col] = None;
                }
                self.compact_columns();
            }
            1 => {
                if col < self.columns.len() {
                    self.columns[col] = Some(parents[0]);
                }
                let active_count = self.columns.iter().filter(|s| s.is_some()).count();
                if active_count > 1 {
                    lines.push(self.continuation_line());
                }
            }
            _ => {
                if col < self.columns.len() {
                    self.columns[col] = Some(parents[0]);
                }

                let mut edge_targets = Vec::new();
                for parent in parents.iter().skip(1) {
                    let pcol = self.find_or_create_column(parent);
                    edge_targets.push((col, pcol));
                }

                let mut merge_line = String::new();
                for (i, slot) in self.columns.iter().enumerate() {
                    let is_edge_target = edge_targets.iter().any(|(_, t)| *t == i);
                    let is_edge_source = i == col;
                    if is_edge_source || is_edge_target || slot.is_some() {
                        merge_line.push('|');
                    } else {
                        let crossed = edge_targets
                            .iter()
                            .any(|(s, t)| i > (*s).min(*t) && i < (*s).max(*t));
                        merge_line.push(if crossed { '-' } else { ' ' });
                    }
                    if i + 1 < self.columns.len() {
                        let crossed = edge_targets
                            .iter()
                            .any(|(s, t)| i >= (*s).min(*t) && i < (*s).max(*t));
                        merge_line.push(if crossed { '-' } else { ' ' });
                    }
                }
                if !merge_line.trim().is_empty() {
                    lines.push(merge_line);
                }

                lines.push(self.continuation_line());
            }
        }

        lines
    }

    fn continuation_line(&self) -> String {
        let mut line = String::new();
        for (i, slot) in self.columns.iter().enumerate() {
            line.push(if slot.is_some() { '|' } else { ' ' });
            if i + 1 < self.columns.len() {
                line.push(' ');
            }
        }
        line
    }

    fn find_column(&mut self, oid: &ObjectId) -> usize {
        self.find_or_create_column(oid)
    }

    fn find_or_create_column(&mut self, oid: &ObjectId) -> usize {
        for (i, slot) in self.columns.iter().enumerate() {
            if slot.as_ref() == Some(oid) {
                return i;
            }
        }
        for (i, slot) in self.columns.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(*oid);
                return i;
            }
        }
        self.columns.push(Some(*oid));
        self.columns.len() - 1
    }

    fn compact_columns(&mut self) {
        while self.columns.last() == Some(&None) {
            self.columns.pop();
        }
    }
}

impl Default for GraphDrawer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> ObjectId {
        let mut bytes = [0u8; 20];
        bytes[19] = byte;
        ObjectId::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn linear_history_has_no_continuation_line() {
        let mut drawer = GraphDrawer::new();
        let c1 = oid(1);
        let c2 = oid(2);
        let lines = drawer.draw_commit(&c1, &[c2]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "*");
    }

    #[test]
    fn root_commit_closes_column() {
        let mut drawer = GraphDrawer::new();
        let c1 = oid(1);
        let lines = drawer.draw_commit(&c1, &[]);
        assert_eq!(lines[0], "*");
    }

    #[test]
    fn merge_commit_draws_edge_to_second_parent() {
        let mut drawer = GraphDrawer::new();
        let merge = oid(1);
        let p1 = oid(2);
        let p2 = oid(3);
        let lines = drawer.draw_commit(&merge, &[p1, p2]);
        assert!(lines[0].starts_with('*'));
        assert!(lines.len() >= 2);
    }
}
