//! Diff output formatting.

pub mod unified;

use crate::DiffResult;

/// Render a [`DiffResult`] as unified diff text.
pub fn format_diff(result: &DiffResult) -> String {
    unified::format(result)
}
