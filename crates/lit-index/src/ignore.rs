//! Gitignore-style pattern matching.
//!
//! Layered stack: `.lit/info/exclude` (repo-local) then `.litignore` files
//! (per-directory, scoped). Last match wins; negation (`!`) can re-include.

use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice};
use lit_utils::wildmatch::{wildmatch, WildmatchFlags};

use crate::IndexError;

/// A single ignore pattern with metadata.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    pub raw: BString,
    pub negated: bool,
    pub directory_only: bool,
    pub anchored: bool,
    pub source: PathBuf,
}

/// Layered litignore pattern stack.
#[derive(Debug, Clone, Default)]
pub struct IgnoreStack {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load patterns from a litignore-style file. Missing files are a no-op.
    pub fn add_file(&mut self, path: &Path) -> Result<(), IndexError> {
        let content = match std::fs::read(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(IndexError::Io(e)),
        };
        self.add_patterns(&content, path);
        Ok(())
    }

    /// Parse and add patterns from raw litignore content.
    pub fn add_patterns(&mut self, content: &[u8], source: &Path) {
        for line in content.lines() {
            if let Some(pattern) = parse_ignore_line(line, source) {
                self.patterns.push(pattern);
            }
        }
    }

    /// Check if a path is ignored. `is_dir` indicates if the path is a directory.
    pub fn is_ignored(&self, path: &BStr, is_dir: bool) -> bool {
        let mut ignored = false;

        for pat in &self.patterns {
            if pat.directory_only && !is_dir {
                continue;
            }
            if pattern_matches(pat, path) {
                ignored = !pat.negated;
            }
        }

        ignored
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn parse_ignore_line(line: &[u8], source: &Path) -> Option<IgnorePattern> {
    let mut line = line;

    if line.is_empty() || line[0] == b'#' {
        return None;
    }

    while line.len() > 1 && line.last() == Some(&b' ') && line[line.len() - 2] != b'\\' {
        line = &line[..line.len() - 1];
    }
    if line.is_empty() {
        return None;
    }

    let negated = line[0] == b'!';
    if negated {
        line = &line[1..];
        if line.is_empty() {
            return None;
        }
    }

    if line[0] == b'\\' && line.len() > 1 && (line[1] == b'#' || line[1] == b'!') {
        line = &line[1..];
    }

    let directory_only = line.last() == Some(&b'/');
    let line = if directory_only {
        &line[..line.len() - 1]
    } else {
        line
    };
    if line.is_empty() {
        return None;
    }

    let anchored = line.contains(&b'/');
    let pattern_str = if line[0] == b'/' { &line[1..] } else { line };

    Some(IgnorePattern {
        raw: BString::from(pattern_str),
        negated,
        directory_only,
        anchored,
        source: source.to_path_buf(),
    })
}

fn pattern_matches(pat: &IgnorePattern, path: &BStr) -> bool {
    let flags = WildmatchFlags::PATHNAME;
    let pattern = BStr::new(&pat.raw);
    if pat.anchored {
        wildmatch(pattern, path, flags)
    } else {
        if wildmatch(pattern, path, flags) {
            return true;
        }
        match path.rfind_byte(b'/') {
            Some(slash_pos) => {
                let basename = BStr::new(&path[slash_pos + 1..]);
                wildmatch(pattern, basename, flags)
            }
            None => false,
        }
    }
}
