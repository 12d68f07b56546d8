//! Unified diff format output.
//!
//! Produces standard unified diff text with `diff --git` / `---` / `+++`
//! headers, `@@ ... @@` hunk headers, and context/addition/deletion lines.

use bstr::ByteSlice;

use crate::{DiffLine, DiffResult, FileDiff, FileStatus, Hunk};

pub fn format(result: &DiffResult) -> String {
    let mut out = String::new();
    for file in &result.files {
        format_file_diff(&mut out, file);
    }
    out
}

fn format_file_diff(out: &mut String, file: &FileDiff) {
    let old_path = file
        .old_path
        .as_ref()
        .map(|p| p.to_str_lossy().into_owned())
        .unwrap_or_else(|| "/dev/null".to_string());
    let new_path = file
        .new_path
        .as_ref()
        .map(|p| p.to_str_lossy().into_owned())
        .unwrap_or_else(|| "/dev/null".to_string());

    let a_path = file.old_path.as_ref().unwrap_or_else(|| file.new_path.as_ref().unwrap());
    let b_path = file.new_path.as_ref().unwrap_or_else(|| file.old_path.as_ref().unwrap());
    out.push_str(&format!(
        "diff --git a/{} b/{}\n",
        a_path.to_str_lossy(),
        b_path.to_str_lossy()
    ));

    match file.status {
        FileStatus::Added => {
            if let Some(mode) = file.new_mode {
                out.push_str(&format!("new file mode {}\n", format_mode(mode)));
            }
        }
        FileStatus::Deleted => {
            if let Some(mode) = file.old_mode {
                out.push_str(&format!("deleted file mode {}\n", format_mode(mode)));
            }
        }
        _ => {
            if file.old_mode != file.new_mode {
                if let (Some(old_m), Some(new_m)) = (file.old_mode, file.new_mode) {
                    out.push_str(&format!("old mode {}\nnew mode {}\n", format_mode(old_m), format_mode(new_m)));
                }
            }
        }
    }

    let old_hex_opt = file.old_oid.map(|o| short_hex(&o));
    let new_hex_opt = file.new_oid.map(|o| short_hex(&o));
    let old_hex = old_hex_opt.as_deref().unwrap_or("0000000");
    let new_hex = new_hex_opt.as_deref().unwrap_or("0000000");

    match file.status {
        FileStatus::Added => {
            out.push_str(&format!("index 0000000..{}\n", new_hex));
        }
        FileStatus::Deleted => {
            out.push_str(&format!("index {}..0000000\n", old_hex));
        }
        _ => {
            if let Some(mode) = file.old_mode.filter(|m| Some(*m) == file.new_mode) {
                out.push_str(&format!("index {}..{} {}\n", old_hex, new_hex, format_mode(mode)));
            } else {
                out.push_str(&format!("index {}..{}\n", old_hex, new_hex));
            }
        }
    }

    if file.is_binary {
        out.push_str(&format!("Binary files a/{} and b/{} differ\n", old_path, new_path));
        return;
    }

    if !file.hunks.is_empty() {
        if file.status == FileStatus::Added {
            out.push_str("--- /dev/null\n");
        } else {
            out.push_str(&format!("--- a/{}\n", old_path));
        }

        if file.status == FileStatus::Deleted {
            out.push_str("+++ /dev/null\n");
        } else {
            out.push_str(&format!("+++ b/{}\n", new_path));
        }

        for hunk in &file.hunks {
            format_hunk(out, hunk);
        }
    }
}

fn format_hunk(out: &mut String, hunk: &Hunk) {
    let old_range = if hunk.old_count == 1 {
        format!("{}", hunk.old_start)
    } else {
        format!("{},{}", hunk.old_start, hunk.old_count)
    };
    let new_range = if hunk.new_count == 1 {
        format!("{}", hunk.new_start)
    } else {
        format!("{},{}", hunk.new_start, hunk.new_count)
    };
    out.push_str(&format!("@@ -{} +{} @@", old_range, new_range));
    if let Some(ref header) = hunk.header {
        out.push(' ');
        out.push_str(&header.to_str_lossy());
    }
    out.push('\n');

    for line in &hunk.lines {
        match line {
            DiffLine::Context(content) => {
                out.push(' ');
                out.push_str(&content.to_str_lossy());
                ensure_newline(out);
            }
            DiffLine::Addition(content) => {
                out.push('+');
                out.push_str(&content.to_str_lossy());
                ensure_newline(out);
            }
            DiffLine::Deletion(content) => {
                out.push('-');
                out.push_str(&content.to_str_lossy());
                ensure_newline(out);
            }
        }
    }
}

fn ensure_newline(out: &mut String) {
    if !out.ends_with('\n') {
        out.push_str("\n\\ No newline at end of file\n");
    }
}

fn format_mode(mode: lit_object::FileMode) -> String {
    format!("{:06o}", mode.raw())
}

fn short_hex(oid: &lit_hash::ObjectId) -> String {
    let h = oid.to_hex();
    h[..7.min(h.len())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bstr::BString;
    use lit_hash::ObjectId;
    use lit_object::FileMode;

    #[test]
    fn formats_added_file() {
        let result = DiffResult {
            files: vec![FileDiff {
                status: FileStatus::Added,
                old_path: None,
                new_path: Some(BString::from("a.txt")),
                old_mode: None,
                new_mode: Some(FileMode::Regular),
                old_oid: None,
                new_oid: Some(ObjectId::NULL),
                hunks: vec![Hunk {
                    old_start: 0,
                    old_count: 0,
                    new_start: 1,
                    new_count: 1,
                    header: None,
                    lines: vec![DiffLine::Addition(BString::from("hello\n"))],
                }],
                is_binary: false,
            }],
        };
        let text = format(&result);
        assert!(text.contains("diff --git a/a.txt b/a.txt"));
        assert!(text.contains("new file mode 100644"));
        assert!(text.contains("--- /dev/null"));
        assert!(text.contains("+++ b/a.txt"));
        assert!(text.contains("+hello"));
    }

    #[test]
    fn formats_binary_file() {
        let result = DiffResult {
            files: vec![FileDiff {
                status: FileStatus::Modified,
                old_path: Some(BString::from("img.png")),
                new_path: Some(BString::from("img.png")),
                old_mode: Some(FileMode::Regular),
                new_mode: Some(FileMode::Regular),
                old_oid: Some(ObjectId::NULL),
                new_oid: Some(ObjectId::NULL),
                hunks: Vec::new(),
                is_binary: true,
            }],
        };
        let text = format(&result);
        assert!(text.contains("Binary files a/img.png and b/img.png differ"));
    }

    #[test]
    fn hunk_header_omits_count_for_single_line() {
        let hunk = Hunk {
            old_start: 5,
            old_count: 1,
            new_start: 5,
            new_count: 1,
            header: None,
            lines: vec![DiffLine::Context(BString::from("same\n"))],
        };
        let mut out = String::new();
        format_hunk(&mut out, &hunk);
        assert!(out.starts_with("@@ -5 +5 @@\n"));
    }
}
