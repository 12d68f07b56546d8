use bstr::{BStr, BString, ByteSlice};

use crate::error::UtilError;
use crate::Result;

/// A path in Lit's internal representation: always forward slashes, never a
/// trailing slash (unless it's the root). Lit stores and compares paths this
/// way regardless of the host platform's native separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LitPath(BString);

#[inline]
fn is_separator(b: u8) -> bool {
    b == b'/' || b == b'\\'
}

fn last_separator(bytes: &[u8]) -> Option<usize> {
    bytes.iter().rposition(|&b| b == b'/')
}

fn trim_trailing_slashes(bytes: &mut Vec<u8>) {
    while bytes.len() > 1 && bytes.last() == Some(&b'/') {
        bytes.pop();
    }
}

impl LitPath {
    /// Build a path from arbitrary bytes, folding `\` into `/` and dropping
    /// any trailing separator (a lone `/` is kept as the root).
    pub fn new(path: impl AsRef<[u8]>) -> Self {
        let mut normalized: Vec<u8> =
            path.as_ref().iter().map(|&b| if is_separator(b) { b'/' } else { b }).collect();
        trim_trailing_slashes(&mut normalized);
        LitPath(BString::from(normalized))
    }

    /// Wrap bytes that are already known to be normalized, skipping the scan.
    pub fn from_normalized(path: BString) -> Self {
        LitPath(path)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_bstr(&self) -> &BStr {
        self.0.as_bstr()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append `other` as a child path component.
    ///
    /// An empty `other` is a no-op; an absolute `other` replaces `self`
    /// entirely (mirroring how `Path::join` behaves for native paths).
    pub fn join(&self, other: impl AsRef<[u8]>) -> LitPath {
        let other = other.as_ref();
        if other.is_empty() {
            return self.clone();
        }
        if is_separator(other[0]) || self.is_empty() {
            return LitPath::new(other);
        }

        let mut combined = Vec::with_capacity(self.len() + other.len() + 1);
        combined.extend_from_slice(self.as_bytes());
        combined.push(b'/');
        combined.extend_from_slice(other);
        LitPath::new(combined)
    }

    /// The directory portion, or `.` when there isn't one.
    pub fn dirname(&self) -> &BStr {
        let bytes = self.0.as_bytes();
        if bytes.is_empty() {
            return BStr::new(b".");
        }
        match last_separator(bytes) {
            Some(0) => BStr::new(b"/"),
            Some(pos) => BStr::new(&bytes[..pos]),
            None => BStr::new(b"."),
        }
    }

    /// The final path component.
    pub fn basename(&self) -> &BStr {
        let bytes = self.0.as_bytes();
        match last_separator(bytes) {
            Some(pos) => BStr::new(&bytes[pos + 1..]),
            None => BStr::new(bytes),
        }
    }

    /// Resolve `.`/`..` components. Climbing past the root of an absolute
    /// path is an error; a relative path may carry leading `..` outward.
    pub fn normalize(&self) -> Result<LitPath> {
        let bytes = self.0.as_bytes();
        if bytes.is_empty() {
            return Ok(LitPath::new(b"" as &[u8]));
        }
        let is_absolute = bytes[0] == b'/';

        let mut stack: Vec<&[u8]> = Vec::new();
        for part in bytes.split(|&b| b == b'/') {
            match part {
                b"" | b"." => {}
                b".."
                    if stack.last().copied() == Some(b".." as &[u8])
                        || (stack.is_empty() && !is_absolute) =>
                {
                    stack.push(b"..");
                }
                b".." if stack.is_empty() => {
                    return Err(UtilError::Path("cannot normalize path above root".into()));
                }
                b".." => {
                    stack.pop();
                }
                other => stack.push(other),
            }
        }

        if stack.is_empty() {
            return Ok(LitPath::new(if is_absolute { b"/" as &[u8] } else { b"." as &[u8] }));
        }

        let mut result = Vec::new();
        if is_absolute {
            result.push(b'/');
        }
        result.extend_from_slice(&stack.join(&b"/"[..]));
        Ok(LitPath::from_normalized(BString::from(result)))
    }

    /// Convert to a native path for filesystem calls.
    pub fn to_os_path(&self) -> std::path::PathBuf {
        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStrExt;
            std::path::PathBuf::from(std::ffi::OsStr::from_bytes(self.0.as_bytes()))
        }
        #[cfg(not(unix))]
        {
            std::path::PathBuf::from(self.0.to_str_lossy().replace('/', "\\"))
        }
    }

    pub fn is_absolute(&self) -> bool {
        let bytes = self.0.as_bytes();
        match bytes.first() {
            None => false,
            Some(b'/') => true,
            Some(first) => {
                // Windows drive letter, e.g. "C:/".
                first.is_ascii_alphabetic()
                    && bytes.len() >= 3
                    && bytes[1] == b':'
                    && is_separator(bytes[2])
            }
        }
    }

    /// Express `self` relative to `base`, using as many `../` climbs as the
    /// two paths' components diverge after their shared prefix.
    pub fn relative_to(&self, base: &LitPath) -> Result<LitPath> {
        if self.is_empty() {
            return Ok(LitPath::new(b"." as &[u8]));
        }
        if base.is_empty() {
            return Ok(self.clone());
        }

        let mine: Vec<&[u8]> = self.0.as_bytes().split(|&b| b == b'/').filter(|c| !c.is_empty()).collect();
        let theirs: Vec<&[u8]> =
            base.0.as_bytes().split(|&b| b == b'/').filter(|c| !c.is_empty()).collect();
        let shared = mine.iter().zip(theirs.iter()).take_while(|(a, b)| a == b).count();

        let mut out = Vec::new();
        for _ in shared..theirs.len() {
            out.extend_from_slice(b"../");
        }
        for (i, part) in mine[shared..].iter().enumerate() {
            if i > 0 {
                out.push(b'/');
            }
            out.extend_from_slice(part);
        }
        trim_trailing_slashes(&mut out);

        if out.is_empty() {
            Ok(LitPath::new(b"." as &[u8]))
        } else {
            Ok(LitPath::from_normalized(BString::from(out)))
        }
    }

    pub fn has_extension(&self, ext: &[u8]) -> bool {
        let name = self.basename().as_bytes();
        match name.iter().rposition(|&b| b == b'.') {
            Some(dot) => &name[dot + 1..] == ext,
            None => false,
        }
    }
}

impl std::fmt::Display for LitPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_bstr())
    }
}

impl AsRef<[u8]> for LitPath {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&[u8]> for LitPath {
    fn from(bytes: &[u8]) -> Self {
        LitPath::new(bytes)
    }
}

impl From<&str> for LitPath {
    fn from(s: &str) -> Self {
        LitPath::new(s.as_bytes())
    }
}

impl From<BString> for LitPath {
    fn from(s: BString) -> Self {
        LitPath::new(s)
    }
}

/// Quote a path the way `core.quotePath` output does: if every byte is
/// printable ASCII the path passes through untouched, otherwise the whole
/// thing is wrapped in double quotes with control/high bytes octal-escaped
/// and `\`/`"`/newline/tab given their usual short escapes.
pub fn quote_path(path: &[u8]) -> String {
    let needs_quoting = path.iter().any(|&b| !(0x20..0x7f).contains(&b) || b == b'\\' || b == b'"');
    if !needs_quoting {
        return String::from_utf8_lossy(path).into_owned();
    }

    let mut out = String::with_capacity(path.len() + 8);
    out.push('"');
    for &b in path {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out.push('"');
    out
}
