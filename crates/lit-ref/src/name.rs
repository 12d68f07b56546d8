//! Validated reference names (`git-check-ref-format` rules).

use std::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::error::RefError;

/// A validated reference name.
///
/// Enforces the rules git-check-ref-format describes:
/// - No double dots `..`, no `//`
/// - No ASCII control characters or space, `~`, `^`, `:`, `?`, `*`, `[`, `\`
/// - Cannot begin or end with `/`
/// - Cannot end with `.` or `.lock`
/// - Cannot contain `@{`, cannot be the single character `@`
/// - No component may start with `.` or end with `.lock`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefName(BString);

const FORBIDDEN_CHARS: &[u8] = b" ~^:?*[\\";

/// Special ref names that are valid without a `/`.
const SPECIAL_REFS: &[&str] = &[
    "HEAD",
    "MERGE_HEAD",
    "CHERRY_PICK_HEAD",
    "REVERT_HEAD",
    "ORIG_HEAD",
    "FETCH_HEAD",
    "REBASE_HEAD",
];

impl RefName {
    pub fn new(name: impl Into<BString>) -> Result<Self, RefError> {
        let name = name.into();
        validate_ref_name(&name)?;
        Ok(Self(name))
    }

    pub(crate) fn new_unchecked(name: impl Into<BString>) -> Self {
        Self(name.into())
    }

    /// The short name (e.g. `main` from `refs/heads/main`).
    pub fn short_name(&self) -> &BStr {
        let s = self.0.as_bstr();
        if let Some(rest) = s.strip_prefix(b"refs/heads/") {
            rest.as_bstr()
        } else if let Some(rest) = s.strip_prefix(b"refs/tags/") {
            rest.as_bstr()
        } else if let Some(rest) = s.strip_prefix(b"refs/remotes/") {
            rest.as_bstr()
        } else {
            s
        }
    }

    pub fn is_branch(&self) -> bool {
        self.0.starts_with(b"refs/heads/")
    }

    pub fn is_tag(&self) -> bool {
        self.0.starts_with(b"refs/tags/")
    }

    pub fn is_remote(&self) -> bool {
        self.0.starts_with(b"refs/remotes/")
    }

    pub fn is_special(&self) -> bool {
        let s = self.0.to_str_lossy();
        SPECIAL_REFS.contains(&s.as_ref())
    }

    pub fn as_bstr(&self) -> &BStr {
        self.0.as_bstr()
    }

    /// Ref names are always ASCII/UTF-8 once validated.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("<invalid-utf8>")
    }

    pub fn into_inner(self) -> BString {
        self.0
    }
}

impl AsRef<BStr> for RefName {
    fn as_ref(&self) -> &BStr {
        self.0.as_bstr()
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_ref_name(name: &[u8]) -> Result<(), RefError> {
    let name_str = || String::from_utf8_lossy(name).into_owned();

    if name.is_empty() {
        return Err(RefError::InvalidName("ref name is empty".into()));
    }

    if name.contains(&0) {
        return Err(RefError::InvalidName(format!(
            "'{}': contains NUL byte",
            name_str()
        )));
    }

    if name == b"@" {
        return Err(RefError::InvalidName("'@' is not a valid ref name".into()));
    }

    for (i, &b) in name.iter().enumerate() {
        if b < 0x20 || b == 0x7f {
            return Err(RefError::InvalidName(format!(
                "'{}': contains control character at position {}",
                name_str(),
                i
            )));
        }
        if FORBIDDEN_CHARS.contains(&b) {
            return Err(RefError::InvalidName(format!(
                "'{}': contains forbidden character '{}' at position {}",
                name_str(),
                b as char,
                i
            )));
        }
    }

    if name.starts_with(b".") {
        return Err(RefError::InvalidName(format!("'{}': starts with '.'", name_str())));
    }
    if name.ends_with(b"/") {
        return Err(RefError::InvalidName(format!("'{}': ends with '/'", name_str())));
    }
    if name.starts_with(b"/") {
        return Err(RefError::InvalidName(format!("'{}': starts with '/'", name_str())));
    }
    if name.ends_with(b".") {
        return Err(RefError::InvalidName(format!("'{}': ends with '.'", name_str())));
    }
    if name.ends_with(b".lock") {
        return Err(RefError::InvalidName(format!("'{}': ends with '.lock'", name_str())));
    }
    if name.find(b"..").is_some() {
        return Err(RefError::InvalidName(format!("'{}': contains '..'", name_str())));
    }
    if name.find(b"//").is_some() {
        return Err(RefError::InvalidName(format!("'{}': contains '//'", name_str())));
    }
    if name.find(b"@{").is_some() {
        return Err(RefError::InvalidName(format!("'{}': contains '@{{'", name_str())));
    }

    for component in name.split_str(b"/") {
        if component.starts_with(b".") {
            return Err(RefError::InvalidName(format!(
                "'{}': component starts with '.'",
                name_str()
            )));
        }
        if component.ends_with(b".lock") {
            return Err(RefError::InvalidName(format!(
                "'{}': component ends with '.lock'",
                name_str()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ref_names() {
        assert!(RefName::new("refs/heads/main").is_ok());
        assert!(RefName::new("refs/tags/v1.0").is_ok());
        assert!(RefName::new("refs/remotes/origin/main").is_ok());
        assert!(RefName::new("HEAD").is_ok());
        assert!(RefName::new("refs/heads/feature/sub-branch").is_ok());
    }

    #[test]
    fn invalid_double_dot() {
        assert!(RefName::new("refs/heads/main..branch").is_err());
    }

    #[test]
    fn invalid_control_char() {
        assert!(RefName::new(b"refs/heads/\x01bad".to_vec()).is_err());
    }

    #[test]
    fn invalid_space_tilde_caret_colon() {
        assert!(RefName::new("refs/heads/bad name").is_err());
        assert!(RefName::new("refs/heads/bad~name").is_err());
        assert!(RefName::new("refs/heads/bad^name").is_err());
        assert!(RefName::new("refs/heads/bad:name").is_err());
    }

    #[test]
    fn invalid_starts_with_dot_or_slash() {
        assert!(RefName::new(".refs/heads/main").is_err());
        assert!(RefName::new("/refs/heads/main").is_err());
        assert!(RefName::new("refs/heads/.hidden").is_err());
    }

    #[test]
    fn invalid_ends_with_slash_dot_or_lock() {
        assert!(RefName::new("refs/heads/main/").is_err());
        assert!(RefName::new("refs/heads/main.").is_err());
        assert!(RefName::new("refs/heads/main.lock").is_err());
    }

    #[test]
    fn invalid_double_slash_and_at_brace() {
        assert!(RefName::new("refs//heads/main").is_err());
        assert!(RefName::new("refs/heads/main@{0}").is_err());
    }

    #[test]
    fn invalid_single_at_and_empty() {
        assert!(RefName::new("@").is_err());
        assert!(RefName::new("").is_err());
    }

    #[test]
    fn short_name_variants() {
        assert_eq!(RefName::new("refs/heads/main").unwrap().short_name(), "main");
        assert_eq!(RefName::new("refs/tags/v1.0").unwrap().short_name(), "v1.0");
        assert_eq!(
            RefName::new("refs/remotes/origin/main").unwrap().short_name(),
            "origin/main"
        );
        assert_eq!(RefName::new("HEAD").unwrap().short_name(), "HEAD");
    }

    #[test]
    fn classification() {
        assert!(RefName::new("refs/heads/main").unwrap().is_branch());
        assert!(RefName::new("refs/tags/v1.0").unwrap().is_tag());
        assert!(RefName::new("refs/remotes/origin/main").unwrap().is_remote());
        assert!(RefName::new("HEAD").unwrap().is_special());
        assert!(!RefName::new("refs/heads/main").unwrap().is_special());
    }

    #[test]
    fn display_and_ordering() {
        let r = RefName::new("refs/heads/main").unwrap();
        assert_eq!(r.to_string(), "refs/heads/main");
        let a = RefName::new("refs/heads/alpha").unwrap();
        let b = RefName::new("refs/heads/beta").unwrap();
        assert!(a < b);
    }
}
