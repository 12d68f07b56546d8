//! Typed value conversion.

use bstr::{BStr, ByteSlice};

use crate::error::ConfigError;

/// Parse a boolean config value.
///
/// - `None` (key with no `=` sign) -> `true`
/// - `""` -> `false`
/// - `"true"`, `"yes"`, `"on"` (case-insensitive) -> `true`
/// - `"false"`, `"no"`, `"off"` (case-insensitive) -> `false`
/// - any other integer -> nonzero is `true`, zero is `false`
pub fn parse_bool(value: Option<&BStr>) -> Result<bool, ConfigError> {
    match value {
        None => Ok(true),
        Some(v) => {
            let s = v.to_str_lossy();
            let s = s.trim();
            if s.is_empty() {
                return Ok(false);
            }
            match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" => Ok(false),
                _ => {
                    if let Ok(n) = s.parse::<i64>() {
                        Ok(n != 0)
                    } else {
                        Err(ConfigError::InvalidBool(s.to_string()))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_none_is_true() {
        assert_eq!(parse_bool(None).unwrap(), true);
    }

    #[test]
    fn bool_empty_is_false() {
        assert_eq!(parse_bool(Some(BStr::new(""))).unwrap(), false);
    }

    #[test]
    fn bool_true_variants() {
        for v in &["true", "yes", "on", "True", "YES", "On", "1"] {
            assert_eq!(parse_bool(Some(BStr::new(v))).unwrap(), true, "failed for {}", v);
        }
    }

    #[test]
    fn bool_false_variants() {
        for v in &["false", "no", "off", "False", "NO", "Off", "0"] {
            assert_eq!(parse_bool(Some(BStr::new(v))).unwrap(), false, "failed for {}", v);
        }
    }

    #[test]
    fn bool_invalid() {
        assert!(parse_bool(Some(BStr::new("maybe"))).is_err());
    }
}
