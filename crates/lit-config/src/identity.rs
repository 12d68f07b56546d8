//! Author/committer identity resolution.
//!
//! Resolution order, highest priority first:
//! 1. `LIT_AUTHOR_NAME`/`LIT_AUTHOR_EMAIL` (or the `LIT_COMMITTER_*` pair
//!    for the committer identity) environment variables.
//! 2. `user.name`/`user.email` in the repository's `.lit/config`.
//! 3. [`ConfigError::MissingIdentity`] — there is no anonymous fallback and
//!    no global/system config layer to fall further back to.

use bstr::BString;
use lit_utils::date::{LitDate, Signature};

use crate::error::ConfigError;
use crate::set::Config;

/// Resolve the author identity and stamp it with the current time.
pub fn resolve_author(config: &Config) -> Result<Signature, ConfigError> {
    resolve("LIT_AUTHOR_NAME", "LIT_AUTHOR_EMAIL", config)
}

/// Resolve the committer identity and stamp it with the current time.
pub fn resolve_committer(config: &Config) -> Result<Signature, ConfigError> {
    resolve("LIT_COMMITTER_NAME", "LIT_COMMITTER_EMAIL", config)
}

fn resolve(name_var: &str, email_var: &str, config: &Config) -> Result<Signature, ConfigError> {
    let name = std::env::var(name_var)
        .ok()
        .or(config.get_string("user.name")?);
    let email = std::env::var(email_var)
        .ok()
        .or(config.get_string("user.email")?);

    match (name, email) {
        (Some(name), Some(email)) => Ok(Signature {
            name: BString::from(name),
            email: BString::from(email),
            date: LitDate::now(),
        }),
        _ => Err(ConfigError::MissingIdentity),
    }
}

/// `LIT_DIR`, the override for where the repository's control directory
/// lives, bypassing discovery from the current directory.
pub fn lit_dir_override() -> Option<std::path::PathBuf> {
    std::env::var_os("LIT_DIR").map(std::path::PathBuf::from)
}
