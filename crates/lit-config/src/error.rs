use std::path::PathBuf;

/// Errors that can occur during config operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config key: {0}")]
    InvalidKey(String),

    #[error("parse error in {file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("invalid boolean value: {0}")]
    InvalidBool(String),

    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error(
        "no identity configured: set user.name and user.email in .lit/config, \
         or LIT_AUTHOR_NAME/LIT_AUTHOR_EMAIL (LIT_COMMITTER_NAME/LIT_COMMITTER_EMAIL for the committer)"
    )]
    MissingIdentity,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("lock error: {0}")]
    Lock(#[from] lit_utils::UtilError),
}
