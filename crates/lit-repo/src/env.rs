use std::path::PathBuf;

/// Environment variable overrides for repository discovery.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    /// `LIT_DIR` — use this path as the control directory instead of
    /// discovering `.lit/` by walking up from the current directory.
    pub lit_dir: Option<PathBuf>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self { lit_dir: lit_config::lit_dir_override() }
    }
}
