use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use lit_repo::Repository;

#[derive(Args)]
pub struct CloneArgs {
    /// Repository to clone from (a local filesystem path)
    url: String,

    /// Directory to clone into; defaults to the basename of `url`
    directory: Option<PathBuf>,
}

pub fn run(args: &CloneArgs) -> Result<i32> {
    let dest = match &args.directory {
        Some(dir) => dir.clone(),
        None => {
            let stripped = args.url.trim_end_matches('/').trim_end_matches(".lit");
            let name = stripped.rsplit('/').next().unwrap_or(stripped);
            if name.is_empty() {
                bail!("could not infer destination directory from '{}'", args.url);
            }
            PathBuf::from(name)
        }
    };

    if dest.exists() && dest.read_dir().map(|mut d| d.next().is_some()).unwrap_or(false) {
        bail!("destination path '{}' already exists and is not an empty directory.", dest.display());
    }
    std::fs::create_dir_all(&dest)?;

    println!("Cloning into '{}'...", dest.display());
    Repository::clone_from(&args.url, &dest)?;
    Ok(0)
}
