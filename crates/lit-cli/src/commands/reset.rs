use anyhow::Result;
use clap::Args;
use lit_repo::reset::ResetMode;

use super::{open_repo, resolve_revision};

#[derive(Args)]
pub struct ResetArgs {
    /// Only move HEAD; keep index and working tree
    #[arg(long)]
    soft: bool,

    /// Move HEAD and reset the index; keep the working tree (default)
    #[arg(long)]
    mixed: bool,

    /// Move HEAD, reset the index, and overwrite the working tree
    #[arg(long)]
    hard: bool,

    /// Commit to reset to
    commit: Option<String>,
}

pub fn run(args: &ResetArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let target_spec = args.commit.as_deref().unwrap_or("HEAD");
    let target = resolve_revision(&repo, target_spec)?;

    let mode = if args.soft {
        ResetMode::Soft
    } else if args.hard {
        ResetMode::Hard
    } else {
        ResetMode::Mixed
    };

    repo.reset(target, mode)?;

    if mode == ResetMode::Hard {
        println!("HEAD is now at {}", &target.to_hex()[..7]);
    }
    Ok(0)
}
