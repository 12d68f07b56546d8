use anyhow::{bail, Result};
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct SwitchArgs {
    /// Create a new branch and switch to it
    #[arg(short = 'c', long = "create")]
    create: bool,

    /// Force the switch, discarding local changes
    #[arg(short, long)]
    force: bool,

    /// Branch to switch to
    name: String,
}

pub fn run(args: &SwitchArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    if args.create {
        let Some(start) = repo.head_oid()? else { bail!("cannot create a branch: HEAD is unborn") };
        repo.branch_create(&args.name, start)?;
    }

    repo.switch_branch(&args.name, args.force)?;
    println!("Switched to branch '{}'", args.name);
    Ok(0)
}
