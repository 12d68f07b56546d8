use anyhow::{bail, Result};
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct AddArgs {
    /// Add all tracked and untracked files under the working tree
    #[arg(short = 'A', long = "all")]
    all: bool,

    /// Be verbose, naming each file as it's staged
    #[arg(short, long)]
    verbose: bool,

    /// Files to add
    #[arg(value_name = "pathspec")]
    files: Vec<String>,
}

pub fn run(args: &AddArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    if args.all {
        repo.stage_all()?;
        repo.write_index()?;
        return Ok(0);
    }

    if args.files.is_empty() {
        bail!("Nothing specified, nothing added.");
    }

    for file in &args.files {
        repo.stage_file(file)?;
        if args.verbose {
            println!("add '{file}'");
        }
    }
    repo.write_index()?;
    Ok(0)
}
