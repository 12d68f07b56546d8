use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use super::open_repo;

#[derive(Args)]
pub struct RemoteArgs {
    /// Show URLs in addition to remote names
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<RemoteSubcommand>,
}

#[derive(Subcommand)]
pub enum RemoteSubcommand {
    /// Add a new remote
    Add { name: String, url: String },
    /// Remove a remote and its tracking refs
    Remove { name: String },
}

pub fn run(args: &RemoteArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    match &args.command {
        None => {
            for name in repo.remote_list() {
                if args.verbose {
                    let url = repo.config().get_string(&format!("remote.{name}.url"))?.unwrap_or_default();
                    println!("{name}\t{url} (fetch)");
                    println!("{name}\t{url} (push)");
                } else {
                    println!("{name}");
                }
            }
        }
        Some(RemoteSubcommand::Add { name, url }) => {
            if repo.remote_list().contains(name) {
                bail!("remote {name} already exists.");
            }
            repo.remote_add(name, url)?;
        }
        Some(RemoteSubcommand::Remove { name }) => {
            if !repo.remote_list().contains(name) {
                bail!("No such remote: '{name}'");
            }
            repo.remote_remove(name)?;
        }
    }

    Ok(0)
}
