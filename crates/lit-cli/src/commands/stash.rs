use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use lit_repo::merge::MergeOutcome;

use super::open_repo;

#[derive(Args)]
pub struct StashArgs {
    #[command(subcommand)]
    command: Option<StashSubcommand>,
}

#[derive(Subcommand)]
pub enum StashSubcommand {
    /// Save changes to the stash (default)
    Push {
        /// Message for the stash entry
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Apply the most recent stash and remove it
    Pop { stash: Option<usize> },
    /// Apply a stash entry without removing it
    Apply { stash: Option<usize> },
    /// List stash entries
    List,
    /// Drop a stash entry
    Drop { stash: Option<usize> },
}

pub fn run(args: &StashArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    match &args.command {
        None => {
            let oid = repo.stash_push(None)?;
            println!("Saved working directory and index state WIP ({})", &oid.to_hex()[..7]);
            Ok(0)
        }
        Some(StashSubcommand::Push { message }) => {
            let oid = repo.stash_push(message.as_deref())?;
            println!("Saved working directory and index state WIP ({})", &oid.to_hex()[..7]);
            Ok(0)
        }
        Some(StashSubcommand::Pop { stash }) => report_merge(repo.stash_pop(stash.unwrap_or(0))?),
        Some(StashSubcommand::Apply { stash }) => report_merge(repo.stash_apply(stash.unwrap_or(0))?),
        Some(StashSubcommand::List) => {
            for entry in repo.stash_list()? {
                println!("stash@{{{}}}: {}", entry.index, entry.message);
            }
            Ok(0)
        }
        Some(StashSubcommand::Drop { stash }) => {
            let index = stash.unwrap_or(0);
            let entries = repo.stash_list()?;
            let Some(entry) = entries.into_iter().find(|e| e.index == index) else {
                bail!("no stash entry at index {index}");
            };
            repo.stash_drop(index)?;
            println!("Dropped stash@{{{}}} ({})", index, &entry.oid.to_hex()[..7]);
            Ok(0)
        }
    }
}

fn report_merge(outcome: MergeOutcome) -> Result<i32> {
    match outcome {
        MergeOutcome::AlreadyUpToDate | MergeOutcome::FastForward(_) | MergeOutcome::Merged(_) => {
            println!("Dropped stash entry");
            Ok(0)
        }
        MergeOutcome::Conflicted(paths) => {
            for path in &paths {
                println!("CONFLICT (content): Merge conflict in {path}");
            }
            eprintln!("error: could not restore untracked files from stash entry");
            Ok(1)
        }
    }
}
