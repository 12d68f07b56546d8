use anyhow::Result;
use clap::Args;
use lit_merge::MergeOptions;
use lit_repo::merge::MergeOutcome;

use super::{open_repo, resolve_revision};

#[derive(Args)]
pub struct MergeArgs {
    /// Branch, tag, or commit to merge into the current branch
    commit: String,

    /// Use the given message for the merge commit
    #[arg(short = 'm', long = "message")]
    message: Option<String>,
}

pub fn run(args: &MergeArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let theirs = resolve_revision(&repo, &args.commit)?;
    let message = args.message.clone().unwrap_or_else(|| format!("Merge commit '{}'\n", args.commit));

    match repo.merge(theirs, &MergeOptions::default(), message)? {
        MergeOutcome::AlreadyUpToDate => {
            println!("Already up to date.");
            Ok(0)
        }
        MergeOutcome::FastForward(oid) => {
            println!("Fast-forward");
            println!("HEAD is now at {}", &oid.to_hex()[..7]);
            Ok(0)
        }
        MergeOutcome::Merged(oid) => {
            println!("Merge made by the 'ort' strategy.");
            println!("{}", &oid.to_hex()[..7]);
            Ok(0)
        }
        MergeOutcome::Conflicted(paths) => {
            for path in &paths {
                println!("CONFLICT (content): Merge conflict in {path}");
            }
            eprintln!("Automatic merge failed; fix conflicts and then commit the result.");
            Ok(1)
        }
    }
}
