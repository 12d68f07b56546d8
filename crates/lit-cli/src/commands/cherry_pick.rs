use anyhow::Result;
use clap::Args;
use lit_merge::MergeOptions;
use lit_repo::cherry_pick::CherryPickOutcome;

use super::{open_repo, resolve_revision};

#[derive(Args)]
pub struct CherryPickArgs {
    /// Commit to apply
    commit: String,
}

pub fn run(args: &CherryPickArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let oid = resolve_revision(&repo, &args.commit)?;

    match repo.cherry_pick(oid, &MergeOptions::default())? {
        CherryPickOutcome::Applied(new_oid) => {
            println!("[{}] cherry-picked", &new_oid.to_hex()[..7]);
            Ok(0)
        }
        CherryPickOutcome::Conflicted(paths) => {
            for path in &paths {
                println!("CONFLICT (content): Merge conflict in {path}");
            }
            eprintln!("error: could not apply {}", &oid.to_hex()[..7]);
            Ok(1)
        }
    }
}
