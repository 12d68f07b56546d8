use anyhow::{bail, Result};
use clap::Args;
use lit_merge::MergeOptions;
use lit_ref::{RefName, RefStore};
use lit_repo::merge::MergeOutcome;

use super::open_repo;

#[derive(Args)]
pub struct PullArgs {
    /// Be quiet
    #[arg(short, long)]
    quiet: bool,

    /// Remote to pull from
    remote: Option<String>,

    /// Branch to pull
    branch: Option<String>,
}

pub fn run(args: &PullArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let remote_name = args.remote.as_deref().unwrap_or("origin");

    if !args.quiet {
        println!("Fetching {remote_name}");
    }
    repo.fetch_remote(remote_name)?;

    let current = repo.current_branch()?.ok_or_else(|| anyhow::anyhow!("You are not currently on a branch."))?;
    let branch_short = args.branch.clone().unwrap_or_else(|| current.short_name().to_string());

    let tracking = RefName::new(format!("refs/remotes/{remote_name}/{branch_short}"))?;
    let Some(theirs) = repo.refs().resolve_to_oid(&tracking)? else {
        bail!("couldn't find remote ref {branch_short}");
    };

    let message = format!("Merge branch '{branch_short}' of {remote_name}\n");
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
