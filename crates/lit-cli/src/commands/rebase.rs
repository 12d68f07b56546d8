use anyhow::{bail, Result};
use clap::Args;
use lit_repo::rebase::RebaseStepOutcome;

use super::{open_repo, resolve_revision};

#[derive(Args)]
pub struct RebaseArgs {
    /// Abort the current rebase
    #[arg(long)]
    abort: bool,

    /// Continue the rebase after resolving conflicts
    #[arg(long = "continue")]
    r#continue: bool,

    /// Upstream commit to rebase onto
    upstream: Option<String>,
}

pub fn run(args: &RebaseArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    if args.abort {
        repo.rebase_abort()?;
        println!("Rebase aborted.");
        return Ok(0);
    }

    let outcome = if args.r#continue {
        repo.rebase_continue()?
    } else {
        let Some(upstream) = &args.upstream else {
            bail!("missing upstream commit to rebase onto");
        };
        let oid = resolve_revision(&repo, upstream)?;
        repo.rebase_start(oid)?
    };

    match outcome {
        RebaseStepOutcome::Complete => {
            println!("Successfully rebased.");
            Ok(0)
        }
        RebaseStepOutcome::Applied(oid) => {
            println!("Applied {}", &oid.to_hex()[..7]);
            Ok(0)
        }
        RebaseStepOutcome::Conflicted(paths) => {
            for path in &paths {
                println!("CONFLICT (content): Merge conflict in {path}");
            }
            eprintln!("error: could not apply commit; resolve conflicts and run 'lit rebase --continue'");
            Ok(1)
        }
    }
}
