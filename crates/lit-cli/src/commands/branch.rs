use anyhow::{bail, Result};
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct BranchArgs {
    /// Delete a branch
    #[arg(short = 'd', long = "delete")]
    delete: bool,

    /// Delete a branch, even if not fully merged
    #[arg(short = 'D')]
    force_delete: bool,

    /// Rename a branch
    #[arg(short = 'm', long = "move")]
    rename: bool,

    /// Branch name (or old name, when renaming)
    name: Option<String>,

    /// Starting point for a new branch, or the new name when renaming
    start_point_or_new_name: Option<String>,
}

pub fn run(args: &BranchArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    if args.delete || args.force_delete {
        let Some(name) = &args.name else { bail!("branch name required") };
        let oid = repo.branch_delete(name, args.force_delete)?;
        println!("Deleted branch {name} (was {}).", &oid.to_hex()[..7]);
        return Ok(0);
    }

    if args.rename {
        let (old, new) = match (&args.name, &args.start_point_or_new_name) {
            (Some(old), Some(new)) => (old.clone(), new.clone()),
            (Some(new), None) => (
                repo.current_branch()?.ok_or(lit_repo::RepoError::DetachedHead)?.short_name().to_string(),
                new.clone(),
            ),
            _ => bail!("branch name required"),
        };
        repo.branch_rename(&old, &new)?;
        return Ok(0);
    }

    match &args.name {
        Some(name) => {
            let start = match &args.start_point_or_new_name {
                Some(rev) => repo.head_oid()?.filter(|_| rev == "HEAD").ok_or(lit_repo::RepoError::UnbornBranch(rev.clone()))?,
                None => repo.head_oid()?.ok_or(lit_repo::RepoError::UnbornBranch("HEAD".to_string()))?,
            };
            repo.branch_create(name, start)?;
            Ok(0)
        }
        None => {
            for branch in repo.branch_list()? {
                let marker = if branch.is_current { "*" } else { " " };
                println!("{marker} {}", branch.name);
            }
            Ok(0)
        }
    }
}
