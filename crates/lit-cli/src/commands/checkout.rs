use anyhow::{bail, Result};
use bstr::BStr;
use clap::Args;
use lit_hash::ObjectId;
use lit_ref::{RefName, RefStore};

use super::open_repo;

#[derive(Args)]
pub struct CheckoutArgs {
    /// Create a new branch and switch to it
    #[arg(short, value_name = "new-branch")]
    b: Option<String>,

    /// Force checkout, discarding local changes
    #[arg(short, long)]
    force: bool,

    /// Target branch, commit, or file
    target: Option<String>,

    /// Additional paths (when checking out files)
    #[arg(last = true)]
    paths: Vec<String>,
}

pub fn run(args: &CheckoutArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    if !args.paths.is_empty() {
        let mut files = args.paths.clone();
        if let Some(target) = &args.target {
            files.insert(0, target.clone());
        }
        let paths: Vec<&BStr> = files.iter().map(|f| BStr::new(f.as_bytes())).collect();
        repo.checkout_paths(&paths, None, false)?;
        return Ok(0);
    }

    if let Some(new_branch) = &args.b {
        let start = repo.head_oid()?.ok_or(lit_repo::RepoError::UnbornBranch("HEAD".to_string()))?;
        repo.branch_create(new_branch, start)?;
        repo.switch_branch(new_branch, args.force)?;
        println!("Switched to a new branch '{new_branch}'");
        return Ok(0);
    }

    let Some(target) = &args.target else {
        bail!("you must specify a branch, commit, or path to checkout");
    };

    let refname = RefName::new(format!("refs/heads/{target}"))?;
    if repo.refs().resolve(&refname)?.is_some() {
        repo.switch_branch(target, args.force)?;
        println!("Switched to branch '{target}'");
        return Ok(0);
    }

    let work_tree = repo.work_tree().map(|p| p.to_path_buf());
    if work_tree.as_ref().is_some_and(|wt| wt.join(target).exists()) {
        let path = BStr::new(target.as_bytes());
        repo.checkout_paths(&[path], None, false)?;
        return Ok(0);
    }

    match ObjectId::from_hex(target) {
        Ok(oid) => {
            repo.checkout_detached(oid, args.force)?;
            println!("HEAD is now at {} detached", &oid.to_hex()[..7]);
            Ok(0)
        }
        Err(_) => {
            eprintln!("error: pathspec '{target}' did not match any file(s) known to lit");
            Ok(1)
        }
    }
}
