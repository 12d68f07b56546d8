use anyhow::{bail, Result};
use clap::Args;
use lit_repo::commit::CommitOptions;
use lit_utils::date::{LitDate, Signature};

use super::open_repo;

#[derive(Args)]
pub struct CommitArgs {
    /// Use the given message as the commit message
    #[arg(short = 'm', long = "message")]
    message: Option<String>,

    /// Automatically stage every tracked, modified file before committing
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Override the author (format: "Name <email>")
    #[arg(long, value_name = "author")]
    author: Option<String>,
}

pub fn run(args: &CommitArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    if !repo.index()?.conflicted_paths().is_empty() {
        bail!("cannot commit: you have unmerged paths.\nfix conflicts and then commit the result.");
    }

    if args.all {
        stage_modified(&mut repo)?;
    }

    let Some(message) = &args.message else {
        bail!("Aborting commit due to empty commit message.");
    };

    let author = match &args.author {
        Some(spec) => Some(parse_author(spec)?),
        None => None,
    };

    let oid = repo.commit(format!("{message}\n"), CommitOptions { author, committer: None, extra_parents: Vec::new() })?;
    let branch = repo.current_branch()?.map(|b| b.short_name().to_string()).unwrap_or_else(|| "HEAD".to_string());
    println!("[{branch} {}] {message}", &oid.to_hex()[..7]);
    Ok(0)
}

fn stage_modified(repo: &mut lit_repo::Repository) -> Result<()> {
    let work_tree = repo.require_work_tree()?.to_path_buf();
    let paths: Vec<_> = repo.index()?.iter().map(|e| e.path.to_string()).collect();
    for path in paths {
        if work_tree.join(&path).is_file() {
            repo.stage_file(&path)?;
        }
    }
    Ok(())
}

fn parse_author(spec: &str) -> Result<Signature> {
    let lt = spec.find('<').ok_or_else(|| anyhow::anyhow!("invalid --author, expected \"Name <email>\""))?;
    let gt = spec.find('>').ok_or_else(|| anyhow::anyhow!("invalid --author, expected \"Name <email>\""))?;
    let name = spec[..lt].trim().to_string();
    let email = spec[lt + 1..gt].trim().to_string();
    Ok(Signature::new(name, email, LitDate::now()))
}
