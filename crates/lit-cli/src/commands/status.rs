use anyhow::Result;
use clap::Args;
use lit_diff::FileStatus;

use super::open_repo;

#[derive(Args)]
pub struct StatusArgs {
    /// Give the output in the short-format
    #[arg(short, long)]
    short: bool,
}

pub fn run(args: &StatusArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let branch = repo.current_branch()?.map(|b| b.short_name().to_string());
    let status = repo.status()?;

    if args.short {
        for entry in &status.staged {
            println!("{} {}", staged_char(entry.status), entry.path);
        }
        for entry in &status.unstaged {
            println!(" {} {}", unstaged_char(entry.status), entry.path);
        }
        return Ok(0);
    }

    match branch {
        Some(b) => println!("On branch {b}"),
        None => println!("HEAD detached"),
    }

    if status.staged.is_empty() && status.unstaged.is_empty() {
        println!("nothing to commit, working tree clean");
        return Ok(0);
    }

    if !status.staged.is_empty() {
        println!("\nChanges to be committed:");
        for entry in &status.staged {
            println!("\t{}:   {}", staged_label(entry.status), entry.path);
        }
    }

    let (modified, untracked): (Vec<_>, Vec<_>) =
        status.unstaged.iter().partition(|e| e.status != lit_repo::WorktreeStatus::Untracked);

    if !modified.is_empty() {
        println!("\nChanges not staged for commit:");
        for entry in modified {
            println!("\t{}:   {}", unstaged_label(entry.status), entry.path);
        }
    }

    if !untracked.is_empty() {
        println!("\nUntracked files:");
        for entry in untracked {
            println!("\t{}", entry.path);
        }
    }

    Ok(0)
}

fn staged_char(status: FileStatus) -> char {
    status.as_char()
}

fn staged_label(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Added => "new file",
        FileStatus::Deleted => "deleted",
        FileStatus::Modified => "modified",
        FileStatus::TypeChanged => "typechange",
    }
}

fn unstaged_char(status: lit_repo::WorktreeStatus) -> char {
    match status {
        lit_repo::WorktreeStatus::Untracked => '?',
        lit_repo::WorktreeStatus::Modified => 'M',
        lit_repo::WorktreeStatus::Deleted => 'D',
        lit_repo::WorktreeStatus::Added => 'A',
    }
}

fn unstaged_label(status: lit_repo::WorktreeStatus) -> &'static str {
    match status {
        lit_repo::WorktreeStatus::Modified => "modified",
        lit_repo::WorktreeStatus::Deleted => "deleted",
        lit_repo::WorktreeStatus::Added => "new file",
        lit_repo::WorktreeStatus::Untracked => "untracked",
    }
}
