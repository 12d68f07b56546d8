use anyhow::{bail, Result};
use bstr::ByteSlice;
use clap::Args;
use lit_diff::format::format_diff;
use lit_diff::tree::diff_trees;
use lit_diff::{DiffOptions, DiffResult};
use lit_index::Stage;
use lit_object::Object;

use super::{open_repo, resolve_revision};

#[derive(Args)]
pub struct DiffArgs {
    /// Show staged changes (index vs HEAD)
    #[arg(long)]
    cached: bool,

    /// Alias for --cached
    #[arg(long)]
    staged: bool,

    /// Show only the names of changed files
    #[arg(long)]
    name_only: bool,

    /// Show the names and status letters of changed files
    #[arg(long)]
    name_status: bool,

    /// Commits or a revision range (e.g. `A..B`) to diff
    revisions: Vec<String>,
}

pub fn run(args: &DiffArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let diff_opts = DiffOptions::default();
    let is_cached = args.cached || args.staged;

    let result = if args.revisions.len() == 2 {
        let tree_a = commit_tree(&repo, &resolve_revision(&repo, &args.revisions[0])?)?;
        let tree_b = commit_tree(&repo, &resolve_revision(&repo, &args.revisions[1])?)?;
        diff_trees(repo.odb(), Some(&tree_a), Some(&tree_b), &diff_opts)?
    } else if args.revisions.len() == 1 && args.revisions[0].contains("..") {
        let (left, right) = args.revisions[0].split_once("..").unwrap();
        let tree_a = commit_tree(&repo, &resolve_revision(&repo, left)?)?;
        let tree_b = commit_tree(&repo, &resolve_revision(&repo, right)?)?;
        diff_trees(repo.odb(), Some(&tree_a), Some(&tree_b), &diff_opts)?
    } else if args.revisions.len() == 1 {
        let tree = commit_tree(&repo, &resolve_revision(&repo, &args.revisions[0])?)?;
        let index_tree = repo.index()?.clone().write_tree(repo.odb())?;
        diff_trees(repo.odb(), Some(&tree), Some(&index_tree), &diff_opts)?
    } else if is_cached {
        let head_tree = match repo.head_oid()? {
            Some(oid) => Some(commit_tree(&repo, &oid)?),
            None => None,
        };
        let index_tree = repo.index()?.clone().write_tree(repo.odb())?;
        diff_trees(repo.odb(), head_tree.as_ref(), Some(&index_tree), &diff_opts)?
    } else {
        diff_index_to_worktree(&mut repo)?
    };

    if result.is_empty() {
        return Ok(0);
    }

    if args.name_only {
        for file in &result.files {
            println!("{}", file.path().to_str_lossy());
        }
    } else if args.name_status {
        for file in &result.files {
            println!("{}\t{}", file.status, file.path().to_str_lossy());
        }
    } else {
        print!("{}", format_diff(&result));
    }

    Ok(0)
}

fn commit_tree(repo: &lit_repo::Repository, oid: &lit_hash::ObjectId) -> Result<lit_hash::ObjectId> {
    match repo.odb().read(oid)? {
        Some(Object::Commit(c)) => Ok(c.tree),
        Some(other) => bail!("not a commit: {oid} is a {}", other.object_type()),
        None => bail!("object not found: {oid}"),
    }
}

/// Diff the index against the files actually on disk, path by path: the
/// simplified diff stack only knows how to compare trees, so working-tree
/// content is hashed and diffed directly against each index entry's blob.
fn diff_index_to_worktree(repo: &mut lit_repo::Repository) -> Result<DiffResult> {
    use lit_diff::algorithm::diff_lines;
    use lit_diff::binary::is_binary;
    use lit_diff::{FileDiff, FileStatus};

    let Some(work_tree) = repo.work_tree().map(|p| p.to_path_buf()) else {
        return Ok(DiffResult::default());
    };

    let entries: Vec<_> = repo.index()?.iter().cloned().collect();
    let odb = repo.odb();
    let mut files = Vec::new();
    for entry in &entries {
        if entry.stage != Stage::Normal {
            continue;
        }
        let disk_path = work_tree.join(entry.path.to_str_lossy().as_ref());
        let Ok(new_data) = std::fs::read(&disk_path) else { continue };

        let Some(Object::Blob(old_blob)) = odb.read(&entry.oid)? else { continue };
        if old_blob.data == new_data {
            continue;
        }

        let binary = is_binary(&old_blob.data) || is_binary(&new_data);
        let hunks = if binary { Vec::new() } else { diff_lines(&old_blob.data, &new_data, 3) };
        files.push(FileDiff {
            status: FileStatus::Modified,
            old_path: Some(entry.path.clone()),
            new_path: Some(entry.path.clone()),
            old_mode: Some(entry.mode),
            new_mode: Some(entry.mode),
            old_oid: Some(entry.oid),
            new_oid: None,
            hunks,
            is_binary: binary,
        });
    }
    Ok(DiffResult { files })
}
