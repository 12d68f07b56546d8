use anyhow::{bail, Result};
use clap::Args;
use lit_object::Object;
use lit_ref::RefStore;
use lit_revwalk::pretty::{BuiltinFormat, FormatOptions};
use lit_revwalk::{GraphDrawer, SortOrder, WalkOptions};

use super::{open_repo, resolve_revision};

#[derive(Args)]
pub struct LogArgs {
    /// Show only the first <n> commits
    #[arg(short = 'n', long = "max-count")]
    max_count: Option<usize>,

    /// Skip <n> commits before starting to show
    #[arg(long)]
    skip: Option<usize>,

    /// Show commits more recent than a unix timestamp
    #[arg(long)]
    since: Option<i64>,

    /// Show commits older than a unix timestamp
    #[arg(long)]
    until: Option<i64>,

    /// Limit commits to author matching pattern
    #[arg(long)]
    author: Option<String>,

    /// Limit commits to those with log message matching pattern
    #[arg(long)]
    grep: Option<String>,

    /// Show one-line summary per commit
    #[arg(long)]
    oneline: bool,

    /// Draw ASCII graph of branch structure
    #[arg(long)]
    graph: bool,

    /// Reverse the output order
    #[arg(long)]
    reverse: bool,

    /// Follow only the first parent
    #[arg(long)]
    first_parent: bool,

    /// Walk commits reachable from every local branch, not just HEAD
    #[arg(long)]
    all: bool,

    /// Revision or revision range (e.g. `A..B`)
    revision: Option<String>,
}

pub fn run(args: &LogArgs) -> Result<i32> {
    let repo = open_repo()?;

    let mut walk_opts = WalkOptions {
        max_count: args.max_count,
        skip: args.skip,
        since: args.since,
        until: args.until,
        author_pattern: args.author.clone(),
        grep_pattern: args.grep.clone(),
        first_parent_only: args.first_parent,
        ..WalkOptions::default()
    };
    if args.reverse {
        walk_opts.sort = SortOrder::Reverse;
    }

    let mut starts = Vec::new();
    let mut excludes = Vec::new();

    if args.all {
        for reference in repo.refs().iter(Some("refs/heads/"))? {
            let reference = reference?;
            if let Ok(oid) = reference.peel_to_oid(repo.refs()) {
                starts.push(oid);
            }
        }
    } else if let Some(rev) = &args.revision {
        if let Some((left, right)) = rev.split_once("..") {
            excludes.push(resolve_revision(&repo, left)?);
            starts.push(resolve_revision(&repo, right)?);
        } else {
            starts.push(resolve_revision(&repo, rev)?);
        }
    } else {
        if repo.is_unborn()? {
            let branch = repo
                .current_branch()?
                .map(|n| n.short_name().to_string())
                .unwrap_or_else(|| "main".to_string());
            eprintln!("fatal: your current branch '{branch}' does not have any commits yet");
            return Ok(128);
        }
        starts.push(repo.head_oid()?.expect("checked not unborn"));
    }

    let entries = repo.log(&starts, &excludes, walk_opts)?;

    let format = if args.oneline { BuiltinFormat::Oneline } else { BuiltinFormat::Medium };
    let format_options = FormatOptions::default();
    let mut graph_drawer = if args.graph { Some(GraphDrawer::new()) } else { None };

    let mut first = true;
    for entry in &entries {
        let formatted = entry.render(format, &format_options);

        if let Some(drawer) = graph_drawer.as_mut() {
            let commit = match repo.odb().read(&entry.oid)? {
                Some(Object::Commit(c)) => c,
                _ => bail!("object {} is not a commit", entry.oid),
            };
            let graph_lines = drawer.draw_commit(&entry.oid, &commit.parents);
            let commit_lines: Vec<&str> = formatted.lines().collect();
            for (i, graph_line) in graph_lines.iter().enumerate() {
                match commit_lines.get(i) {
                    Some(line) => println!("{graph_line} {line}"),
                    None => println!("{graph_line}"),
                }
            }
            let pad = " ".repeat(graph_lines.first().map_or(0, |l| l.len()));
            for line in commit_lines.iter().skip(graph_lines.len()) {
                println!("{pad} {line}");
            }
        } else {
            if !first && format != BuiltinFormat::Oneline {
                println!();
            }
            print!("{formatted}");
            if format == BuiltinFormat::Oneline {
                println!();
            }
        }
        first = false;
    }

    Ok(0)
}
