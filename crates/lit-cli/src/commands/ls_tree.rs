use anyhow::{bail, Result};
use bstr::ByteSlice;
use clap::Args;
use lit_hash::ObjectId;
use lit_object::{Object, TreeEntry};
use lit_odb::ObjectDatabase;

use super::{open_repo, resolve_revision};

#[derive(Args)]
pub struct LsTreeArgs {
    /// Recurse into sub-trees
    #[arg(short = 'r')]
    recurse: bool,

    /// Show only trees (directories)
    #[arg(short = 'd')]
    trees_only: bool,

    /// Show trees when recursing
    #[arg(short = 't')]
    show_trees: bool,

    /// Show only path names
    #[arg(long)]
    name_only: bool,

    /// Tree-ish to list
    tree_ish: String,

    /// Path patterns to filter
    paths: Vec<String>,
}

pub fn run(args: &LsTreeArgs) -> Result<i32> {
    let repo = open_repo()?;
    let odb = repo.odb();

    let oid = resolve_revision(&repo, &args.tree_ish)?;
    let tree_oid = match odb.read(&oid)? {
        Some(Object::Tree(_)) => oid,
        Some(Object::Commit(commit)) => commit.tree,
        Some(other) => bail!("not a tree object: {} is a {}", args.tree_ish, other.object_type()),
        None => bail!("not found: {}", args.tree_ish),
    };

    list_tree(odb, &tree_oid, "", args)?;
    Ok(0)
}

fn list_tree(odb: &ObjectDatabase, tree_oid: &ObjectId, prefix: &str, args: &LsTreeArgs) -> Result<()> {
    let tree = match odb.read(tree_oid)? {
        Some(Object::Tree(t)) => t,
        _ => bail!("not a tree: {}", tree_oid.to_hex()),
    };

    for entry in tree.iter() {
        let name = entry.name.to_str_lossy();
        let full_path = if prefix.is_empty() { name.to_string() } else { format!("{prefix}/{name}") };

        if !args.paths.is_empty() && !args.paths.iter().any(|p| full_path.starts_with(p.as_str())) {
            continue;
        }

        let is_tree = entry.mode.is_tree();

        if is_tree && args.recurse {
            if args.show_trees {
                print_entry(entry, &full_path, args.name_only);
            }
            list_tree(odb, &entry.oid, &full_path, args)?;
        } else if args.trees_only && !is_tree {
            continue;
        } else {
            print_entry(entry, &full_path, args.name_only);
        }
    }
    Ok(())
}

fn print_entry(entry: &TreeEntry, full_path: &str, name_only: bool) {
    if name_only {
        println!("{full_path}");
        return;
    }
    let type_name = if entry.mode.is_tree() {
        "tree"
    } else if entry.mode.is_gitlink() {
        "commit"
    } else {
        "blob"
    };
    println!("{:06o} {} {}\t{}", entry.mode.raw(), type_name, entry.oid.to_hex(), full_path);
}
