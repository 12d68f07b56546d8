use bstr::ByteSlice;
use clap::Args;
use lit_diff::format::format_diff;
use lit_diff::tree::diff_trees;
use lit_diff::DiffOptions;
use lit_object::Object;
use lit_revwalk::pretty::{format_commit, BuiltinFormat, FormatOptions};

use super::{open_repo, resolve_revision};

#[derive(Args)]
pub struct ShowArgs {
    /// Don't show the diff, just the object itself
    #[arg(short = 's', long)]
    no_patch: bool,

    /// Object to show (defaults to HEAD)
    #[arg(default_value = "HEAD")]
    object: String,
}

pub fn run(args: &ShowArgs) -> anyhow::Result<i32> {
    let repo = open_repo()?;
    let odb = repo.odb();

    let oid = resolve_revision(&repo, &args.object)?;
    let obj = odb
        .read(&oid)?
        .ok_or_else(|| anyhow::anyhow!("object not found: {}", oid.to_hex()))?;

    match obj {
        Object::Commit(commit) => {
            let format_options = FormatOptions::default();
            print!("{}", format_commit(&commit, &oid, BuiltinFormat::Medium, &format_options));

            if !args.no_patch {
                let parent_tree = match commit.parents.first() {
                    Some(parent_oid) => match odb.read(parent_oid)? {
                        Some(Object::Commit(parent)) => Some(parent.tree),
                        _ => None,
                    },
                    None => None,
                };
                let result = diff_trees(odb, parent_tree.as_ref(), Some(&commit.tree), &DiffOptions::default())?;
                if !result.is_empty() {
                    println!();
                    print!("{}", format_diff(&result));
                }
            }
        }
        Object::Tag(tag) => {
            println!("tag {}", tag.tag_name.to_str_lossy());
            if let Some(tagger) = &tag.tagger {
                println!("Tagger: {} <{}>", tagger.name, tagger.email);
                println!("Date:   {}", tagger.date.format_iso());
            }
            println!();
            for line in tag.message.lines() {
                println!("{}", line.to_str_lossy());
            }

            if let Some(Object::Commit(commit)) = odb.read(&tag.target)? {
                println!();
                print!("{}", format_commit(&commit, &tag.target, BuiltinFormat::Medium, &FormatOptions::default()));
            }
        }
        Object::Tree(tree) => {
            for entry in tree.iter() {
                let type_name = if entry.mode.is_tree() { "tree" } else { "blob" };
                println!(
                    "{:06o} {} {}\t{}",
                    entry.mode.raw(),
                    type_name,
                    entry.oid.to_hex(),
                    entry.name.to_str_lossy()
                );
            }
        }
        Object::Blob(blob) => {
            use std::io::Write;
            std::io::stdout().write_all(&blob.data)?;
        }
    }

    Ok(0)
}
