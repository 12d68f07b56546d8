use anyhow::{bail, Result};
use clap::Args;

use super::{open_repo, resolve_revision};

#[derive(Args)]
pub struct TagArgs {
    /// Create an annotated tag
    #[arg(short, long)]
    annotate: bool,

    /// Delete a tag
    #[arg(short, long)]
    delete: bool,

    /// List tags
    #[arg(short, long)]
    list: bool,

    /// Tag message
    #[arg(short, long)]
    message: Option<String>,

    /// Tag name
    name: Option<String>,

    /// Object to tag (defaults to HEAD)
    object: Option<String>,
}

pub fn run(args: &TagArgs) -> Result<i32> {
    let mut repo = open_repo()?;

    if args.list || args.name.is_none() {
        for tag in repo.tag_list()? {
            println!("{}", tag.name);
        }
        return Ok(0);
    }

    let name = args.name.as_deref().unwrap();

    if args.delete {
        let oid = repo.tag_delete(name)?;
        println!("Deleted tag '{name}' (was {})", &oid.to_hex()[..7]);
        return Ok(0);
    }

    let target_spec = args.object.as_deref().unwrap_or("HEAD");
    let target = resolve_revision(&repo, target_spec)?;

    if args.annotate || args.message.is_some() {
        let Some(message) = &args.message else {
            bail!("missing tag message; use -m");
        };
        let tagger = repo.committer_signature()?;
        repo.tag_create_annotated(name, target, lit_object::ObjectType::Commit, format!("{message}\n"), tagger)?;
    } else {
        repo.tag_create_lightweight(name, target)?;
    }

    Ok(0)
}
