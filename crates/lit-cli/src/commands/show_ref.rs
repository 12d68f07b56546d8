use anyhow::Result;
use bstr::BString;
use clap::Args;
use lit_object::Object;
use lit_ref::{RefName, RefStore, Reference};

use super::open_repo;

#[derive(Args)]
pub struct ShowRefArgs {
    /// Show the HEAD reference as well
    #[arg(long)]
    head: bool,

    /// Only show branches (refs/heads/)
    #[arg(long)]
    heads: bool,

    /// Only show tags (refs/tags/)
    #[arg(long)]
    tags: bool,

    /// Verify that the given refs exist
    #[arg(long)]
    verify: bool,

    /// Be quiet (for --verify)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Dereference tags to their target object
    #[arg(short = 'd')]
    dereference: bool,

    /// Patterns or refs to verify
    #[arg(value_name = "pattern")]
    patterns: Vec<String>,
}

pub fn run(args: &ShowRefArgs) -> Result<i32> {
    let repo = open_repo()?;
    let refs = repo.refs();

    if args.verify {
        return verify_refs(args, refs);
    }

    let mut found_any = false;

    if args.head {
        if let Some(oid) = refs.resolve_to_oid(&RefName::new("HEAD")?)? {
            println!("{} HEAD", oid.to_hex());
            found_any = true;
        }
    }

    let prefix = if args.heads {
        "refs/heads/"
    } else if args.tags {
        "refs/tags/"
    } else {
        "refs/"
    };

    for reference in refs.iter(Some(prefix))? {
        let reference = reference?;
        let oid = match reference.target_oid().or_else(|| reference.peel_to_oid(refs).ok()) {
            Some(oid) => oid,
            None => continue,
        };
        let refname = reference.name().as_str();

        if !args.patterns.is_empty() && !args.patterns.iter().any(|p| refname == p) {
            continue;
        }

        println!("{} {}", oid.to_hex(), refname);
        found_any = true;

        if args.dereference {
            if let Ok(Some(Object::Tag(tag))) = repo.odb().read(&oid) {
                println!("{} {}^{{}}", tag.target.to_hex(), refname);
            }
        }
    }

    if found_any { Ok(0) } else { Ok(1) }
}

fn verify_refs(args: &ShowRefArgs, refs: &lit_ref::FilesRefStore) -> Result<i32> {
    let mut all_ok = true;
    for pattern in &args.patterns {
        let refname = RefName::new(BString::from(pattern.as_str()));
        let resolved = match &refname {
            Ok(name) => refs.resolve_to_oid(name)?,
            Err(_) => None,
        };
        match resolved {
            Some(oid) => {
                if !args.quiet {
                    println!("{} {}", oid.to_hex(), pattern);
                }
            }
            None => {
                if !args.quiet {
                    eprintln!("fatal: '{pattern}' - not a valid ref");
                }
                all_ok = false;
            }
        }
    }
    if all_ok { Ok(0) } else { Ok(1) }
}
