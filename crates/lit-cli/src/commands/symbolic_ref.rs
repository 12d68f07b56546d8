use anyhow::Result;
use bstr::ByteSlice;
use clap::Args;
use lit_ref::{RefName, RefStore, Reference};

use super::open_repo;

#[derive(Args)]
pub struct SymbolicRefArgs {
    /// Delete the symbolic ref
    #[arg(short = 'd', long)]
    delete: bool,

    /// Be quiet
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Show only the short ref name
    #[arg(long)]
    short: bool,

    /// Name of the symbolic ref (e.g. HEAD)
    name: String,

    /// Target ref to set; omit to read the current target
    target: Option<String>,
}

pub fn run(args: &SymbolicRefArgs) -> Result<i32> {
    let repo = open_repo()?;
    let refs = repo.refs();
    let refname = RefName::new(args.name.as_str())?;

    if args.delete {
        refs.delete_ref(&refname)?;
        return Ok(0);
    }

    if let Some(target_str) = &args.target {
        let target = RefName::new(target_str.as_str())?;
        refs.write_symbolic_ref(&refname, &target)?;
        return Ok(0);
    }

    match refs.resolve(&refname)? {
        Some(Reference::Symbolic { target, .. }) => {
            if args.short {
                println!("{}", target.short_name().to_str_lossy());
            } else {
                println!("{}", target.as_str());
            }
            Ok(0)
        }
        _ => {
            if !args.quiet {
                eprintln!("fatal: ref {} is not a symbolic ref", args.name);
            }
            Ok(1)
        }
    }
}
