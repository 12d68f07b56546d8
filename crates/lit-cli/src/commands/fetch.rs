use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct FetchArgs {
    /// Be quiet
    #[arg(short, long)]
    quiet: bool,

    /// Remote name
    remote: Option<String>,
}

pub fn run(args: &FetchArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let remote_name = args.remote.as_deref().unwrap_or("origin");

    if !args.quiet {
        println!("Fetching {remote_name}");
    }
    let copied = repo.fetch_remote(remote_name)?;
    if !args.quiet {
        println!("received {copied} object(s)");
    }
    Ok(0)
}
