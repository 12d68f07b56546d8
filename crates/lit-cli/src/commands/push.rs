use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct PushArgs {
    /// Force the push, even if it is not a fast-forward
    #[arg(short, long)]
    force: bool,

    /// Remote name
    remote: Option<String>,
}

pub fn run(args: &PushArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let remote_name = args.remote.as_deref().unwrap_or("origin");

    let copied = repo.push_remote(remote_name, args.force)?;
    println!("To {remote_name}");
    println!("sent {copied} object(s)");
    Ok(0)
}
