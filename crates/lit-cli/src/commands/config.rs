use std::io::{self, Write};

use anyhow::{bail, Result};
use bstr::ByteSlice;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct ConfigArgs {
    /// Remove a key instead of reading or setting it
    #[arg(long)]
    unset: bool,

    /// List every key=value pair
    #[arg(short = 'l', long)]
    list: bool,

    /// `section.name` (or `section.subsection.name`)
    key: Option<String>,

    /// Value to assign; omit to read the current value
    value: Option<String>,
}

pub fn run(args: &ConfigArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list {
        for entry in repo.config().entries() {
            let value = entry.value.as_ref().map(|v| v.to_str_lossy().into_owned()).unwrap_or_else(|| "true".to_string());
            writeln!(out, "{}={}", entry.key.to_canonical(), value)?;
        }
        return Ok(0);
    }

    let Some(key) = &args.key else {
        bail!("usage: lit config [--list] [--unset] <key> [<value>]");
    };

    if args.unset {
        return Ok(if repo.config_mut().unset(key)? { 0 } else { 1 });
    }

    match &args.value {
        Some(value) => {
            repo.config_mut().set(key, value)?;
            Ok(0)
        }
        None => match repo.config().get_string(key)? {
            Some(value) => {
                writeln!(out, "{value}")?;
                Ok(0)
            }
            None => Ok(1),
        },
    }
}
