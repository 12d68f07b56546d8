use std::fs;

use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct CountObjectsArgs {
    /// Print sizes in human-readable format
    #[arg(short = 'H', long)]
    human_readable: bool,
}

pub fn run(args: &CountObjectsArgs) -> Result<i32> {
    let repo = open_repo()?;
    let objects_dir = repo.lit_dir().join("objects");

    let mut count: u64 = 0;
    let mut size: u64 = 0;

    for prefix in 0..=0xffu32 {
        let subdir = objects_dir.join(format!("{prefix:02x}"));
        let Ok(entries) = fs::read_dir(&subdir) else { continue };
        for entry in entries.flatten() {
            if let Ok(meta) = entry.metadata() {
                if meta.is_file() {
                    count += 1;
                    size += meta.len();
                }
            }
        }
    }

    println!("count: {count}");
    println!("size: {}", format_size(size / 1024, args.human_readable));
    Ok(0)
}

fn format_size(kib: u64, human_readable: bool) -> String {
    if !human_readable {
        return kib.to_string();
    }
    if kib >= 1_048_576 {
        format!("{:.2} GiB", kib as f64 / 1_048_576.0)
    } else if kib >= 1024 {
        format!("{:.2} MiB", kib as f64 / 1024.0)
    } else {
        format!("{kib} KiB")
    }
}
