use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;
use crate::progress::format_bytes;

#[derive(Args)]
pub struct LsArgs {
    /// Prefix to list (default: the root)
    #[arg(default_value = "")]
    prefix: String,

    /// Include files in nested folders
    #[arg(short, long)]
    recursive: bool,

    /// Show size and modification time
    #[arg(short, long)]
    long: bool,
}

pub async fn run(args: LsArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let fs = config.open().await?;

    let files = fs.list(&args.prefix, args.recursive).await?;
    if files.is_empty() {
        println!("No files found.");
        return Ok(());
    }

    for file in &files {
        if args.long {
            let full = join(&args.prefix, file);
            let info = fs.stat(&full).await?;
            println!(
                "{:>10}  {}  {file}",
                format_bytes(info.size),
                info.last_modified.format("%Y-%m-%d %H:%M")
            );
        } else {
            println!("{file}");
        }
    }
    Ok(())
}

/// Listing entries are relative to the prefix; stat needs the full path.
fn join(prefix: &str, entry: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        entry.to_string()
    } else {
        format!("{prefix}/{entry}")
    }
}
