use std::path::Path;

use anyhow::Result;
use clap::Args;
use console::style;

use crate::config::AppConfig;
use crate::progress::format_bytes;

#[derive(Args)]
pub struct StatArgs {
    /// File to inspect
    path: String,
}

pub async fn run(args: StatArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let fs = config.open().await?;

    let info = fs.stat(&args.path).await?;
    println!("{}  {}", style("Path:        ").bold(), args.path);
    println!(
        "{}  {} ({} bytes)",
        style("Size:        ").bold(),
        format_bytes(info.size),
        info.size
    );
    println!("{}  {}", style("Content-Type:").bold(), info.content_type);
    println!(
        "{}  {}",
        style("Modified:    ").bold(),
        info.last_modified.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "{}  {}",
        style("ETag:        ").bold(),
        if info.e_tag.is_empty() { "-" } else { info.e_tag.as_str() }
    );
    Ok(())
}
