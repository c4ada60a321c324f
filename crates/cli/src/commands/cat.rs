use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::AsyncWriteExt;

use crate::config::AppConfig;

#[derive(Args)]
pub struct CatArgs {
    /// File to print
    path: String,
}

pub async fn run(args: CatArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let fs = config.open().await?;

    let mut file = fs.read_stream(&args.path).await?;
    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut file.content, &mut stdout)
        .await
        .with_context(|| format!("failed to stream {}", args.path))?;
    stdout.flush().await?;
    Ok(())
}
