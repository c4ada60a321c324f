use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use fsbridge_core::{ByteStream, FileSystem};

use crate::config::AppConfig;
use crate::progress;

#[derive(Args)]
pub struct PutArgs {
    /// Local file to upload
    source: PathBuf,

    /// Destination path (default: the source file name)
    dest: Option<String>,
}

pub async fn run(args: PutArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let fs = config.open().await?;

    let dest = match args.dest {
        Some(dest) => dest,
        None => args
            .source
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow::anyhow!("cannot derive a destination from {}", args.source.display())
            })?,
    };

    let size = upload(&fs, &args.source, &dest, true).await?;
    info!(source = %args.source.display(), dest = %dest, size, "Uploaded");
    println!("Uploaded {} to {dest}", progress::format_bytes(size));
    Ok(())
}

/// Stream a local file into the store, returning its size.
pub async fn upload(
    fs: &FileSystem,
    source: &Path,
    dest: &str,
    show_progress: bool,
) -> Result<u64> {
    let file = tokio::fs::File::open(source)
        .await
        .with_context(|| format!("failed to open {}", source.display()))?;
    let size = file.metadata().await?.len();

    let pb = if show_progress {
        progress::create_bytes_progress(size, dest)
    } else {
        indicatif::ProgressBar::hidden()
    };
    let stream: ByteStream = Box::new(pb.wrap_async_read(file));
    fs.write_stream(dest, stream, size).await?;
    pb.finish_and_clear();
    Ok(size)
}
