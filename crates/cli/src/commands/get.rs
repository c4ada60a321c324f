use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::AsyncWriteExt;
use tracing::info;

use fsbridge_core::FileSystem;

use crate::config::AppConfig;
use crate::progress;

#[derive(Args)]
pub struct GetArgs {
    /// File to download
    path: String,

    /// Local destination (default: the file name in the current directory)
    target: Option<PathBuf>,
}

pub async fn run(args: GetArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let fs = config.open().await?;

    let target = args.target.unwrap_or_else(|| {
        PathBuf::from(args.path.rsplit('/').next().unwrap_or(args.path.as_str()))
    });

    let size = download(&fs, &args.path, &target, true).await?;
    info!(path = %args.path, target = %target.display(), size, "Downloaded");
    println!(
        "Downloaded {} to {}",
        progress::format_bytes(size),
        target.display()
    );
    Ok(())
}

/// Stream a stored file to `target`, creating parent directories.
pub async fn download(
    fs: &FileSystem,
    path: &str,
    target: &Path,
    show_progress: bool,
) -> Result<u64> {
    let mut stream = fs.read_stream(path).await?;

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let file = tokio::fs::File::create(target)
        .await
        .with_context(|| format!("failed to create {}", target.display()))?;

    let pb = if show_progress {
        progress::create_bytes_progress(stream.size, path)
    } else {
        indicatif::ProgressBar::hidden()
    };
    let mut writer = pb.wrap_async_write(file);
    let copied = tokio::io::copy(&mut stream.content, &mut writer)
        .await
        .with_context(|| format!("failed to download {path}"))?;
    writer.flush().await?;
    pb.finish_and_clear();
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsbridge_core::LocalConfig;

    #[tokio::test]
    async fn downloads_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let fs = FileSystem::open(LocalConfig::new(dir.path().join("store")))
            .await
            .unwrap();
        fs.write_string("docs/readme.md", "# hi").await.unwrap();

        let target = dir.path().join("out/nested/readme.md");
        let size = download(&fs, "docs/readme.md", &target, false).await.unwrap();
        assert_eq!(size, 4);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# hi");
    }

    #[tokio::test]
    async fn missing_file_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let fs = FileSystem::open(LocalConfig::new(dir.path().join("store")))
            .await
            .unwrap();
        let target = dir.path().join("out.bin");
        assert!(download(&fs, "ghost.bin", &target, false).await.is_err());
        assert!(!target.exists());
    }
}
