use std::fs::Metadata;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, trace};

use super::Backend;
use crate::config::LocalConfig;
use crate::error::{Error, Result};
use crate::path;
use crate::types::{ByteStream, FileInfo, FileStream, guess_content_type};

/// Suffix of in-flight write files. Only names shaped like [`temp_path`]
/// output are hidden from `list`.
const TEMP_SUFFIX: &str = ".fsbridge-tmp";

pub struct LocalBackend {
    root: PathBuf,
    debug: bool,
}

impl LocalBackend {
    /// Open a backend rooted at `config.base_path`, creating the directory
    /// tree if it does not exist yet.
    pub fn new(config: LocalConfig) -> Result<Self> {
        let root = config.base_path;
        let existed = root.is_dir();
        if !existed {
            std::fs::create_dir_all(&root)
                .map_err(|e| Error::io("init", root.display().to_string(), e))?;
        }
        info!(backend = "local", root = %root.display(), existed, "Backend ready");
        Ok(Self {
            root,
            debug: config.debug,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    fn log_op(&self, op: &'static str, path: &str) {
        if self.debug {
            debug!(backend = "local", op, path, "storage op");
        } else {
            trace!(backend = "local", op, path, "storage op");
        }
    }

    /// Metadata of the file behind `path`. Missing entries and directories
    /// are both `NotFound`: only leaves are addressable.
    async fn leaf_metadata(&self, op: &'static str, path: &str, full: &Path) -> Result<Metadata> {
        let metadata = tokio::fs::metadata(full)
            .await
            .map_err(|e| Error::from_io(op, path, e))?;
        if metadata.is_dir() {
            return Err(Error::not_found(op, path));
        }
        Ok(metadata)
    }

    /// Copy `source` into a fresh sibling of `full`, then rename it into
    /// place. The temporary is removed on any failure.
    async fn replace_with<R>(
        &self,
        op: &'static str,
        path: &str,
        full: &Path,
        source: &mut R,
        expected: u64,
    ) -> Result<()>
    where
        R: tokio::io::AsyncRead + Unpin + ?Sized,
    {
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(op, path, e))?;
        }

        let temp = temp_path(full);
        let result = async {
            let mut file = tokio::fs::File::create(&temp).await?;
            let written = tokio::io::copy(&mut source.take(expected), &mut file).await?;
            if written != expected {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("expected {expected} bytes, stream ended after {written}"),
                ));
            }
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&temp, full).await
        }
        .await;

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(Error::io(op, path, e));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<String>> {
        let prefix = path::normalize(prefix)?;
        self.log_op("list", &prefix);

        let dir = self.full_path(&prefix);
        if !tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut pending = vec![(dir, String::new())];
        while let Some((dir, relative)) = pending.pop() {
            let mut read_dir = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| Error::io("list", path::join(&prefix, &relative), e))?;
            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| Error::io("list", path::join(&prefix, &relative), e))?
            {
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                let child = path::join(&relative, &name);
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| Error::io("list", path::join(&prefix, &child), e))?;

                if file_type.is_dir() {
                    if recursive {
                        pending.push((entry.path(), child));
                    }
                    continue;
                }
                if is_temp_name(&name) {
                    continue;
                }
                if recursive || path::depth(&child) == 1 {
                    files.push(child);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    async fn stat(&self, path: &str) -> Result<FileInfo> {
        let path = path::normalize_file(path)?;
        self.log_op("stat", &path);

        let full = self.full_path(&path);
        let metadata = self.leaf_metadata("stat", &path, &full).await?;
        let modified = metadata
            .modified()
            .map_err(|e| Error::io("stat", path.as_str(), e))?;

        Ok(FileInfo {
            last_modified: DateTime::<Utc>::from(modified),
            e_tag: String::new(),
            content_type: guess_content_type(&path).to_string(),
            size: metadata.len(),
        })
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = path::normalize_file(path)?;
        self.log_op("read", &path);

        let full = self.full_path(&path);
        self.leaf_metadata("read", &path, &full).await?;
        tokio::fs::read(&full)
            .await
            .map_err(|e| Error::from_io("read", path.as_str(), e))
    }

    async fn read_stream(&self, path: &str) -> Result<FileStream> {
        let path = path::normalize_file(path)?;
        self.log_op("read_stream", &path);

        let full = self.full_path(&path);
        let metadata = self.leaf_metadata("read_stream", &path, &full).await?;
        let file = tokio::fs::File::open(&full)
            .await
            .map_err(|e| Error::from_io("read_stream", path.as_str(), e))?;

        Ok(FileStream {
            size: metadata.len(),
            content_type: guess_content_type(&path).to_string(),
            content: Box::new(file),
        })
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let path = path::normalize_file(path)?;
        self.log_op("write", &path);

        let full = self.full_path(&path);
        let mut source = data;
        self.replace_with("write", &path, &full, &mut source, data.len() as u64)
            .await
    }

    async fn write_stream(&self, path: &str, mut stream: ByteStream, length: u64) -> Result<()> {
        let path = path::normalize_file(path)?;
        self.log_op("write_stream", &path);

        let full = self.full_path(&path);
        self.replace_with("write_stream", &path, &full, &mut stream, length)
            .await
    }

    async fn move_file(&self, src: &str, dst: &str) -> Result<()> {
        let src = path::normalize_file(src)?;
        let dst = path::normalize_file(dst)?;
        self.log_op("move", &format!("{src} -> {dst}"));

        let src_full = self.full_path(&src);
        self.leaf_metadata("move", &src, &src_full).await?;

        // A missing destination parent also surfaces as ErrorKind::NotFound,
        // but the source is known to exist here, so report it as I/O.
        tokio::fs::rename(&src_full, self.full_path(&dst))
            .await
            .map_err(|e| Error::io("move", format!("{src} -> {dst}"), e))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let path = path::normalize_file(path)?;
        self.log_op("delete", &path);

        let full = self.full_path(&path);
        self.leaf_metadata("delete", &path, &full).await?;
        tokio::fs::remove_file(&full)
            .await
            .map_err(|e| Error::from_io("delete", path.as_str(), e))
    }
}

fn temp_path(full: &Path) -> PathBuf {
    let name = full
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    full.with_file_name(format!(".{name}.{}{TEMP_SUFFIX}", uuid::Uuid::new_v4().simple()))
}

/// `.{name}.{32 hex digits}.fsbridge-tmp`
fn is_temp_name(name: &str) -> bool {
    let Some(rest) = name
        .strip_prefix('.')
        .and_then(|n| n.strip_suffix(TEMP_SUFFIX))
    else {
        return false;
    };
    let Some((_, id)) = rest.rsplit_once('.') else {
        return false;
    };
    id.len() == 32 && id.bytes().all(|b| b.is_ascii_hexdigit())
}
