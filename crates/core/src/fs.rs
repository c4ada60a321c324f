use std::sync::Arc;

use crate::backend::Backend;
use crate::backend::local::LocalBackend;
use crate::backend::s3::ObjectStoreBackend;
use crate::config::{BackendConfig, BackendKind};
use crate::error::{Error, Result};
use crate::types::{ByteStream, FileInfo, FileStream};

/// Entry point: picks a backend from its configuration and forwards every
/// call to it unchanged.
#[derive(Clone)]
pub struct FileSystem {
    kind: BackendKind,
    backend: Arc<dyn Backend>,
}

impl FileSystem {
    pub async fn open(config: impl Into<BackendConfig>) -> Result<Self> {
        let config = config.into();
        let kind = config.kind();
        let backend: Arc<dyn Backend> = match config {
            BackendConfig::Local(local) => Arc::new(LocalBackend::new(local)?),
            BackendConfig::S3(s3) => Arc::new(ObjectStoreBackend::connect(s3).await?),
        };
        Ok(Self { kind, backend })
    }

    /// Open with an explicitly declared kind, rejecting a configuration of a
    /// different kind.
    pub async fn open_kind(kind: BackendKind, config: impl Into<BackendConfig>) -> Result<Self> {
        let config = config.into();
        if config.kind() != kind {
            return Err(Error::Config(format!(
                "{kind} backend given a {} configuration",
                config.kind()
            )));
        }
        Self::open(config).await
    }

    /// Wrap an already constructed backend.
    pub fn from_backend(kind: BackendKind, backend: Arc<dyn Backend>) -> Self {
        Self { kind, backend }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<String>> {
        self.backend.list(prefix, recursive).await
    }

    pub async fn stat(&self, path: &str) -> Result<FileInfo> {
        self.backend.stat(path).await
    }

    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.backend.read(path).await
    }

    pub async fn read_string(&self, path: &str) -> Result<String> {
        self.backend.read_string(path).await
    }

    pub async fn read_stream(&self, path: &str) -> Result<FileStream> {
        self.backend.read_stream(path).await
    }

    pub async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        self.backend.write(path, data).await
    }

    pub async fn write_string(&self, path: &str, content: &str) -> Result<()> {
        self.backend.write_string(path, content).await
    }

    pub async fn write_stream(&self, path: &str, stream: ByteStream, length: u64) -> Result<()> {
        self.backend.write_stream(path, stream, length).await
    }

    pub async fn move_file(&self, src: &str, dst: &str) -> Result<()> {
        self.backend.move_file(src, dst).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.backend.delete(path).await
    }
}
