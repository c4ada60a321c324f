pub mod local;
pub mod s3;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::types::{ByteStream, FileInfo, FileStream};

/// The file operations every storage kind provides.
///
/// Paths are logical: `/`-delimited and relative to the backend's root.
/// Implementations are shared across tasks and hold no per-call state.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Leaf objects under `prefix`, relative to it. Without `recursive`, only
    /// direct children are returned.
    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<String>>;

    async fn stat(&self, path: &str) -> Result<FileInfo>;

    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Open the object without buffering it. The caller owns the stream.
    async fn read_stream(&self, path: &str) -> Result<FileStream>;

    /// Store `data`, replacing whatever was at `path`.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Store `length` bytes read from `stream`. The stream is consumed and
    /// dropped before this returns.
    async fn write_stream(&self, path: &str, stream: ByteStream, length: u64) -> Result<()>;

    async fn move_file(&self, src: &str, dst: &str) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;

    async fn read_string(&self, path: &str) -> Result<String> {
        let data = self.read(path).await?;
        String::from_utf8(data).map_err(|e| Error::io("read_string", path, e))
    }

    async fn write_string(&self, path: &str, content: &str) -> Result<()> {
        self.write(path, content.as_bytes()).await
    }
}
