//! The object-store client capability consumed by
//! [`ObjectStoreBackend`](crate::backend::s3::ObjectStoreBackend).
//!
//! A client is bound to one bucket and speaks in fully qualified keys. It
//! knows nothing about logical paths or key prefixes.

pub mod memory;
pub mod rusts3;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::types::{ByteStream, FileInfo};

pub use memory::MemoryClient;
pub use rusts3::S3Client;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no such key")]
    NotFound,
    #[error(transparent)]
    Other(BoxError),
}

impl ClientError {
    pub fn other(err: impl Into<BoxError>) -> Self {
        ClientError::Other(err.into())
    }
}

#[async_trait]
pub trait ObjectClient: Send + Sync {
    async fn bucket_exists(&self) -> ClientResult<bool>;

    /// Keys starting with `prefix`. Without `recursive`, keys with a `/`
    /// after the prefix are left out, as with a `/` delimiter.
    async fn list_objects(&self, prefix: &str, recursive: bool) -> ClientResult<Vec<String>>;

    async fn stat_object(&self, key: &str) -> ClientResult<FileInfo>;

    async fn get_object(&self, key: &str) -> ClientResult<ByteStream>;

    /// Upload exactly `length` bytes from `content`.
    async fn put_object(&self, key: &str, content: ByteStream, length: u64) -> ClientResult<()>;

    async fn remove_object(&self, key: &str) -> ClientResult<()>;
}
