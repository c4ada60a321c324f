use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

use super::{ClientError, ClientResult, ObjectClient};
use crate::types::{ByteStream, FileInfo, MAX_PREALLOC, guess_content_type};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    e_tag: String,
    last_modified: DateTime<Utc>,
}

/// In-process object store with S3 listing semantics. Useful for tests and
/// for running the object-store backend without a server.
#[derive(Debug)]
pub struct MemoryClient {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    bucket_exists: bool,
    version: AtomicU64,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            bucket_exists: true,
            version: AtomicU64::new(0),
        }
    }

    /// A client whose bucket is reported missing.
    pub fn without_bucket() -> Self {
        Self {
            bucket_exists: false,
            ..Self::new()
        }
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Store an object directly, bypassing any backend.
    pub async fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        let object = self.stored(data.into());
        self.objects.write().await.insert(key.into(), object);
    }

    fn stored(&self, data: Bytes) -> StoredObject {
        let version = self.version.fetch_add(1, Ordering::Relaxed) + 1;
        StoredObject {
            data,
            e_tag: format!("\"{version:016x}\""),
            last_modified: Utc::now(),
        }
    }
}

#[async_trait]
impl ObjectClient for MemoryClient {
    async fn bucket_exists(&self) -> ClientResult<bool> {
        Ok(self.bucket_exists)
    }

    async fn list_objects(&self, prefix: &str, recursive: bool) -> ClientResult<Vec<String>> {
        let objects = self.objects.read().await;
        Ok(objects
            .keys()
            .filter_map(|key| {
                let rest = key.strip_prefix(prefix)?;
                (recursive || !rest.contains('/')).then(|| key.clone())
            })
            .collect())
    }

    async fn stat_object(&self, key: &str) -> ClientResult<FileInfo> {
        let objects = self.objects.read().await;
        let object = objects.get(key).ok_or(ClientError::NotFound)?;
        Ok(FileInfo {
            last_modified: object.last_modified,
            e_tag: object.e_tag.clone(),
            content_type: guess_content_type(key).to_string(),
            size: object.data.len() as u64,
        })
    }

    async fn get_object(&self, key: &str) -> ClientResult<ByteStream> {
        let objects = self.objects.read().await;
        let object = objects.get(key).ok_or(ClientError::NotFound)?;
        Ok(Box::new(Cursor::new(object.data.clone())))
    }

    async fn put_object(&self, key: &str, content: ByteStream, length: u64) -> ClientResult<()> {
        let mut buf = Vec::with_capacity(length.min(MAX_PREALLOC) as usize);
        content
            .take(length)
            .read_to_end(&mut buf)
            .await
            .map_err(ClientError::other)?;
        if buf.len() as u64 != length {
            return Err(ClientError::other(format!(
                "expected {length} bytes, stream ended after {}",
                buf.len()
            )));
        }
        let object = self.stored(Bytes::from(buf));
        self.objects.write().await.insert(key.to_string(), object);
        Ok(())
    }

    async fn remove_object(&self, key: &str) -> ClientResult<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or(ClientError::NotFound)
    }
}
