use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, trace, warn};

use super::Backend;
use crate::client::{ClientError, ObjectClient, S3Client};
use crate::config::ObjectStoreConfig;
use crate::error::{Error, Result};
use crate::path;
use crate::types::{ByteStream, FileInfo, FileStream};

/// Backend over one bucket, with every logical path placed under a fixed
/// key prefix. Objects are reached through an injected [`ObjectClient`].
pub struct ObjectStoreBackend {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    prefix: String,
    debug: bool,
}

impl ObjectStoreBackend {
    /// Build an [`S3Client`] from `config` and check the bucket.
    pub async fn connect(config: ObjectStoreConfig) -> Result<Self> {
        let client = S3Client::new(&config)?;
        Self::with_client(config, Arc::new(client)).await
    }

    /// Use an existing client. Fails if the bucket is missing or the check
    /// itself fails.
    pub async fn with_client(config: ObjectStoreConfig, client: Arc<dyn ObjectClient>) -> Result<Self> {
        let prefix = path::normalize(&config.key_prefix)
            .map_err(|e| Error::Config(format!("invalid key prefix: {e}")))?;

        match client.bucket_exists().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(Error::Config(format!(
                    "bucket {} does not exist",
                    config.bucket
                )));
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "unable to check bucket {} at {}: {e}",
                    config.bucket, config.endpoint
                )));
            }
        }

        info!(
            backend = "s3",
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            access_key = %config.access_key,
            prefix = %prefix,
            "Backend ready"
        );
        Ok(Self {
            client,
            bucket: config.bucket,
            prefix,
            debug: config.debug,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn full_key(&self, path: &str) -> String {
        path::join(&self.prefix, path)
    }

    /// Key prefix that selects everything below a logical directory.
    fn search_prefix(&self, dir: &str) -> String {
        let key = self.full_key(dir);
        if key.is_empty() { key } else { format!("{key}/") }
    }

    fn log_op(&self, op: &'static str, path: &str) {
        if self.debug {
            debug!(backend = "s3", bucket = %self.bucket, op, path, "storage op");
        } else {
            trace!(backend = "s3", bucket = %self.bucket, op, path, "storage op");
        }
    }
}

fn client_error(op: &'static str, path: &str, err: ClientError) -> Error {
    match err {
        ClientError::NotFound => Error::not_found(op, path),
        other => Error::io(op, path, other),
    }
}

#[async_trait]
impl Backend for ObjectStoreBackend {
    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<String>> {
        let prefix = path::normalize(prefix)?;
        self.log_op("list", &prefix);

        let search = self.search_prefix(&prefix);
        let keys = self
            .client
            .list_objects(&search, recursive)
            .await
            .map_err(|e| Error::io("list", prefix.as_str(), e))?;

        // Keys ending in '/' are empty-folder markers, not leaves.
        let mut files: Vec<String> = keys
            .iter()
            .filter_map(|key| key.strip_prefix(&search))
            .filter(|rel| !rel.is_empty() && !rel.ends_with(path::SEPARATOR))
            .map(str::to_string)
            .collect();
        files.sort();
        Ok(files)
    }

    async fn stat(&self, path: &str) -> Result<FileInfo> {
        let path = path::normalize_file(path)?;
        self.log_op("stat", &path);

        self.client
            .stat_object(&self.full_key(&path))
            .await
            .map_err(|e| client_error("stat", &path, e))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = path::normalize_file(path)?;
        self.log_op("read", &path);

        let mut content = self
            .client
            .get_object(&self.full_key(&path))
            .await
            .map_err(|e| client_error("read", &path, e))?;
        let mut data = Vec::new();
        content
            .read_to_end(&mut data)
            .await
            .map_err(|e| Error::io("read", path.as_str(), e))?;
        Ok(data)
    }

    async fn read_stream(&self, path: &str) -> Result<FileStream> {
        let path = path::normalize_file(path)?;
        self.log_op("read_stream", &path);

        let key = self.full_key(&path);
        let content = self
            .client
            .get_object(&key)
            .await
            .map_err(|e| client_error("read_stream", &path, e))?;
        let info = self
            .client
            .stat_object(&key)
            .await
            .map_err(|e| client_error("read_stream", &path, e))?;

        Ok(FileStream {
            size: info.size,
            content_type: info.content_type,
            content,
        })
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let path = path::normalize_file(path)?;
        self.log_op("write", &path);

        let body: ByteStream = Box::new(Cursor::new(data.to_vec()));
        self.client
            .put_object(&self.full_key(&path), body, data.len() as u64)
            .await
            .map_err(|e| Error::io("write", path.as_str(), e))
    }

    async fn write_stream(&self, path: &str, stream: ByteStream, length: u64) -> Result<()> {
        let path = path::normalize_file(path)?;
        self.log_op("write_stream", &path);

        self.client
            .put_object(&self.full_key(&path), stream, length)
            .await
            .map_err(|e| Error::io("write_stream", path.as_str(), e))
    }

    /// Copy-then-delete: object stores have no rename. The source is only
    /// deleted once the destination has been written in full.
    async fn move_file(&self, src: &str, dst: &str) -> Result<()> {
        let src = path::normalize_file(src)?;
        let dst = path::normalize_file(dst)?;
        self.log_op("move", &format!("{src} -> {dst}"));

        if src == dst {
            return self.stat(&src).await.map(|_| ());
        }

        let source = self.read_stream(&src).await?;
        self.write_stream(&dst, source.content, source.size).await?;

        if let Err(e) = self.delete(&src).await {
            warn!(
                backend = "s3",
                bucket = %self.bucket,
                src = %src,
                dst = %dst,
                error = %e,
                "Move copied the object but could not delete the source"
            );
            return Err(Error::MoveIncomplete {
                src,
                dst,
                source: Box::new(e),
            });
        }
        Ok(())
    }

    /// Object stores accept deletes of absent keys, so existence is checked
    /// first to report `NotFound`.
    async fn delete(&self, path: &str) -> Result<()> {
        let path = path::normalize_file(path)?;
        self.log_op("delete", &path);

        let key = self.full_key(&path);
        self.client
            .stat_object(&key)
            .await
            .map_err(|e| client_error("delete", &path, e))?;
        self.client
            .remove_object(&key)
            .await
            .map_err(|e| client_error("delete", &path, e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::client::{ClientResult, MemoryClient};

    /// Wraps a [`MemoryClient`], failing selected calls on demand.
    #[derive(Default)]
    struct FlakyClient {
        inner: MemoryClient,
        fail_exists: bool,
        fail_put: bool,
        fail_remove: bool,
        fail_list: bool,
        removes: AtomicUsize,
    }

    #[async_trait]
    impl ObjectClient for FlakyClient {
        async fn bucket_exists(&self) -> ClientResult<bool> {
            if self.fail_exists {
                return Err(ClientError::other("connection refused"));
            }
            self.inner.bucket_exists().await
        }

        async fn list_objects(&self, prefix: &str, recursive: bool) -> ClientResult<Vec<String>> {
            if self.fail_list {
                return Err(ClientError::other("listing interrupted"));
            }
            self.inner.list_objects(prefix, recursive).await
        }

        async fn stat_object(&self, key: &str) -> ClientResult<FileInfo> {
            self.inner.stat_object(key).await
        }

        async fn get_object(&self, key: &str) -> ClientResult<ByteStream> {
            self.inner.get_object(key).await
        }

        async fn put_object(&self, key: &str, content: ByteStream, length: u64) -> ClientResult<()> {
            if self.fail_put {
                return Err(ClientError::other("connection reset"));
            }
            self.inner.put_object(key, content, length).await
        }

        async fn remove_object(&self, key: &str) -> ClientResult<()> {
            self.removes.fetch_add(1, Ordering::SeqCst);
            if self.fail_remove {
                return Err(ClientError::other("access denied"));
            }
            self.inner.remove_object(key).await
        }
    }

    fn config(prefix: &str) -> ObjectStoreConfig {
        let mut config = ObjectStoreConfig::new("ak", "sk");
        config.key_prefix = prefix.to_string();
        config
    }

    async fn backend_with(client: Arc<dyn ObjectClient>, prefix: &str) -> ObjectStoreBackend {
        ObjectStoreBackend::with_client(config(prefix), client)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_bucket_is_a_config_error() {
        let client = Arc::new(MemoryClient::without_bucket());
        let result = ObjectStoreBackend::with_client(config(""), client).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_config_error() {
        let client = Arc::new(FlakyClient {
            fail_exists: true,
            ..Default::default()
        });
        let result = ObjectStoreBackend::with_client(config(""), client).await;
        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("connection refused")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("backend opened without a reachable bucket"),
        }
    }

    #[tokio::test]
    async fn huge_declared_length_is_an_io_error() {
        let client = Arc::new(MemoryClient::new());
        let backend = backend_with(client.clone(), "").await;
        let stream: ByteStream = Box::new(Cursor::new(b"abc".to_vec()));

        let err = backend.write_stream("k.bin", stream, u64::MAX).await.unwrap_err();
        assert!(matches!(err, Error::Io { op: "write_stream", .. }));
        assert!(client.keys().await.is_empty());
    }

    #[tokio::test]
    async fn keys_carry_the_prefix() {
        let client = Arc::new(MemoryClient::new());
        let backend = backend_with(client.clone(), "/tenant/").await;

        backend.write_string("sub/y.txt", "world").await.unwrap();
        assert_eq!(client.keys().await, vec!["tenant/sub/y.txt"]);
        assert_eq!(backend.read_string("sub/y.txt").await.unwrap(), "world");
    }

    #[tokio::test]
    async fn list_skips_folder_markers_and_siblings() {
        let client = Arc::new(MemoryClient::new());
        client.insert("data/x.txt", "hello").await;
        client.insert("data/sub/", "").await;
        client.insert("data/sub/y.txt", "world").await;
        client.insert("data/subway.txt", "not below sub").await;
        client.insert("other/z.txt", "outside the prefix").await;
        let backend = backend_with(client, "data").await;

        assert_eq!(
            backend.list("", false).await.unwrap(),
            vec!["subway.txt", "x.txt"]
        );
        assert_eq!(
            backend.list("", true).await.unwrap(),
            vec!["sub/y.txt", "subway.txt", "x.txt"]
        );
        assert_eq!(backend.list("sub", false).await.unwrap(), vec!["y.txt"]);
    }

    #[tokio::test]
    async fn list_error_aborts_listing() {
        let client = Arc::new(FlakyClient {
            fail_list: true,
            ..Default::default()
        });
        let backend = backend_with(client, "").await;
        let err = backend.list("", true).await.unwrap_err();
        assert!(matches!(err, Error::Io { op: "list", .. }));
    }

    #[tokio::test]
    async fn move_copies_then_deletes() {
        let client = Arc::new(MemoryClient::new());
        let backend = backend_with(client.clone(), "").await;
        backend.write_string("x.txt", "hello").await.unwrap();

        backend.move_file("x.txt", "z.txt").await.unwrap();
        assert_eq!(backend.read_string("z.txt").await.unwrap(), "hello");
        assert!(backend.stat("x.txt").await.unwrap_err().is_not_found());
        assert_eq!(client.keys().await, vec!["z.txt"]);
    }

    #[tokio::test]
    async fn move_of_missing_source_touches_nothing() {
        let client = Arc::new(FlakyClient::default());
        let backend = backend_with(client.clone(), "").await;

        let err = backend.move_file("ghost", "z.txt").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(client.inner.keys().await.is_empty());
        assert_eq!(client.removes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_copy_keeps_source() {
        let client = Arc::new(FlakyClient {
            fail_put: true,
            ..Default::default()
        });
        client.inner.insert("x.txt", "hello").await;
        let backend = backend_with(client.clone(), "").await;

        let err = backend.move_file("x.txt", "z.txt").await.unwrap_err();
        assert!(matches!(err, Error::Io { op: "write_stream", .. }));
        assert_eq!(client.removes.load(Ordering::SeqCst), 0);
        assert_eq!(client.inner.keys().await, vec!["x.txt"]);
    }

    #[tokio::test]
    async fn failed_delete_reports_incomplete_move() {
        let client = Arc::new(FlakyClient {
            fail_remove: true,
            ..Default::default()
        });
        client.inner.insert("x.txt", "hello").await;
        let backend = backend_with(client.clone(), "").await;

        let err = backend.move_file("x.txt", "z.txt").await.unwrap_err();
        match &err {
            Error::MoveIncomplete { src, dst, .. } => {
                assert_eq!(src, "x.txt");
                assert_eq!(dst, "z.txt");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(client.inner.keys().await, vec!["x.txt", "z.txt"]);
        assert_eq!(backend.read_string("z.txt").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn move_onto_itself_keeps_data() {
        let client = Arc::new(MemoryClient::new());
        let backend = backend_with(client, "").await;
        backend.write_string("x.txt", "hello").await.unwrap();

        backend.move_file("x.txt", "/x.txt").await.unwrap();
        assert_eq!(backend.read_string("x.txt").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_not_found() {
        let client = Arc::new(FlakyClient::default());
        let backend = backend_with(client.clone(), "").await;
        assert!(backend.delete("ghost").await.unwrap_err().is_not_found());
        assert_eq!(client.removes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn read_stream_reports_size() {
        let client = Arc::new(MemoryClient::new());
        let backend = backend_with(client, "p").await;
        backend.write("a/b.json", b"[1,2,3]").await.unwrap();

        let stream = backend.read_stream("a/b.json").await.unwrap();
        assert_eq!(stream.size, 7);
        assert_eq!(stream.content_type, "application/json");
        assert_eq!(stream.into_bytes().await.unwrap(), b"[1,2,3]");
    }
}
