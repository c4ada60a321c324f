use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

use super::{ClientError, ClientResult, ObjectClient};
use crate::config::ObjectStoreConfig;
use crate::error::{Error, Result};
use crate::types::{ByteStream, DEFAULT_CONTENT_TYPE, FileInfo, guess_content_type};

/// [`ObjectClient`] over an S3-compatible endpoint, using path-style
/// addressing and static credentials.
pub struct S3Client {
    bucket: Box<Bucket>,
}

impl S3Client {
    pub fn new(config: &ObjectStoreConfig) -> Result<Self> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint_url(),
        };
        let credentials = Credentials::new(
            Some(config.access_key.as_str()),
            Some(config.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| Error::Config(format!("invalid S3 credentials: {e}")))?;
        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| Error::Config(format!("failed to create S3 client: {e}")))?
            .with_path_style();
        Ok(Self { bucket })
    }
}

/// Map a response status to a client result. Depending on rust-s3's
/// `fail-on-err` feature, failures arrive either as a status or as an error.
fn check_status(status: u16, what: &str, key: &str) -> ClientResult<()> {
    match status {
        200..=299 => Ok(()),
        404 => Err(ClientError::NotFound),
        other => Err(ClientError::other(format!("S3 {what} {key} returned {other}"))),
    }
}

fn from_s3(err: S3Error) -> ClientError {
    match err {
        S3Error::HttpFailWithBody(404, _) => ClientError::NotFound,
        other => ClientError::other(other),
    }
}

/// Streaming puts stop at end of input, so a short body would otherwise be
/// stored truncated.
fn check_uploaded(key: &str, expected: u64, uploaded: u64) -> ClientResult<()> {
    if uploaded == expected {
        Ok(())
    } else {
        Err(ClientError::other(format!(
            "S3 PUT {key}: expected {expected} bytes, uploaded {uploaded}"
        )))
    }
}

fn parse_http_date(value: Option<&str>) -> DateTime<Utc> {
    value
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_default()
}

#[async_trait]
impl ObjectClient for S3Client {
    async fn bucket_exists(&self) -> ClientResult<bool> {
        self.bucket.exists().await.map_err(ClientError::other)
    }

    async fn list_objects(&self, prefix: &str, recursive: bool) -> ClientResult<Vec<String>> {
        let delimiter = (!recursive).then(|| "/".to_string());
        let pages = self
            .bucket
            .list(prefix.to_string(), delimiter)
            .await
            .map_err(ClientError::other)?;
        Ok(pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| object.key)
            .collect())
    }

    async fn stat_object(&self, key: &str) -> ClientResult<FileInfo> {
        let (head, status) = self.bucket.head_object(key).await.map_err(from_s3)?;
        check_status(status, "HEAD", key)?;
        Ok(FileInfo {
            last_modified: parse_http_date(head.last_modified.as_deref()),
            e_tag: head.e_tag.unwrap_or_default(),
            content_type: head
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            size: head.content_length.unwrap_or(0).max(0) as u64,
        })
    }

    async fn get_object(&self, key: &str) -> ClientResult<ByteStream> {
        let response = self.bucket.get_object_stream(key).await.map_err(from_s3)?;
        check_status(response.status_code, "GET", key)?;
        let body = response.bytes.map_err(std::io::Error::other);
        Ok(Box::new(StreamReader::new(body)))
    }

    async fn put_object(&self, key: &str, content: ByteStream, length: u64) -> ClientResult<()> {
        let mut body = content.take(length);
        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut body, key, guess_content_type(key))
            .await
            .map_err(from_s3)?;
        check_status(response.status_code(), "PUT", key)?;
        check_uploaded(key, length, response.uploaded_bytes() as u64)
    }

    async fn remove_object(&self, key: &str) -> ClientResult<()> {
        let response = self.bucket.delete_object(key).await.map_err(from_s3)?;
        check_status(response.status_code(), "DELETE", key)
    }
}
