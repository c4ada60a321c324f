use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upper bound on buffer space reserved from a declared or reported size.
pub(crate) const MAX_PREALLOC: u64 = 64 * 1024;

/// Owned, readable byte source. Dropping it releases the underlying handle.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Metadata snapshot of a single stored object, taken at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub last_modified: DateTime<Utc>,
    pub e_tag: String,
    pub content_type: String,
    pub size: u64,
}

/// An open handle over one object's bytes.
pub struct FileStream {
    pub size: u64,
    pub content_type: String,
    pub content: ByteStream,
}

impl FileStream {
    /// Drain the stream into memory.
    pub async fn into_bytes(mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size.min(MAX_PREALLOC) as usize);
        self.content.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

impl fmt::Debug for FileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStream")
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Guess a MIME type from the file extension.
pub fn guess_content_type(path: &str) -> &'static str {
    let name = path.rsplit('/').next().unwrap_or(path);
    let ext = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return DEFAULT_CONTENT_TYPE,
    };
    match ext.as_str() {
        "txt" | "text" | "log" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "xml" => "text/xml; charset=utf-8",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(guess_content_type("a/b/report.PDF"), "application/pdf");
        assert_eq!(guess_content_type("x.txt"), "text/plain; charset=utf-8");
        assert_eq!(guess_content_type("noext"), DEFAULT_CONTENT_TYPE);
        assert_eq!(guess_content_type(".hidden"), DEFAULT_CONTENT_TYPE);
        assert_eq!(guess_content_type("dir.d/file"), DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn file_stream_drains() {
        let stream = FileStream {
            size: 5,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            content: Box::new(std::io::Cursor::new(b"hello".to_vec())),
        };
        assert_eq!(stream.into_bytes().await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn oversized_report_does_not_preallocate() {
        let stream = FileStream {
            size: u64::MAX,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            content: Box::new(std::io::Cursor::new(b"tiny".to_vec())),
        };
        assert_eq!(stream.into_bytes().await.unwrap(), b"tiny");
    }
}
