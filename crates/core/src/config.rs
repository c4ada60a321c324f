use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    S3,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::S3 => write!(f, "s3"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "s3" => Ok(BackendKind::S3),
            _ => Err(Error::Config(format!(
                "unknown backend type: {s} (supported: local, s3)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    pub base_path: PathBuf,
    #[serde(default)]
    pub debug: bool,
}

impl LocalConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            debug: false,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default)]
    pub debug: bool,
}

fn default_endpoint() -> String {
    "localhost:9000".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_use_tls() -> bool {
    true
}

fn default_bucket() -> String {
    "gofs".to_string()
}

impl ObjectStoreConfig {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            endpoint: default_endpoint(),
            region: default_region(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            use_tls: default_use_tls(),
            bucket: default_bucket(),
            key_prefix: String::new(),
            debug: false,
        }
    }

    /// Endpoint URL with a scheme, picking one from `use_tls` when absent.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.use_tls {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

// Keeps the secret key out of logs.
impl fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("use_tls", &self.use_tls)
            .field("bucket", &self.bucket)
            .field("key_prefix", &self.key_prefix)
            .field("debug", &self.debug)
            .finish()
    }
}

/// Backend selection: the variant decides the kind, the payload its settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackendConfig {
    #[serde(rename = "local")]
    Local(LocalConfig),
    #[serde(rename = "s3")]
    S3(ObjectStoreConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::Local(_) => BackendKind::Local,
            BackendConfig::S3(_) => BackendKind::S3,
        }
    }

    pub fn debug(&self) -> bool {
        match self {
            BackendConfig::Local(c) => c.debug,
            BackendConfig::S3(c) => c.debug,
        }
    }
}

impl From<LocalConfig> for BackendConfig {
    fn from(config: LocalConfig) -> Self {
        BackendConfig::Local(config)
    }
}

impl From<ObjectStoreConfig> for BackendConfig {
    fn from(config: ObjectStoreConfig) -> Self {
        BackendConfig::S3(config)
    }
}
