use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fsbridge_core::{BackendConfig, FileSystem};

use crate::progress;

const CONFIG_FILE: &str = "fsbridge.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fsbridge")
            .join(CONFIG_FILE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("config not found at {}", path.display()))?;
        toml::from_str(&content).context("failed to parse config")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Open the configured backend. Object stores check the bucket here, so
    /// a spinner covers the wait.
    pub async fn open(&self) -> Result<FileSystem> {
        let kind = self.backend.kind();
        let spinner = progress::create_spinner(&format!("Opening {kind} backend..."));
        let result = FileSystem::open(self.backend.clone()).await;
        spinner.finish_and_clear();
        result.with_context(|| format!("failed to open {kind} backend"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsbridge_core::{LocalConfig, ObjectStoreConfig};

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut s3 = ObjectStoreConfig::new("ak", "sk");
        s3.key_prefix = "backups/".to_string();
        let config = AppConfig {
            backend: BackendConfig::S3(s3.clone()),
        };

        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.backend, BackendConfig::S3(s3));
    }

    #[test]
    fn parses_local_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [backend]
            type = "local"
            base_path = "/tmp/fsbridge-data"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Local(LocalConfig::new("/tmp/fsbridge-data"))
        );
    }

    #[tokio::test]
    async fn opens_configured_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            backend: BackendConfig::Local(LocalConfig::new(dir.path().join("data"))),
        };
        let fs = config.open().await.unwrap();
        fs.write_string("a.txt", "hello").await.unwrap();
        assert_eq!(fs.list("", true).await.unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("none.toml")).unwrap_err();
        assert!(err.to_string().contains("config not found"));
    }
}
