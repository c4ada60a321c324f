use std::path::Path;

use anyhow::Result;
use clap::Args;
use tracing::info;

use fsbridge_core::{BackendConfig, BackendKind, LocalConfig, ObjectStoreConfig};

use crate::config::AppConfig;

#[derive(Args)]
pub struct InitArgs {
    /// Backend type: local or s3
    #[arg(long)]
    backend: String,

    /// Root directory for the local backend
    #[arg(long)]
    path: Option<String>,

    /// S3 endpoint, host:port or URL
    #[arg(long, default_value = "localhost:9000")]
    endpoint: String,

    /// S3 bucket name
    #[arg(long, default_value = "gofs")]
    bucket: String,

    /// S3 region
    #[arg(long, default_value = "us-east-1")]
    region: String,

    /// S3 access key
    #[arg(long)]
    access_key: Option<String>,

    /// S3 secret key
    #[arg(long)]
    secret_key: Option<String>,

    /// Key prefix inside the bucket
    #[arg(long, default_value = "")]
    prefix: String,

    /// Talk plain HTTP to the S3 endpoint
    #[arg(long)]
    insecure: bool,

    /// Log every storage operation at debug level
    #[arg(long)]
    debug: bool,
}

fn backend_config(args: InitArgs) -> Result<BackendConfig> {
    let config = match args.backend.parse::<BackendKind>()? {
        BackendKind::Local => {
            let path = args
                .path
                .ok_or_else(|| anyhow::anyhow!("--path required for local backend"))?;
            BackendConfig::Local(LocalConfig {
                base_path: path.into(),
                debug: args.debug,
            })
        }
        BackendKind::S3 => {
            let access_key = args
                .access_key
                .ok_or_else(|| anyhow::anyhow!("--access-key required for S3 backend"))?;
            let secret_key = args
                .secret_key
                .ok_or_else(|| anyhow::anyhow!("--secret-key required for S3 backend"))?;
            BackendConfig::S3(ObjectStoreConfig {
                endpoint: args.endpoint,
                region: args.region,
                access_key,
                secret_key,
                use_tls: !args.insecure,
                bucket: args.bucket,
                key_prefix: args.prefix,
                debug: args.debug,
            })
        }
    };
    Ok(config)
}

pub async fn run(args: InitArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig {
        backend: backend_config(args)?,
    };

    // Opening creates the local root or checks that the bucket exists.
    config.open().await?;
    config.save(config_path)?;

    info!(
        config_path = %config_path.display(),
        backend = %config.backend.kind(),
        "Backend configured. Config saved."
    );
    println!("Backend initialized successfully.");
    println!("Config: {}", config_path.display());
    Ok(())
}
