mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "fsbridge",
    version,
    about = "One file interface over local directories and S3-compatible buckets"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: <config dir>/fsbridge/fsbridge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);

    match cli.command {
        commands::Command::Init(args) => commands::init::run(args, &config_path).await,
        commands::Command::Ls(args) => commands::ls::run(args, &config_path).await,
        commands::Command::Stat(args) => commands::stat::run(args, &config_path).await,
        commands::Command::Cat(args) => commands::cat::run(args, &config_path).await,
        commands::Command::Put(args) => commands::put::run(args, &config_path).await,
        commands::Command::Get(args) => commands::get::run(args, &config_path).await,
        commands::Command::Mv(args) => commands::mv::run(args, &config_path).await,
        commands::Command::Rm(args) => commands::rm::run(args, &config_path).await,
        commands::Command::Demo(args) => commands::demo::run(args, &config_path).await,
    }
}
