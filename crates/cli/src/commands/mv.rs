use std::path::Path;

use anyhow::Result;
use clap::Args;
use console::style;

use fsbridge_core::Error;

use crate::config::AppConfig;

#[derive(Args)]
pub struct MvArgs {
    /// Current path
    src: String,

    /// New path
    dst: String,
}

pub async fn run(args: MvArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let fs = config.open().await?;

    match fs.move_file(&args.src, &args.dst).await {
        Ok(()) => {
            println!("Moved {} -> {}", args.src, args.dst);
            Ok(())
        }
        Err(err @ Error::MoveIncomplete { .. }) => {
            eprintln!(
                "{} {} was copied to {} but could not be deleted; both now exist.",
                style("warning:").yellow().bold(),
                args.src,
                args.dst
            );
            eprintln!("Run `fsbridge rm {}` once the cause is fixed.", args.src);
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
