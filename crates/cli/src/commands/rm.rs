use std::path::Path;

use anyhow::Result;
use clap::Args;
use dialoguer::Confirm;

use crate::config::AppConfig;

#[derive(Args)]
pub struct RmArgs {
    /// File to delete
    path: String,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
}

pub async fn run(args: RmArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let fs = config.open().await?;

    // Fail on a missing file before prompting.
    fs.stat(&args.path).await?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {}?", args.path))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    fs.delete(&args.path).await?;
    println!("Deleted {}", args.path);
    Ok(())
}
