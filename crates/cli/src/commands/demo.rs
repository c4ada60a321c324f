use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use fsbridge_core::FileSystem;

use crate::config::AppConfig;
use crate::progress;

const SAMPLE_FILES: [(&str, &str); 5] = [
    ("file1.txt", "File 1 in the root folder"),
    ("file2.txt", "File 2 in the root folder"),
    ("subfolder1/sf1_file1.txt", "File 1 in subfolder 1"),
    ("subfolder1/sf1_file2.txt", "File 2 in subfolder 1"),
    (
        "subfolder1/ssf1.1/sf1_ssf1_file1.txt",
        "File 1 in sub-subfolder 1 of subfolder 1",
    ),
];

const MOVED_NAME: &str = "new_file_moved.txt";

#[derive(Args)]
pub struct DemoArgs {
    /// Folder the sample files are written under
    #[arg(long, default_value = "demo")]
    prefix: String,
}

pub async fn run(args: DemoArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let fs = config.open().await?;

    walkthrough(&fs, &args.prefix, true).await?;
    println!("{}", style("Demo complete.").green().bold());
    Ok(())
}

/// Write the sample files, then list, stat, move, read and delete.
/// Returns the recursive listing taken after the writes.
pub async fn walkthrough(fs: &FileSystem, prefix: &str, verbose: bool) -> Result<Vec<String>> {
    let prefix = prefix.trim_matches('/');
    let full = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        }
    };
    let say = |line: String| {
        if verbose {
            println!("{line}");
        }
    };

    say(format!("{}", style("Writing sample files").bold()));
    for (name, content) in SAMPLE_FILES {
        fs.write_string(&full(name), content)
            .await
            .with_context(|| format!("failed to write {name}"))?;
        say(format!("  wrote {name}"));
    }

    say(format!("{}", style("Listing recursively").bold()));
    let files = fs.list(prefix, true).await?;
    for file in &files {
        say(format!("  {file}"));
    }

    let Some(first) = files.first() else {
        anyhow::bail!("listing returned no files after writing samples");
    };

    say(format!("{}", style("Stat of the first file").bold()));
    let info = fs.stat(&full(first.as_str())).await?;
    say(format!(
        "  modified {}  etag {}  type {}  size {}",
        info.last_modified.format("%Y-%m-%d %H:%M:%S"),
        if info.e_tag.is_empty() { "-" } else { info.e_tag.as_str() },
        info.content_type,
        progress::format_bytes(info.size)
    ));

    say(format!("{}", style("Moving the first file").bold()));
    fs.move_file(&full(first.as_str()), &full(MOVED_NAME)).await?;
    say(format!("  {first} -> {MOVED_NAME}"));

    say(format!("{}", style("Reading the moved file").bold()));
    let content = fs.read_string(&full(MOVED_NAME)).await?;
    say(format!("  {content}"));

    say(format!("{}", style("Deleting the moved file").bold()));
    fs.delete(&full(MOVED_NAME)).await?;
    say(format!("  deleted {MOVED_NAME}"));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsbridge_core::LocalConfig;

    #[tokio::test]
    async fn walkthrough_on_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let fs = FileSystem::open(LocalConfig::new(dir.path()))
            .await
            .unwrap();

        let listed = walkthrough(&fs, "demo", false).await.unwrap();
        assert_eq!(listed.len(), SAMPLE_FILES.len());
        assert_eq!(listed[0], "file1.txt");

        let remaining = fs.list("demo", true).await.unwrap();
        assert_eq!(remaining.len(), SAMPLE_FILES.len() - 1);
        assert!(!remaining.contains(&"file1.txt".to_string()));
        assert!(!remaining.contains(&MOVED_NAME.to_string()));
    }
}
