use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::print_json;
use crate::infrastructure::client::CovergenClient;

#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Path to a ZIP archive of cover images
    pub file: PathBuf,
}

pub async fn run(client: &CovergenClient, command: ImportCommand) -> Result<()> {
    let archive = std::fs::read(&command.file)
        .with_context(|| format!("failed to read {}", command.file.display()))?;

    let summary = client.imports().upload(archive).await?;
    print_json(&summary)
}
