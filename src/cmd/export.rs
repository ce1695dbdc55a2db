//! Store dump command: `intake export`.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;

use intake::config::IntakeConfig;
use intake::store::SubmissionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// The append-only JSONL log, one submission per line.
    Jsonl,
    /// The CSV mirror with the evolved header.
    Csv,
}

pub fn cmd_export(format: ExportFormat, data_dir: Option<PathBuf>) -> Result<()> {
    let config = IntakeConfig::from_env()?;
    let data_dir = data_dir.unwrap_or(config.data_dir);

    let store = SubmissionStore::open(&data_dir)?;
    let path = match format {
        ExportFormat::Jsonl => store.jsonl_path(),
        ExportFormat::Csv => store.csv_path(),
    };

    if !path.exists() {
        println!("No submissions recorded yet.");
        return Ok(());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    print!("{}", content);
    Ok(())
}
