use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::record::Record;

/// CSV mirror of the submission log with an evolving header.
///
/// The header is the append-only union of every field name ever written,
/// in first-seen order. A record whose fields all fit the current header
/// is appended as one row without touching earlier bytes. A record that
/// introduces a new field triggers a full rewrite: the widened header,
/// every prior row backfilled with empty strings for the new columns,
/// then the new row.
pub struct CsvTable {
    path: PathBuf,
}

impl CsvTable {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current header columns; empty when the file is absent or empty.
    pub fn header(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        self.read_header()
    }

    pub fn append(&self, record: &Record) -> Result<()> {
        if !self.path.exists() {
            return self.create_with(record);
        }

        let existing = self.read_header()?;
        let mut columns = existing.clone();
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }

        if columns == existing {
            self.append_row(&columns, record)
        } else {
            // Header grew, or the file was empty and has no header yet.
            self.rewrite(&columns, record)
        }
    }

    fn create_with(&self, record: &Record) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        writer
            .write_record(record.keys())
            .context("Failed to write CSV header")?;
        writer
            .write_record(record.keys().map(|key| record.get_or(key, "")))
            .context("Failed to write CSV row")?;
        writer.flush().context("Failed to flush CSV")?;
        Ok(())
    }

    fn read_header(&self) -> Result<Vec<String>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        // An empty file yields an empty header record rather than an error.
        let headers = reader.headers().context("Failed to read CSV header")?;
        Ok(headers.iter().map(str::to_string).collect())
    }

    fn append_row(&self, columns: &[String], record: &Record) -> Result<()> {
        let file = fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(columns.iter().map(|column| record.get_or(column, "")))
            .context("Failed to append CSV row")?;
        writer.flush().context("Failed to flush CSV")?;
        Ok(())
    }

    fn rewrite(&self, columns: &[String], record: &Record) -> Result<()> {
        let mut rows: Vec<csv::StringRecord> = Vec::new();
        {
            let mut reader = csv::ReaderBuilder::new()
                .flexible(true)
                .from_path(&self.path)
                .with_context(|| format!("Failed to open {}", self.path.display()))?;
            for row in reader.records() {
                rows.push(row.context("Failed to read CSV row")?);
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Failed to rewrite {}", self.path.display()))?;
        writer
            .write_record(columns)
            .context("Failed to write CSV header")?;
        for row in &rows {
            // Prior rows keep their positional values; the union only ever
            // appends columns, so position i still means column i.
            writer
                .write_record((0..columns.len()).map(|i| row.get(i).unwrap_or("")))
                .context("Failed to write CSV row")?;
        }
        writer
            .write_record(columns.iter().map(|column| record.get_or(column, "")))
            .context("Failed to write CSV row")?;
        writer.flush().context("Failed to flush CSV")?;
        Ok(())
    }
}
