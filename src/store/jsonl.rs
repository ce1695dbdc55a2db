use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::record::Record;

/// Append-only JSONL log, one submission per line.
///
/// This file is the source of truth; the CSV mirror is derived from the
/// same records and can be rebuilt from here. Each append is a single
/// `write_all` of the full line on a file opened in append mode, so a line
/// is never left half-written by an interrupted writer.
pub struct JsonlLog {
    path: PathBuf,
}

impl JsonlLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line.
    pub fn append(&self, record: &Record) -> Result<()> {
        let mut line =
            serde_json::to_string(record).context("Failed to serialize submission record")?;
        line.push('\n');

        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?
            .write_all(line.as_bytes())
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;

        Ok(())
    }

    /// Read every record back, oldest first. A missing file is an empty
    /// log, not an error.
    pub fn read_all(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(line).with_context(|| {
                format!("Malformed record at line {} of {}", idx + 1, self.path.display())
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};
    use tempfile::tempdir;

    use crate::record::normalize_payload;

    fn record(fields: &[(&str, &str)]) -> Record {
        let mut map = Map::new();
        for (key, value) in fields {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        normalize_payload(&map)
    }

    fn make_log() -> (JsonlLog, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let log = JsonlLog::new(dir.path().join("registrations.jsonl"));
        (log, dir)
    }

    #[test]
    fn test_append_and_read_back() {
        let (log, _dir) = make_log();
        log.append(&record(&[("factoryName", "Acme"), ("city", "القاهرة")]))
            .unwrap();
        log.append(&record(&[("factoryName", "Globex")])).unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("factoryName"), Some("Acme"));
        assert_eq!(records[0].get("city"), Some("القاهرة"));
        assert_eq!(records[1].get("factoryName"), Some("Globex"));
    }

    #[test]
    fn test_one_json_object_per_line() {
        let (log, _dir) = make_log();
        log.append(&record(&[("a", "1")])).unwrap();
        log.append(&record(&[("b", "2")])).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.ends_with('\n'));
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            serde_json::from_str::<Value>(line).unwrap();
        }
    }

    #[test]
    fn test_read_all_missing_file_is_empty() {
        let (log, _dir) = make_log();
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_recovery_after_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registrations.jsonl");

        {
            let log = JsonlLog::new(path.clone());
            log.append(&record(&[("factoryName", "Acme")])).unwrap();
        }

        {
            let log = JsonlLog::new(path);
            log.append(&record(&[("factoryName", "Globex")])).unwrap();
            let records = log.read_all().unwrap();
            assert_eq!(records.len(), 2);
            assert_eq!(records[0].get("factoryName"), Some("Acme"));
        }
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let (log, _dir) = make_log();
        log.append(&record(&[("a", "1")])).unwrap();
        fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap()
            .write_all(b"not json\n")
            .unwrap();

        let err = log.read_all().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
