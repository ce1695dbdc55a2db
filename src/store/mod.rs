//! Flat-file persistence for registration submissions.
//!
//! Two files live side by side in the data directory: the JSONL log (the
//! lossless source of truth) and a CSV mirror kept convenient for
//! spreadsheet users. Every accepted submission is appended to both.

mod csv;
mod jsonl;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::record::Record;

pub use self::csv::CsvTable;
pub use self::jsonl::JsonlLog;

pub const JSONL_FILE: &str = "factory_registrations.jsonl";
pub const CSV_FILE: &str = "factory_registrations.csv";

/// The pair of submission files under one data directory.
pub struct SubmissionStore {
    jsonl: JsonlLog,
    csv: CsvTable,
}

impl SubmissionStore {
    /// Open the store rooted at `data_dir`, creating the directory if it
    /// does not exist yet.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).with_context(|| {
            format!("Failed to create data directory {}", data_dir.display())
        })?;
        Ok(Self {
            jsonl: JsonlLog::new(data_dir.join(JSONL_FILE)),
            csv: CsvTable::new(data_dir.join(CSV_FILE)),
        })
    }

    /// Persist a record to the JSONL log, then to the CSV mirror. If the
    /// CSV write fails the record is already in the log; the mirror can be
    /// rebuilt from there, so the partial state is reported but not rolled
    /// back.
    pub fn append(&self, record: &Record) -> Result<()> {
        self.jsonl.append(record)?;
        self.csv.append(record)?;
        Ok(())
    }

    /// All submissions in arrival order, read from the JSONL log.
    pub fn list(&self) -> Result<Vec<Record>> {
        self.jsonl.read_all()
    }

    /// Raw bytes of the CSV mirror; `None` before the first submission.
    pub fn read_csv_bytes(&self) -> Result<Option<Vec<u8>>> {
        let path = self.csv.path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(bytes))
    }

    pub fn jsonl_path(&self) -> &Path {
        self.jsonl.path()
    }

    pub fn csv_path(&self) -> &Path {
        self.csv.path()
    }
}

/// Async-safe handle to the submission store.
///
/// Wraps the store behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`. The mutex makes the store a
/// single-writer: the CSV header check and the rewrite it may trigger
/// happen under one lock, and file I/O stays off async worker threads.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<Mutex<SubmissionStore>>,
}

impl StoreHandle {
    pub fn new(store: SubmissionStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a closure with access to the store on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&SubmissionStore) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = store
                .lock()
                .map_err(|e| anyhow::anyhow!("Store lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("Store task panicked")?
    }
}
