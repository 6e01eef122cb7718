//! Table extraction: sends captures to a recognition service.
//!
//! Each capture has at most one job in flight. A job moves
//! `Idle -> Running -> Succeeded | Failed`; a failed or succeeded job can be
//! started again. Jobs for different captures are independent and may run
//! concurrently.

mod http;
mod options;

pub use http::{HealthStatus, HttpRecognizer};
pub use options::{ExtractOptions, DEFAULT_ENDPOINT, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TIMEOUT};

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExtractionError;
use crate::export::encode_png;
use crate::model::{Capture, CaptureId, Table, TableRow, TableSet};
use crate::render::to_csv;

/// Lifecycle of the extraction job for one capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Never started, or forgotten
    #[default]
    Idle,
    /// Request in flight
    Running,
    /// Tables were recognized
    Succeeded,
    /// The last attempt failed
    Failed,
}

/// Raw body returned by a recognition service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    /// Tables as rows of cells; cells may be any JSON scalar
    #[serde(default)]
    pub tables: Option<Vec<Vec<Vec<Value>>>>,

    /// Table count reported by the service
    #[serde(default)]
    pub count: Option<usize>,

    /// Error message, present on failure
    #[serde(default)]
    pub error: Option<String>,
}

impl RecognitionResponse {
    /// Build a successful response from string cells.
    pub fn from_tables(tables: &TableSet) -> Self {
        let tables: Vec<Vec<Vec<Value>>> = tables
            .iter()
            .map(|t| {
                t.rows
                    .iter()
                    .map(|r| r.cells.iter().cloned().map(Value::String).collect())
                    .collect()
            })
            .collect();
        Self {
            count: Some(tables.len()),
            tables: Some(tables),
            error: None,
        }
    }

    /// Build a response carrying an error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Interpret the response.
    ///
    /// A non-empty `error` field is a remote failure; an absent or empty
    /// table list is [`ExtractionError::NoTablesFound`].
    pub fn into_tables(self) -> Result<TableSet, ExtractionError> {
        if let Some(message) = self.error.filter(|e| !e.is_empty()) {
            return Err(ExtractionError::Remote {
                status: None,
                message,
            });
        }

        let tables: Vec<Table> = self
            .tables
            .unwrap_or_default()
            .into_iter()
            .map(|rows| Table {
                rows: rows
                    .into_iter()
                    .map(|cells| TableRow::new(cells.into_iter().map(cell_text).collect()))
                    .collect(),
            })
            .collect();

        if tables.is_empty() {
            return Err(ExtractionError::NoTablesFound);
        }
        Ok(TableSet::new(tables))
    }
}

/// Text of one cell. `null` becomes empty; other scalars use their JSON form.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Turns a PNG image into recognized tables.
///
/// Implementations report transport and service failures as
/// [`ExtractionError::Remote`]. Timeouts are applied by the caller.
pub trait TableRecognizer: Send + Sync {
    /// Submit one PNG image under `filename`.
    fn recognize(
        &self,
        png: Vec<u8>,
        filename: String,
    ) -> impl Future<Output = Result<RecognitionResponse, ExtractionError>> + Send;
}

/// A finished extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Capture the tables were extracted from
    pub capture_id: CaptureId,

    /// Recognized tables, in service order
    pub tables: TableSet,

    /// Tables rendered as CSV
    pub csv: String,

    /// Where the CSV artifact was written, if configured
    pub artifact: Option<PathBuf>,
}

/// File name of the CSV artifact for a capture.
pub fn artifact_filename(id: CaptureId) -> String {
    format!("table_{}.csv", id)
}

type JobTable = Mutex<HashMap<CaptureId, JobStatus>>;

fn lock(jobs: &JobTable) -> MutexGuard<'_, HashMap<CaptureId, JobStatus>> {
    jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Marks a job `Failed` if its future is dropped before completing.
struct JobGuard<'a> {
    jobs: &'a JobTable,
    id: CaptureId,
    finished: bool,
}

impl JobGuard<'_> {
    fn finish(mut self, status: JobStatus) {
        lock(self.jobs).insert(self.id, status);
        self.finished = true;
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            log::warn!("Extraction for capture {} abandoned", self.id);
            lock(self.jobs).insert(self.id, JobStatus::Failed);
        }
    }
}

/// Runs extraction jobs against a [`TableRecognizer`] and tracks their state.
pub struct ExtractionGateway<R> {
    recognizer: R,
    options: ExtractOptions,
    jobs: JobTable,
}

impl<R: TableRecognizer> ExtractionGateway<R> {
    /// Create a gateway.
    pub fn new(recognizer: R, options: ExtractOptions) -> Self {
        Self {
            recognizer,
            options,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// The configured options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// The underlying recognizer.
    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Current job status for a capture.
    pub fn status(&self, id: CaptureId) -> JobStatus {
        lock(&self.jobs).get(&id).copied().unwrap_or_default()
    }

    /// True while a request for `id` is in flight.
    pub fn is_running(&self, id: CaptureId) -> bool {
        self.status(id) == JobStatus::Running
    }

    /// Drop the job record for a removed capture.
    pub fn forget(&self, id: CaptureId) {
        lock(&self.jobs).remove(&id);
    }

    /// Drop every job record.
    pub fn reset(&self) {
        lock(&self.jobs).clear();
    }

    /// Extract tables from one capture.
    ///
    /// Fails with [`ExtractionError::AlreadyRunning`] without touching the
    /// running job if one is in flight for the same capture. Every other
    /// failure leaves the job `Failed`.
    pub async fn extract(&self, capture: &Capture) -> Result<Extraction, ExtractionError> {
        let guard = self.start(capture.id)?;

        match self.run(capture).await {
            Ok(extraction) => {
                guard.finish(JobStatus::Succeeded);
                log::info!(
                    "Capture {}: extracted {} table(s)",
                    capture.id,
                    extraction.tables.len()
                );
                Ok(extraction)
            }
            Err(e) => {
                guard.finish(JobStatus::Failed);
                log::warn!("Capture {}: extraction failed: {}", capture.id, e);
                Err(e)
            }
        }
    }

    fn start(&self, id: CaptureId) -> Result<JobGuard<'_>, ExtractionError> {
        let mut jobs = lock(&self.jobs);
        if jobs.get(&id) == Some(&JobStatus::Running) {
            return Err(ExtractionError::AlreadyRunning(id));
        }
        jobs.insert(id, JobStatus::Running);

        Ok(JobGuard {
            jobs: &self.jobs,
            id,
            finished: false,
        })
    }

    async fn run(&self, capture: &Capture) -> Result<Extraction, ExtractionError> {
        let png = encode_png(capture.image()).map_err(|e| ExtractionError::Encode(e.to_string()))?;
        if png.len() > self.options.max_upload_bytes {
            return Err(ExtractionError::PayloadTooLarge {
                size: png.len(),
                limit: self.options.max_upload_bytes,
            });
        }

        log::debug!(
            "Capture {}: submitting {} bytes as {}",
            capture.id,
            png.len(),
            capture.upload_filename()
        );

        let timeout = self.options.timeout;
        let response = tokio::time::timeout(
            timeout,
            self.recognizer.recognize(png, capture.upload_filename()),
        )
        .await
        .map_err(|_| ExtractionError::Timeout(timeout))??;

        let tables = response.into_tables()?;
        let csv = to_csv(&tables);

        let artifact = match &self.options.artifact_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(artifact_filename(capture.id));
                tokio::fs::write(&path, &csv).await?;
                log::debug!("Wrote {}", path.display());
                Some(path)
            }
            None => None,
        };

        Ok(Extraction {
            capture_id: capture.id,
            tables,
            csv,
            artifact,
        })
    }
}
