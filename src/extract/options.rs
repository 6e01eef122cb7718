//! Extraction options and configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default base URL of the table-recognition service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Default time allowed for one extraction call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upload limit enforced by the service (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Options for table extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Base URL of the recognition service
    pub endpoint: String,

    /// Time allowed for one extraction call
    pub timeout: Duration,

    /// Largest encoded image that will be uploaded
    pub max_upload_bytes: usize,

    /// Directory to write `table_<id>.csv` artifacts into
    pub artifact_dir: Option<PathBuf>,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the upload limit in bytes.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Write a CSV artifact for every successful extraction.
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            artifact_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ExtractOptions::default();
        assert_eq!(opts.endpoint, "http://localhost:5000");
        assert_eq!(opts.timeout, Duration::from_secs(30));
        assert_eq!(opts.max_upload_bytes, 10 * 1024 * 1024);
        assert!(opts.artifact_dir.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let opts = ExtractOptions::new()
            .with_endpoint("http://tables.internal:8080")
            .with_timeout(Duration::from_secs(5))
            .with_max_upload_bytes(1024)
            .with_artifact_dir("/tmp/tables");

        assert_eq!(opts.endpoint, "http://tables.internal:8080");
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert_eq!(opts.max_upload_bytes, 1024);
        assert_eq!(opts.artifact_dir, Some(PathBuf::from("/tmp/tables")));
    }
}
