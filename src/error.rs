//! Error types for pagecrop library.

use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::model::{CaptureId, RegionId};

/// Result type alias for pagecrop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, selecting and capturing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a type the rasterizer understands. No load is attempted.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// A page failed to rasterize; the whole load is aborted.
    #[error("Failed to render page {page}: {message}")]
    Render {
        /// 0-based index of the page that failed
        page: usize,
        /// Rasterizer message
        message: String,
    },

    /// The document has no pages.
    #[error("Document contains no pages")]
    EmptyDocument,

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageNotFound(usize, usize),

    /// Capture was requested with zero regions.
    #[error("Please select at least one area")]
    EmptySelection,

    /// A selection operation was invoked from the wrong state.
    #[error("Invalid selection transition: {0}")]
    InvalidTransition(&'static str),

    /// A region maps to more native pixels than a capture may hold.
    #[error("Region {region} is too large to capture ({width}x{height} pixels)")]
    RegionTooLarge {
        /// Offending region
        region: RegionId,
        /// Native width
        width: u32,
        /// Native height
        height: u32,
    },

    /// A region specification could not be parsed.
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// Error decoding or encoding raster data.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Error materializing output (CSV, JSON).
    #[error("Rendering error: {0}")]
    Output(String),

    /// Table extraction failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error belongs to the load-failure family.
    ///
    /// Load failures abort the load and leave no partial state behind.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedInput(_) | Error::Render { .. } | Error::EmptyDocument
        )
    }
}

/// Errors raised by a single extraction job.
///
/// Every variant is local to one capture; the job is left in the
/// `Failed` state so that it can be retried.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The remote call did not complete within the allowed time.
    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    /// A job for this capture is already running.
    #[error("Extraction already running for capture {0}")]
    AlreadyRunning(CaptureId),

    /// The service answered but found no tables.
    #[error("No tables found in the image")]
    NoTablesFound,

    /// Non-success status, explicit error field, or transport failure.
    #[error("{}", remote_message(.status, .message))]
    Remote {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// The encoded image exceeds the service upload limit.
    #[error("Image is {size} bytes; maximum upload size is {limit} bytes")]
    PayloadTooLarge {
        /// Encoded size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// The capture image could not be encoded for upload.
    #[error("Failed to encode capture: {0}")]
    Encode(String),

    /// The CSV artifact could not be written.
    #[error("Failed to write table artifact: {0}")]
    Artifact(#[from] io::Error),
}

fn remote_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Server responded with {}: {}", code, message),
        None => format!("Request failed: {}", message),
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        ExtractionError::Remote {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
