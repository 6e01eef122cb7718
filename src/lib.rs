//! # pagecrop
//!
//! Region selection and pixel-exact capture for rasterized documents.
//!
//! A document is loaded as a sequence of page rasters. Rectangles are drawn
//! over pages at any zoom and stored in zoom-independent document space.
//! Captures crop those rectangles out of the native-resolution rasters, and
//! captures can be sent to a table-recognition service.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagecrop::{load_file, CaptureSet, Point, SelectionEngine};
//!
//! # async fn run() -> pagecrop::Result<()> {
//! let pages = load_file("scan.png").await?;
//!
//! // Draw a rectangle at zoom 1.0 on the first page
//! let mut selection = SelectionEngine::new();
//! let origin = Point::origin();
//! selection.begin_drag(Point::new(40.0, 40.0), origin, 1.0, 0)?;
//! selection.update_drag(Point::new(240.0, 140.0), origin, 1.0)?;
//! selection.end_drag()?;
//!
//! let mut captures = CaptureSet::new();
//! for capture in captures.capture_all(selection.regions(), &pages)? {
//!     println!("{}: {:?}", capture.id, capture.dimensions());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Coordinate spaces
//!
//! - **Screen**: pointer positions, relative to a rendering origin.
//! - **Document**: screen minus origin, divided by zoom. Regions live here.
//! - **Native**: document scaled by the page's native/display ratio. Crops
//!   are taken here.
//!
//! ## Features
//!
//! - **Selection state machine**: explicit `Idle`/`Dragging` transitions
//! - **Pixel-exact capture**: no resampling, parallel cropping with Rayon
//! - **Table extraction**: async gateway with per-capture job tracking
//! - **Output**: CSV and JSON tables, PNG export

pub mod capture;
pub mod detect;
pub mod error;
pub mod export;
pub mod extract;
pub mod geometry;
pub mod model;
pub mod navigation;
pub mod notification;
pub mod raster;
pub mod render;
pub mod selection;
pub mod session;
pub mod view;

// Re-export commonly used types
pub use capture::{crop_region, CaptureSet};
pub use detect::{detect_format_from_bytes, detect_format_from_path, InputFormat};
pub use error::{Error, ExtractionError, Result};
pub use export::{encode_png, export_captures, export_pages};
pub use extract::{
    ExtractOptions, Extraction, ExtractionGateway, HealthStatus, HttpRecognizer, JobStatus,
    RecognitionResponse, TableRecognizer,
};
pub use geometry::{Point, Rect};
pub use model::{
    Capture, CaptureId, PageInfo, PageRaster, Region, RegionId, RegionSpec, Table, TableRow,
    TableSet,
};
pub use navigation::{compute_scroll_target, ScrollTarget};
pub use notification::{Notification, NotificationCenter, NotificationLevel, Operation};
pub use raster::{ImageRasterizer, PageRegistry, RasterOptions, Rasterizer};
pub use render::{to_csv, to_json, JsonFormat};
pub use selection::{SelectionEngine, SelectionState};
pub use session::{Session, SessionOptions};
pub use view::ViewState;

use std::path::Path;
use std::sync::Arc;

/// Load a document file with the bundled image rasterizer.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> pagecrop::Result<()> {
/// let pages = pagecrop::load_file("scan.png").await?;
/// println!("Pages: {}", pages.page_count());
/// # Ok(())
/// # }
/// ```
pub async fn load_file<P: AsRef<Path>>(path: P) -> Result<PageRegistry> {
    let data = tokio::fs::read(path.as_ref()).await?;
    load_bytes(data).await
}

/// Load a document from bytes with the bundled image rasterizer.
pub async fn load_bytes(data: Vec<u8>) -> Result<PageRegistry> {
    load_bytes_with_options(data, RasterOptions::default()).await
}

/// Load a document from bytes with custom rasterization options.
pub async fn load_bytes_with_options(
    data: Vec<u8>,
    options: RasterOptions,
) -> Result<PageRegistry> {
    PageRegistry::load(Arc::new(ImageRasterizer::new()), data, options).await
}
