//! Rasterization seam and the page registry.
//!
//! Turning a source document into page rasters is delegated to a
//! [`Rasterizer`]. The core only ever sees the resulting [`PageRaster`]s,
//! held by a [`PageRegistry`].
//!
//! [`PageRaster`]: crate::model::PageRaster

mod image;
mod registry;

pub use self::image::ImageRasterizer;
pub use registry::PageRegistry;

use ::image::RgbaImage;

use crate::detect::InputFormat;
use crate::error::Result;

/// Abstract interface to a document rasterizer.
///
/// Implementations must be deterministic for the same input bytes; the
/// registry may call [`render_page`](Rasterizer::render_page) for several
/// pages concurrently.
pub trait Rasterizer: Send + Sync {
    /// Name of this rasterizer, for logging.
    fn name(&self) -> &str;

    /// Check that the input is a type this rasterizer understands.
    ///
    /// Called before any rendering; an error here means no load is attempted.
    fn detect(&self, data: &[u8]) -> Result<InputFormat>;

    /// Number of pages in the document.
    fn page_count(&self, data: &[u8]) -> Result<usize>;

    /// Render one page (0-based) at native resolution.
    fn render_page(&self, data: &[u8], index: usize) -> Result<RgbaImage>;

    /// Render every page in one pass.
    ///
    /// For formats that can only be decoded front to back. `None` means
    /// pages are rendered independently through [`Rasterizer::render_page`].
    fn render_all(&self, _data: &[u8]) -> Option<Result<Vec<RgbaImage>>> {
        None
    }
}

/// Options for building a page registry.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Native pixels per display unit.
    ///
    /// Pages are laid out at `native / display_ratio`; the default of 2.0
    /// keeps a 2x supersampled raster behind every display pixel.
    pub display_ratio: f64,

    /// Whether to render pages in parallel
    pub parallel: bool,
}

impl RasterOptions {
    /// Create new raster options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the native-to-display ratio.
    pub fn with_display_ratio(mut self, ratio: f64) -> Self {
        self.display_ratio = ratio;
        self
    }

    /// Enable or disable parallel rendering.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Render pages one at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            display_ratio: 2.0,
            parallel: true,
        }
    }
}
