//! Page-level types.

use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// One rasterized page of the loaded document.
///
/// Display dimensions are the page at the reference layout scale (zoom 1.0);
/// native dimensions are the raster's true pixel size. Both axes share one
/// scale factor, so `native_width / display_width == native_height / display_height`.
#[derive(Clone)]
pub struct PageRaster {
    /// Page index (0-based, document order)
    pub index: usize,

    /// Layout width at zoom 1.0
    pub display_width: f64,

    /// Layout height at zoom 1.0
    pub display_height: f64,

    /// Raster width in pixels
    pub native_width: u32,

    /// Raster height in pixels
    pub native_height: u32,

    pixels: Arc<RgbaImage>,
}

impl PageRaster {
    /// Create a page from its raster.
    ///
    /// `display_ratio` is native pixels per display unit; display dimensions
    /// are derived from it so the scale is uniform on both axes.
    pub fn new(index: usize, pixels: RgbaImage, display_ratio: f64) -> Self {
        let ratio = if display_ratio.is_finite() && display_ratio > 0.0 {
            display_ratio
        } else {
            1.0
        };
        let (native_width, native_height) = pixels.dimensions();

        Self {
            index,
            display_width: f64::from(native_width) / ratio,
            display_height: f64::from(native_height) / ratio,
            native_width,
            native_height,
            pixels: Arc::new(pixels),
        }
    }

    /// The page raster.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Horizontal document-to-native scale.
    pub fn scale_x(&self) -> f64 {
        f64::from(self.native_width) / self.display_width
    }

    /// Vertical document-to-native scale.
    pub fn scale_y(&self) -> f64 {
        f64::from(self.native_height) / self.display_height
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Serializable summary of this page.
    pub fn info(&self) -> PageInfo {
        PageInfo {
            index: self.index,
            display_width: self.display_width,
            display_height: self.display_height,
            native_width: self.native_width,
            native_height: self.native_height,
        }
    }
}

impl std::fmt::Debug for PageRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRaster")
            .field("index", &self.index)
            .field("display_width", &self.display_width)
            .field("display_height", &self.display_height)
            .field("native_width", &self.native_width)
            .field("native_height", &self.native_height)
            .finish_non_exhaustive()
    }
}

/// Page dimensions without pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub index: usize,
    pub display_width: f64,
    pub display_height: f64,
    pub native_width: u32,
    pub native_height: u32,
}
