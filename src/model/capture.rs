//! Captured sub-images.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::RegionId;
use crate::geometry::{PixelRect, Rect};

/// Unique identifier of a capture. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureId(pub u64);

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A region cropped out of its page at native resolution.
#[derive(Clone, Serialize)]
pub struct Capture {
    /// Unique id
    pub id: CaptureId,

    /// Region the capture was taken from
    pub region_id: RegionId,

    /// Source page (0-based)
    pub source_page_index: usize,

    /// Document-space rectangle the capture was cropped from
    pub coords: Rect,

    /// Native-pixel rectangle actually cropped
    pub native_rect: PixelRect,

    /// When the capture was taken
    pub created_at: DateTime<Utc>,

    #[serde(skip)]
    image: Arc<RgbaImage>,
}

impl Capture {
    /// Create a capture from an already-cropped image.
    pub fn new(
        id: CaptureId,
        region_id: RegionId,
        source_page_index: usize,
        coords: Rect,
        native_rect: PixelRect,
        image: RgbaImage,
    ) -> Self {
        Self {
            id,
            region_id,
            source_page_index,
            coords,
            native_rect,
            created_at: Utc::now(),
            image: Arc::new(image),
        }
    }

    /// The cropped pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Image dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// File name used when uploading this capture.
    pub fn upload_filename(&self) -> String {
        format!("capture_{}.png", self.id)
    }
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capture")
            .field("id", &self.id)
            .field("region_id", &self.region_id)
            .field("source_page_index", &self.source_page_index)
            .field("coords", &self.coords)
            .field("native_rect", &self.native_rect)
            .field("dimensions", &self.dimensions())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_metadata_serializes_without_pixels() {
        let capture = Capture::new(
            CaptureId(7),
            RegionId(3),
            0,
            Rect::new(1.0, 2.0, 30.0, 40.0),
            PixelRect {
                x: 2,
                y: 4,
                width: 60,
                height: 80,
            },
            RgbaImage::new(60, 80),
        );

        let json = serde_json::to_string(&capture).unwrap();
        assert!(json.contains("\"id\":7"));
        assert!(json.contains("\"native_rect\""));
        assert!(!json.contains("image"));
        assert_eq!(capture.upload_filename(), "capture_7.png");
    }
}
