//! Coordinate-space conversions and rectangle math.
//!
//! Three spaces are involved:
//!
//! - **screen space**: pointer coordinates, relative to an arbitrary origin
//! - **document space**: the page at zoom 1.0 (layout dimensions)
//! - **native-pixel space**: the page raster's true resolution
//!
//! All functions here are pure and total. Degenerate (zero-size) rectangles
//! are valid output; callers decide whether to filter them.

use serde::{Deserialize, Serialize};

/// A point in any coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin (0, 0).
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// An axis-aligned rectangle with non-negative size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when either side has zero length.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// True when both sides are strictly longer than `min_side`.
    pub fn exceeds(&self, min_side: f64) -> bool {
        self.width > min_side && self.height > min_side
    }

    /// Round to whole pixels.
    ///
    /// Origin and size are rounded independently, matching how a canvas
    /// sizes a buffer from fractional dimensions. Size never drops below one
    /// pixel so that a committed region always yields a non-empty image.
    /// Values beyond the integer range saturate.
    pub fn to_pixels(&self) -> PixelRect {
        PixelRect {
            x: self.x.round() as i64,
            y: self.y.round() as i64,
            width: (self.width.round() as u32).max(1),
            height: (self.height.round() as u32).max(1),
        }
    }
}

/// A rectangle in whole pixels. The origin may lie outside the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Right edge, saturating.
    pub fn right(&self) -> i64 {
        self.x.saturating_add(i64::from(self.width))
    }

    /// Bottom edge, saturating.
    pub fn bottom(&self) -> i64 {
        self.y.saturating_add(i64::from(self.height))
    }

    /// Number of pixels covered.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Intersect with a raster of the given size.
    ///
    /// Returns `None` when there is no overlap.
    pub fn clip_to(&self, raster_width: u32, raster_height: u32) -> Option<PixelRect> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = self.right().min(i64::from(raster_width));
        let bottom = self.bottom().min(i64::from(raster_height));

        if right <= left || bottom <= top {
            return None;
        }

        Some(PixelRect {
            x: left,
            y: top,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    /// True when the rectangle lies fully inside a raster of the given size.
    pub fn fits_within(&self, raster_width: u32, raster_height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= i64::from(raster_width)
            && self.bottom() <= i64::from(raster_height)
    }
}

/// Convert a pointer position to document space.
///
/// Subtracts the rendering origin, then divides by zoom.
pub fn screen_to_document(pointer: Point, origin: Point, zoom: f64) -> Point {
    Point::new((pointer.x - origin.x) / zoom, (pointer.y - origin.y) / zoom)
}

/// Scale a document-space rectangle to display space.
pub fn document_to_display(rect: Rect, zoom: f64) -> Rect {
    Rect::new(
        rect.x * zoom,
        rect.y * zoom,
        rect.width * zoom,
        rect.height * zoom,
    )
}

/// Build a rectangle from two opposite corners, in any order.
pub fn normalize_rect(p1: Point, p2: Point) -> Rect {
    Rect::new(
        p1.x.min(p2.x),
        p1.y.min(p2.y),
        (p2.x - p1.x).abs(),
        (p2.y - p1.y).abs(),
    )
}

/// Scale a document-space rectangle to native-pixel space.
pub fn scale_rect_to_native(rect: Rect, scale_x: f64, scale_y: f64) -> Rect {
    Rect::new(
        rect.x * scale_x,
        rect.y * scale_y,
        rect.width * scale_x,
        rect.height * scale_y,
    )
}
