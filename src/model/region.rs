//! Selection regions.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::{normalize_rect, Point, Rect};

/// Unique identifier of a committed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A committed selection, stored in document space.
///
/// Regions are never mutated once committed; editing one means removing it
/// and drawing a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Unique id
    pub id: RegionId,

    /// Page the region was drawn on (0-based)
    pub page_index: usize,

    /// Gesture anchor in document space
    pub start: Point,

    /// Gesture end in document space
    pub end: Point,
}

impl Region {
    /// Normalized document-space rectangle.
    pub fn rect(&self) -> Rect {
        normalize_rect(self.start, self.end)
    }

    /// Width in document units.
    pub fn width(&self) -> f64 {
        (self.end.x - self.start.x).abs()
    }

    /// Height in document units.
    pub fn height(&self) -> f64 {
        (self.end.y - self.start.y).abs()
    }
}

/// The rectangle being drawn between gesture start and end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InProgressSelection {
    /// Page the gesture started on
    pub page_index: usize,

    /// Gesture anchor in document space
    pub start: Point,

    /// Latest pointer position in document space
    pub end: Point,
}

impl InProgressSelection {
    /// Start a selection anchored at `start`.
    pub fn anchored(page_index: usize, start: Point) -> Self {
        Self {
            page_index,
            start,
            end: start,
        }
    }

    /// Normalized document-space rectangle.
    pub fn rect(&self) -> Rect {
        normalize_rect(self.start, self.end)
    }
}

/// A region described in text, e.g. `2:10,20,300,150`.
///
/// The page number is 1-based; the rectangle is `x,y,width,height` in
/// document units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSpec {
    /// Page index (0-based)
    pub page_index: usize,

    /// Document-space rectangle
    pub rect: Rect,
}

fn spec_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(\d+)\s*:\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*,\s*([\d.]+)\s*,\s*([\d.]+)\s*$",
        )
        .unwrap()
    })
}

impl FromStr for RegionSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = spec_pattern()
            .captures(s)
            .ok_or_else(|| Error::InvalidRegion(format!("expected PAGE:X,Y,W,H, got '{}'", s)))?;

        let number = |i: usize| -> Result<f64, Error> {
            caps[i]
                .parse::<f64>()
                .map_err(|_| Error::InvalidRegion(format!("'{}' is not a number", &caps[i])))
        };

        let page: usize = caps[1]
            .parse()
            .map_err(|_| Error::InvalidRegion(format!("'{}' is not a page number", &caps[1])))?;
        if page == 0 {
            return Err(Error::InvalidRegion("page numbers start at 1".into()));
        }

        Ok(Self {
            page_index: page - 1,
            rect: Rect::new(number(2)?, number(3)?, number(4)?, number(5)?),
        })
    }
}
