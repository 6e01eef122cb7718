//! Writing captures and page rasters out as standalone images.
//!
//! File names are derived from 1-based position: `capture_1.png`,
//! `page_1.png`, and so on.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::error::Result;
use crate::model::Capture;
use crate::raster::PageRegistry;

/// File name for the capture at 0-based `index`.
pub fn capture_filename(index: usize) -> String {
    format!("capture_{}.png", index + 1)
}

/// File name for the page at 0-based `index`.
pub fn page_filename(index: usize) -> String {
    format!("page_{}.png", index + 1)
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Write every capture to `dir`, creating it if needed.
///
/// Returns the written paths in capture order.
pub fn export_captures(captures: &[Capture], dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    captures
        .iter()
        .enumerate()
        .map(|(index, capture)| {
            let path = dir.join(capture_filename(index));
            fs::write(&path, encode_png(capture.image())?)?;
            log::debug!("Wrote capture {} to {}", capture.id, path.display());
            Ok(path)
        })
        .collect()
}

/// Write every page raster to `dir`, creating it if needed.
pub fn export_pages(registry: &PageRegistry, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    registry
        .iter()
        .map(|page| {
            let path = dir.join(page_filename(page.index));
            fs::write(&path, encode_png(page.pixels())?)?;
            Ok(path)
        })
        .collect()
}
