//! Input format detection.
//!
//! Document loads are rejected up front when the bytes are not a format the
//! rasterizer understands.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Formats recognized by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
    /// GIF image (each frame is a page)
    Gif,
    /// PDF document (requires a PDF-capable rasterizer)
    Pdf,
}

impl InputFormat {
    /// MIME type of the format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            InputFormat::Png => "image/png",
            InputFormat::Jpeg => "image/jpeg",
            InputFormat::Gif => "image/gif",
            InputFormat::Pdf => "application/pdf",
        }
    }

    /// Whether the format is a raster image.
    pub fn is_image(&self) -> bool {
        !matches!(self, InputFormat::Pdf)
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PDF_MAGIC: &[u8] = b"%PDF-";
const HEADER_LEN: usize = 16;

/// Detect the input format from a file path.
///
/// # Returns
/// * `Ok(InputFormat)` if the header is recognized
/// * `Err(Error::UnsupportedInput)` otherwise
///
/// # Example
/// ```no_run
/// use pagecrop::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("scan.png").unwrap();
/// println!("Format: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the input format from the leading bytes of a document.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    if data.starts_with(PNG_MAGIC) {
        return Ok(InputFormat::Png);
    }
    if data.starts_with(JPEG_MAGIC) {
        return Ok(InputFormat::Jpeg);
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Ok(InputFormat::Gif);
    }
    if data.starts_with(PDF_MAGIC) {
        return Ok(InputFormat::Pdf);
    }

    Err(Error::UnsupportedInput(describe_unknown(data)))
}

fn describe_unknown(data: &[u8]) -> String {
    if data.is_empty() {
        return "empty input".to_string();
    }
    let preview: String = data
        .iter()
        .take(8)
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ");
    format!("unrecognized header [{}]", preview)
}
