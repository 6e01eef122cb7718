//! Rasterizer for documents that are already raster images.

use std::io::Cursor;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat, RgbaImage};

use super::Rasterizer;
use crate::detect::{detect_format_from_bytes, InputFormat};
use crate::error::{Error, Result};

/// Treats PNG and JPEG inputs as one-page documents and GIF inputs as one
/// page per frame.
#[derive(Debug, Clone, Default)]
pub struct ImageRasterizer {
    _private: (),
}

impl ImageRasterizer {
    /// Create a new image rasterizer.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Decode every GIF frame in one pass.
    fn gif_frames(data: &[u8]) -> Result<Vec<RgbaImage>> {
        let decoder = GifDecoder::new(Cursor::new(data))?;
        decoder
            .into_frames()
            .enumerate()
            .map(|(index, frame)| {
                frame.map(|f| f.into_buffer()).map_err(|e| Error::Render {
                    page: index,
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

impl Rasterizer for ImageRasterizer {
    fn name(&self) -> &str {
        "image"
    }

    fn detect(&self, data: &[u8]) -> Result<InputFormat> {
        let format = detect_format_from_bytes(data)?;
        if !format.is_image() {
            return Err(Error::UnsupportedInput(format!(
                "{} input needs a document rasterizer",
                format
            )));
        }
        Ok(format)
    }

    fn page_count(&self, data: &[u8]) -> Result<usize> {
        match self.detect(data)? {
            InputFormat::Gif => Ok(Self::gif_frames(data)?.len()),
            _ => Ok(1),
        }
    }

    fn render_page(&self, data: &[u8], index: usize) -> Result<RgbaImage> {
        let format = self.detect(data)?;

        if format == InputFormat::Gif {
            let decoder = GifDecoder::new(Cursor::new(data))?;
            let frame = decoder
                .into_frames()
                .nth(index)
                .ok_or_else(|| Error::Render {
                    page: index,
                    message: "frame not present".to_string(),
                })??;
            return Ok(frame.into_buffer());
        }

        if index != 0 {
            return Err(Error::PageNotFound(index, 1));
        }

        let image_format = match format {
            InputFormat::Png => ImageFormat::Png,
            _ => ImageFormat::Jpeg,
        };
        let decoded = image::load_from_memory_with_format(data, image_format)?;
        Ok(decoded.to_rgba8())
    }

    fn render_all(&self, data: &[u8]) -> Option<Result<Vec<RgbaImage>>> {
        match self.detect(data) {
            Ok(InputFormat::Gif) => Some(Self::gif_frames(data)),
            _ => None,
        }
    }
}
