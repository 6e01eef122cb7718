//! Ordered collection of page rasters for the loaded document.

use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;

use super::{RasterOptions, Rasterizer};
use crate::error::{Error, Result};
use crate::model::{PageInfo, PageRaster};

/// The rasterized pages of one document, in document order.
///
/// A registry is built in one piece by [`PageRegistry::load`]; it is never
/// partially populated. Dropping it releases the page rasters.
#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    pages: Vec<PageRaster>,
}

impl PageRegistry {
    /// Create an empty registry (no document loaded).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-rendered pages.
    ///
    /// Page indices are reassigned to match their position.
    pub fn from_pages(pages: Vec<PageRaster>) -> Self {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, mut page)| {
                page.index = index;
                page
            })
            .collect();
        Self { pages }
    }

    /// Rasterize a document off the calling task.
    ///
    /// The input type is checked before anything is rendered. If any page
    /// fails, the whole load fails and nothing is returned.
    pub async fn load(
        rasterizer: Arc<dyn Rasterizer>,
        data: Vec<u8>,
        options: RasterOptions,
    ) -> Result<Self> {
        rasterizer.detect(&data)?;

        tokio::task::spawn_blocking(move || {
            Self::load_blocking(rasterizer.as_ref(), &data, &options)
        })
        .await
        .map_err(|e| Error::Other(format!("Rasterizer task failed: {}", e)))?
    }

    /// Rasterize a document on the current thread.
    pub fn load_blocking(
        rasterizer: &dyn Rasterizer,
        data: &[u8],
        options: &RasterOptions,
    ) -> Result<Self> {
        let format = rasterizer.detect(data)?;

        let page_raster = |index: usize, pixels: RgbaImage| -> Result<PageRaster> {
            if pixels.width() == 0 || pixels.height() == 0 {
                return Err(render_failure(index, Error::Other("empty raster".into())));
            }
            log::debug!(
                "Rendered page {} at {}x{}",
                index + 1,
                pixels.width(),
                pixels.height()
            );
            Ok(PageRaster::new(index, pixels, options.display_ratio))
        };

        if let Some(rendered) = rasterizer.render_all(data) {
            let pages = rendered?
                .into_iter()
                .enumerate()
                .map(|(index, pixels)| page_raster(index, pixels))
                .collect::<Result<Vec<_>>>()?;
            if pages.is_empty() {
                return Err(Error::EmptyDocument);
            }
            log::info!(
                "Rendered {} page(s) of {} input with '{}' rasterizer",
                pages.len(),
                format,
                rasterizer.name()
            );
            return Ok(Self { pages });
        }

        let count = rasterizer.page_count(data)?;
        if count == 0 {
            return Err(Error::EmptyDocument);
        }

        log::info!(
            "Rendering {} page(s) of {} input with '{}' rasterizer",
            count,
            format,
            rasterizer.name()
        );

        let render = |index: usize| -> Result<PageRaster> {
            let pixels = rasterizer
                .render_page(data, index)
                .map_err(|e| render_failure(index, e))?;
            page_raster(index, pixels)
        };

        let pages = if options.parallel {
            (0..count)
                .into_par_iter()
                .map(render)
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..count).map(render).collect::<Result<Vec<_>>>()?
        };

        Ok(Self { pages })
    }

    /// Get a page by index (0-based).
    pub fn get(&self, index: usize) -> Result<&PageRaster> {
        self.pages
            .get(index)
            .ok_or(Error::PageNotFound(index, self.pages.len()))
    }

    /// Get a page by index, if present.
    pub fn page(&self, index: usize) -> Option<&PageRaster> {
        self.pages.get(index)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if no document is loaded.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All pages in document order.
    pub fn pages(&self) -> &[PageRaster] {
        &self.pages
    }

    /// Iterate over pages in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, PageRaster> {
        self.pages.iter()
    }

    /// Dimensions of every page.
    pub fn info(&self) -> Vec<PageInfo> {
        self.pages.iter().map(PageRaster::info).collect()
    }
}

fn render_failure(page: usize, err: Error) -> Error {
    match err {
        Error::Render { .. } => err,
        other => Error::Render {
            page,
            message: other.to_string(),
        },
    }
}
