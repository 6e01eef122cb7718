//! Capture pipeline: crops committed regions out of their page rasters.

use image::{imageops, RgbaImage};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::geometry::{scale_rect_to_native, PixelRect};
use crate::model::{Capture, CaptureId, PageRaster, Region};
use crate::raster::PageRegistry;

/// Largest capture, in pixels (1 GiB of RGBA).
pub const MAX_CAPTURE_PIXELS: u64 = 1 << 28;

/// Native-pixel rectangle a region maps to on its page.
pub fn native_rect(region: &Region, page: &PageRaster) -> PixelRect {
    scale_rect_to_native(region.rect(), page.scale_x(), page.scale_y()).to_pixels()
}

/// Crop a region out of its page at native resolution.
///
/// The output is exactly the rounded native rectangle in size. Pixels are
/// copied without resampling; any part of the rectangle that falls outside
/// the raster is left transparent. Fails with [`Error::RegionTooLarge`]
/// when the output would exceed [`MAX_CAPTURE_PIXELS`].
pub fn crop_region(region: &Region, page: &PageRaster) -> Result<(PixelRect, RgbaImage)> {
    let rect = native_rect(region, page);
    let pixels = page.pixels();

    if rect.fits_within(pixels.width(), pixels.height()) {
        let cropped =
            imageops::crop_imm(pixels, rect.x as u32, rect.y as u32, rect.width, rect.height)
                .to_image();
        return Ok((rect, cropped));
    }

    if rect.pixel_count() > MAX_CAPTURE_PIXELS {
        return Err(Error::RegionTooLarge {
            region: region.id,
            width: rect.width,
            height: rect.height,
        });
    }

    log::warn!(
        "Region {} extends past page {} raster ({}x{}); padding with transparency",
        region.id,
        page.number(),
        pixels.width(),
        pixels.height()
    );

    let mut out = RgbaImage::new(rect.width, rect.height);
    if let Some(clip) = rect.clip_to(pixels.width(), pixels.height()) {
        let part = imageops::crop_imm(pixels, clip.x as u32, clip.y as u32, clip.width, clip.height)
            .to_image();
        imageops::replace(&mut out, &part, clip.x - rect.x, clip.y - rect.y);
    }
    Ok((rect, out))
}

/// Ordered collection of captures.
///
/// New captures are appended; ids are never reused or renumbered.
#[derive(Debug, Clone)]
pub struct CaptureSet {
    captures: Vec<Capture>,
    next_id: u64,
    parallel: bool,
}

impl Default for CaptureSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSet {
    /// Create an empty capture set.
    pub fn new() -> Self {
        Self {
            captures: Vec::new(),
            next_id: 1,
            parallel: true,
        }
    }

    /// Crop regions one at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Capture every region, appending the results.
    ///
    /// Fails with [`Error::EmptySelection`] when `regions` is empty. A region
    /// whose page cannot be resolved is skipped. If any region cannot be
    /// cropped, nothing is appended. Returns the newly appended captures, in
    /// region order.
    pub fn capture_all(
        &mut self,
        regions: &[Region],
        registry: &PageRegistry,
    ) -> Result<&[Capture]> {
        if regions.is_empty() {
            return Err(Error::EmptySelection);
        }

        let crop = |region: &Region| -> Result<Option<(usize, PixelRect, RgbaImage)>> {
            match registry.page(region.page_index) {
                Some(page) => {
                    let (rect, image) = crop_region(region, page)?;
                    Ok(Some((page.index, rect, image)))
                }
                None => {
                    log::warn!(
                        "Skipping region {}: page {} not loaded",
                        region.id,
                        region.page_index + 1
                    );
                    Ok(None)
                }
            }
        };

        let crops = if self.parallel {
            regions.par_iter().map(crop).collect::<Result<Vec<_>>>()?
        } else {
            regions.iter().map(crop).collect::<Result<Vec<_>>>()?
        };

        let first_new = self.captures.len();
        for (region, cropped) in regions.iter().zip(crops) {
            let Some((page_index, rect, image)) = cropped else {
                continue;
            };
            let id = CaptureId(self.next_id);
            self.next_id += 1;
            self.captures
                .push(Capture::new(id, region.id, page_index, region.rect(), rect, image));
        }

        log::info!(
            "Captured {} of {} region(s)",
            self.captures.len() - first_new,
            regions.len()
        );
        Ok(&self.captures[first_new..])
    }

    /// Remove one capture. Returns false if the id was not present.
    pub fn remove(&mut self, id: CaptureId) -> bool {
        let before = self.captures.len();
        self.captures.retain(|c| c.id != id);
        self.captures.len() != before
    }

    /// Remove all captures.
    pub fn clear(&mut self) {
        self.captures.clear();
    }

    /// Look up a capture.
    pub fn get(&self, id: CaptureId) -> Option<&Capture> {
        self.captures.iter().find(|c| c.id == id)
    }

    /// All captures, in creation order.
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// Iterate over captures.
    pub fn iter(&self) -> std::slice::Iter<'_, Capture> {
        self.captures.iter()
    }

    /// Number of captures.
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// Check if there are no captures.
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::model::RegionId;
    use image::Rgba;

    /// A page whose pixel at (x, y) encodes its own coordinates.
    fn coordinate_page(index: usize, width: u32, height: u32, ratio: f64) -> PageRaster {
        let pixels = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, (x / 256) as u8, 255])
        });
        PageRaster::new(index, pixels, ratio)
    }

    fn region(id: u64, page_index: usize, rect: Rect) -> Region {
        Region {
            id: RegionId(id),
            page_index,
            start: Point::new(rect.x, rect.y),
            end: Point::new(rect.right(), rect.bottom()),
        }
    }

    #[test]
    fn test_native_rect_scales_by_page() {
        let page = coordinate_page(0, 2000, 2000, 5.0);
        let rect = native_rect(&region(1, 0, Rect::new(10.0, 10.0, 20.0, 20.0)), &page);
        assert_eq!(
            rect,
            PixelRect {
                x: 50,
                y: 50,
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn test_crop_is_pixel_exact() {
        let page = coordinate_page(0, 600, 400, 2.0);
        let (rect, image) =
            crop_region(&region(1, 0, Rect::new(10.0, 20.0, 30.0, 15.0)), &page).unwrap();

        assert_eq!(image.dimensions(), (60, 30));
        for (x, y, pixel) in image.enumerate_pixels() {
            let src = page.pixels().get_pixel(rect.x as u32 + x, rect.y as u32 + y);
            assert_eq!(pixel, src);
        }
    }

    #[test]
    fn test_crop_out_of_bounds_pads_transparent() {
        let page = coordinate_page(0, 100, 100, 1.0);
        let (rect, image) =
            crop_region(&region(1, 0, Rect::new(-10.0, 90.0, 30.0, 20.0)), &page).unwrap();

        assert_eq!(rect.x, -10);
        assert_eq!(image.dimensions(), (30, 20));
        // Outside the raster
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(15, 15)[3], 0);
        // Inside: source (5, 95) lands at (15, 5)
        assert_eq!(image.get_pixel(15, 5), page.pixels().get_pixel(5, 95));
    }

    #[test]
    fn test_crop_huge_region_rejected() {
        let page = coordinate_page(0, 100, 100, 2.0);
        let huge = region(4, 0, Rect::new(0.0, 0.0, 9_999_999_999.0, 9_999_999_999.0));
        assert!(matches!(
            crop_region(&huge, &page),
            Err(Error::RegionTooLarge {
                region: RegionId(4),
                width: u32::MAX,
                ..
            })
        ));
    }

    #[test]
    fn test_crop_far_off_page_is_bounded() {
        let page = coordinate_page(0, 100, 100, 1.0);
        let (rect, image) =
            crop_region(&region(1, 0, Rect::new(5000.0, 5000.0, 20.0, 20.0)), &page).unwrap();
        assert_eq!(rect.x, 5000);
        assert_eq!(image.dimensions(), (20, 20));
        assert!(image.pixels().all(|p| p[3] == 0));
    }

    // ==================== CaptureSet Tests ====================

    #[test]
    fn test_capture_all_empty_fails() {
        let mut set = CaptureSet::new();
        let registry = PageRegistry::from_pages(vec![coordinate_page(0, 10, 10, 1.0)]);
        assert!(matches!(
            set.capture_all(&[], &registry),
            Err(Error::EmptySelection)
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_capture_all_skips_missing_page_and_keeps_order() {
        let registry = PageRegistry::from_pages(vec![
            coordinate_page(0, 200, 200, 1.0),
            coordinate_page(1, 200, 200, 1.0),
        ]);
        let regions = vec![
            region(1, 1, Rect::new(0.0, 0.0, 20.0, 20.0)),
            region(2, 7, Rect::new(0.0, 0.0, 20.0, 20.0)),
            region(3, 0, Rect::new(5.0, 5.0, 40.0, 40.0)),
        ];

        let mut set = CaptureSet::new().sequential();
        let new = set.capture_all(&regions, &registry).unwrap();
        let sources: Vec<_> = new.iter().map(|c| (c.region_id.0, c.source_page_index)).collect();
        assert_eq!(sources, vec![(1, 1), (3, 0)]);
    }

    #[test]
    fn test_capture_all_is_all_or_nothing() {
        let registry = PageRegistry::from_pages(vec![coordinate_page(0, 200, 200, 1.0)]);
        let regions = vec![
            region(1, 0, Rect::new(0.0, 0.0, 20.0, 20.0)),
            region(2, 0, Rect::new(-1e12, -1e12, 2e12, 2e12)),
        ];

        let mut set = CaptureSet::new();
        assert!(matches!(
            set.capture_all(&regions, &registry),
            Err(Error::RegionTooLarge { .. })
        ));
        assert!(set.is_empty());

        // Ids are not consumed by a failed batch.
        set.capture_all(&regions[..1], &registry).unwrap();
        assert_eq!(set.captures()[0].id, CaptureId(1));
    }

    #[test]
    fn test_capture_all_appends() {
        let registry = PageRegistry::from_pages(vec![coordinate_page(0, 200, 200, 1.0)]);
        let regions = vec![region(1, 0, Rect::new(0.0, 0.0, 20.0, 20.0))];

        let mut set = CaptureSet::new();
        set.capture_all(&regions, &registry).unwrap();
        set.capture_all(&regions, &registry).unwrap();

        let ids: Vec<_> = set.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_remove_keeps_other_coords() {
        let registry = PageRegistry::from_pages(vec![coordinate_page(0, 300, 300, 1.0)]);
        let regions = vec![
            region(1, 0, Rect::new(0.0, 0.0, 20.0, 20.0)),
            region(2, 0, Rect::new(50.0, 60.0, 30.0, 40.0)),
            region(3, 0, Rect::new(100.0, 100.0, 25.0, 25.0)),
        ];
        let mut set = CaptureSet::new();
        set.capture_all(&regions, &registry).unwrap();
        let before: Vec<_> = set.iter().map(|c| (c.id, c.coords)).collect();

        assert!(set.remove(CaptureId(2)));
        assert!(!set.remove(CaptureId(2)));

        let after: Vec<_> = set.iter().map(|c| (c.id, c.coords)).collect();
        assert_eq!(after, vec![before[0], before[2]]);
    }
}
