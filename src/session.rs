//! Session: one loaded document with its view, selections and captures.
//!
//! The session ties the components together the way an interactive front end
//! drives them. Pointer handlers read zoom and current page from the view
//! state; failures of user-triggered operations are reported to the
//! notification center as well as returned.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::capture::CaptureSet;
use crate::error::{Error, ExtractionError, Result};
use crate::export;
use crate::extract::{Extraction, ExtractionGateway, TableRecognizer};
use crate::geometry::Point;
use crate::model::{Capture, CaptureId, RegionId, RegionSpec};
use crate::navigation::{click_percent, compute_scroll_target, ScrollTarget};
use crate::notification::{NotificationCenter, Operation};
use crate::raster::{PageRegistry, RasterOptions, Rasterizer};
use crate::selection::{SelectionEngine, MIN_REGION_SIZE};
use crate::view::ViewState;

/// Options for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Zoom at start-up
    pub initial_zoom: f64,

    /// Minimum region side, in document units (exclusive)
    pub min_region_size: f64,

    /// Rasterization options used by [`Session::load`]
    pub raster: RasterOptions,

    /// Drop notifications older than this when pruned
    pub notification_lifetime: Option<chrono::Duration>,
}

impl SessionOptions {
    /// Create new session options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start-up zoom.
    pub fn with_initial_zoom(mut self, zoom: f64) -> Self {
        self.initial_zoom = zoom;
        self
    }

    /// Set the minimum region size.
    pub fn with_min_region_size(mut self, size: f64) -> Self {
        self.min_region_size = size;
        self
    }

    /// Set the rasterization options.
    pub fn with_raster(mut self, raster: RasterOptions) -> Self {
        self.raster = raster;
        self
    }

    /// Expire notifications after `lifetime`.
    pub fn with_notification_lifetime(mut self, lifetime: chrono::Duration) -> Self {
        self.notification_lifetime = Some(lifetime);
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            initial_zoom: ViewState::DEFAULT_ZOOM,
            min_region_size: MIN_REGION_SIZE,
            raster: RasterOptions::default(),
            notification_lifetime: None,
        }
    }
}

/// A document session.
#[derive(Debug, Clone)]
pub struct Session {
    options: SessionOptions,
    view: ViewState,
    pages: PageRegistry,
    selection: SelectionEngine,
    captures: CaptureSet,
    notifications: NotificationCenter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session with default options.
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    /// Create an empty session.
    pub fn with_options(options: SessionOptions) -> Self {
        let captures = if options.raster.parallel {
            CaptureSet::new()
        } else {
            CaptureSet::new().sequential()
        };
        let notifications = match options.notification_lifetime {
            Some(lifetime) => NotificationCenter::with_lifetime(lifetime),
            None => NotificationCenter::new(),
        };

        Self {
            view: ViewState::with_zoom(options.initial_zoom),
            selection: SelectionEngine::with_min_size(options.min_region_size),
            pages: PageRegistry::new(),
            captures,
            notifications,
            options,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Mutable view state for zoom and page controls.
    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn captures(&self) -> &CaptureSet {
        &self.captures
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    // ==================== Document ====================

    /// Load a document, replacing the current one on success.
    ///
    /// On failure the current document, regions and captures are left as
    /// they were and a `Load` notification is raised. The session is borrowed
    /// for the whole load; use [`Session::begin_load`] to keep handling
    /// pointer events meanwhile.
    pub async fn load(&mut self, rasterizer: Arc<dyn Rasterizer>, data: Vec<u8>) -> Result<usize> {
        let result = self.begin_load(rasterizer, data).await;
        self.finish_load(result)
    }

    /// Start rasterizing a document with this session's raster options.
    ///
    /// The returned future does not borrow the session. Hand its output to
    /// [`Session::finish_load`].
    pub fn begin_load(
        &self,
        rasterizer: Arc<dyn Rasterizer>,
        data: Vec<u8>,
    ) -> impl Future<Output = Result<PageRegistry>> + Send + 'static {
        PageRegistry::load(rasterizer, data, self.options.raster.clone())
    }

    /// Install the outcome of [`Session::begin_load`].
    ///
    /// Returns the page count, or raises a `Load` notification and leaves the
    /// current document in place.
    pub fn finish_load(&mut self, result: Result<PageRegistry>) -> Result<usize> {
        match result {
            Ok(registry) => {
                let count = registry.page_count();
                self.install_pages(registry);
                Ok(count)
            }
            Err(e) => {
                log::error!("Document load failed: {}", e);
                self.notifications.error(Operation::Load, e.to_string());
                Err(e)
            }
        }
    }

    /// Install a freshly loaded document.
    ///
    /// Regions, captures and any in-progress selection belong to the old
    /// document and are dropped along with its rasters.
    pub fn install_pages(&mut self, registry: PageRegistry) {
        self.selection.cancel_drag();
        self.selection.clear_all();
        self.captures.clear();
        self.view.set_page_count(registry.page_count());
        log::info!("Installed document with {} page(s)", registry.page_count());
        self.pages = registry;
    }

    // ==================== Pointer ====================

    /// Start a selection on the current page.
    ///
    /// `origin` is the screen position of the page's top-left corner.
    pub fn pointer_down(&mut self, pointer: Point, origin: Point) -> Result<()> {
        let page_index = self.view.current_page();
        if self.pages.page(page_index).is_none() {
            return Err(Error::PageNotFound(page_index, self.pages.page_count()));
        }
        self.selection
            .begin_drag(pointer, origin, self.view.zoom(), page_index)
    }

    /// Track the pointer. Ignored when no selection is in progress.
    pub fn pointer_move(&mut self, pointer: Point, origin: Point) -> Result<()> {
        if !self.selection.is_dragging() {
            return Ok(());
        }
        self.selection
            .update_drag(pointer, origin, self.view.zoom())
    }

    /// Finish the selection. Returns the committed region, if any.
    pub fn pointer_up(&mut self) -> Result<Option<RegionId>> {
        if !self.selection.is_dragging() {
            return Ok(None);
        }
        self.selection.end_drag()
    }

    /// The pointer left the page surface.
    pub fn pointer_leave(&mut self) {
        self.selection.cancel_drag();
    }

    /// Replay a region spec as a drag gesture at the current zoom.
    ///
    /// Moves to the spec's page first. The minimum-size policy applies, so
    /// `Ok(None)` means the region was too small to commit.
    pub fn select_spec(&mut self, spec: &RegionSpec) -> Result<Option<RegionId>> {
        if self.pages.page(spec.page_index).is_none() {
            return Err(Error::PageNotFound(spec.page_index, self.pages.page_count()));
        }
        self.view.go_to_page(spec.page_index);

        let zoom = self.view.zoom();
        let origin = Point::origin();
        let rect = spec.rect;
        self.pointer_down(Point::new(rect.x * zoom, rect.y * zoom), origin)?;
        self.pointer_move(Point::new(rect.right() * zoom, rect.bottom() * zoom), origin)?;
        self.pointer_up()
    }

    pub fn remove_region(&mut self, id: RegionId) -> bool {
        self.selection.remove(id)
    }

    pub fn clear_regions(&mut self) {
        self.selection.clear_all();
    }

    // ==================== Capture ====================

    /// Capture every committed region.
    ///
    /// Raises a `Capture` notification on failure, including when there is
    /// nothing to capture.
    pub fn capture_selections(&mut self) -> Result<&[Capture]> {
        let regions = self.selection.regions();
        let result = if regions.is_empty() {
            Err(Error::EmptySelection)
        } else {
            self.captures.capture_all(regions, &self.pages)
        };

        if let Err(e) = &result {
            log::warn!("Capture failed: {}", e);
            self.notifications.error(Operation::Capture, e.to_string());
        }
        result
    }

    /// Remove a capture and drop its extraction job record.
    pub fn remove_capture<R: TableRecognizer>(
        &mut self,
        id: CaptureId,
        gateway: &ExtractionGateway<R>,
    ) -> bool {
        if !self.captures.remove(id) {
            return false;
        }
        gateway.forget(id);
        true
    }

    /// Remove every capture and every extraction job record.
    pub fn clear_captures<R: TableRecognizer>(&mut self, gateway: &ExtractionGateway<R>) {
        self.captures.clear();
        gateway.reset();
    }

    /// Record the outcome of an extraction job.
    ///
    /// Failures raise a notification naming the capture.
    pub fn report_extraction(
        &mut self,
        capture_id: CaptureId,
        result: &std::result::Result<Extraction, ExtractionError>,
    ) {
        match result {
            Ok(extraction) => {
                self.notifications.info(
                    Operation::Extract(capture_id),
                    format!("Extracted {} table(s)", extraction.tables.len()),
                );
            }
            Err(e) => {
                self.notifications
                    .error(Operation::Extract(capture_id), e.to_string());
            }
        }
    }

    // ==================== Export ====================

    /// Write every capture to `dir` as `capture_<n>.png`.
    ///
    /// Raises an `Export` notification on failure.
    pub fn export_captures(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        let result = export::export_captures(self.captures.captures(), dir);
        self.report_export(result)
    }

    /// Write every page raster to `dir` as `page_<n>.png`.
    ///
    /// Raises an `Export` notification on failure.
    pub fn export_pages(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        let result = export::export_pages(&self.pages, dir);
        self.report_export(result)
    }

    fn report_export(&mut self, result: Result<Vec<PathBuf>>) -> Result<Vec<PathBuf>> {
        if let Err(e) = &result {
            log::error!("Export failed: {}", e);
            self.notifications.error(Operation::Export, e.to_string());
        }
        result
    }

    // ==================== Navigation ====================

    /// Scroll target for a click on the overview of the current page.
    ///
    /// Returns `None` when no document is loaded.
    pub fn map_click(
        &self,
        click: Point,
        map_width: f64,
        map_height: f64,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Option<ScrollTarget> {
        let page = self.pages.page(self.view.current_page())?;
        let (px, py) = click_percent(click.x, click.y, map_width, map_height);
        Some(compute_scroll_target(
            px,
            py,
            page.display_width,
            page.display_height,
            self.view.zoom(),
            viewport_width,
            viewport_height,
        ))
    }
}
