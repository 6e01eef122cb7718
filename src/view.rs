//! Zoom and current-page state shared by selection and navigation.

use serde::{Deserialize, Serialize};

/// Process-wide view state: zoom factor and current page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    zoom: f64,
    current_page: usize,
    page_count: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: Self::DEFAULT_ZOOM,
            current_page: 0,
            page_count: 0,
        }
    }
}

impl ViewState {
    /// Minimum zoom factor
    pub const MIN_ZOOM: f64 = 0.5;
    /// Maximum zoom factor
    pub const MAX_ZOOM: f64 = 3.0;
    /// Zoom change per step
    pub const ZOOM_STEP: f64 = 0.1;
    /// Zoom restored by [`reset_zoom`](ViewState::reset_zoom)
    pub const RESET_ZOOM: f64 = 1.0;
    /// Zoom at start-up
    pub const DEFAULT_ZOOM: f64 = 0.8;

    /// Create view state with the given initial zoom (clamped).
    pub fn with_zoom(zoom: f64) -> Self {
        Self {
            zoom: Self::clamp_zoom(zoom),
            ..Self::default()
        }
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current page index (0-based).
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Number of pages navigable.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Set zoom, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = Self::clamp_zoom(zoom);
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + Self::ZOOM_STEP);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - Self::ZOOM_STEP);
    }

    /// Reset zoom to exactly 1.0, regardless of the start-up zoom.
    pub fn reset_zoom(&mut self) {
        self.zoom = Self::RESET_ZOOM;
    }

    /// Update the page range after a document load and go to the first page.
    pub fn set_page_count(&mut self, page_count: usize) {
        self.page_count = page_count;
        self.current_page = 0;
    }

    /// Go to a page, clamped to the page range.
    pub fn go_to_page(&mut self, index: usize) {
        self.current_page = index.min(self.page_count.saturating_sub(1));
    }

    /// Go to the next page if there is one.
    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page + 1);
    }

    /// Go to the previous page if there is one.
    pub fn previous_page(&mut self) {
        self.go_to_page(self.current_page.saturating_sub(1));
    }

    /// Clamp zoom to range, handling NaN/Inf.
    pub fn clamp_zoom(zoom: f64) -> f64 {
        if !zoom.is_finite() {
            Self::RESET_ZOOM
        } else {
            zoom.clamp(Self::MIN_ZOOM, Self::MAX_ZOOM)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zoom() {
        let view = ViewState::default();
        assert_eq!(view.zoom(), 0.8);
        assert_eq!(view.current_page(), 0);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut view = ViewState::default();
        for _ in 0..50 {
            view.zoom_in();
        }
        assert_eq!(view.zoom(), ViewState::MAX_ZOOM);

        for _ in 0..50 {
            view.zoom_out();
        }
        assert_eq!(view.zoom(), ViewState::MIN_ZOOM);

        view.set_zoom(f64::NAN);
        assert_eq!(view.zoom(), 1.0);
    }

    #[test]
    fn test_reset_zoom_is_literal_one() {
        let mut view = ViewState::with_zoom(2.4);
        view.reset_zoom();
        assert_eq!(view.zoom(), 1.0);
    }

    #[test]
    fn test_page_navigation_clamped() {
        let mut view = ViewState::default();
        view.set_page_count(3);

        view.previous_page();
        assert_eq!(view.current_page(), 0);

        view.next_page();
        view.next_page();
        view.next_page();
        assert_eq!(view.current_page(), 2);

        view.go_to_page(99);
        assert_eq!(view.current_page(), 2);

        view.set_page_count(0);
        view.next_page();
        assert_eq!(view.current_page(), 0);
    }
}
