//! Selection engine: turns pointer gestures into committed regions.
//!
//! The engine is a two-state machine:
//!
//! ```text
//!            begin_drag                  end_drag / cancel_drag
//!   Idle ───────────────▶ Dragging ───────────────────────────▶ Idle
//!                          │    ▲
//!                          └────┘ update_drag
//! ```
//!
//! Pointer positions are converted to document space on entry, so stored
//! regions do not depend on the zoom in effect when they were drawn.

use crate::error::{Error, Result};
use crate::geometry::{document_to_display, screen_to_document, Point, Rect};
use crate::model::{InProgressSelection, Region, RegionId};

/// Regions must be strictly larger than this on both sides (document units).
pub const MIN_REGION_SIZE: f64 = 10.0;

/// State of the selection engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    /// No gesture in progress
    Idle,
    /// A rectangle is being drawn
    Dragging(InProgressSelection),
}

/// Owns the committed regions and the single in-progress selection.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    state: SelectionState,
    regions: Vec<Region>,
    next_id: u64,
    min_size: f64,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionEngine {
    /// Create an engine with the default minimum region size.
    pub fn new() -> Self {
        Self::with_min_size(MIN_REGION_SIZE)
    }

    /// Create an engine with a custom minimum region size.
    pub fn with_min_size(min_size: f64) -> Self {
        Self {
            state: SelectionState::Idle,
            regions: Vec::new(),
            next_id: 1,
            min_size,
        }
    }

    /// Current state.
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// True while a gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectionState::Dragging(_))
    }

    /// Start a gesture at `pointer` on `page_index`.
    ///
    /// Only valid from `Idle`.
    pub fn begin_drag(
        &mut self,
        pointer: Point,
        origin: Point,
        zoom: f64,
        page_index: usize,
    ) -> Result<()> {
        if self.is_dragging() {
            return Err(Error::InvalidTransition("begin_drag while dragging"));
        }

        let anchor = screen_to_document(pointer, origin, zoom);
        self.state = SelectionState::Dragging(InProgressSelection::anchored(page_index, anchor));
        Ok(())
    }

    /// Move the free corner of the in-progress rectangle.
    ///
    /// Only valid while `Dragging`.
    pub fn update_drag(&mut self, pointer: Point, origin: Point, zoom: f64) -> Result<()> {
        match &mut self.state {
            SelectionState::Dragging(selection) => {
                selection.end = screen_to_document(pointer, origin, zoom);
                Ok(())
            }
            SelectionState::Idle => Err(Error::InvalidTransition("update_drag while idle")),
        }
    }

    /// Finish the gesture.
    ///
    /// Commits a region if the normalized rectangle is larger than the
    /// minimum size on both sides and returns its id. The in-progress
    /// selection is discarded either way.
    pub fn end_drag(&mut self) -> Result<Option<RegionId>> {
        let selection = match std::mem::replace(&mut self.state, SelectionState::Idle) {
            SelectionState::Dragging(selection) => selection,
            SelectionState::Idle => return Err(Error::InvalidTransition("end_drag while idle")),
        };

        let rect = selection.rect();
        if !rect.exceeds(self.min_size) {
            log::debug!(
                "Discarding {:.1}x{:.1} selection below minimum size {}",
                rect.width,
                rect.height,
                self.min_size
            );
            return Ok(None);
        }

        let id = RegionId(self.next_id);
        self.next_id += 1;
        self.regions.push(Region {
            id,
            page_index: selection.page_index,
            start: selection.start,
            end: selection.end,
        });
        Ok(Some(id))
    }

    /// Abandon the gesture without committing anything.
    pub fn cancel_drag(&mut self) {
        self.state = SelectionState::Idle;
    }

    /// Remove one region. Returns false if the id was not present.
    pub fn remove(&mut self, id: RegionId) -> bool {
        let before = self.regions.len();
        self.regions.retain(|r| r.id != id);
        self.regions.len() != before
    }

    /// Remove all committed regions.
    pub fn clear_all(&mut self) {
        self.regions.clear();
    }

    /// All committed regions, in creation order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Look up a region.
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Committed regions on one page, in creation order.
    pub fn regions_for_page(&self, page_index: usize) -> impl Iterator<Item = &Region> + '_ {
        self.regions
            .iter()
            .filter(move |r| r.page_index == page_index)
    }

    /// 1-based position of a region among all committed regions.
    pub fn region_label(&self, id: RegionId) -> Option<usize> {
        self.regions.iter().position(|r| r.id == id).map(|i| i + 1)
    }

    /// The in-progress selection, if dragging.
    pub fn in_progress(&self) -> Option<&InProgressSelection> {
        match &self.state {
            SelectionState::Dragging(selection) => Some(selection),
            SelectionState::Idle => None,
        }
    }

    /// Normalized in-progress rectangle in document space.
    pub fn in_progress_rect(&self) -> Option<Rect> {
        self.in_progress().map(InProgressSelection::rect)
    }

    /// In-progress rectangle scaled for display.
    pub fn display_in_progress_rect(&self, zoom: f64) -> Option<Rect> {
        self.in_progress_rect()
            .map(|rect| document_to_display(rect, zoom))
    }

    /// Regions on a page as display-space rectangles.
    pub fn display_regions_for_page(&self, page_index: usize, zoom: f64) -> Vec<(RegionId, Rect)> {
        self.regions_for_page(page_index)
            .map(|r| (r.id, document_to_display(r.rect(), zoom)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(
        engine: &mut SelectionEngine,
        from: (f64, f64),
        to: (f64, f64),
        zoom: f64,
    ) -> Option<RegionId> {
        let origin = Point::origin();
        engine
            .begin_drag(Point::new(from.0, from.1), origin, zoom, 0)
            .unwrap();
        engine
            .update_drag(Point::new(to.0, to.1), origin, zoom)
            .unwrap();
        engine.end_drag().unwrap()
    }

    #[test]
    fn test_small_drag_discarded() {
        let mut engine = SelectionEngine::new();
        assert!(drag(&mut engine, (0.0, 0.0), (5.0, 5.0), 1.0).is_none());
        assert!(engine.regions().is_empty());
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let mut engine = SelectionEngine::new();
        assert!(drag(&mut engine, (0.0, 0.0), (10.0, 50.0), 1.0).is_none());
        assert!(drag(&mut engine, (0.0, 0.0), (50.0, 10.0), 1.0).is_none());
        assert!(drag(&mut engine, (0.0, 0.0), (10.5, 10.5), 1.0).is_some());
    }

    #[test]
    fn test_commit_region() {
        let mut engine = SelectionEngine::new();
        let id = drag(&mut engine, (0.0, 0.0), (50.0, 50.0), 1.0).unwrap();

        let region = engine.region(id).unwrap();
        assert_eq!(region.width(), 50.0);
        assert_eq!(region.height(), 50.0);
        assert_eq!(engine.region_label(id), Some(1));
    }

    #[test]
    fn test_min_size_is_zoom_independent() {
        // 30 screen px at zoom 3.0 is 10 document units: rejected.
        let mut engine = SelectionEngine::new();
        assert!(drag(&mut engine, (0.0, 0.0), (30.0, 30.0), 3.0).is_none());

        // 8 screen px at zoom 0.5 is 16 document units: committed.
        let id = drag(&mut engine, (0.0, 0.0), (8.0, 8.0), 0.5).unwrap();
        assert_eq!(engine.region(id).unwrap().rect(), Rect::new(0.0, 0.0, 16.0, 16.0));
    }

    #[test]
    fn test_reverse_drag_normalized() {
        let mut engine = SelectionEngine::new();
        let id = drag(&mut engine, (80.0, 90.0), (20.0, 30.0), 1.0).unwrap();
        assert_eq!(
            engine.region(id).unwrap().rect(),
            Rect::new(20.0, 30.0, 60.0, 60.0)
        );
    }

    // ==================== Transition Tests ====================

    #[test]
    fn test_invalid_transitions() {
        let mut engine = SelectionEngine::new();
        let origin = Point::origin();

        assert!(matches!(
            engine.update_drag(origin, origin, 1.0),
            Err(Error::InvalidTransition(_))
        ));
        assert!(matches!(engine.end_drag(), Err(Error::InvalidTransition(_))));

        engine.begin_drag(origin, origin, 1.0, 0).unwrap();
        assert!(matches!(
            engine.begin_drag(origin, origin, 1.0, 0),
            Err(Error::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_cancel_drag() {
        let mut engine = SelectionEngine::new();
        let origin = Point::origin();
        engine.begin_drag(origin, origin, 1.0, 0).unwrap();
        engine
            .update_drag(Point::new(100.0, 100.0), origin, 1.0)
            .unwrap();
        engine.cancel_drag();

        assert!(engine.in_progress_rect().is_none());
        assert!(engine.regions().is_empty());
    }

    #[test]
    fn test_in_progress_rect_display() {
        let mut engine = SelectionEngine::new();
        let origin = Point::new(10.0, 10.0);
        engine
            .begin_drag(Point::new(30.0, 30.0), origin, 2.0, 1)
            .unwrap();
        engine
            .update_drag(Point::new(10.0, 50.0), origin, 2.0)
            .unwrap();

        assert_eq!(engine.in_progress_rect(), Some(Rect::new(0.0, 10.0, 10.0, 10.0)));
        assert_eq!(
            engine.display_in_progress_rect(2.0),
            Some(Rect::new(0.0, 20.0, 20.0, 20.0))
        );
        assert_eq!(engine.in_progress().unwrap().page_index, 1);
    }

    // ==================== Collection Tests ====================

    #[test]
    fn test_remove_preserves_others() {
        let mut engine = SelectionEngine::new();
        let a = drag(&mut engine, (0.0, 0.0), (20.0, 20.0), 1.0).unwrap();
        let b = drag(&mut engine, (0.0, 0.0), (30.0, 30.0), 1.0).unwrap();
        let c = drag(&mut engine, (0.0, 0.0), (40.0, 40.0), 1.0).unwrap();

        assert!(engine.remove(b));
        assert!(!engine.remove(b));

        let ids: Vec<_> = engine.regions().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(engine.region_label(c), Some(2));
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut engine = SelectionEngine::new();
        let a = drag(&mut engine, (0.0, 0.0), (20.0, 20.0), 1.0).unwrap();
        engine.clear_all();
        let b = drag(&mut engine, (0.0, 0.0), (20.0, 20.0), 1.0).unwrap();
        assert_ne!(a, b);
        assert_eq!(engine.regions().len(), 1);
    }

    #[test]
    fn test_regions_for_page() {
        let mut engine = SelectionEngine::new();
        let origin = Point::origin();
        for page in [0, 1, 0] {
            engine.begin_drag(origin, origin, 1.0, page).unwrap();
            engine
                .update_drag(Point::new(20.0, 20.0), origin, 1.0)
                .unwrap();
            engine.end_drag().unwrap();
        }

        let on_first: Vec<_> = engine.regions_for_page(0).map(|r| r.id.0).collect();
        assert_eq!(on_first, vec![1, 3]);
        assert_eq!(engine.display_regions_for_page(1, 2.0)[0].1, Rect::new(0.0, 0.0, 40.0, 40.0));
    }
}
