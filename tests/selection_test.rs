//! Integration tests for coordinate conversion and the selection engine.

use pagecrop::geometry::{document_to_display, normalize_rect, screen_to_document};
use pagecrop::{Error, Point, Rect, RegionId, SelectionEngine, SelectionState, ViewState};

fn drag(
    engine: &mut SelectionEngine,
    from: Point,
    to: Point,
    origin: Point,
    zoom: f64,
) -> Option<RegionId> {
    engine.begin_drag(from, origin, zoom, 0).unwrap();
    engine.update_drag(to, origin, zoom).unwrap();
    engine.end_drag().unwrap()
}

#[test]
fn test_screen_document_round_trip() {
    let origin = Point::new(37.5, 112.0);
    let mut zoom = ViewState::MIN_ZOOM;

    while zoom <= ViewState::MAX_ZOOM {
        for (x, y) in [(0.0, 0.0), (37.5, 112.0), (512.25, 90.0), (-40.0, 1999.0)] {
            let doc = screen_to_document(Point::new(x, y), origin, zoom);
            let display = document_to_display(Rect::new(doc.x, doc.y, 0.0, 0.0), zoom);
            assert!((display.x - (x - origin.x)).abs() < 1e-9, "x at zoom {}", zoom);
            assert!((display.y - (y - origin.y)).abs() < 1e-9, "y at zoom {}", zoom);
        }
        zoom += ViewState::ZOOM_STEP;
    }
}

#[test]
fn test_normalize_rect_any_corner_order() {
    let a = Point::new(10.0, 40.0);
    let b = Point::new(30.0, 5.0);
    assert_eq!(normalize_rect(a, b), normalize_rect(b, a));
    assert_eq!(normalize_rect(a, b), Rect::new(10.0, 5.0, 20.0, 35.0));
}

#[test]
fn test_minimum_size_policy() {
    let mut engine = SelectionEngine::new();
    let origin = Point::origin();

    assert_eq!(
        drag(&mut engine, Point::new(0.0, 0.0), Point::new(5.0, 5.0), origin, 1.0),
        None
    );
    assert!(engine.regions().is_empty());

    let id = drag(&mut engine, Point::new(0.0, 0.0), Point::new(50.0, 50.0), origin, 1.0).unwrap();
    assert_eq!(engine.regions().len(), 1);
    let region = engine.region(id).unwrap();
    assert_eq!((region.width(), region.height()), (50.0, 50.0));
}

#[test]
fn test_regions_survive_zoom_changes() {
    let mut engine = SelectionEngine::new();
    let origin = Point::new(20.0, 20.0);

    // Drawn at zoom 2.0: 100 screen px is 50 document units.
    let from = Point::new(20.0, 20.0);
    let id = drag(&mut engine, from, Point::new(120.0, 120.0), origin, 2.0).unwrap();
    let stored = engine.region(id).unwrap().rect();
    assert_eq!(stored, Rect::new(0.0, 0.0, 50.0, 50.0));

    // Displaying at another zoom only scales.
    let shown = engine.display_regions_for_page(0, 0.5);
    assert_eq!(shown, vec![(id, Rect::new(0.0, 0.0, 25.0, 25.0))]);
    assert_eq!(engine.region(id).unwrap().rect(), stored);
}

#[test]
fn test_gesture_returns_to_idle_after_rejection() {
    let mut engine = SelectionEngine::new();
    let origin = Point::origin();
    drag(&mut engine, origin, Point::new(3.0, 300.0), origin, 1.0);

    assert_eq!(engine.state(), &SelectionState::Idle);
    assert!(engine.in_progress_rect().is_none());
    assert!(engine.begin_drag(origin, origin, 1.0, 0).is_ok());
}

#[test]
fn test_wrong_state_transitions_rejected() {
    let mut engine = SelectionEngine::new();
    let origin = Point::origin();

    assert!(matches!(engine.end_drag(), Err(Error::InvalidTransition(_))));
    engine.begin_drag(origin, origin, 1.0, 0).unwrap();
    assert!(matches!(
        engine.begin_drag(origin, origin, 1.0, 1),
        Err(Error::InvalidTransition(_))
    ));
    // The original gesture is untouched.
    assert_eq!(engine.in_progress().unwrap().page_index, 0);
}

#[test]
fn test_remove_and_clear() {
    let mut engine = SelectionEngine::new();
    let origin = Point::origin();
    let ids: Vec<_> = (1..=4)
        .map(|i| {
            let end = Point::new(20.0 * i as f64, 20.0 * i as f64);
            drag(&mut engine, origin, end, origin, 1.0).unwrap()
        })
        .collect();

    // Removing an absent id is a no-op.
    assert!(!engine.remove(RegionId(999)));
    assert!(engine.remove(ids[1]));

    let remaining: Vec<_> = engine.regions().iter().map(|r| r.id).collect();
    assert_eq!(remaining, vec![ids[0], ids[2], ids[3]]);

    engine.clear_all();
    assert!(engine.regions().is_empty());
}
