//! Navigation map: jumping the viewport to a point picked on a page overview.

use serde::{Deserialize, Serialize};

/// Scroll offsets for the page viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollTarget {
    pub scroll_left: f64,
    pub scroll_top: f64,
}

/// Fraction of the overview a click landed at, per axis.
///
/// Returns `(0.0, 0.0)` for a zero-sized overview.
pub fn click_percent(click_x: f64, click_y: f64, map_width: f64, map_height: f64) -> (f64, f64) {
    let ratio = |click: f64, extent: f64| {
        if extent > 0.0 {
            click / extent
        } else {
            0.0
        }
    };
    (ratio(click_x, map_width), ratio(click_y, map_height))
}

/// Compute the scroll offsets that center the viewport on a picked point.
///
/// The point is `click_percent * page_dimension * zoom` in display space;
/// half the viewport is subtracted on each axis and the result is clamped
/// at 0.
pub fn compute_scroll_target(
    click_percent_x: f64,
    click_percent_y: f64,
    page_display_width: f64,
    page_display_height: f64,
    zoom: f64,
    viewport_width: f64,
    viewport_height: f64,
) -> ScrollTarget {
    let target_x = click_percent_x * (page_display_width * zoom);
    let target_y = click_percent_y * (page_display_height * zoom);

    ScrollTarget {
        scroll_left: (target_x - viewport_width / 2.0).max(0.0),
        scroll_top: (target_y - viewport_height / 2.0).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_on_click() {
        let target = compute_scroll_target(0.5, 0.5, 800.0, 1000.0, 2.0, 600.0, 400.0);
        assert_eq!(target.scroll_left, 800.0 - 300.0);
        assert_eq!(target.scroll_top, 1000.0 - 200.0);
    }

    #[test]
    fn test_top_left_clamped_to_zero() {
        let target = compute_scroll_target(0.01, 0.02, 800.0, 1000.0, 1.0, 600.0, 400.0);
        assert_eq!(target, ScrollTarget::default());
    }

    #[test]
    fn test_never_negative_across_inputs() {
        for px in [0.0, 0.1, 0.5, 1.0] {
            for zoom in [0.5, 1.0, 3.0] {
                let t = compute_scroll_target(px, px, 400.0, 600.0, zoom, 1920.0, 1080.0);
                assert!(t.scroll_left >= 0.0);
                assert!(t.scroll_top >= 0.0);
            }
        }
    }

    #[test]
    fn test_click_percent() {
        assert_eq!(click_percent(50.0, 30.0, 200.0, 120.0), (0.25, 0.25));
        assert_eq!(click_percent(5.0, 5.0, 0.0, 0.0), (0.0, 0.0));
    }
}
