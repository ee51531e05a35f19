//! Overlay placement relative to a selection.
//!
//! Placement never fails. If the viewport is too narrow for the overlay and
//! its margins the result may overflow, but a position is always produced.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, OverlaySize, Viewport};

/// Default gap between the viewport edge and the overlay.
pub const DEFAULT_MIN_MARGIN_PX: f64 = 10.0;

/// Default gap between the selection and the overlay.
pub const DEFAULT_OFFSET_PX: f64 = 10.0;

/// Which side of the selection the overlay sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Above,
    Below,
}

/// Computed overlay position in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub side: Side,
}

/// Gaps used when placing the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementOptions {
    /// Gap between selection and overlay.
    pub offset_px: f64,
    /// Minimum distance from the viewport edges.
    pub min_margin_px: f64,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            offset_px: DEFAULT_OFFSET_PX,
            min_margin_px: DEFAULT_MIN_MARGIN_PX,
        }
    }
}

/// Place the overlay centred over the selection, or below it when there is
/// no room above.
///
/// Horizontally the overlay is clamped inside the viewport margins. When
/// those bounds cross (viewport narrower than overlay plus margins) the left
/// margin wins, so the overlay's start stays visible. Vertically there is no
/// clamp against the bottom edge: a Below placement may land past the fold
/// and the host's scrolling reveals it.
pub fn place_overlay(
    selection: BoundingBox,
    overlay: OverlaySize,
    viewport: Viewport,
    options: PlacementOptions,
) -> Placement {
    let margin = options.min_margin_px;

    let min_left = viewport.scroll_x + margin;
    let max_left = viewport.scroll_x + viewport.inner_width - overlay.width - margin;
    let left = (selection.center_x() - overlay.width / 2.0)
        .min(max_left)
        .max(min_left);

    let above = selection.top - overlay.height - options.offset_px;
    let placement = if above < viewport.scroll_y + margin {
        Placement {
            left,
            top: selection.bottom() + options.offset_px,
            side: Side::Below,
        }
    } else {
        Placement {
            left,
            top: above,
            side: Side::Above,
        }
    };

    tracing::trace!(
        target: "weaver::inline::position",
        left = placement.left,
        top = placement.top,
        side = ?placement.side,
        "placed overlay"
    );
    placement
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(0.0, 0.0, 800.0, 600.0)
    }

    fn toolbar() -> OverlaySize {
        OverlaySize::new(300.0, 36.0)
    }

    #[test]
    fn test_centred_above() {
        let bbox = BoundingBox::new(100.0, 300.0, 100.0, 20.0);
        let p = place_overlay(bbox, toolbar(), viewport(), PlacementOptions::default());
        assert_eq!(p.left, 200.0);
        assert_eq!(p.top, 54.0);
        assert_eq!(p.side, Side::Above);
    }

    #[test]
    fn test_clamps_to_right_edge() {
        let bbox = BoundingBox::new(100.0, 790.0, 5.0, 20.0);
        let p = place_overlay(bbox, toolbar(), viewport(), PlacementOptions::default());
        assert_eq!(p.left, 490.0);
    }

    #[test]
    fn test_clamps_to_left_edge() {
        let bbox = BoundingBox::new(100.0, 0.0, 10.0, 20.0);
        let p = place_overlay(bbox, toolbar(), viewport(), PlacementOptions::default());
        assert_eq!(p.left, 10.0);
    }

    #[test]
    fn test_switches_below_near_top() {
        let bbox = BoundingBox::new(5.0, 300.0, 50.0, 20.0);
        let p = place_overlay(bbox, toolbar(), viewport(), PlacementOptions::default());
        assert_eq!(p.side, Side::Below);
        assert_eq!(p.top, bbox.bottom() + 10.0);
    }

    #[test]
    fn test_scroll_offsets_apply() {
        let vp = Viewport::new(100.0, 1000.0, 800.0, 600.0);
        // Selection sits just under the scrolled top edge.
        let bbox = BoundingBox::new(1020.0, 100.0, 10.0, 20.0);
        let p = place_overlay(bbox, toolbar(), vp, PlacementOptions::default());
        assert_eq!(p.left, 110.0);
        assert_eq!(p.side, Side::Below);
        assert_eq!(p.top, 1050.0);
    }

    #[test]
    fn test_below_is_not_clamped_to_fold() {
        let bbox = BoundingBox::new(5.0, 300.0, 50.0, 2000.0);
        let p = place_overlay(bbox, toolbar(), viewport(), PlacementOptions::default());
        assert_eq!(p.side, Side::Below);
        assert_eq!(p.top, 2015.0);
    }

    #[test]
    fn test_narrow_viewport_degrades() {
        let vp = Viewport::new(0.0, 0.0, 200.0, 600.0);
        let bbox = BoundingBox::new(100.0, 150.0, 10.0, 20.0);
        let p = place_overlay(bbox, toolbar(), vp, PlacementOptions::default());
        assert_eq!(p.left, 10.0);
    }

    #[test]
    fn test_stays_inside_viewport() {
        let vp = viewport();
        for left in [0.0, 37.5, 250.0, 512.0, 799.0, 1200.0] {
            let bbox = BoundingBox::new(200.0, left, 12.0, 20.0);
            let p = place_overlay(bbox, toolbar(), vp, PlacementOptions::default());
            assert!(p.left >= vp.scroll_x);
            assert!(p.left + toolbar().width <= vp.scroll_x + vp.inner_width);
        }
    }
}
