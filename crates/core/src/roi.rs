//! Region-of-interest state and the values derived from it.
//!
//! Only the center and the handle position are stored. The crop rectangle,
//! shade alpha and corner radius are recomputed from them on demand so they
//! can never go stale.

use crate::geometry::{Point, RoiRect, round_half_even, round_half_up};

/// Distance from a center axis (in dp) below which that axis snaps to "no crop".
pub const DIST_TO_FULL_DP: f32 = 24.0;
/// Pointer travel (in dp) that turns a tap into a drag.
pub const MIN_MOVE_THRESHOLD_DP: f32 = 8.0;
/// Upper bound (in dp) for the ROI corner radius.
pub const CORNER_RADIUS_DP: f32 = 8.0;
/// Alpha of the shade once the ROI is at least `dist_to_full` wide on both axes.
pub const MAX_SHADE_ALPHA: u8 = 128;

/// Density-scaled thresholds and the handle hit box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub density: f32,
    pub dist_to_full: f32,
    pub min_move_threshold_sq: f32,
    pub corner_radius_cap: f32,
    pub handle_half_width: f32,
    pub handle_half_height: f32,
}

impl Metrics {
    /// Derives all thresholds from the display density and the handle glyph size.
    ///
    /// The hit box half extents use integer halves of the glyph size, the
    /// same way the glyph is centered on screen.
    pub fn new(density: f32, handle_width: u32, handle_height: u32) -> Self {
        let min_move_threshold = MIN_MOVE_THRESHOLD_DP * density;
        Self {
            density,
            dist_to_full: DIST_TO_FULL_DP * density,
            min_move_threshold_sq: min_move_threshold * min_move_threshold,
            corner_radius_cap: CORNER_RADIUS_DP * density,
            handle_half_width: (handle_width / 2) as f32,
            handle_half_height: (handle_height / 2) as f32,
        }
    }
}

/// Center of the widget and the position of the resize handle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoiState {
    pub center: Point,
    pub handle_pos: Point,
}

impl RoiState {
    /// Recomputes the center from the widget bounds and re-seeds the handle.
    ///
    /// Landscape bounds put the handle at three quarters of the right edge on
    /// the horizontal center line, portrait bounds at three quarters of the
    /// bottom edge on the vertical center line. Any user-chosen crop is
    /// discarded.
    pub fn layout(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        let width = right - left;
        let height = bottom - top;
        self.center = Point::new((left + width / 2) as f32, (top + height / 2) as f32);
        self.handle_pos = if width > height {
            Point::new(round_half_even(right as f32 * 0.75), self.center.y)
        } else {
            Point::new(self.center.x, round_half_even(bottom as f32 * 0.75))
        };
    }

    /// Absolute handle offsets from the center as `(dx, dy)`.
    pub fn offsets(&self) -> (f32, f32) {
        (
            (self.handle_pos.x - self.center.x).abs(),
            (self.handle_pos.y - self.center.y).abs(),
        )
    }

    /// Smaller of the two handle offsets.
    pub fn min_axis_distance(&self) -> f32 {
        let (dx, dy) = self.offsets();
        dx.min(dy)
    }

    /// The crop rectangle, mirrored around the center.
    ///
    /// Half extents are rounded before being applied on both sides so the
    /// rectangle stays exactly symmetric.
    pub fn rect(&self) -> RoiRect {
        let (dx, dy) = self.offsets();
        let cx = round_half_up(self.center.x);
        let cy = round_half_up(self.center.y);
        let half_w = round_half_up(dx);
        let half_h = round_half_up(dy);
        RoiRect::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }

    /// Shade alpha ramping from 0 at the center to [`MAX_SHADE_ALPHA`] at `dist_to_full`.
    pub fn shade_alpha(&self, metrics: &Metrics) -> u8 {
        if metrics.dist_to_full <= 0.0 {
            return MAX_SHADE_ALPHA;
        }
        let ratio = (self.min_axis_distance() / metrics.dist_to_full).min(1.0);
        (ratio * MAX_SHADE_ALPHA as f32) as u8
    }

    /// Corner radius for the cutout: half the smaller offset, capped.
    pub fn corner_radius(&self, metrics: &Metrics) -> f32 {
        (self.min_axis_distance() * 0.5).min(metrics.corner_radius_cap)
    }
}
