//! Pointer gesture handling for the ROI handle.
//!
//! The controller turns down/move/up/cancel events into handle grabs, drags,
//! snapping to the center axes and the "tap to open a default window"
//! shortcut. It mutates [`RoiState`] and reports what the host should do
//! next through [`GestureResponse`].

use crate::geometry::{Point, dist_sq};
use crate::roi::{Metrics, RoiState};
use tracing::debug;

/// Phase of a pointer event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// What a single pointer event asks of the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureResponse {
    /// The event was claimed by the handle and should not propagate.
    pub consumed: bool,
    /// The overlay needs to be painted again.
    pub redraw: bool,
    /// A gesture finished and the ROI consumer should re-read the rectangle.
    pub roi_changed: bool,
}

/// Per-gesture bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    pub handle_grabbed: bool,
    pub moved_handle: bool,
    pub touch_down: Point,
}

/// Drives [`GestureState`] from pointer events.
#[derive(Debug, Default)]
pub struct GestureController {
    state: GestureState,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Feeds one pointer event through the state machine.
    ///
    /// `show_handle` is the current value of the crop handle preference; when
    /// it is off, pointer-down never grabs the handle and so nothing else in
    /// the gesture does anything either.
    pub fn on_pointer_event(
        &mut self,
        roi: &mut RoiState,
        metrics: &Metrics,
        show_handle: bool,
        phase: PointerPhase,
        x: f32,
        y: f32,
    ) -> GestureResponse {
        match phase {
            PointerPhase::Down => self.pointer_down(roi, metrics, show_handle, x, y),
            PointerPhase::Move => self.pointer_move(roi, metrics, x, y),
            PointerPhase::Cancel => {
                let mut response = GestureResponse::default();
                if self.state.handle_grabbed {
                    response.redraw = self.snap(roi, metrics, x, y);
                    self.state.handle_grabbed = false;
                    debug!(x, y, "handle gesture cancelled");
                }
                response
            }
            PointerPhase::Up => self.pointer_up(roi, metrics, x, y),
        }
    }

    fn pointer_down(
        &mut self,
        roi: &RoiState,
        metrics: &Metrics,
        show_handle: bool,
        x: f32,
        y: f32,
    ) -> GestureResponse {
        if !show_handle {
            return GestureResponse::default();
        }
        let grabbed = (x - roi.handle_pos.x).abs() < metrics.handle_half_width
            && (y - roi.handle_pos.y).abs() < metrics.handle_half_height;
        self.state.handle_grabbed = grabbed;
        if grabbed {
            self.state.touch_down = Point::new(x, y);
            debug!(x, y, "handle grabbed");
        }
        GestureResponse {
            consumed: grabbed,
            ..GestureResponse::default()
        }
    }

    fn pointer_move(
        &mut self,
        roi: &mut RoiState,
        metrics: &Metrics,
        x: f32,
        y: f32,
    ) -> GestureResponse {
        if !self.state.handle_grabbed {
            return GestureResponse::default();
        }
        roi.handle_pos = Point::new(x, y);
        if dist_sq(roi.handle_pos, self.state.touch_down) > metrics.min_move_threshold_sq {
            self.state.moved_handle = true;
        }
        GestureResponse {
            consumed: true,
            redraw: true,
            roi_changed: false,
        }
    }

    fn pointer_up(
        &mut self,
        roi: &mut RoiState,
        metrics: &Metrics,
        x: f32,
        y: f32,
    ) -> GestureResponse {
        let mut response = GestureResponse::default();
        if !self.state.handle_grabbed {
            return response;
        }
        if self.state.moved_handle {
            response.redraw = self.snap(roi, metrics, x, y);
        } else {
            roi.handle_pos = Point::new(roi.center.x * 1.75, roi.center.y * 1.25);
            self.state.moved_handle = true;
            response.redraw = true;
            debug!(
                x = roi.handle_pos.x,
                y = roi.handle_pos.y,
                "tap on handle, opening default window"
            );
        }
        response.roi_changed = true;
        self.state.handle_grabbed = false;
        response
    }

    /// Collapses each axis whose coordinate ended within `dist_to_full` of the center.
    ///
    /// Returns whether the handle moved.
    pub fn snap(&mut self, roi: &mut RoiState, metrics: &Metrics, x: f32, y: f32) -> bool {
        let mut snapped = false;
        if (x - roi.center.x).abs() < metrics.dist_to_full {
            roi.handle_pos.x = roi.center.x;
            self.state.moved_handle = false;
            snapped = true;
        }
        if (y - roi.center.y).abs() < metrics.dist_to_full {
            roi.handle_pos.y = roi.center.y;
            self.state.moved_handle = false;
            snapped = true;
        }
        if snapped {
            debug!(x, y, "handle snapped to center axis");
        }
        snapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::RoiState;

    fn metrics() -> Metrics {
        Metrics::new(1.0, 48, 48)
    }

    fn landscape_roi() -> RoiState {
        let mut roi = RoiState::default();
        roi.layout(0, 50, 200, 150);
        roi
    }

    #[test]
    fn pointer_down_on_handle_grabs_it() {
        let m = metrics();
        let mut roi = landscape_roi();
        let mut gestures = GestureController::new();

        let response = gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Down, 160.0, 90.0);

        assert!(response.consumed);
        assert!(gestures.state().handle_grabbed);
        assert_eq!(gestures.state().touch_down, Point::new(160.0, 90.0));
    }

    #[test]
    fn pointer_down_outside_hit_box_mutates_nothing() {
        let m = metrics();
        let mut roi = landscape_roi();
        let before_roi = roi;
        let mut gestures = GestureController::new();
        let before = *gestures.state();

        let response = gestures.on_pointer_event(
            &mut roi,
            &m,
            true,
            PointerPhase::Down,
            150.0 + m.handle_half_width + 5.0,
            100.0,
        );

        assert_eq!(response, GestureResponse::default());
        assert_eq!(*gestures.state(), before);
        assert_eq!(roi, before_roi);
    }

    #[test]
    fn hidden_handle_never_grabs() {
        let m = metrics();
        let mut roi = landscape_roi();
        let mut gestures = GestureController::new();

        let down = gestures.on_pointer_event(&mut roi, &m, false, PointerPhase::Down, 150.0, 100.0);
        let moved = gestures.on_pointer_event(&mut roi, &m, false, PointerPhase::Move, 60.0, 60.0);

        assert!(!down.consumed);
        assert!(!moved.consumed);
        assert_eq!(roi.handle_pos, Point::new(150.0, 100.0));
    }

    #[test]
    fn move_without_grab_is_ignored() {
        let m = metrics();
        let mut roi = landscape_roi();
        let mut gestures = GestureController::new();

        let response = gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Move, 10.0, 10.0);

        assert!(!response.consumed);
        assert_eq!(roi.handle_pos, Point::new(150.0, 100.0));
    }

    #[test]
    fn drag_moves_handle_and_marks_it_moved_past_threshold() {
        let m = metrics();
        let mut roi = landscape_roi();
        let mut gestures = GestureController::new();

        gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Down, 150.0, 100.0);
        let small = gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Move, 155.0, 103.0);
        assert!(small.consumed && small.redraw);
        assert!(!gestures.state().moved_handle);
        assert_eq!(roi.handle_pos, Point::new(155.0, 103.0));

        gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Move, 170.0, 140.0);
        assert!(gestures.state().moved_handle);
    }

    #[test]
    fn tap_opens_default_window_wherever_it_lands() {
        let m = metrics();
        for (tx, ty) in [(150.0, 100.0), (130.0, 80.0), (171.0, 121.0)] {
            let mut roi = landscape_roi();
            let mut gestures = GestureController::new();

            gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Down, tx, ty);
            let up = gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Up, tx, ty);

            assert!(!up.consumed);
            assert!(up.roi_changed);
            assert!(up.redraw);
            assert_eq!(roi.handle_pos, Point::new(175.0, 125.0));
            assert!(gestures.state().moved_handle);
            assert!(!gestures.state().handle_grabbed);
        }
    }

    #[test]
    fn drag_to_center_collapses_both_axes() {
        let m = metrics();
        let mut roi = landscape_roi();
        let mut gestures = GestureController::new();

        gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Down, 150.0, 100.0);
        gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Move, 100.0, 100.0);
        let up = gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Up, 100.0, 100.0);

        assert!(up.roi_changed);
        assert!(!up.consumed);
        assert_eq!(roi.handle_pos, roi.center);
        assert!(roi.rect().is_empty());
        assert!(!gestures.state().moved_handle);
    }

    #[test]
    fn drag_ending_far_from_axes_keeps_position() {
        let m = metrics();
        let mut roi = landscape_roi();
        let mut gestures = GestureController::new();

        gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Down, 150.0, 100.0);
        gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Move, 180.0, 140.0);
        let up = gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Up, 180.0, 140.0);

        assert!(up.roi_changed);
        assert_eq!(roi.handle_pos, Point::new(180.0, 140.0));
        assert!(gestures.state().moved_handle);
    }

    #[test]
    fn snap_is_idempotent() {
        let m = metrics();
        let mut roi = landscape_roi();
        let mut gestures = GestureController::new();
        roi.handle_pos = Point::new(110.0, 170.0);

        gestures.snap(&mut roi, &m, 110.0, 170.0);
        let once = roi.handle_pos;
        gestures.snap(&mut roi, &m, 110.0, 170.0);

        assert_eq!(once, Point::new(100.0, 170.0));
        assert_eq!(roi.handle_pos, once);
    }

    #[test]
    fn cancel_snaps_but_never_consumes_or_notifies() {
        let m = metrics();
        let mut roi = landscape_roi();
        let mut gestures = GestureController::new();

        gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Down, 150.0, 100.0);
        gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Move, 160.0, 110.0);
        let cancel = gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Cancel, 160.0, 110.0);

        assert!(!cancel.consumed);
        assert!(!cancel.roi_changed);
        assert_eq!(roi.handle_pos, Point::new(160.0, 100.0));
        assert!(!gestures.state().handle_grabbed);
    }

    #[test]
    fn up_without_grab_does_nothing() {
        let m = metrics();
        let mut roi = landscape_roi();
        let mut gestures = GestureController::new();

        let up = gestures.on_pointer_event(&mut roi, &m, true, PointerPhase::Up, 150.0, 100.0);

        assert_eq!(up, GestureResponse::default());
        assert_eq!(roi.handle_pos, Point::new(150.0, 100.0));
    }
}
