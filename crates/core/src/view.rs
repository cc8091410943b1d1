//! The scanner overlay widget.
//!
//! [`DetectorView`] owns the ROI, gesture and mark state for one viewfinder
//! and exposes the handful of entry points a host needs: layout, pointer
//! events, new detections, timer polling and drawing. It never blocks and
//! never schedules anything itself; redraw requests and the next timer
//! wakeup are read back by the host loop.

use crate::config::Config;
use crate::error::Result;
use crate::geometry::{Point, RoiRect};
use crate::gesture::{GestureController, PointerPhase};
use crate::marks::MarkHighlight;
use crate::render::{BorderStyle, Canvas, HandleGlyph, Scene, ShadeStrategy, render_frame};
use crate::roi::{Metrics, RoiState};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Shared "show crop handle" preference.
///
/// The view only reads it, on every pointer-down and every draw. Cloning
/// hands out another reference to the same flag.
#[derive(Debug, Clone, Default)]
pub struct HandleVisibility(Rc<Cell<bool>>);

impl HandleVisibility {
    pub fn new(visible: bool) -> Self {
        Self(Rc::new(Cell::new(visible)))
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, visible: bool) {
        self.0.set(visible);
    }
}

/// Construction parameters resolved by the host.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub density: f32,
    pub mark_timeout: Duration,
    pub strategy: ShadeStrategy,
    pub glyph: HandleGlyph,
    pub border: BorderStyle,
}

impl ViewOptions {
    pub fn new(density: f32) -> Self {
        Self {
            density,
            mark_timeout: crate::marks::DEFAULT_MARK_TIMEOUT,
            strategy: ShadeStrategy::default(),
            glyph: HandleGlyph::default_for_density(density),
            border: BorderStyle::dashed(density),
        }
    }

    /// Resolves options from the configuration, loading the handle glyph if one is set.
    ///
    /// # Errors
    /// Returns [`AppError::Resource`](crate::AppError::Resource) if the glyph cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let glyph = match &config.handle_glyph {
            Some(path) => HandleGlyph::load(path)?,
            None => HandleGlyph::default_for_density(config.density),
        };
        Ok(Self {
            density: config.density,
            mark_timeout: config.mark_timeout,
            strategy: config.shade_strategy,
            glyph,
            border: BorderStyle::dashed(config.density),
        })
    }
}

type RoiListener = Box<dyn FnMut(RoiRect)>;

pub struct DetectorView {
    roi: RoiState,
    metrics: Metrics,
    gestures: GestureController,
    marks: MarkHighlight,
    glyph: HandleGlyph,
    border: BorderStyle,
    strategy: ShadeStrategy,
    handle_visibility: HandleVisibility,
    roi_listener: Option<RoiListener>,
    redraw_requested: bool,
}

impl DetectorView {
    pub fn new(options: ViewOptions, handle_visibility: HandleVisibility) -> Self {
        let metrics = Metrics::new(
            options.density,
            options.glyph.width(),
            options.glyph.height(),
        );
        Self {
            roi: RoiState::default(),
            metrics,
            gestures: GestureController::new(),
            marks: MarkHighlight::new(options.mark_timeout),
            glyph: options.glyph,
            border: options.border,
            strategy: options.strategy,
            handle_visibility,
            roi_listener: None,
            redraw_requested: false,
        }
    }

    /// Registers the consumer notified once per finished handle gesture.
    pub fn set_roi_listener(&mut self, listener: impl FnMut(RoiRect) + 'static) {
        self.roi_listener = Some(Box::new(listener));
    }

    /// Current crop rectangle. Empty means "no crop".
    pub fn roi(&self) -> RoiRect {
        self.roi.rect()
    }

    pub fn roi_state(&self) -> &RoiState {
        &self.roi
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn glyph(&self) -> &HandleGlyph {
        &self.glyph
    }

    pub fn handle_visibility(&self) -> &HandleVisibility {
        &self.handle_visibility
    }

    /// Handles a layout pass with the widget bounds.
    pub fn on_layout(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        self.roi.layout(left, top, right, bottom);
        debug!(
            left,
            top,
            right,
            bottom,
            handle_x = self.roi.handle_pos.x,
            handle_y = self.roi.handle_pos.y,
            "overlay laid out"
        );
        self.redraw_requested = true;
    }

    /// Feeds a pointer event; returns whether the overlay consumed it.
    pub fn on_pointer_event(&mut self, phase: PointerPhase, x: f32, y: f32) -> bool {
        let show_handle = self.handle_visibility.get();
        let response = self.gestures.on_pointer_event(
            &mut self.roi,
            &self.metrics,
            show_handle,
            phase,
            x,
            y,
        );
        if response.redraw {
            self.redraw_requested = true;
        }
        if response.roi_changed {
            let rect = self.roi.rect();
            debug!(?rect, "region of interest changed");
            if let Some(listener) = self.roi_listener.as_mut() {
                listener(rect);
            }
        }
        response.consumed
    }

    /// Shows freshly detected code points until the highlight times out.
    pub fn show_marks(&mut self, points: Vec<Point>, now: Instant) {
        self.marks.show(points, now);
        self.redraw_requested = true;
    }

    /// Expires marks whose highlight time has passed.
    pub fn poll_timers(&mut self, now: Instant) {
        if self.marks.poll(now) {
            self.redraw_requested = true;
        }
    }

    /// When the host should call [`poll_timers`](Self::poll_timers) next.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.marks.deadline()
    }

    pub fn marks(&self) -> Option<&[Point]> {
        self.marks.marks()
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Paints the current state onto `canvas`.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let scene = Scene {
            roi: &self.roi,
            metrics: &self.metrics,
            marks: self.marks.marks(),
            glyph: &self.glyph,
            border: &self.border,
            strategy: self.strategy,
            show_handle: self.handle_visibility.get(),
        };
        render_frame(canvas, &scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::{Op, RecordingCanvas};
    use std::cell::RefCell;

    fn view(visible: bool) -> (DetectorView, Rc<RefCell<Vec<RoiRect>>>) {
        let mut view = DetectorView::new(ViewOptions::new(1.0), HandleVisibility::new(visible));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        view.set_roi_listener(move |rect| sink.borrow_mut().push(rect));
        view.on_layout(0, 50, 200, 150);
        view.take_redraw_request();
        (view, changes)
    }

    #[test]
    fn drag_to_center_collapses_roi_and_notifies_once() {
        let (mut view, changes) = view(true);
        assert_eq!(view.roi_state().handle_pos, Point::new(150.0, 100.0));

        assert!(view.on_pointer_event(PointerPhase::Down, 150.0, 100.0));
        assert!(view.on_pointer_event(PointerPhase::Move, 100.0, 100.0));
        assert!(!view.on_pointer_event(PointerPhase::Up, 100.0, 100.0));

        assert!(view.roi().is_empty());
        assert_eq!(view.roi(), RoiRect::new(100, 100, 100, 100));
        assert_eq!(*changes.borrow(), vec![RoiRect::new(100, 100, 100, 100)]);
        assert!(view.take_redraw_request());
    }

    #[test]
    fn tap_reports_default_window() {
        let (mut view, changes) = view(true);

        view.on_pointer_event(PointerPhase::Down, 150.0, 100.0);
        view.on_pointer_event(PointerPhase::Up, 150.0, 100.0);

        assert_eq!(view.roi_state().handle_pos, Point::new(175.0, 125.0));
        assert_eq!(*changes.borrow(), vec![RoiRect::new(25, 75, 175, 125)]);
    }

    #[test]
    fn hidden_handle_blocks_gestures_but_keeps_shade() {
        let (mut view, changes) = view(false);

        assert!(!view.on_pointer_event(PointerPhase::Down, 150.0, 100.0));
        assert!(!view.on_pointer_event(PointerPhase::Move, 170.0, 140.0));
        assert!(!view.on_pointer_event(PointerPhase::Up, 170.0, 140.0));
        assert!(changes.borrow().is_empty());

        // Visibility is polled, so flipping it back re-enables the handle.
        view.handle_visibility().set(true);
        view.on_pointer_event(PointerPhase::Down, 150.0, 100.0);
        view.on_pointer_event(PointerPhase::Move, 170.0, 140.0);
        view.on_pointer_event(PointerPhase::Up, 170.0, 140.0);
        view.handle_visibility().set(false);

        let mut canvas = RecordingCanvas::default();
        view.draw(&mut canvas);
        assert!(canvas.ops.contains(&Op::Fill(crate::render::Rgba::black_alpha(128))));
        assert!(!canvas.ops.iter().any(|op| matches!(op, Op::Handle(..))));
    }

    #[test]
    fn pointer_down_outside_hit_box_is_not_consumed() {
        let (mut view, changes) = view(true);
        let before = *view.roi_state();
        let x = 150.0 + view.metrics().handle_half_width + 5.0;

        assert!(!view.on_pointer_event(PointerPhase::Down, x, 100.0));
        assert!(!view.on_pointer_event(PointerPhase::Up, x, 100.0));

        assert_eq!(*view.roi_state(), before);
        assert!(changes.borrow().is_empty());
        assert!(!view.take_redraw_request());
    }

    #[test]
    fn marks_live_until_timeout_and_request_redraws() {
        let (mut view, _) = view(true);
        let t0 = Instant::now();

        view.show_marks(vec![Point::new(5.0, 5.0)], t0);
        assert!(view.take_redraw_request());
        assert_eq!(view.next_wakeup(), Some(t0 + Duration::from_millis(500)));

        view.show_marks(vec![Point::new(6.0, 6.0)], t0 + Duration::from_millis(400));
        view.poll_timers(t0 + Duration::from_millis(600));
        assert!(view.marks().is_some());

        view.poll_timers(t0 + Duration::from_millis(900));
        assert!(view.marks().is_none());
        assert!(view.take_redraw_request());
        assert_eq!(view.next_wakeup(), None);
    }

    #[test]
    fn options_follow_config() {
        let mut config = Config {
            density: 2.0,
            mark_timeout: Duration::from_millis(250),
            ..Config::default()
        };
        config.set_outline_only(true);
        let options = ViewOptions::from_config(&config).unwrap();
        assert_eq!(options.strategy, ShadeStrategy::OutlineOnly);
        assert_eq!(options.mark_timeout, Duration::from_millis(250));
        assert_eq!(options.glyph.width(), 64);

        let view = DetectorView::new(options, HandleVisibility::new(true));
        assert_eq!(view.metrics().dist_to_full, 48.0);
        assert_eq!(view.metrics().handle_half_width, 32.0);
    }

    #[test]
    fn missing_glyph_file_is_a_resource_error() {
        let config = Config {
            handle_glyph: Some("/nonexistent/scanview/handle.png".into()),
            ..Config::default()
        };
        assert!(matches!(
            ViewOptions::from_config(&config),
            Err(crate::AppError::Resource(_))
        ));
    }

    #[test]
    fn layout_reseeds_handle_and_requests_redraw() {
        let (mut view, _) = view(true);
        view.on_pointer_event(PointerPhase::Down, 150.0, 100.0);
        view.on_pointer_event(PointerPhase::Up, 150.0, 100.0);

        view.on_layout(0, 0, 100, 300);

        assert_eq!(view.roi_state().center, Point::new(50.0, 150.0));
        assert_eq!(view.roi_state().handle_pos, Point::new(50.0, 225.0));
        assert!(view.take_redraw_request());
    }
}
