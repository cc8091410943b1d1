//! Simulated detection pipeline for the demo viewfinder.
//!
//! Runs on its own thread with a current-thread tokio runtime. It follows
//! the scan window published by the overlay and periodically reports a
//! wandering code quad inside it, pausing every few seconds so the marks
//! visibly fade out.

use scanview_core::ui::{DetectionEvent, ViewfinderEvent};
use scanview_core::{Point, RoiRect};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

const TICK: Duration = Duration::from_millis(250);
/// Ticks per half cycle: detecting for this many ticks, then idle for as many.
const BURST_TICKS: u64 = 8;
const CODE_SIZE: f32 = 40.0;

/// What the detector is told about the viewfinder.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanArea {
    /// Applied crop; empty means the whole viewfinder.
    pub roi: RoiRect,
    /// Current viewfinder bounds.
    pub viewfinder: RoiRect,
}

impl ScanArea {
    pub fn apply(&mut self, event: ViewfinderEvent) {
        match event {
            ViewfinderEvent::Resized(bounds) => self.viewfinder = bounds,
            ViewfinderEvent::RoiApplied(roi) => self.roi = roi,
        }
    }

    /// The region being scanned: the ROI, or the whole viewfinder when there is no crop.
    pub fn effective(&self) -> RoiRect {
        if self.roi.is_empty() {
            self.viewfinder
        } else {
            self.roi
        }
    }
}

/// Handle used by the overlay to publish its scan area.
pub type ScanWindow = watch::Sender<ScanArea>;

/// Starts the pipeline, scanning `viewfinder` until the overlay reports otherwise.
///
/// The thread exits once the UI drops either the event receiver or the
/// returned sender.
pub fn spawn(events: Sender<DetectionEvent>, viewfinder: RoiRect) -> ScanWindow {
    let (window_tx, window_rx) = watch::channel(ScanArea {
        roi: RoiRect::default(),
        viewfinder,
    });

    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build();

        match runtime {
            Ok(rt) => rt.block_on(run(events, window_rx)),
            Err(e) => {
                let _ = events.send(DetectionEvent::Error(format!(
                    "Failed to create async runtime: {}",
                    e
                )));
            }
        }
    });

    window_tx
}

async fn run(events: Sender<DetectionEvent>, mut window: watch::Receiver<ScanArea>) {
    let mut interval = tokio::time::interval(TICK);
    let mut tick: u64 = 0;
    info!("simulated detector started");

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            changed = window.changed() => {
                if changed.is_err() {
                    break;
                }
                debug!(area = ?*window.borrow(), "scan area updated");
                continue;
            }
        }

        tick += 1;
        if (tick / BURST_TICKS) % 2 == 1 {
            continue;
        }

        let area = window.borrow().effective();
        let quad = code_quad(area, tick);
        if events.send(DetectionEvent::Marks(quad)).is_err() {
            break;
        }
    }

    info!("simulated detector stopped");
}

/// Corners of a code drifting along an ellipse inside `area`.
pub fn code_quad(area: RoiRect, tick: u64) -> Vec<Point> {
    let c = area.center();
    let half = CODE_SIZE / 2.0;
    let rx = (area.width() as f32 / 2.0 - half).max(0.0) * 0.6;
    let ry = (area.height() as f32 / 2.0 - half).max(0.0) * 0.6;
    let t = tick as f32 * 0.3;
    let cx = c.x + rx * t.cos();
    let cy = c.y + ry * t.sin();
    vec![
        Point::new(cx - half, cy - half),
        Point::new(cx + half, cy - half),
        Point::new(cx + half, cy + half),
        Point::new(cx - half, cy + half),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roi_scans_whole_viewfinder() {
        let full = RoiRect::new(0, 0, 960, 540);
        let mut area = ScanArea {
            roi: RoiRect::default(),
            viewfinder: full,
        };
        area.apply(ViewfinderEvent::RoiApplied(RoiRect::new(480, 270, 480, 400)));
        assert_eq!(area.effective(), full);

        let roi = RoiRect::new(100, 100, 300, 200);
        area.apply(ViewfinderEvent::RoiApplied(roi));
        assert_eq!(area.effective(), roi);
    }

    #[test]
    fn resize_moves_full_frame_scan() {
        let mut area = ScanArea {
            roi: RoiRect::default(),
            viewfinder: RoiRect::new(0, 0, 960, 540),
        };
        let resized = RoiRect::new(0, 0, 1600, 900);
        area.apply(ViewfinderEvent::Resized(resized));
        assert_eq!(area.effective(), resized);

        for p in code_quad(area.effective(), 3) {
            assert!(p.x > 0.0 && p.x < 1600.0 && p.y > 0.0 && p.y < 900.0);
        }

        // An applied crop still wins over the viewfinder bounds
        let roi = RoiRect::new(10, 10, 200, 120);
        area.apply(ViewfinderEvent::RoiApplied(roi));
        area.apply(ViewfinderEvent::Resized(RoiRect::new(0, 0, 800, 600)));
        assert_eq!(area.effective(), roi);
    }

    #[test]
    fn code_quad_stays_inside_window() {
        let area = RoiRect::new(100, 100, 400, 300);
        for tick in 0..64 {
            for p in code_quad(area, tick) {
                assert!(p.x >= 100.0 && p.x <= 400.0, "x {} at tick {tick}", p.x);
                assert!(p.y >= 100.0 && p.y <= 300.0, "y {} at tick {tick}", p.y);
            }
        }
    }
}
