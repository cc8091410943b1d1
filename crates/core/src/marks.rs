//! Transient highlight of detected code positions.
//!
//! Each call to [`MarkHighlight::show`] replaces the marks and pushes the
//! expiry out to `now + delay`. The host loop polls with the current time;
//! there is never more than one pending expiry.

use crate::geometry::Point;
use std::time::{Duration, Instant};
use tracing::debug;

/// How long marks stay on screen after the last detection.
pub const DEFAULT_MARK_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct MarkHighlight {
    marks: Option<Vec<Point>>,
    deadline: Option<Instant>,
    delay: Duration,
}

impl Default for MarkHighlight {
    fn default() -> Self {
        Self::new(DEFAULT_MARK_TIMEOUT)
    }
}

impl MarkHighlight {
    pub fn new(delay: Duration) -> Self {
        Self {
            marks: None,
            deadline: None,
            delay,
        }
    }

    /// Replaces the current marks and restarts the expiry countdown.
    pub fn show(&mut self, points: Vec<Point>, now: Instant) {
        self.marks = Some(points);
        self.deadline = Some(now + self.delay);
    }

    /// Clears the marks once the deadline has passed.
    ///
    /// Returns `true` exactly when this call expired them.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.marks = None;
                debug!("detection marks expired");
                true
            }
            _ => false,
        }
    }

    /// Live marks, if any. An empty list is live but draws nothing.
    pub fn marks(&self) -> Option<&[Point]> {
        self.marks.as_deref()
    }

    /// When the pending expiry fires, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
