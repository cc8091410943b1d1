//! Types exchanged between the viewfinder and the code hosting it.

use crate::geometry::{Point, RoiRect};
use eframe::egui;

/// Outcome of a viewfinder session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionResult {
    /// The last scan window applied by a handle gesture.
    pub roi: Option<RoiRect>,
    /// Viewfinder size when it was applied, for mapping onto frame pixels.
    pub screen_size: Option<egui::Vec2>,
}

/// Events sent from the detection pipeline to the UI thread.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectionEvent {
    /// Corner or finder points of a code that was just detected.
    Marks(Vec<Point>),
    /// The pipeline failed and will not send further marks.
    Error(String),
}

/// Notifications from the viewfinder to the code hosting it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewfinderEvent {
    /// The viewfinder was laid out with new bounds, in UI coordinates.
    Resized(RoiRect),
    /// A handle gesture finished and this is the new scan window.
    RoiApplied(RoiRect),
}
