//! User interface components for scanview.
//!
//! This module hosts the scanner overlay in an eframe window on top of a
//! camera frame.
//!
//! # Architecture
//!
//! The UI is split into focused submodules:
//! - [`state`]: Session result and detection event types
//! - [`settings`]: User preferences and persistence
//! - [`rendering`]: egui canvas for the overlay
//! - [`input`]: egui events to overlay pointer phases
//! - [`viewfinder`]: Main application logic
//!
//! # Usage
//!
//! ```ignore
//! use scanview_core::{ui, Config};
//!
//! let config = Config::load()?;
//! let (tx, rx) = std::sync::mpsc::channel();
//! // hand `tx` to the detection pipeline ...
//! if let Some(session) = ui::run_viewfinder(config, None, rx, |event| println!("{event:?}"))? {
//!     println!("last scan window: {:?}", session.roi);
//! }
//! ```

mod input;
mod rendering;
mod settings;
mod state;
mod viewfinder;

// Public API exports
pub use input::{PointerInput, PointerTracker};
pub use rendering::{EguiCanvas, draw_dashed_border, draw_shade_outside};
pub use settings::Settings;
pub use state::{DetectionEvent, SessionResult, ViewfinderEvent};
pub use viewfinder::Viewfinder;

use crate::config::Config;
use crate::error::Result;
use image::DynamicImage;
use std::sync::mpsc::Receiver;

/// Launches the viewfinder window and blocks until it is closed.
///
/// # Arguments
/// * `config` - Application configuration
/// * `frame` - Still frame shown behind the overlay; a plain background otherwise
/// * `detections` - Events from the detection pipeline
/// * `on_event` - Told about new viewfinder bounds and about the scan window
///   applied by every finished handle gesture
///
/// # Returns
/// - `Ok(Some(session))` - The handle was used; `session.roi` is the last window
/// - `Ok(None)` - The window was closed without touching the handle
/// - `Err(e)` - An error occurred launching or running the UI
pub fn run_viewfinder(
    config: Config,
    frame: Option<DynamicImage>,
    detections: Receiver<DetectionEvent>,
    on_event: impl FnMut(ViewfinderEvent) + 'static,
) -> Result<Option<SessionResult>> {
    viewfinder::run(config, frame, detections, on_event)
}
