//! scanview Core Library
//!
//! This library provides the interactive overlay for a barcode scanner
//! viewfinder: a shade outside an adjustable region of interest, a handle
//! to resize that region and short-lived highlights of detected codes.
//!
//! # Overview
//!
//! - **Geometry**: points, the integral ROI rectangle and rounded outlines via [`geometry`]
//! - **ROI State**: center, handle and everything derived from them via [`roi`]
//! - **Gestures**: grab, drag, snap and tap handling via [`gesture`]
//! - **Marks**: the debounced detection highlight via [`marks`]
//! - **Rendering**: the canvas abstraction and frame composition via [`render`] and [`raster`]
//! - **Widget**: everything wired together in [`DetectorView`]
//! - **User Interface**: an eframe viewfinder hosting the widget via [`ui`]
//!
//! # Quick Start
//!
//! ```ignore
//! use scanview_core::{DetectorView, HandleVisibility, PointerPhase, ViewOptions};
//!
//! let mut view = DetectorView::new(ViewOptions::new(1.0), HandleVisibility::new(true));
//! view.set_roi_listener(|roi| println!("scan window: {roi:?}"));
//! view.on_layout(0, 0, 1280, 720);
//! view.on_pointer_event(PointerPhase::Down, 960.0, 360.0);
//! view.on_pointer_event(PointerPhase::Up, 960.0, 360.0);
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod image_processing;
pub mod marks;
pub mod raster;
pub mod render;
pub mod roi;
pub mod ui;
pub mod view;

// Re-export primary types for convenience
pub use config::Config;
pub use error::{AppError, Result};
pub use geometry::{Point, RoiRect};
pub use gesture::PointerPhase;
pub use raster::RasterCanvas;
pub use render::{Canvas, HandleGlyph, ShadeStrategy};
pub use view::{DetectorView, HandleVisibility, ViewOptions};

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before loading [`Config`].
pub fn init() {
    let _ = dotenvy::dotenv();
}
