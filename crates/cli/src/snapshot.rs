//! Headless rendering of the overlay into a PNG.

use crate::detector;
use anyhow::{Context, Result};
use image::DynamicImage;
use scanview_core::image_processing::ImageProcessor;
use scanview_core::render::MarkStyle;
use scanview_core::{
    Config, DetectorView, HandleVisibility, PointerPhase, RasterCanvas, RoiRect, ViewOptions,
};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Gesture replayed on the overlay before it is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    None,
    /// Press and release on the handle without moving.
    Tap,
    /// Grab the handle and release it at the given point.
    DragTo(f32, f32),
}

pub struct SnapshotRequest<'a> {
    pub width: u32,
    pub height: u32,
    pub show_handle: bool,
    pub gesture: Gesture,
    pub with_marks: bool,
    pub frame: Option<&'a DynamicImage>,
}

/// Lays out a fresh overlay, replays the gesture and renders it.
///
/// Returns the rendered overlay and the ROI it ended with.
pub fn render(config: &Config, request: &SnapshotRequest<'_>) -> Result<(image::RgbaImage, RoiRect)> {
    let options = ViewOptions::from_config(config).context("Failed to prepare overlay")?;
    let mut view = DetectorView::new(options, HandleVisibility::new(request.show_handle));
    view.on_layout(0, 0, request.width as i32, request.height as i32);

    let handle = view.roi_state().handle_pos;
    match request.gesture {
        Gesture::None => {}
        Gesture::Tap => {
            view.on_pointer_event(PointerPhase::Down, handle.x, handle.y);
            view.on_pointer_event(PointerPhase::Up, handle.x, handle.y);
        }
        Gesture::DragTo(x, y) => {
            view.on_pointer_event(PointerPhase::Down, handle.x, handle.y);
            view.on_pointer_event(PointerPhase::Move, x, y);
            view.on_pointer_event(PointerPhase::Up, x, y);
        }
    }

    let roi = view.roi();
    if request.with_marks {
        let area = detector::ScanArea {
            roi,
            viewfinder: RoiRect::new(0, 0, request.width as i32, request.height as i32),
        };
        view.show_marks(detector::code_quad(area.effective(), 0), Instant::now());
    }

    let mut canvas = RasterCanvas::new(
        request.width,
        request.height,
        MarkStyle::for_density(config.density),
    );
    view.draw(&mut canvas);
    Ok((canvas.into_image(), roi))
}

/// Renders the overlay, composites it over the frame and writes the PNG.
pub fn write(config: &Config, request: &SnapshotRequest<'_>, path: &Path) -> Result<RoiRect> {
    let (overlay, roi) = render(config, request)?;
    let image = ImageProcessor::composite(request.frame, &overlay);
    ImageProcessor::save_png(&image, path)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
    info!(path = %path.display(), ?roi, "snapshot written");
    Ok(roi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(gesture: Gesture) -> SnapshotRequest<'static> {
        SnapshotRequest {
            width: 200,
            height: 100,
            show_handle: true,
            gesture,
            with_marks: false,
            frame: None,
        }
    }

    #[test]
    fn untouched_overlay_scans_full_frame() {
        let config = Config::default();
        let (image, roi) = render(&config, &request(Gesture::None)).unwrap();
        assert_eq!(image.dimensions(), (200, 100));
        assert!(roi.is_empty());
        // No shade without a crop
        assert_eq!(image.get_pixel(5, 5)[3], 0);
    }

    #[test]
    fn tap_presets_crop_and_shades_outside() {
        let config = Config::default();
        let (image, roi) = render(&config, &request(Gesture::Tap)).unwrap();
        assert!(!roi.is_empty());
        assert_eq!(roi.center(), scanview_core::Point::new(100.0, 50.0));
        assert!(image.get_pixel(1, 1)[3] > 0);
        let c = roi.center();
        assert_eq!(image.get_pixel(c.x as u32, c.y as u32)[3], 0);
    }

    #[test]
    fn drag_to_center_collapses_roi() {
        let config = Config::default();
        let (_, roi) = render(&config, &request(Gesture::DragTo(100.0, 50.0))).unwrap();
        assert!(roi.is_empty());
    }

    #[test]
    fn write_produces_png() {
        let dir = std::env::temp_dir().join(format!("scanview-snap-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("overlay.png");
        let mut req = request(Gesture::Tap);
        req.with_marks = true;
        write(&Config::default(), &req, &path).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
