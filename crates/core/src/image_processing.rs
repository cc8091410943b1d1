//! Image loading, compositing and ROI coordinate mapping.
//!
//! The viewfinder shows frames at logical UI size while the frame itself
//! may have a different resolution. The ROI is always expressed in UI
//! coordinates; [`ImageProcessor::map_roi`] turns it into frame pixels for
//! the scan pipeline.

use crate::error::{AppError, Result};
use crate::geometry::RoiRect;
use eframe::egui;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;

/// Image helpers for the viewfinder and snapshot workflows.
pub struct ImageProcessor;

/// A crop window in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageProcessor {
    /// Loads a still frame to show behind the overlay.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Resource`] if the file cannot be opened or decoded.
    pub fn load_frame(path: &Path) -> Result<DynamicImage> {
        image::open(path)
            .map_err(|e| AppError::resource(format!("frame {}: {}", path.display(), e)))
    }

    /// Converts an RGBA buffer into an egui texture image.
    pub fn to_color_image(image: &RgbaImage) -> egui::ColorImage {
        let size = [image.width() as usize, image.height() as usize];
        egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw())
    }

    /// Maps a UI-space ROI onto a frame of `frame_size` shown at `ui_size`.
    ///
    /// An empty ROI means "no crop" and maps to the whole frame. The window
    /// is clamped to the frame; `None` is returned if nothing of it remains.
    pub fn map_roi(roi: RoiRect, ui_size: (f32, f32), frame_size: (u32, u32)) -> Option<PixelWindow> {
        let (frame_w, frame_h) = frame_size;
        if frame_w == 0 || frame_h == 0 {
            return None;
        }
        if roi.is_empty() {
            return Some(PixelWindow {
                x: 0,
                y: 0,
                width: frame_w,
                height: frame_h,
            });
        }
        if ui_size.0 <= 0.0 || ui_size.1 <= 0.0 {
            return None;
        }

        // Calculate scaling factors between UI and image coordinates
        let scale_x = frame_w as f32 / ui_size.0;
        let scale_y = frame_h as f32 / ui_size.1;

        let x = (roi.left as f32 * scale_x).max(0.0) as u32;
        let y = (roi.top as f32 * scale_y).max(0.0) as u32;
        let right = ((roi.right as f32 * scale_x).max(0.0) as u32).min(frame_w);
        let bottom = ((roi.bottom as f32 * scale_y).max(0.0) as u32).min(frame_h);

        if right <= x || bottom <= y {
            return None;
        }
        Some(PixelWindow {
            x,
            y,
            width: right - x,
            height: bottom - y,
        })
    }

    /// Draws the overlay on top of a frame scaled to the overlay size.
    ///
    /// Without a frame the overlay is composited onto opaque mid-grey so the
    /// shade is visible in the output.
    pub fn composite(frame: Option<&DynamicImage>, overlay: &RgbaImage) -> RgbaImage {
        let (w, h) = overlay.dimensions();
        let mut base = match frame {
            Some(frame) => imageops::resize(&frame.to_rgba8(), w, h, FilterType::Triangle),
            None => RgbaImage::from_pixel(w, h, image::Rgba([128, 128, 128, 255])),
        };
        imageops::overlay(&mut base, overlay, 0, 0);
        base
    }

    /// Writes an image as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ImageProcessing`] if encoding or writing fails.
    pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| AppError::image(format!("Failed to write {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roi_maps_to_whole_frame() {
        let window = ImageProcessor::map_roi(RoiRect::new(50, 50, 50, 90), (100.0, 100.0), (640, 480));
        assert_eq!(
            window,
            Some(PixelWindow {
                x: 0,
                y: 0,
                width: 640,
                height: 480
            })
        );
    }

    #[test]
    fn roi_scales_to_frame_resolution() {
        let window =
            ImageProcessor::map_roi(RoiRect::new(25, 10, 75, 40), (100.0, 50.0), (200, 100));
        assert_eq!(
            window,
            Some(PixelWindow {
                x: 50,
                y: 20,
                width: 100,
                height: 60
            })
        );
    }

    #[test]
    fn roi_is_clamped_to_frame() {
        let window = ImageProcessor::map_roi(RoiRect::new(-20, -20, 300, 300), (100.0, 100.0), (100, 100));
        assert_eq!(
            window,
            Some(PixelWindow {
                x: 0,
                y: 0,
                width: 100,
                height: 100
            })
        );
        assert_eq!(
            ImageProcessor::map_roi(RoiRect::new(200, 200, 300, 300), (100.0, 100.0), (100, 100)),
            None
        );
    }

    #[test]
    fn composite_blends_overlay_over_grey() {
        let mut overlay = RgbaImage::new(4, 4);
        overlay.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
        let out = ImageProcessor::composite(None, &overlay);
        assert_eq!(*out.get_pixel(0, 0), image::Rgba([0, 0, 0, 255]));
        assert_eq!(*out.get_pixel(3, 3), image::Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn color_image_keeps_dimensions() {
        let img = RgbaImage::new(7, 3);
        let color = ImageProcessor::to_color_image(&img);
        assert_eq!(color.size, [7, 3]);
    }
}
