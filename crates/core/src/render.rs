//! Frame composition for the scanner overlay.
//!
//! [`render_frame`] paints one frame onto any [`Canvas`]: the shade outside
//! the rounded ROI (or a dashed outline on targets without clip-out
//! support), the live detection marks and the resize handle.

use crate::error::{AppError, Result};
use crate::geometry::{Point, RoiRect, RoundedRectPath, rounded_rect_path};
use crate::roi::{Metrics, RoiState};
use image::{Rgba as Pixel, RgbaImage};
use std::path::Path;

/// Straight (non-premultiplied) RGBA colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Black at the given alpha, as used for the shade.
    pub const fn black_alpha(a: u8) -> Self {
        Self::new(0, 0, 0, a)
    }
}

/// How the area outside the ROI is rendered.
///
/// Picked once when the view is built, from what the target canvas can do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShadeStrategy {
    /// Clip out the rounded ROI and fill everything else with the shade.
    #[default]
    ClipOut,
    /// No reliable clip-out: outline the ROI with a dashed border, no shade.
    OutlineOnly,
}

/// Paint used for the dashed ROI outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderStyle {
    pub color: Rgba,
    pub width: f32,
    pub dash: f32,
    pub gap: f32,
}

impl BorderStyle {
    pub fn dashed(density: f32) -> Self {
        Self {
            color: Rgba::new(255, 255, 255, 200),
            width: 2.0 * density,
            dash: 8.0 * density,
            gap: 6.0 * density,
        }
    }
}

/// Appearance of detection marks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkStyle {
    pub color: Rgba,
    pub radius: f32,
}

impl MarkStyle {
    pub fn for_density(density: f32) -> Self {
        Self {
            color: Rgba::new(255, 200, 0, 220),
            radius: 4.0 * density,
        }
    }
}

/// Bitmap of the resize handle.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleGlyph {
    image: RgbaImage,
}

impl HandleGlyph {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Loads the glyph from an image file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Resource`] if the file cannot be opened or decoded.
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|e| AppError::resource(format!("handle glyph {}: {}", path.display(), e)))?
            .to_rgba8();
        Ok(Self::from_image(image))
    }

    /// Built-in crop-corner handle.
    ///
    /// Two white arms meet at the glyph center and run along the outside of
    /// the ROI's bottom and right edges, since the handle sits on that corner.
    pub fn default_for_density(density: f32) -> Self {
        let size = (32.0 * density).round().max(4.0) as u32;
        let c = (size / 2) as f32;
        let arm = (3.0 * density).round().max(1.0);
        let image = RgbaImage::from_fn(size, size, |x, y| {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let vertical = px >= c && px < c + arm && py < c + arm;
            let horizontal = py >= c && py < c + arm && px < c + arm;
            if vertical || horizontal {
                Pixel([255, 255, 255, 255])
            } else {
                Pixel([0, 0, 0, 0])
            }
        });
        Self::from_image(image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Drawing surface the overlay paints onto.
///
/// `save`/`restore` bracket a clip; `fill_color` replaces every pixel inside
/// the current clip with the given colour.
pub trait Canvas {
    /// Resets the whole surface to fully transparent.
    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    /// Excludes the interior of `path` from subsequent fills.
    fn clip_out_path(&mut self, path: &RoundedRectPath);
    fn fill_color(&mut self, color: Rgba);
    fn stroke_dashed_rect(&mut self, rect: RoiRect, style: &BorderStyle);
    fn draw_marks(&mut self, marks: &[Point]);
    /// Draws the handle with its top-left corner at `(left, top)`.
    fn draw_handle(&mut self, glyph: &HandleGlyph, left: f32, top: f32);
}

/// Everything one frame is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub roi: &'a RoiState,
    pub metrics: &'a Metrics,
    pub marks: Option<&'a [Point]>,
    pub glyph: &'a HandleGlyph,
    pub border: &'a BorderStyle,
    pub strategy: ShadeStrategy,
    pub show_handle: bool,
}

/// Paints one overlay frame.
pub fn render_frame<C: Canvas + ?Sized>(canvas: &mut C, scene: &Scene<'_>) {
    canvas.clear();

    let rect = scene.roi.rect();
    if !rect.is_empty() {
        match scene.strategy {
            ShadeStrategy::ClipOut => {
                let radius = scene.roi.corner_radius(scene.metrics);
                let path = rounded_rect_path(
                    rect.left as f32,
                    rect.top as f32,
                    rect.right as f32,
                    rect.bottom as f32,
                    radius,
                    radius,
                );
                canvas.save();
                canvas.clip_out_path(&path);
                canvas.fill_color(Rgba::black_alpha(scene.roi.shade_alpha(scene.metrics)));
                canvas.restore();
            }
            ShadeStrategy::OutlineOnly => canvas.stroke_dashed_rect(rect, scene.border),
        }
    }

    if let Some(marks) = scene.marks.filter(|m| !m.is_empty()) {
        canvas.draw_marks(marks);
    }

    if scene.show_handle {
        canvas.draw_handle(
            scene.glyph,
            scene.roi.handle_pos.x - scene.metrics.handle_half_width,
            scene.roi.handle_pos.y - scene.metrics.handle_half_height,
        );
    }
}
