//! Software canvas backed by an RGBA image buffer.
//!
//! Used for headless snapshots of the overlay. Clip-out is implemented per
//! pixel against the flattened outline, so this target always supports
//! [`ShadeStrategy::ClipOut`](crate::render::ShadeStrategy::ClipOut).

use crate::geometry::{Point, RoiRect, RoundedRectPath, polygon_contains};
use crate::render::{BorderStyle, Canvas, HandleGlyph, MarkStyle, Rgba};
use image::{Rgba as Pixel, RgbaImage};

const CLIP_SEGMENTS: usize = 12;

#[derive(Debug, Clone)]
struct ClipOut {
    bounds: (f32, f32, f32, f32),
    polygon: Vec<Point>,
}

impl ClipOut {
    fn excludes(&self, p: Point) -> bool {
        let (l, t, r, b) = self.bounds;
        p.x >= l && p.x <= r && p.y >= t && p.y <= b && polygon_contains(&self.polygon, p)
    }
}

pub struct RasterCanvas {
    image: RgbaImage,
    clip: Option<ClipOut>,
    saved: Vec<Option<ClipOut>>,
    mark_style: MarkStyle,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32, mark_style: MarkStyle) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            clip: None,
            saved: Vec::new(),
            mark_style,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.image.width() as i64 && y < self.image.height() as i64
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgba) {
        if !self.in_bounds(x, y) || color.a == 0 {
            return;
        }
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        *px = source_over(*px, color);
    }

    fn fill_span(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
        let (x0, x1) = (x0.min(x1).floor() as i64, x0.max(x1).ceil() as i64);
        let (y0, y1) = (y0.min(y1).floor() as i64, y0.max(y1).ceil() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }
}

/// Straight-alpha "source over" compositing.
fn source_over(dst: Pixel<u8>, src: Rgba) -> Pixel<u8> {
    let sa = src.a as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Pixel([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Pixel([
        channel(src.r, dst[0]),
        channel(src.g, dst[1]),
        channel(src.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

impl Canvas for RasterCanvas {
    fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Pixel([0, 0, 0, 0]);
        }
    }

    fn save(&mut self) {
        self.saved.push(self.clip.clone());
    }

    fn restore(&mut self) {
        self.clip = self.saved.pop().flatten();
    }

    fn clip_out_path(&mut self, path: &RoundedRectPath) {
        self.clip = Some(ClipOut {
            bounds: path.bounds(),
            polygon: path.flatten(CLIP_SEGMENTS),
        });
    }

    fn fill_color(&mut self, color: Rgba) {
        let fill = Pixel([color.r, color.g, color.b, color.a]);
        let (width, height) = self.image.dimensions();
        for y in 0..height {
            for x in 0..width {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if self.clip.as_ref().is_some_and(|c| c.excludes(center)) {
                    continue;
                }
                self.image.put_pixel(x, y, fill);
            }
        }
    }

    fn stroke_dashed_rect(&mut self, rect: RoiRect, style: &BorderStyle) {
        let half = style.width / 2.0;
        let period = (style.dash + style.gap).max(1.0);
        let (l, t, r, b) = (
            rect.left as f32,
            rect.top as f32,
            rect.right as f32,
            rect.bottom as f32,
        );

        let mut along = 0.0;
        while along < r - l {
            let end = (along + style.dash).min(r - l);
            self.fill_span(l + along, t - half, l + end, t + half, style.color);
            self.fill_span(l + along, b - half, l + end, b + half, style.color);
            along += period;
        }
        along = 0.0;
        while along < b - t {
            let end = (along + style.dash).min(b - t);
            self.fill_span(l - half, t + along, l + half, t + end, style.color);
            self.fill_span(r - half, t + along, r + half, t + end, style.color);
            along += period;
        }
    }

    fn draw_marks(&mut self, marks: &[Point]) {
        let MarkStyle { color, radius } = self.mark_style;
        let r2 = radius * radius;
        for mark in marks {
            let x0 = (mark.x - radius).floor() as i64;
            let x1 = (mark.x + radius).ceil() as i64;
            let y0 = (mark.y - radius).floor() as i64;
            let y1 = (mark.y + radius).ceil() as i64;
            for y in y0..y1 {
                for x in x0..x1 {
                    let dx = x as f32 + 0.5 - mark.x;
                    let dy = y as f32 + 0.5 - mark.y;
                    if dx * dx + dy * dy <= r2 {
                        self.blend(x, y, color);
                    }
                }
            }
        }
    }

    fn draw_handle(&mut self, glyph: &HandleGlyph, left: f32, top: f32) {
        let ox = left.round() as i64;
        let oy = top.round() as i64;
        for (gx, gy, px) in glyph.image().enumerate_pixels() {
            let color = Rgba::new(px[0], px[1], px[2], px[3]);
            self.blend(ox + gx as i64, oy + gy as i64, color);
        }
    }
}
