//! egui-backed canvas for the overlay.
//!
//! egui has no "clip out" primitive, so the shade is painted as the four
//! bands around the ROI bounding box plus one triangle fan per rounded
//! corner. The result is the complement of the rounded ROI inside the
//! frame rectangle.

use crate::geometry::{Point, RoiRect, RoundedRectPath};
use crate::render::{BorderStyle, Canvas, HandleGlyph, MarkStyle, Rgba};
use eframe::egui;

const CORNER_SEGMENTS: usize = 8;

/// Converts an overlay colour to egui's premultiplied representation.
pub fn to_color32(color: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn pos(p: Point) -> egui::Pos2 {
    egui::pos2(p.x, p.y)
}

/// A [`Canvas`] that records egui shapes into a painter.
pub struct EguiCanvas<'a> {
    painter: &'a egui::Painter,
    frame_rect: egui::Rect,
    handle_texture: Option<&'a egui::TextureHandle>,
    mark_style: MarkStyle,
    clip: Option<RoundedRectPath>,
    saved: Vec<Option<RoundedRectPath>>,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(
        painter: &'a egui::Painter,
        frame_rect: egui::Rect,
        handle_texture: Option<&'a egui::TextureHandle>,
        mark_style: MarkStyle,
    ) -> Self {
        Self {
            painter,
            frame_rect,
            handle_texture,
            mark_style,
            clip: None,
            saved: Vec::new(),
        }
    }
}

/// Draws `color` over `screen_rect` everywhere except inside `cutout`.
pub fn draw_shade_outside(
    painter: &egui::Painter,
    screen_rect: egui::Rect,
    cutout: &RoundedRectPath,
    color: egui::Color32,
) {
    let (l, t, r, b) = cutout.bounds();
    let hole = egui::Rect::from_min_max(egui::pos2(l, t), egui::pos2(r, b)).intersect(screen_rect);
    if !hole.is_positive() {
        painter.rect_filled(screen_rect, 0.0, color);
        return;
    }

    // Top region (above hole)
    painter.rect_filled(
        egui::Rect::from_min_max(screen_rect.min, egui::pos2(screen_rect.max.x, hole.min.y)),
        0.0,
        color,
    );

    // Bottom region (below hole)
    painter.rect_filled(
        egui::Rect::from_min_max(egui::pos2(screen_rect.min.x, hole.max.y), screen_rect.max),
        0.0,
        color,
    );

    // Left region (left of hole, between top and bottom)
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(screen_rect.min.x, hole.min.y),
            egui::pos2(hole.min.x, hole.max.y),
        ),
        0.0,
        color,
    );

    // Right region (right of hole, between top and bottom)
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(hole.max.x, hole.min.y),
            egui::pos2(screen_rect.max.x, hole.max.y),
        ),
        0.0,
        color,
    );

    // Corners between the sharp box and the rounded outline
    let mut mesh = egui::Mesh::default();
    for fan in cutout.corner_fans(CORNER_SEGMENTS) {
        let base = mesh.vertices.len() as u32;
        mesh.colored_vertex(pos(fan.corner), color);
        for p in &fan.arc {
            mesh.colored_vertex(pos(*p), color);
        }
        for i in 1..fan.arc.len() as u32 {
            mesh.add_triangle(base, base + i, base + i + 1);
        }
    }
    painter.add(egui::Shape::mesh(mesh));
}

/// Draws a dashed outline along the ROI edges.
pub fn draw_dashed_border(painter: &egui::Painter, rect: RoiRect, style: &BorderStyle) {
    let (l, t, r, b) = (
        rect.left as f32,
        rect.top as f32,
        rect.right as f32,
        rect.bottom as f32,
    );
    let outline = [
        egui::pos2(l, t),
        egui::pos2(r, t),
        egui::pos2(r, b),
        egui::pos2(l, b),
        egui::pos2(l, t),
    ];
    let stroke = egui::Stroke::new(style.width, to_color32(style.color));
    painter.extend(egui::Shape::dashed_line(&outline, stroke, style.dash, style.gap));
}

impl Canvas for EguiCanvas<'_> {
    fn clear(&mut self) {
        // egui rebuilds every layer each frame; nothing from the last frame survives.
        self.clip = None;
        self.saved.clear();
    }

    fn save(&mut self) {
        self.saved.push(self.clip.clone());
    }

    fn restore(&mut self) {
        self.clip = self.saved.pop().flatten();
    }

    fn clip_out_path(&mut self, path: &RoundedRectPath) {
        self.clip = Some(path.clone());
    }

    fn fill_color(&mut self, color: Rgba) {
        let color = to_color32(color);
        match &self.clip {
            Some(path) => draw_shade_outside(self.painter, self.frame_rect, path, color),
            None => {
                self.painter.rect_filled(self.frame_rect, 0.0, color);
            }
        }
    }

    fn stroke_dashed_rect(&mut self, rect: RoiRect, style: &BorderStyle) {
        draw_dashed_border(self.painter, rect, style);
    }

    fn draw_marks(&mut self, marks: &[Point]) {
        let color = to_color32(self.mark_style.color);
        for mark in marks {
            self.painter
                .circle_filled(pos(*mark), self.mark_style.radius, color);
        }
    }

    fn draw_handle(&mut self, glyph: &HandleGlyph, left: f32, top: f32) {
        let Some(texture) = self.handle_texture else {
            return;
        };
        let rect = egui::Rect::from_min_size(
            egui::pos2(left, top),
            egui::vec2(glyph.width() as f32, glyph.height() as f32),
        );
        self.painter.image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }
}
