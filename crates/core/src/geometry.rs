//! Geometry primitives shared by the overlay state and its canvases.
//!
//! Coordinates are host pixels. Points are `f32` because pointer input is
//! sub-pixel; the derived ROI rectangle is integral because it is handed to
//! the scan pipeline as a crop window.

/// A 2D coordinate in host pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Squared euclidean distance between two points.
pub fn dist_sq(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Rounds to the nearest integer, ties towards positive infinity.
pub fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Rounds to the nearest integer, ties to even.
pub fn round_half_even(v: f32) -> f32 {
    v.round_ties_even()
}

/// Integral rectangle with exclusive right/bottom edges.
///
/// A rectangle with non-positive width or height is valid and means the
/// region collapsed on that axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoiRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl RoiRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// True unless both dimensions are positive.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) as f32 * 0.5,
            (self.top + self.bottom) as f32 * 0.5,
        )
    }
}

/// One drawing command of a path, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic bezier with a control point and an end point.
    QuadTo(Point, Point),
    Close,
}

/// Closed outline of a rectangle with quadratic corners.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundedRectPath {
    commands: Vec<PathCommand>,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

/// Builds a rounded rectangle outline.
///
/// The outline starts at the top of the right edge and runs counter-clockwise
/// (top-right, top-left, bottom-left, bottom-right). Each corner is a
/// quadratic curve whose control point is the sharp corner itself.
pub fn rounded_rect_path(
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    rx: f32,
    ry: f32,
) -> RoundedRectPath {
    let p = Point::new;
    let commands = vec![
        PathCommand::MoveTo(p(right, top + ry)),
        PathCommand::QuadTo(p(right, top), p(right - rx, top)),
        PathCommand::LineTo(p(left + rx, top)),
        PathCommand::QuadTo(p(left, top), p(left, top + ry)),
        PathCommand::LineTo(p(left, bottom - ry)),
        PathCommand::QuadTo(p(left, bottom), p(left + rx, bottom)),
        PathCommand::LineTo(p(right - rx, bottom)),
        PathCommand::QuadTo(p(right, bottom), p(right, bottom - ry)),
        PathCommand::LineTo(p(right, top + ry)),
        PathCommand::Close,
    ];
    RoundedRectPath {
        commands,
        left,
        top,
        right,
        bottom,
    }
}

impl RoundedRectPath {
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Bounding box as `(left, top, right, bottom)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        (self.left, self.top, self.right, self.bottom)
    }

    /// Approximates the outline with a polygon.
    ///
    /// Every quadratic segment is sampled `segments_per_corner` times. The
    /// closing vertex is not repeated.
    pub fn flatten(&self, segments_per_corner: usize) -> Vec<Point> {
        let steps = segments_per_corner.max(1);
        let mut points: Vec<Point> = Vec::with_capacity(4 * steps + 5);
        let mut cursor = Point::default();

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(to) | PathCommand::LineTo(to) => {
                    cursor = to;
                    points.push(to);
                }
                PathCommand::QuadTo(ctrl, to) => {
                    for i in 1..=steps {
                        let t = i as f32 / steps as f32;
                        points.push(quad_point(cursor, ctrl, to, t));
                    }
                    cursor = to;
                }
                PathCommand::Close => {}
            }
        }

        if points.len() > 1 && points.last() == points.first() {
            points.pop();
        }
        points
    }

    /// The area between each sharp corner and its curve, as triangle fans.
    ///
    /// Together with the four bands around the bounding box these cover the
    /// complement of the outline, which is what "clip out" needs on targets
    /// that cannot subtract a path.
    pub fn corner_fans(&self, segments_per_corner: usize) -> Vec<CornerFan> {
        let steps = segments_per_corner.max(1);
        let mut fans = Vec::with_capacity(4);
        let mut cursor = Point::default();

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(to) | PathCommand::LineTo(to) => cursor = to,
                PathCommand::QuadTo(ctrl, to) => {
                    let mut arc = Vec::with_capacity(steps + 1);
                    arc.push(cursor);
                    for i in 1..=steps {
                        arc.push(quad_point(cursor, ctrl, to, i as f32 / steps as f32));
                    }
                    fans.push(CornerFan { corner: ctrl, arc });
                    cursor = to;
                }
                PathCommand::Close => {}
            }
        }
        fans
    }

    /// Even-odd containment test against the flattened outline.
    pub fn contains(&self, point: Point) -> bool {
        if point.x < self.left || point.x > self.right || point.y < self.top || point.y > self.bottom
        {
            return false;
        }
        polygon_contains(&self.flatten(8), point)
    }
}

/// A sharp rectangle corner and the sampled curve that rounds it off.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerFan {
    pub corner: Point,
    pub arc: Vec<Point>,
}

fn quad_point(from: Point, ctrl: Point, to: Point, t: f32) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * from.x + 2.0 * u * t * ctrl.x + t * t * to.x,
        u * u * from.y + 2.0 * u * t * ctrl.y + t * t * to.y,
    )
}

/// Ray-casting point-in-polygon test.
pub fn polygon_contains(polygon: &[Point], point: Point) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
