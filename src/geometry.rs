// src/geometry.rs

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Coordinates at or below zero are forced to 1.
    pub fn clamp_to_positive(self) -> Self {
        Point {
            x: if self.x <= 0 { 1 } else { self.x },
            y: if self.y <= 0 { 1 } else { self.y },
        }
    }
}

/// Axis-aligned rectangle.
///
/// Width and height are unsigned, so a `Rect` can never be negative. A rectangle with
/// zero width or height is degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Rect { left, top, width, height }
    }

    /// Builds the rectangle spanned by two arbitrary corners.
    pub fn normalize(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Rect {
            left: x1.min(x2),
            top: y1.min(y2),
            width: x1.abs_diff(x2),
            height: y1.abs_diff(y2),
        }
    }

    pub fn from_points(a: Point, b: Point) -> Self {
        Self::normalize(a.x, a.y, b.x, b.y)
    }

    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Grows the rectangle by `margin` pixels on every side.
    pub fn inflate(&self, margin: u32) -> Self {
        Rect {
            left: self.left.saturating_sub_unsigned(margin),
            top: self.top.saturating_sub_unsigned(margin),
            width: self.width.saturating_add(margin.saturating_mul(2)),
            height: self.height.saturating_add(margin.saturating_mul(2)),
        }
    }

    /// Intersection with `bounds`. Disjoint rectangles give a degenerate result.
    pub fn clip(&self, bounds: &Rect) -> Self {
        let left = self.left.max(bounds.left);
        let top = self.top.max(bounds.top);
        let right = self.right().min(bounds.right());
        let bottom = self.bottom().min(bounds.bottom());

        Rect {
            left,
            top,
            width: (right - left as i64).max(0) as u32,
            height: (bottom - top as i64).max(0) as u32,
        }
    }

    /// Half-open containment test: `[left, right) x [top, bottom)`.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.left as i64 && x < self.right() && y >= self.top as i64 && y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}
