// src/compositor.rs
//
// Incremental repaint of the selection outline. Instead of re-blitting the whole capture on
// every pointer motion, only the strips the outline swept across are restored.

use crate::geometry::{Point, Rect};

/// Outline stroke width; each sweep is grown by this much before blitting.
pub const STROKE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Damage {
    /// The whole overlay has to be re-blitted.
    Full,
    /// Regions to restore from the framebuffer, in blit order.
    Partial(Vec<Rect>),
}

/// True when `current` lies on the opposite side of `start` from `previous` on either axis.
pub fn flipped(start: Point, previous: Point, current: Point) -> bool {
    let crossed = |s: i32, p: i32, c: i32| {
        let (p, c) = (p as i64 - s as i64, c as i64 - s as i64);
        (p < 0 && c > 0) || (p > 0 && c < 0)
    };
    crossed(start.x, previous.x, current.x) || crossed(start.y, previous.y, current.y)
}

/// Works out what has to be restored after the dragged corner moved from `previous`
/// to `current`, with the opposite corner anchored at `start`.
///
/// The horizontal sweep spans the moving x-edge's travel (`previous.x` to `current.x`)
/// over every row either outline touches; the vertical sweep is the same for y. Together
/// they cover every pixel that belongs to exactly one of the two outlines. Sweeps are
/// grown by [`STROKE`], clipped to `bounds`, and dropped when nothing is left.
pub fn dirty_regions(start: Point, previous: Point, current: Point, bounds: Rect) -> Damage {
    if flipped(start, previous, current) {
        return Damage::Full;
    }

    let min3 = |a: i32, b: i32, c: i32| a.min(b).min(c);
    let max3 = |a: i32, b: i32, c: i32| a.max(b).max(c);

    let horizontal = Rect::normalize(
        previous.x,
        min3(start.y, previous.y, current.y),
        current.x,
        max3(start.y, previous.y, current.y),
    );
    let vertical = Rect::normalize(
        min3(start.x, previous.x, current.x),
        previous.y,
        max3(start.x, previous.x, current.x),
        current.y,
    );

    let regions = [horizontal, vertical]
        .into_iter()
        .map(|sweep| sweep.inflate(STROKE).clip(&bounds))
        .filter(|r| !r.is_degenerate())
        .collect();

    Damage::Partial(regions)
}
