//! Screen-space points and rectangles.
//!
//! Coordinates are signed so that offsets and padding may point outside the
//! frame; clipping to frame bounds happens explicitly via [`Rect::clip`].

use std::fmt;

/// Integer position in screen-pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this point shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Reading-order comparison: top-to-bottom, then left-to-right.
    pub fn reading_order(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then_with(|| self.x.cmp(&other.x))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle; may extend past any image it is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Rectangle known to lie inside some image, in unsigned pixel units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClippedRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size whose integer center is `center`.
    ///
    /// The top-left corner is `center - size / 2`, mirroring how match
    /// centers are derived from top-left placements.
    pub const fn centered(center: Point, width: i32, height: i32) -> Self {
        Self {
            x: center.x - width / 2,
            y: center.y - height / 2,
            width,
            height,
        }
    }

    /// Grows the rectangle by `pad` pixels on every side.
    pub const fn padded(self, pad: i32) -> Self {
        Self {
            x: self.x - pad,
            y: self.y - pad,
            width: self.width + 2 * pad,
            height: self.height + 2 * pad,
        }
    }

    /// Intersects the rectangle with `[0, img_width) x [0, img_height)`.
    ///
    /// Returns `None` when nothing of the rectangle remains.
    pub fn clip(&self, img_width: usize, img_height: usize) -> Option<ClippedRect> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.width)).min(img_width as i64);
        let y1 = (i64::from(self.y) + i64::from(self.height)).min(img_height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(ClippedRect {
            x: x0 as usize,
            y: y0 as usize,
            width: (x1 - x0) as usize,
            height: (y1 - y0) as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect};

    #[test]
    fn centered_rect_round_trips_center() {
        let rect = Rect::centered(Point::new(20, 30), 10, 6);
        assert_eq!(rect, Rect::new(15, 27, 10, 6));
        assert_eq!(rect.padded(5), Rect::new(10, 22, 20, 16));
    }

    #[test]
    fn clip_trims_rect_hanging_off_edges() {
        let rect = Rect::new(-4, 95, 10, 10);
        let clipped = rect.clip(100, 100).unwrap();
        assert_eq!((clipped.x, clipped.y), (0, 95));
        assert_eq!((clipped.width, clipped.height), (6, 5));
    }

    #[test]
    fn clip_rejects_disjoint_rect() {
        assert!(Rect::new(120, 10, 5, 5).clip(100, 100).is_none());
        assert!(Rect::new(-10, 10, 10, 5).clip(100, 100).is_none());
        assert!(Rect::new(0, 0, 0, 5).clip(100, 100).is_none());
    }

    #[test]
    fn reading_order_sorts_rows_first() {
        let mut points = vec![Point::new(50, 10), Point::new(5, 40), Point::new(1, 10)];
        points.sort_by(Point::reading_order);
        assert_eq!(
            points,
            vec![Point::new(1, 10), Point::new(50, 10), Point::new(5, 40)]
        );
    }
}
