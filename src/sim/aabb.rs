//! Axis-aligned bounding boxes
//!
//! World space has +y pointing down (screen convention): `top` is the
//! smallest y, `bottom` the largest.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "degenerate rect {width}x{height}");
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect of `size` with its top-left corner at `pos`
    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Open-interval overlap on the x axis (shared edges do not count)
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.left() < other.right() && other.left() < self.right()
    }

    /// Open-interval overlap on the y axis (shared edges do not count)
    #[inline]
    pub fn overlaps_y(&self, other: &Aabb) -> bool {
        self.top() < other.bottom() && other.top() < self.bottom()
    }

    /// True if the interiors intersect. Touching rects do not intersect, so a
    /// body resting on a platform is not in collision with it.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }

    #[inline]
    pub fn translated(&self, dx: f32, dy: f32) -> Aabb {
        Aabb {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Region covered while moving by (dx, dy) along a single axis
    pub fn swept(&self, dx: f32, dy: f32) -> Aabb {
        let moved = self.translated(dx, dy);
        let left = self.left().min(moved.left());
        let top = self.top().min(moved.top());
        Aabb {
            x: left,
            y: top,
            width: self.right().max(moved.right()) - left,
            height: self.bottom().max(moved.bottom()) - top,
        }
    }
}
