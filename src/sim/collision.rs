//! Axis-aligned collision helpers
//!
//! Every game resolves contacts with plain rectangle overlap; the only
//! refinement is picking which face of a rectangle was struck.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, top-left origin, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centred on a point
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap test; rectangles that only share an edge do not collide
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Point containment (half-open on the far edges)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    pub fn translate(&self, offset: Vec2) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }

    /// Shrink by `d` on every side
    pub fn inset(&self, d: f32) -> Rect {
        Rect::new(
            self.x + d,
            self.y + d,
            (self.w - 2.0 * d).max(0.0),
            (self.h - 2.0 * d).max(0.0),
        )
    }
}

/// Face of a rectangle that was struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Top/bottom hits flip vertical velocity, left/right flip horizontal
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

/// Which face of `target` the `mover` hit, judged by centre offset
pub fn collision_side(mover: &Rect, target: &Rect) -> Side {
    let delta = mover.center() - target.center();
    if delta.x.abs() > delta.y.abs() {
        if delta.x < 0.0 { Side::Left } else { Side::Right }
    } else if delta.y < 0.0 {
        Side::Top
    } else {
        Side::Bottom
    }
}

/// Circle against rectangle overlap
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = Vec2::new(
        center.x.clamp(rect.left(), rect.right()),
        center.y.clamp(rect.top(), rect.bottom()),
    );
    center.distance_squared(closest) < radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9.5, 5.0, 2.0, 2.0)));
    }

    #[test]
    fn test_collision_side() {
        let brick = Rect::new(100.0, 100.0, 60.0, 25.0);
        let above = Rect::new(120.0, 85.0, 16.0, 16.0);
        let left = Rect::new(88.0, 105.0, 16.0, 16.0);
        assert_eq!(collision_side(&above, &brick), Side::Top);
        assert_eq!(collision_side(&left, &brick), Side::Left);
        assert!(collision_side(&above, &brick).is_vertical());
    }

    #[test]
    fn test_inset() {
        let r = Rect::new(0.0, 0.0, 44.0, 47.0).inset(5.0);
        assert_eq!(r, Rect::new(5.0, 5.0, 34.0, 37.0));
    }

    #[test]
    fn test_circle_rect_overlap() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(circle_rect_overlap(Vec2::new(12.0, 5.0), 3.0, &r));
        assert!(!circle_rect_overlap(Vec2::new(14.0, 14.0), 3.0, &r));
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.5f32..200.0, 0.5f32..200.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn test_intersects_is_symmetric(a in arb_rect(), b in arb_rect()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn test_rect_intersects_itself(a in arb_rect()) {
            prop_assert!(a.intersects(&a));
        }
    }
}
