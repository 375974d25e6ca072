//! Collision detection for sprites
//!
//! Every sprite is an axis-aligned box anchored at its top-left corner.
//! Two boxes touch when their centers are closer than the sum of their
//! half-extents on both axes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Center of the box
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Half the box dimensions
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }
}

/// Anything with a collision box
pub trait Hitbox {
    fn hitbox(&self) -> Aabb;
}

impl Hitbox for Aabb {
    fn hitbox(&self) -> Aabb {
        *self
    }
}

/// Check whether two boxes overlap
///
/// Strict comparison: boxes that merely share an edge do not collide.
pub fn intersects(a: &Aabb, b: &Aabb) -> bool {
    let distance = (a.center() - b.center()).abs();
    let reach = a.half_extents() + b.half_extents();
    distance.x < reach.x && distance.y < reach.y
}

/// Check whether two sprites overlap
#[inline]
pub fn hits<A: Hitbox + ?Sized, B: Hitbox + ?Sized>(a: &A, b: &B) -> bool {
    intersects(&a.hitbox(), &b.hitbox())
}

/// Clamp a box position so the whole box stays within `[0, bounds]`
pub fn clamp_to_bounds(pos: Vec2, size: Vec2, bounds: Vec2) -> Vec2 {
    let max = (bounds - size).max(Vec2::ZERO);
    pos.clamp(Vec2::ZERO, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(x: f32, y: f32, side: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::splat(side))
    }

    #[test]
    fn test_overlapping_boxes_collide() {
        let a = square(0.0, 0.0, 20.0);
        let b = square(10.0, 10.0, 20.0);
        assert!(intersects(&a, &b));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        // Centers exactly 20 apart on X, reach is 20
        let a = square(0.0, 0.0, 20.0);
        let b = square(20.0, 0.0, 20.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn test_overlap_on_one_axis_only() {
        let a = square(0.0, 0.0, 20.0);
        let b = square(5.0, 100.0, 20.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn test_mismatched_sizes() {
        // Thin arrow entering a sprite from the left
        let arrow = Aabb::new(Vec2::new(390.0, 308.0), Vec2::new(15.0, 5.0));
        let enemy = square(400.0, 300.0, 20.0);
        assert!(intersects(&arrow, &enemy));
    }

    #[test]
    fn test_clamp_keeps_box_inside() {
        let bounds = Vec2::new(800.0, 600.0);
        let size = Vec2::splat(20.0);
        assert_eq!(clamp_to_bounds(Vec2::new(-5.0, 700.0), size, bounds), Vec2::new(0.0, 580.0));
        assert_eq!(clamp_to_bounds(Vec2::new(790.0, -1.0), size, bounds), Vec2::new(780.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_intersects_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 1.0f32..100.0, ah in 1.0f32..100.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            bw in 1.0f32..100.0, bh in 1.0f32..100.0,
        ) {
            let a = Aabb::new(Vec2::new(ax, ay), Vec2::new(aw, ah));
            let b = Aabb::new(Vec2::new(bx, by), Vec2::new(bw, bh));
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        }

        #[test]
        fn prop_separated_boxes_never_collide(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 1.0f32..100.0, ah in 1.0f32..100.0,
            bw in 1.0f32..100.0, bh in 1.0f32..100.0,
            gap in 0.5f32..200.0, dy in -300.0f32..300.0,
        ) {
            let a = Aabb::new(Vec2::new(ax, ay), Vec2::new(aw, ah));
            // Place b so its center is beyond the combined half-widths on X
            let center_x = a.center().x + (aw + bw) * 0.5 + gap;
            let b = Aabb::new(
                Vec2::new(center_x - bw * 0.5, ay + dy),
                Vec2::new(bw, bh),
            );
            prop_assert!(!intersects(&a, &b));
        }
    }
}
