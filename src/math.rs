//! 2D vector helpers on top of [`glam::Vec2`].
//!
//! glam already provides the algebra (`+`, `-`, scaling, `dot`, `perp`,
//! `perp_dot`, `normalize_or_zero`). This module adds the rotation, winding
//! and angle helpers the simulation needs.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Extension methods for [`Vec2`].
pub trait Vec2Ext {
    /// Rotate counter-clockwise by `angle` radians.
    fn rotated(self, angle: f32) -> Vec2;

    /// Is rotating from `self` to `other` counter-clockwise?
    fn is_ccw(self, other: Vec2) -> bool;

    /// Signed angle in radians from `self` to `other`, in [-π, π].
    ///
    /// Uses `acos` of the clamped dot product of the normalized vectors, with
    /// the sign taken from [`Vec2Ext::is_ccw`]. Zero-length inputs give 0.
    fn angle_to(self, other: Vec2) -> f32;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn rotated(self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(cos * self.x - sin * self.y, cos * self.y + sin * self.x)
    }

    #[inline]
    fn is_ccw(self, other: Vec2) -> bool {
        other.dot(self.perp()) >= 0.0
    }

    fn angle_to(self, other: Vec2) -> f32 {
        let a = self.normalize_or_zero();
        let b = other.normalize_or_zero();
        if a == Vec2::ZERO || b == Vec2::ZERO {
            return 0.0;
        }
        // Clamp: float overshoot past ±1 would make acos return NaN.
        let angle = a.dot(b).clamp(-1.0, 1.0).acos();
        if a.is_ccw(b) {
            angle
        } else {
            -angle
        }
    }
}

/// Normalize an angle into (-π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Unweighted mean of `points`. Returns zero for an empty slice.
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// Shoelace signed area of a closed polygon; positive when wound counter-clockwise.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice_area += a.perp_dot(b);
    }
    twice_area * 0.5
}
