//! Damped springs between point masses.

use glam::Vec2;

use super::point_mass::PointMass;

/// Below this separation the spring axis is undefined and no force is produced.
const MIN_SPRING_LENGTH: f32 = 1e-6;

/// A damped spring between two point masses, addressed by index in the
/// owner's point-mass list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub a: usize,
    pub b: usize,
    pub rest_length: f32,
    /// Stiffness `k`.
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    pub fn new(a: usize, b: usize, rest_length: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            a,
            b,
            rest_length,
            stiffness,
            damping,
        }
    }

    /// Spring whose rest length is the current distance between the two masses.
    pub fn from_current(
        a: usize,
        b: usize,
        masses: &[PointMass],
        stiffness: f32,
        damping: f32,
    ) -> Self {
        let rest_length = masses[a].position.distance(masses[b].position);
        Self::new(a, b, rest_length, stiffness, damping)
    }

    /// Force on endpoint `a`; endpoint `b` receives the negation.
    #[inline]
    pub fn force(&self, a: &PointMass, b: &PointMass) -> Vec2 {
        spring_force(
            a.position,
            a.velocity,
            b.position,
            b.velocity,
            self.rest_length,
            self.stiffness,
            self.damping,
        )
    }
}

/// Damped spring force acting on A.
///
/// Along the axis from B to A the magnitude is
/// `-k * (length - rest_length) - damping * relative_velocity`.
/// Returns zero when the endpoints coincide.
pub fn spring_force(
    pos_a: Vec2,
    vel_a: Vec2,
    pos_b: Vec2,
    vel_b: Vec2,
    rest_length: f32,
    stiffness: f32,
    damping: f32,
) -> Vec2 {
    let b_to_a = pos_a - pos_b;
    let length = b_to_a.length();
    if length <= MIN_SPRING_LENGTH {
        return Vec2::ZERO;
    }
    let axis = b_to_a / length;
    let stretch = length - rest_length;
    let relative_velocity = (vel_a - vel_b).dot(axis);
    axis * (-stiffness * stretch - damping * relative_velocity)
}
