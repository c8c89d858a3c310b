//! Point masses: the simulated particles every body and chain is made of.

use glam::Vec2;

/// A simulated particle. A mass of `f32::INFINITY` marks an immovable anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Force accumulator, cleared by [`PointMass::update`].
    pub force: Vec2,
    pub mass: f32,
}

impl PointMass {
    /// Create a resting point mass. Callers validate `mass` (see `Body::new`).
    pub fn new(position: Vec2, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            mass,
        }
    }

    /// `1 / mass`, or zero for an immovable point mass.
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        if self.mass.is_finite() && self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_immovable(&self) -> bool {
        self.inv_mass() == 0.0
    }

    #[inline]
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Semi-implicit Euler: `v += F/m * dt`, then `p += v * dt`. Clears the
    /// force accumulator. Immovable point masses never move.
    pub fn update(&mut self, elapsed: f32) {
        let inv_mass = self.inv_mass();
        if inv_mass > 0.0 {
            self.velocity += self.force * inv_mass * elapsed;
            self.position += self.velocity * elapsed;
        }
        self.force = Vec2::ZERO;
    }
}
