//! Ropes: point masses connected end to end by springs.

use glam::Vec2;

use crate::error::{validate_mass, KinematicsError, Result};

use super::point_mass::PointMass;
use super::spring::Spring;

/// Default per-step velocity damping for chain point masses.
pub const DEFAULT_CHAIN_DAMPING: f32 = 0.99;

/// A chain of `segments + 1` point masses joined by `segments` springs.
///
/// The first and last point masses are anchors: they receive spring forces
/// but are never integrated, so they stay wherever the host puts them.
/// Chains take no part in collision detection.
#[derive(Debug, Clone)]
pub struct Chain {
    point_masses: Vec<PointMass>,
    springs: Vec<Spring>,
    damping: f32,
}

impl Chain {
    /// Evenly space the point masses on the segment `from`-`to`. Each spring's
    /// rest length is one segment length, so the chain starts unstretched.
    pub fn new(
        from: Vec2,
        to: Vec2,
        segments: usize,
        stiffness: f32,
        damping: f32,
        mass: f32,
    ) -> Result<Self> {
        if segments == 0 {
            return Err(KinematicsError::InvalidSegmentCount(segments));
        }
        validate_mass(mass)?;

        let step = (to - from) / segments as f32;
        let point_masses: Vec<PointMass> = (0..=segments)
            .map(|i| PointMass::new(from + step * i as f32, mass))
            .collect();
        let springs = (1..=segments)
            .map(|i| Spring::from_current(i - 1, i, &point_masses, stiffness, damping))
            .collect();

        Ok(Self {
            point_masses,
            springs,
            damping: DEFAULT_CHAIN_DAMPING,
        })
    }

    pub fn update(&mut self, elapsed: f32, gravity: Vec2) {
        for spring in &self.springs {
            let force = spring.force(&self.point_masses[spring.a], &self.point_masses[spring.b]);
            self.point_masses[spring.a].force += force;
            self.point_masses[spring.b].force -= force;
        }

        let last = self.point_masses.len() - 1;
        for (i, pm) in self.point_masses.iter_mut().enumerate() {
            if i == 0 || i == last {
                pm.force = Vec2::ZERO;
                continue;
            }
            if !pm.is_immovable() {
                pm.force += gravity * pm.mass;
            }
            pm.velocity *= self.damping;
            pm.update(elapsed);
        }
    }

    /// Move the first anchor.
    pub fn set_start(&mut self, position: Vec2) {
        self.point_masses[0].position = position;
    }

    /// Move the last anchor.
    pub fn set_end(&mut self, position: Vec2) {
        let last = self.point_masses.len() - 1;
        self.point_masses[last].position = position;
    }

    pub fn start(&self) -> Vec2 {
        self.point_masses[0].position
    }

    pub fn end(&self) -> Vec2 {
        self.point_masses[self.point_masses.len() - 1].position
    }

    #[inline]
    pub fn point_masses(&self) -> &[PointMass] {
        &self.point_masses
    }

    #[inline]
    pub fn point_masses_mut(&mut self) -> &mut [PointMass] {
        &mut self.point_masses
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping;
    }
}
