//! Deformable polygon bodies built from point masses.
//!
//! A body keeps an immutable, centered base shape and one point mass per base
//! point. Each step it fits a single rotation to the live point masses
//! (shape matching), so downstream code can treat it as a rotated, translated
//! copy of its base polygon even while springs perturb individual points.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::error::{validate_mass, KinematicsError, Result};
use crate::math::{signed_area, wrap_angle, Vec2Ext};

use super::aabb::Aabb;
use super::bitmask::Bitmask;
use super::point_mass::PointMass;
use super::shape::Shape;
use super::spring::{spring_force, Spring};

/// Default per-step velocity damping for body point masses.
pub const DEFAULT_DAMPING: f32 = 0.999;

/// How far past the AABB the containment ray extends.
const CONTAINS_RAY_MARGIN: f32 = 0.1;
/// Edges shorter than this are not normalized.
const MIN_EDGE_LENGTH: f32 = f32::EPSILON;
/// Offsets shorter than this carry no usable direction for shape matching.
const MIN_OFFSET_SQ: f32 = 1e-12;
/// Enclosed areas below this disable the pressure force.
const MIN_PRESSURE_AREA: f32 = 1e-6;

/// Springs and internal point masses of a spring or pressure body.
///
/// Spring endpoints index the concatenation `[outline..., internal...]`:
/// indices below the outline count address the body's point masses, the rest
/// address the internal masses owned here.
#[derive(Debug, Clone, Default)]
pub struct SpringSet {
    springs: Vec<Spring>,
    internal: Vec<PointMass>,
    shape_stiffness: f32,
    shape_damping: f32,
}

impl SpringSet {
    fn with_edges(
        outline: &[PointMass],
        edge_stiffness: f32,
        edge_damping: f32,
        shape_stiffness: f32,
        shape_damping: f32,
    ) -> Self {
        let n = outline.len();
        let springs = (0..n)
            .map(|i| Spring::from_current(i, (i + 1) % n, outline, edge_stiffness, edge_damping))
            .collect();
        Self {
            springs,
            internal: Vec::new(),
            shape_stiffness,
            shape_damping,
        }
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Point masses owned by the spring network but not part of the outline.
    pub fn internal_masses(&self) -> &[PointMass] {
        &self.internal
    }

    pub fn shape_stiffness(&self) -> f32 {
        self.shape_stiffness
    }

    pub fn shape_damping(&self) -> f32 {
        self.shape_damping
    }

    fn apply(
        &mut self,
        outline: &mut [PointMass],
        targets: &[Vec2],
        gravity: Vec2,
        elapsed: f32,
        damping: f32,
    ) {
        for spring in &self.springs {
            let force = spring.force(
                mass_at(outline, &self.internal, spring.a),
                mass_at(outline, &self.internal, spring.b),
            );
            mass_at_mut(outline, &mut self.internal, spring.a).force += force;
            mass_at_mut(outline, &mut self.internal, spring.b).force -= force;
        }

        if self.shape_stiffness > 0.0 {
            for (pm, &target) in outline.iter_mut().zip(targets) {
                pm.force += spring_force(
                    pm.position,
                    pm.velocity,
                    target,
                    pm.velocity,
                    0.0,
                    self.shape_stiffness,
                    self.shape_damping,
                );
            }
        }

        for pm in &mut self.internal {
            if !pm.is_immovable() {
                pm.force += gravity * pm.mass;
            }
            pm.velocity *= damping;
            pm.update(elapsed);
        }
    }
}

fn mass_at<'a>(outline: &'a [PointMass], internal: &'a [PointMass], index: usize) -> &'a PointMass {
    match outline.get(index) {
        Some(pm) => pm,
        None => &internal[index - outline.len()],
    }
}

fn mass_at_mut<'a>(
    outline: &'a mut [PointMass],
    internal: &'a mut [PointMass],
    index: usize,
) -> &'a mut PointMass {
    let n = outline.len();
    if index < n {
        &mut outline[index]
    } else {
        &mut internal[index - n]
    }
}

/// Internal-force model of a body.
#[derive(Debug, Clone)]
pub enum BodyKind {
    /// No internal forces: point masses move independently.
    Plain,
    /// Edge springs plus optional shape-matching springs.
    Spring(SpringSet),
    /// Spring body inflated by a gas pressure force along vertex normals.
    Pressure { springs: SpringSet, gas_pressure: f32 },
}

/// Closest point on one edge of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    /// Distance to the query point (squared for the `_squared` queries).
    pub distance: f32,
    /// Closest point on the edge.
    pub point: Vec2,
    /// Outward unit normal of the edge.
    pub normal: Vec2,
    /// Position of `point` along the edge in [0, 1].
    pub edge_distance: f32,
}

/// Closest edge of a body to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestEdge {
    /// Index of the edge's first point mass; the edge ends at `(edge + 1) % count`.
    pub edge: usize,
    pub hit: EdgeHit,
}

/// A deformable polygon of point masses tracked via best-fit rotation.
#[derive(Debug, Clone)]
pub struct Body {
    base_shape: Shape,
    current_shape: Shape,
    point_masses: Vec<PointMass>,
    kind: BodyKind,
    aabb: Aabb,
    bitmask_x: Bitmask,
    bitmask_y: Bitmask,
    position: Vec2,
    velocity: Vec2,
    force: Vec2,
    angle: f32,
    scale: Vec2,
    damping: f32,
    is_static: bool,
    dirty: bool,
    merging: bool,
    /// +1 when `perp(edge)` points outward (clockwise base shape), -1 otherwise.
    outward_sign: f32,
}

impl Body {
    /// Plain body: every point mass gets `mass`. `f32::INFINITY` makes it immovable.
    pub fn new(shape: &Shape, mass: f32) -> Result<Self> {
        Self::build(shape, mass, false, |_| BodyKind::Plain)
    }

    /// Static body: immovable, updated once and skipped afterwards.
    pub fn new_static(shape: &Shape) -> Result<Self> {
        Self::build(shape, f32::INFINITY, true, |_| BodyKind::Plain)
    }

    /// Spring body with edge springs between adjacent point masses and, when
    /// `shape_stiffness > 0`, shape-matching springs pulling each point mass
    /// toward its slot in the rotated base shape.
    pub fn new_spring(
        shape: &Shape,
        mass: f32,
        edge_stiffness: f32,
        edge_damping: f32,
        shape_stiffness: f32,
        shape_damping: f32,
    ) -> Result<Self> {
        Self::build(shape, mass, false, |outline| {
            BodyKind::Spring(SpringSet::with_edges(
                outline,
                edge_stiffness,
                edge_damping,
                shape_stiffness,
                shape_damping,
            ))
        })
    }

    /// Spring body with an additional gas pressure force.
    pub fn new_pressure(
        shape: &Shape,
        mass: f32,
        gas_pressure: f32,
        edge_stiffness: f32,
        edge_damping: f32,
        shape_stiffness: f32,
        shape_damping: f32,
    ) -> Result<Self> {
        Self::build(shape, mass, false, |outline| BodyKind::Pressure {
            springs: SpringSet::with_edges(
                outline,
                edge_stiffness,
                edge_damping,
                shape_stiffness,
                shape_damping,
            ),
            gas_pressure,
        })
    }

    fn build(
        shape: &Shape,
        mass: f32,
        is_static: bool,
        kind: impl FnOnce(&[PointMass]) -> BodyKind,
    ) -> Result<Self> {
        if shape.len() < 3 {
            return Err(KinematicsError::TooFewPoints { found: shape.len() });
        }
        validate_mass(mass)?;

        let base_shape = shape.centered();
        let point_masses: Vec<PointMass> = shape
            .points()
            .iter()
            .map(|&p| PointMass::new(p, mass))
            .collect();
        let outward_sign = if base_shape.is_clockwise() { 1.0 } else { -1.0 };

        let mut body = Self {
            current_shape: base_shape.clone(),
            base_shape,
            kind: kind(&point_masses[..]),
            point_masses,
            aabb: Aabb::default(),
            bitmask_x: Bitmask::new(),
            bitmask_y: Bitmask::new(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            angle: 0.0,
            scale: Vec2::ONE,
            damping: DEFAULT_DAMPING,
            is_static,
            dirty: true,
            merging: false,
            outward_sign,
        };
        body.update_aggregate();
        body.rotate_shape();
        body.refresh_aabb(0.0);
        Ok(body)
    }

    /// Move the body so its position is `position`, immediately.
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self.push_aggregate();
        self.rotate_shape();
        self.refresh_aabb(0.0);
        self
    }

    /// Give every point mass the same velocity, immediately.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self.push_aggregate();
        self.refresh_aabb(0.0);
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Advance one step. Static bodies settle after their first update and
    /// are skipped from then on.
    pub fn update(&mut self, elapsed: f32, gravity: Vec2) {
        if self.merging || !self.dirty {
            return;
        }

        // Order matters: shape matching reads the aggregate position, springs
        // read the matched shape, and the AABB reads the integrated state.
        self.push_aggregate();
        self.rotate_shape();
        self.apply_internal_forces(elapsed, gravity);
        self.apply_gravity(gravity);
        self.integrate(elapsed);
        self.refresh_aabb(elapsed);
        self.update_aggregate();

        if self.is_static {
            self.dirty = false;
        }
    }

    /// Shift every point mass so the means of position, velocity and force
    /// match the body's aggregate values.
    fn push_aggregate(&mut self) {
        let (position, velocity, force) = self.mean_state();
        let dp = self.position - position;
        let dv = self.velocity - velocity;
        let df = self.force - force;
        for pm in &mut self.point_masses {
            pm.position += dp;
            pm.velocity += dv;
            pm.force += df;
        }
    }

    fn mean_state(&self) -> (Vec2, Vec2, Vec2) {
        let inv_count = 1.0 / self.point_masses.len() as f32;
        let mut position = Vec2::ZERO;
        let mut velocity = Vec2::ZERO;
        let mut force = Vec2::ZERO;
        for pm in &self.point_masses {
            position += pm.position;
            velocity += pm.velocity;
            force += pm.force;
        }
        (position * inv_count, velocity * inv_count, force * inv_count)
    }

    /// Recompute aggregate position, velocity and force as the unweighted
    /// mean over all point masses.
    pub fn update_aggregate(&mut self) {
        let (position, velocity, force) = self.mean_state();
        self.position = position;
        self.velocity = velocity;
        self.force = force;
    }

    /// Fit one rotation angle to the point masses and rebuild the current
    /// shape from the base shape, that angle and the aggregate position.
    pub fn rotate_shape(&mut self) {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut reference: Option<f32> = None;

        for (base, pm) in self.base_shape.points().iter().zip(&self.point_masses) {
            let base_dir = *base * self.scale;
            let current_dir = pm.position - self.position;
            if base_dir.length_squared() <= MIN_OFFSET_SQ
                || current_dir.length_squared() <= MIN_OFFSET_SQ
            {
                continue;
            }

            let mut angle = base_dir.angle_to(current_dir);
            match reference {
                None => reference = Some(angle),
                Some(first) => {
                    // Unwrap across the ±π seam so points straddling it average correctly.
                    let diff = angle - first;
                    if diff > PI {
                        angle -= TAU;
                    } else if diff < -PI {
                        angle += TAU;
                    }
                }
            }
            sum += angle;
            count += 1;
        }

        if count > 0 {
            let raw = sum / count as f32;
            self.angle += wrap_angle(raw - self.angle);
        }

        let (position, angle, scale) = (self.position, self.angle, self.scale);
        for (target, base) in self
            .current_shape
            .points_mut()
            .iter_mut()
            .zip(self.base_shape.points())
        {
            *target = (*base * scale).rotated(angle) + position;
        }
    }

    fn apply_internal_forces(&mut self, elapsed: f32, gravity: Vec2) {
        let damping = self.damping;
        let outward_sign = self.outward_sign;
        let targets = self.current_shape.points();
        match &mut self.kind {
            BodyKind::Plain => {}
            BodyKind::Spring(springs) => {
                springs.apply(&mut self.point_masses, targets, gravity, elapsed, damping);
            }
            BodyKind::Pressure {
                springs,
                gas_pressure,
            } => {
                springs.apply(&mut self.point_masses, targets, gravity, elapsed, damping);
                apply_pressure(&mut self.point_masses, *gas_pressure, outward_sign);
            }
        }
    }

    fn apply_gravity(&mut self, gravity: Vec2) {
        if gravity == Vec2::ZERO {
            return;
        }
        for pm in &mut self.point_masses {
            if !pm.is_immovable() {
                pm.force += gravity * pm.mass;
            }
        }
    }

    fn integrate(&mut self, elapsed: f32) {
        for pm in &mut self.point_masses {
            pm.velocity *= self.damping;
            pm.update(elapsed);
        }
    }

    /// Rebuild the AABB from each point mass's current position and its
    /// position projected `elapsed` seconds ahead.
    fn refresh_aabb(&mut self, elapsed: f32) {
        self.aabb.clear();
        for pm in &self.point_masses {
            self.aabb.add(pm.position);
            self.aabb.add(pm.position + pm.velocity * elapsed);
        }
    }

    /// Apply `force` at world point `point`: every point mass receives the
    /// linear force plus a torque term perpendicular to its offset.
    pub fn apply_force(&mut self, point: Vec2, force: Vec2) {
        let r = self.position - point;
        let torque = r.perp_dot(force);
        for pm in &mut self.point_masses {
            let to_point = pm.position - self.position;
            pm.force += -to_point.perp() * torque + force;
        }
        self.force = self.mean_state().2;
    }

    /// Ray-cast parity test along +X against the live outline.
    pub fn contains(&self, point: Vec2) -> bool {
        let end_x = self.aabb.max.x + CONTAINS_RAY_MARGIN;
        let n = self.point_masses.len();
        let mut inside = false;
        for i in 0..n {
            let start = self.point_masses[i].position;
            let end = self.point_masses[(i + 1) % n].position;
            let crosses = (start.y <= point.y && end.y > point.y)
                || (start.y > point.y && end.y <= point.y);
            if crosses {
                let slope = (end.x - start.x) / (end.y - start.y);
                let hit_x = start.x + (point.y - start.y) * slope;
                if hit_x >= point.x && hit_x <= end_x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn project_on_edge(&self, point: Vec2, edge: usize) -> EdgeHit {
        let n = self.point_masses.len();
        let a = self.point_masses[edge].position;
        let b = self.point_masses[(edge + 1) % n].position;

        let to_point = point - a;
        let mut dir = b - a;
        let edge_length = dir.length();
        if edge_length > MIN_EDGE_LENGTH {
            dir /= edge_length;
        }
        let normal = dir.perp() * self.outward_sign;

        let x = to_point.dot(dir);
        if x <= 0.0 {
            EdgeHit {
                distance: point.distance_squared(a),
                point: a,
                normal,
                edge_distance: 0.0,
            }
        } else if x >= edge_length {
            EdgeHit {
                distance: point.distance_squared(b),
                point: b,
                normal,
                edge_distance: 1.0,
            }
        } else {
            let perpendicular = to_point.perp_dot(dir);
            EdgeHit {
                distance: perpendicular * perpendicular,
                point: a + dir * x,
                normal,
                edge_distance: x / edge_length,
            }
        }
    }

    /// Closest point on edge `edge` (from point mass `edge` to the next one).
    pub fn closest_point_on_edge(&self, point: Vec2, edge: usize) -> EdgeHit {
        let mut hit = self.project_on_edge(point, edge);
        hit.distance = hit.distance.sqrt();
        hit
    }

    /// Like [`Body::closest_point_on_edge`] but `distance` is squared.
    pub fn closest_point_on_edge_squared(&self, point: Vec2, edge: usize) -> EdgeHit {
        self.project_on_edge(point, edge)
    }

    /// Closest point over all edges. Ties keep the first edge found.
    pub fn closest_point(&self, point: Vec2) -> ClosestEdge {
        let mut best = ClosestEdge {
            edge: 0,
            hit: self.closest_point_on_edge(point, 0),
        };
        for edge in 1..self.point_masses.len() {
            let hit = self.closest_point_on_edge(point, edge);
            if hit.distance < best.hit.distance {
                best = ClosestEdge { edge, hit };
            }
        }
        best
    }

    /// Index of the point mass nearest to `point`, and its distance.
    pub fn closest_point_mass(&self, point: Vec2) -> (usize, f32) {
        let mut closest = 0;
        let mut closest_sq = f32::MAX;
        for (i, pm) in self.point_masses.iter().enumerate() {
            let d = pm.position.distance_squared(point);
            if d < closest_sq {
                closest_sq = d;
                closest = i;
            }
        }
        (closest, closest_sq.sqrt())
    }

    /// Add a point mass owned by the spring network at `local` (relative to
    /// the body's position and rotation). Returns its spring index.
    pub fn add_internal_mass(&mut self, local: Vec2, mass: f32) -> Result<usize> {
        validate_mass(mass)?;
        let position = self.position + (local * self.scale).rotated(self.angle);
        let outline = self.point_masses.len();
        let springs = self.spring_set_mut()?;
        springs.internal.push(PointMass::new(position, mass));
        Ok(outline + springs.internal.len() - 1)
    }

    /// Connect two masses (outline or internal) with a spring whose rest
    /// length is their current distance.
    pub fn add_spring(&mut self, a: usize, b: usize, stiffness: f32, damping: f32) -> Result<()> {
        let outline = &self.point_masses;
        let springs = match &mut self.kind {
            BodyKind::Plain => return Err(KinematicsError::NotSpringBody),
            BodyKind::Spring(springs) | BodyKind::Pressure { springs, .. } => springs,
        };
        let count = outline.len() + springs.internal.len();
        for index in [a, b] {
            if index >= count {
                return Err(KinematicsError::PointMassOutOfRange { index, count });
            }
        }
        let rest_length = mass_at(outline, &springs.internal, a)
            .position
            .distance(mass_at(outline, &springs.internal, b).position);
        springs
            .springs
            .push(Spring::new(a, b, rest_length, stiffness, damping));
        Ok(())
    }

    fn spring_set_mut(&mut self) -> Result<&mut SpringSet> {
        match &mut self.kind {
            BodyKind::Plain => Err(KinematicsError::NotSpringBody),
            BodyKind::Spring(springs) | BodyKind::Pressure { springs, .. } => Ok(springs),
        }
    }

    pub fn spring_set(&self) -> Option<&SpringSet> {
        match &self.kind {
            BodyKind::Plain => None,
            BodyKind::Spring(springs) | BodyKind::Pressure { springs, .. } => Some(springs),
        }
    }

    pub fn springs(&self) -> &[Spring] {
        self.spring_set().map_or(&[], |s| s.springs())
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Set the aggregate position; point masses follow on the next update.
    /// Wakes a settled static body.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.dirty = true;
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Set the aggregate velocity; point masses follow on the next update.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        self.dirty = true;
    }

    #[inline]
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Best-fit rotation of the body in radians (continuous, not wrapped).
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.dirty = true;
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping;
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// A settled static body is skipped by [`Body::update`].
    pub fn is_settled(&self) -> bool {
        !self.dirty
    }

    /// Force a settled static body to be recomputed on the next update.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    #[inline]
    pub fn bitmask_x(&self) -> Bitmask {
        self.bitmask_x
    }

    #[inline]
    pub fn bitmask_y(&self) -> Bitmask {
        self.bitmask_y
    }

    pub(crate) fn set_bitmasks(&mut self, x: Bitmask, y: Bitmask) {
        self.bitmask_x = x;
        self.bitmask_y = y;
    }

    pub fn base_shape(&self) -> &Shape {
        &self.base_shape
    }

    pub fn current_shape(&self) -> &Shape {
        &self.current_shape
    }

    #[inline]
    pub fn point_masses(&self) -> &[PointMass] {
        &self.point_masses
    }

    #[inline]
    pub fn point_masses_mut(&mut self) -> &mut [PointMass] {
        &mut self.point_masses
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.point_masses.len()
    }

    #[inline]
    pub(crate) fn outward_sign(&self) -> f32 {
        self.outward_sign
    }
}

/// Push each outline point mass along its vertex normal with a force
/// proportional to `edge_length * gas_pressure / enclosed_area`.
fn apply_pressure(outline: &mut [PointMass], gas_pressure: f32, outward_sign: f32) {
    let n = outline.len();
    let positions: Vec<Vec2> = outline.iter().map(|pm| pm.position).collect();
    let area = signed_area(&positions).abs();
    if area <= MIN_PRESSURE_AREA {
        return;
    }

    let mut normals = Vec::with_capacity(n);
    let mut edge_lengths = Vec::with_capacity(n);
    for i in 0..n {
        let prev = positions[(i + n - 1) % n];
        let next = positions[(i + 1) % n];
        let incoming = positions[i] - prev;
        let outgoing = next - positions[i];
        normals.push(((incoming.perp() + outgoing.perp()) * outward_sign).normalize_or_zero());
        edge_lengths.push(outgoing.length());
    }

    for i in 0..n {
        let j = (i + 1) % n;
        let pressure = edge_lengths[i] * gas_pressure / area;
        outline[i].force += normals[i] * pressure;
        outline[j].force += normals[j] * pressure;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn unit_square() -> Shape {
        Shape::rectangle(1.0, 1.0).unwrap()
    }

    fn rotate_point_masses(body: &mut Body, angle: f32) {
        let center = body.position();
        for (pm, base) in body
            .point_masses
            .iter_mut()
            .zip(body.base_shape.points().to_vec())
        {
            pm.position = center + base.rotated(angle);
        }
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(
            Body::new(&Shape::new(), 1.0).unwrap_err(),
            KinematicsError::TooFewPoints { found: 0 }
        );
        assert_eq!(
            Body::new(&unit_square(), 0.0).unwrap_err(),
            KinematicsError::InvalidMass(0.0)
        );
        assert!(Body::new(&unit_square(), f32::INFINITY).is_ok());
    }

    #[test]
    fn test_counts_match_base_shape() {
        let shape = Shape::regular_polygon(7, 1.0).unwrap();
        let body = Body::new_spring(&shape, 1.0, 50.0, 1.0, 20.0, 1.0).unwrap();
        assert_eq!(body.point_count(), 7);
        assert_eq!(body.base_shape().len(), 7);
        assert_eq!(body.current_shape().len(), 7);
        assert_eq!(body.springs().len(), 7, "one edge spring per edge");
    }

    #[test]
    fn test_position_is_centroid_after_update() {
        let mut shape = Shape::regular_polygon(8, 2.0).unwrap();
        shape.begin(false).unwrap();
        for p in Shape::regular_polygon(8, 2.0).unwrap().points() {
            shape.add(*p + Vec2::new(3.0, -1.0)).unwrap();
        }
        shape.end().unwrap();

        let mut body = Body::new(&shape, 1.0).unwrap();
        body.update(1.0 / 60.0, Vec2::ZERO);
        assert!(
            (body.position() - Vec2::new(3.0, -1.0)).length() < EPS,
            "position = {}",
            body.position()
        );
        assert!(body.velocity().length() < EPS);
    }

    #[test]
    fn test_static_body_settles() {
        let mut body = Body::new_static(&unit_square()).unwrap();
        assert!(!body.is_settled());
        body.update(0.0, Vec2::ZERO);
        assert!(body.is_settled());

        body.update(1.0, Vec2::new(0.0, -9.81));
        assert_eq!(body.point_masses()[0].position, unit_square().points()[0]);

        body.mark_dirty();
        body.update(0.0, Vec2::ZERO);
        assert!(body.is_settled());
        assert!(body.position().length() < EPS);
    }

    #[test]
    fn test_set_position_wakes_static_body() {
        let mut body = Body::new_static(&unit_square()).unwrap();
        body.update(0.0, Vec2::ZERO);
        assert!(body.is_settled());

        body.set_position(Vec2::new(5.0, 5.0));
        assert!(!body.is_settled());
        body.update(1.0 / 60.0, Vec2::ZERO);
        // Same sequence the controller runs after resolving contacts.
        body.update_aggregate();
        assert!(
            (body.position() - Vec2::new(5.0, 5.0)).length() < EPS,
            "position = {}",
            body.position()
        );
        assert!(body.contains(Vec2::new(5.2, 5.1)));
        assert!(body.is_settled());
    }

    #[test]
    fn test_with_position_moves_outline() {
        let body = Body::new(&unit_square(), 1.0)
            .unwrap()
            .with_position(Vec2::new(4.0, 2.0));
        assert!((body.position() - Vec2::new(4.0, 2.0)).length() < EPS);
        assert!(body.contains(Vec2::new(4.2, 2.1)));
        assert!(!body.contains(Vec2::ZERO));
        assert!(body.aabb().contains(Vec2::new(4.5, 2.5)));
    }

    #[test]
    fn test_rotate_shape_recovers_angle() {
        let mut body = Body::new(&Shape::regular_polygon(6, 1.0).unwrap(), 1.0).unwrap();
        rotate_point_masses(&mut body, 0.3);
        body.rotate_shape();
        assert!((body.angle() - 0.3).abs() < EPS, "angle = {}", body.angle());
        for (current, pm) in body.current_shape().points().iter().zip(body.point_masses()) {
            assert!((*current - pm.position).length() < EPS);
        }
    }

    #[test]
    fn test_rotate_shape_unwraps_near_pi() {
        let mut body = Body::new(&Shape::regular_polygon(4, 1.0).unwrap(), 1.0).unwrap();
        let base_angle = PI - 0.01;
        rotate_point_masses(&mut body, base_angle);
        // Push one point across the seam: its raw angle becomes about -π + 0.02.
        let center = body.position();
        let base = body.base_shape.points()[2];
        body.point_masses[2].position = center + base.rotated(base_angle + 0.03);

        body.rotate_shape();
        let expected = base_angle + 0.03 / 4.0;
        assert!(
            (wrap_angle(body.angle() - expected)).abs() < EPS,
            "angle = {}, expected {}",
            body.angle(),
            expected
        );
    }

    #[test]
    fn test_rotate_shape_is_continuous() {
        let mut body = Body::new(&Shape::regular_polygon(5, 1.0).unwrap(), 1.0).unwrap();
        rotate_point_masses(&mut body, 3.0);
        body.rotate_shape();
        assert!((body.angle() - 3.0).abs() < EPS);

        rotate_point_masses(&mut body, 3.3);
        body.rotate_shape();
        assert!(
            (body.angle() - 3.3).abs() < EPS,
            "angle must not jump by 2π: {}",
            body.angle()
        );
    }

    #[test]
    fn test_contains_either_winding() {
        let cw = Body::new(&unit_square(), 1.0).unwrap();
        let mut points = unit_square().points().to_vec();
        points.reverse();
        let ccw = Body::new(&Shape::from_points(points).unwrap(), 1.0).unwrap();

        for body in [&cw, &ccw] {
            assert!(body.contains(Vec2::new(0.1, 0.2)));
            assert!(body.contains(Vec2::new(-0.45, -0.45)));
            assert!(!body.contains(Vec2::new(0.6, 0.0)));
            assert!(!body.contains(Vec2::new(-2.0, 0.0)));
        }
    }

    #[test]
    fn test_edge_normals_point_outward() {
        let cw = Body::new(&unit_square(), 1.0).unwrap();
        let mut points = unit_square().points().to_vec();
        points.reverse();
        let ccw = Body::new(&Shape::from_points(points).unwrap(), 1.0).unwrap();

        for body in [&cw, &ccw] {
            let closest = body.closest_point(Vec2::new(0.0, 0.4));
            assert!((closest.hit.normal - Vec2::Y).length() < EPS, "{:?}", closest);
            assert!((closest.hit.distance - 0.1).abs() < EPS);
            assert!((closest.hit.point - Vec2::new(0.0, 0.5)).length() < EPS);
        }
    }

    #[test]
    fn test_closest_point_on_edge_clamps() {
        let body = Body::new(&unit_square(), 1.0).unwrap();
        // Edge 0 runs from (-0.5, 0.5) to (0.5, 0.5).
        let before = body.closest_point_on_edge(Vec2::new(-1.5, 0.5), 0);
        assert_eq!(before.edge_distance, 0.0);
        assert!((before.point - Vec2::new(-0.5, 0.5)).length() < EPS);
        assert!((before.distance - 1.0).abs() < EPS);

        let past = body.closest_point_on_edge(Vec2::new(1.5, 1.5), 0);
        assert_eq!(past.edge_distance, 1.0);
        assert!((past.point - Vec2::new(0.5, 0.5)).length() < EPS);

        let inside = body.closest_point_on_edge_squared(Vec2::new(0.25, 0.0), 0);
        assert!((inside.edge_distance - 0.75).abs() < EPS);
        assert!((inside.distance - 0.25).abs() < EPS, "squared distance");
    }

    #[test]
    fn test_closest_point_mass() {
        let body = Body::new(&unit_square(), 1.0).unwrap();
        let (index, distance) = body.closest_point_mass(Vec2::new(0.6, -0.6));
        assert_eq!(body.point_masses()[index].position, Vec2::new(0.5, -0.5));
        assert!((distance - (0.02f32).sqrt()).abs() < EPS);
    }

    #[test]
    fn test_aabb_covers_projected_motion() {
        let mut body = Body::new(&unit_square(), 1.0)
            .unwrap()
            .with_velocity(Vec2::new(60.0, 0.0))
            .with_damping(1.0);
        body.update(1.0 / 60.0, Vec2::ZERO);
        // After the step the box spans from the new position to one more step ahead.
        assert!((body.aabb().min.x - 0.5).abs() < EPS, "{:?}", body.aabb());
        assert!((body.aabb().max.x - 2.5).abs() < EPS, "{:?}", body.aabb());
    }

    #[test]
    fn test_damping_scales_velocity() {
        let mut body = Body::new(&unit_square(), 1.0)
            .unwrap()
            .with_velocity(Vec2::new(1.0, 0.0));
        body.update(0.1, Vec2::ZERO);
        assert!((body.velocity().x - DEFAULT_DAMPING).abs() < 1e-6);
    }

    #[test]
    fn test_gravity_accelerates_dynamic_body() {
        let mut body = Body::new(&unit_square(), 2.0).unwrap().with_damping(1.0);
        body.update(0.5, Vec2::new(0.0, -10.0));
        assert!((body.velocity().y + 5.0).abs() < EPS, "v = {}", body.velocity());
        assert!((body.position().y + 2.5).abs() < EPS, "p = {}", body.position());
    }

    #[test]
    fn test_shape_springs_pull_point_back() {
        let mut body = Body::new_spring(&unit_square(), 1.0, 0.0, 0.0, 100.0, 0.0).unwrap();
        let rest = body.point_masses()[1].position;
        body.point_masses_mut()[1].position = rest + Vec2::new(0.3, 0.0);
        body.update(1.0 / 60.0, Vec2::ZERO);

        let pm = body.point_masses()[1];
        assert!(pm.velocity.x < 0.0, "displaced point must move back: {}", pm.velocity);
    }

    #[test]
    fn test_edge_spring_restores_length() {
        let mut body = Body::new_spring(&unit_square(), 1.0, 200.0, 0.0, 0.0, 0.0).unwrap();
        let spring = body.springs()[0];
        let a = body.point_masses()[spring.a];
        body.point_masses_mut()[spring.a].position = a.position + Vec2::new(-0.5, 0.0);

        let stretched_a = body.point_masses()[spring.a];
        let b = body.point_masses()[spring.b];
        let force = spring.force(&stretched_a, &b);
        assert!(force.dot(stretched_a.position - b.position) < 0.0);
    }

    #[test]
    fn test_internal_masses_and_springs() {
        let mut plain = Body::new(&unit_square(), 1.0).unwrap();
        assert_eq!(
            plain.add_internal_mass(Vec2::ZERO, 1.0),
            Err(KinematicsError::NotSpringBody)
        );

        let mut body = Body::new_spring(&unit_square(), 1.0, 10.0, 0.1, 0.0, 0.0).unwrap();
        let center = body.add_internal_mass(Vec2::ZERO, 1.0).unwrap();
        assert_eq!(center, 4);
        for corner in 0..4 {
            body.add_spring(corner, center, 10.0, 0.1).unwrap();
        }
        assert_eq!(body.springs().len(), 8);
        assert!((body.springs()[4].rest_length - (0.5f32).sqrt()).abs() < EPS);
        assert_eq!(
            body.add_spring(0, 9, 1.0, 0.0),
            Err(KinematicsError::PointMassOutOfRange { index: 9, count: 5 })
        );

        body.update(1.0 / 60.0, Vec2::ZERO);
        let internal = body.spring_set().unwrap().internal_masses()[0];
        assert!(internal.position.length() < EPS, "balanced center stays put");
    }

    #[test]
    fn test_pressure_inflates() {
        let mut body = Body::new_pressure(
            &Shape::regular_polygon(8, 1.0).unwrap(),
            1.0,
            10.0,
            0.0,
            0.0,
            0.0,
            0.0,
        )
        .unwrap();
        body.update(1.0 / 60.0, Vec2::ZERO);
        for pm in body.point_masses() {
            let outward = pm.position - body.position();
            assert!(pm.velocity.dot(outward) > 0.0, "pressure pushes outward");
        }
    }

    #[test]
    fn test_apply_force_off_center_rotates_clockwise() {
        let mut body = Body::new(&unit_square(), 1.0).unwrap().with_damping(1.0);
        body.apply_force(Vec2::new(0.0, 0.5), Vec2::new(4.0, 0.0));

        let forces: Vec<Vec2> = body.point_masses().iter().map(|pm| pm.force).collect();
        assert!(
            forces.iter().any(|f| (*f - forces[0]).length() > EPS),
            "torque must spread unequal forces: {forces:?}"
        );
        assert!((body.force() - Vec2::new(4.0, 0.0)).length() < EPS);

        for _ in 0..10 {
            body.update(1.0 / 60.0, Vec2::ZERO);
        }
        assert!(body.angle() < 0.0, "push above center turns clockwise: {}", body.angle());
        assert!(body.velocity().x > 0.0);
    }

    #[test]
    fn test_apply_force_translates() {
        let mut body = Body::new(&unit_square(), 1.0).unwrap().with_damping(1.0);
        body.apply_force(body.position(), Vec2::new(4.0, 0.0));
        assert!((body.force() - Vec2::new(4.0, 0.0)).length() < EPS);
        body.update(0.5, Vec2::ZERO);
        assert!(body.velocity().x > 0.0);
        assert!(body.velocity().y.abs() < EPS);
    }
}
