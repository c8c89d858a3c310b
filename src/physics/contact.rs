//! Contact data structures for collision response.

use glam::Vec2;

use super::BodyHandle;

/// A vertex of one body found inside another, as reported by the narrowphase.
///
/// Indices address point masses of the two bodies passed to
/// [`intersects`](super::narrowphase::intersects).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// Penetrating point mass of the vertex body.
    pub vertex: usize,
    /// First point mass of the edge body's contact edge.
    pub edge_start: usize,
    /// Second point mass of the edge body's contact edge.
    pub edge_end: usize,
    /// Position of the contact point along the edge in [0, 1].
    pub edge_distance: f32,
    /// Outward normal of the contact edge.
    pub normal: Vec2,
    /// Closest point on the edge.
    pub point: Vec2,
    /// Distance from the vertex to `point`.
    pub penetration: f32,
}

/// One contact recorded by the controller during a step.
///
/// `body_a` owns the penetrating vertex, `body_b` owns the edge. Records are
/// rebuilt from scratch every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub point_mass_a: usize,
    pub point_mass_b: usize,
    pub point_mass_c: usize,
    pub edge_distance: f32,
    /// Outward normal of the edge body at the contact (from B toward A).
    pub normal: Vec2,
    pub point: Vec2,
    pub penetration: f32,
}

impl CollisionInfo {
    pub fn new(vertex_body: BodyHandle, edge_body: BodyHandle, contact: ContactInfo) -> Self {
        Self {
            body_a: vertex_body,
            body_b: edge_body,
            point_mass_a: contact.vertex,
            point_mass_b: contact.edge_start,
            point_mass_c: contact.edge_end,
            edge_distance: contact.edge_distance,
            normal: contact.normal,
            point: contact.point,
            penetration: contact.penetration,
        }
    }

    /// The contact as seen by the narrowphase, without body handles.
    pub fn contact(&self) -> ContactInfo {
        ContactInfo {
            vertex: self.point_mass_a,
            edge_start: self.point_mass_b,
            edge_end: self.point_mass_c,
            edge_distance: self.edge_distance,
            normal: self.normal,
            point: self.point,
            penetration: self.penetration,
        }
    }
}
