//! Contact resolution: positional correction plus normal and friction impulses.
//!
//! Each contact is resolved once, in order, against the point masses it
//! names. There is no iteration and nothing persists between steps.

use super::contact::ContactInfo;
use super::point_mass::PointMass;

/// Approach speed above which a contact counts as separating.
const SEPARATING_EPSILON: f32 = 1e-4;

/// Tunables read by [`resolve_contact`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    pub friction: f32,
    pub elasticity: f32,
    pub deep_penetration_threshold: f32,
    pub penetration_slop: f32,
}

/// What [`resolve_contact`] did with a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Positions corrected and impulses applied.
    Resolved,
    /// Positions corrected; the bodies were already moving apart.
    Separating,
    /// Deeper than the threshold; nothing was touched.
    DeepPenetration,
    /// Both sides immovable; nothing was touched.
    Immovable,
}

/// Resolve one contact between vertex `a` and the edge `b1`-`b2`.
///
/// The edge side acts as a single mass `b1.mass + b2.mass` (infinite when
/// either endpoint is) and its share of every correction is split between
/// the endpoints by `1 - edge_distance` and `edge_distance`.
pub fn resolve_contact(
    contact: &ContactInfo,
    a: &mut PointMass,
    b1: &mut PointMass,
    b2: &mut PointMass,
    params: &SolverParams,
) -> Resolution {
    if contact.penetration > params.deep_penetration_threshold {
        return Resolution::DeepPenetration;
    }

    let normal = contact.normal;
    let b1_share = 1.0 - contact.edge_distance;
    let b2_share = contact.edge_distance;

    let edge_mass = if b1.is_immovable() || b2.is_immovable() {
        f32::INFINITY
    } else {
        b1.mass + b2.mass
    };
    let inv_a = a.inv_mass();
    let inv_b = if edge_mass.is_finite() {
        1.0 / edge_mass
    } else {
        0.0
    };
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return Resolution::Immovable;
    }

    let b_velocity = (b1.velocity + b2.velocity) * 0.5;
    let relative_velocity = a.velocity - b_velocity;
    let relative_dot = relative_velocity.dot(normal);

    if contact.penetration > 0.0 {
        let (move_a, move_b) = if inv_a == 0.0 {
            (0.0, contact.penetration + params.penetration_slop)
        } else if inv_b == 0.0 {
            (contact.penetration + params.penetration_slop, 0.0)
        } else {
            let total = a.mass + edge_mass;
            (
                contact.penetration * (edge_mass / total),
                contact.penetration * (a.mass / total),
            )
        };

        if inv_a > 0.0 {
            a.position += normal * move_a;
        }
        if !b1.is_immovable() {
            b1.position -= normal * (move_b * b1_share);
        }
        if !b2.is_immovable() {
            b2.position -= normal * (move_b * b2_share);
        }
    }

    if relative_dot > SEPARATING_EPSILON {
        return Resolution::Separating;
    }

    let j = -(1.0 + params.elasticity) * relative_dot / inv_sum;
    let tangent = normal.perp();
    let f = params.friction * relative_velocity.dot(tangent) / inv_sum;
    let impulse = normal * j - tangent * f;

    a.velocity += impulse * inv_a;
    b1.velocity -= impulse * (inv_b * b1_share);
    b2.velocity -= impulse * (inv_b * b2_share);

    Resolution::Resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const EPS: f32 = 1e-5;

    fn params(elasticity: f32, friction: f32) -> SolverParams {
        SolverParams {
            friction,
            elasticity,
            deep_penetration_threshold: 0.3,
            penetration_slop: 0.001,
        }
    }

    fn floor_contact(penetration: f32, edge_distance: f32) -> ContactInfo {
        ContactInfo {
            vertex: 0,
            edge_start: 0,
            edge_end: 1,
            edge_distance,
            normal: Vec2::Y,
            point: Vec2::ZERO,
            penetration,
        }
    }

    fn ground() -> (PointMass, PointMass) {
        (
            PointMass::new(Vec2::new(-1.0, 0.0), f32::INFINITY),
            PointMass::new(Vec2::new(1.0, 0.0), f32::INFINITY),
        )
    }

    #[test]
    fn test_zero_elasticity_stops_approach() {
        let (mut b1, mut b2) = ground();
        let mut a = PointMass::new(Vec2::new(0.0, -0.05), 1.0);
        a.velocity = Vec2::new(0.0, -2.0);

        let result = resolve_contact(&floor_contact(0.05, 0.5), &mut a, &mut b1, &mut b2, &params(0.0, 0.0));
        assert_eq!(result, Resolution::Resolved);
        assert!(a.velocity.y.abs() < EPS, "no rebound expected: {}", a.velocity);
        assert!((a.position.y - 0.001).abs() < EPS, "pushed out plus slop: {}", a.position);
        assert_eq!(b1.position, Vec2::new(-1.0, 0.0));
        assert_eq!(b2.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_elasticity_above_one_adds_energy() {
        let (mut b1, mut b2) = ground();
        let mut a = PointMass::new(Vec2::ZERO, 1.0);
        a.velocity = Vec2::new(0.0, -2.0);

        resolve_contact(&floor_contact(0.01, 0.5), &mut a, &mut b1, &mut b2, &params(1.5, 0.0));
        assert!((a.velocity.y - 3.0).abs() < EPS, "rebound {}", a.velocity);
        assert!(a.velocity.y > 2.0, "rebound must exceed approach speed");
    }

    #[test]
    fn test_mass_weighted_split() {
        let mut a = PointMass::new(Vec2::ZERO, 1.0);
        let mut b1 = PointMass::new(Vec2::new(-1.0, 0.0), 1.0);
        let mut b2 = PointMass::new(Vec2::new(1.0, 0.0), 1.0);

        resolve_contact(&floor_contact(0.15, 0.5), &mut a, &mut b1, &mut b2, &params(0.5, 0.0));
        // Edge side weighs 2, vertex side 1: A moves 2/3 of the depth.
        assert!((a.position.y - 0.1).abs() < EPS, "{}", a.position);
        assert!((b1.position.y + 0.025).abs() < EPS, "{}", b1.position);
        assert!((b2.position.y + 0.025).abs() < EPS, "{}", b2.position);
    }

    #[test]
    fn test_edge_distance_weights_endpoints() {
        let mut a = PointMass::new(Vec2::ZERO, f32::INFINITY);
        let mut b1 = PointMass::new(Vec2::new(-1.0, 0.0), 1.0);
        let mut b2 = PointMass::new(Vec2::new(1.0, 0.0), 1.0);
        b1.velocity = Vec2::new(0.0, 1.0);
        b2.velocity = Vec2::new(0.0, 1.0);

        resolve_contact(&floor_contact(0.1, 0.25), &mut a, &mut b1, &mut b2, &params(0.0, 0.0));
        assert_eq!(a.position, Vec2::ZERO, "immovable vertex stays");
        assert!((b1.position.y + 0.101 * 0.75).abs() < EPS);
        assert!((b2.position.y + 0.101 * 0.25).abs() < EPS);
        assert!(b1.velocity.y < 1.0 && b2.velocity.y < 1.0);
        assert!(b1.velocity.y < b2.velocity.y, "nearer endpoint takes more of the impulse");
    }

    #[test]
    fn test_both_immovable() {
        let (mut b1, mut b2) = ground();
        let mut a = PointMass::new(Vec2::ZERO, f32::INFINITY);
        a.velocity = Vec2::new(0.0, -1.0);
        let result = resolve_contact(&floor_contact(0.1, 0.5), &mut a, &mut b1, &mut b2, &params(0.5, 0.5));
        assert_eq!(result, Resolution::Immovable);
        assert_eq!(a.position, Vec2::ZERO);
        assert!(a.velocity.is_finite());
    }

    #[test]
    fn test_separating_only_corrects_position() {
        let (mut b1, mut b2) = ground();
        let mut a = PointMass::new(Vec2::ZERO, 1.0);
        a.velocity = Vec2::new(0.5, 1.0);
        let result = resolve_contact(&floor_contact(0.05, 0.5), &mut a, &mut b1, &mut b2, &params(0.5, 0.5));
        assert_eq!(result, Resolution::Separating);
        assert_eq!(a.velocity, Vec2::new(0.5, 1.0));
        assert!(a.position.y > 0.05);
    }

    #[test]
    fn test_deep_contact_skipped() {
        let (mut b1, mut b2) = ground();
        let mut a = PointMass::new(Vec2::ZERO, 1.0);
        a.velocity = Vec2::new(0.0, -1.0);
        let before = a;
        let result = resolve_contact(&floor_contact(0.5, 0.5), &mut a, &mut b1, &mut b2, &params(0.5, 0.5));
        assert_eq!(result, Resolution::DeepPenetration);
        assert_eq!(a, before);
    }

    #[test]
    fn test_zero_penetration_does_not_move() {
        let (mut b1, mut b2) = ground();
        let mut a = PointMass::new(Vec2::ZERO, 1.0);
        resolve_contact(&floor_contact(0.0, 0.5), &mut a, &mut b1, &mut b2, &params(0.5, 0.5));
        assert_eq!(a.position, Vec2::ZERO);
        assert_eq!(a.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_friction_opposes_sliding() {
        let (mut b1, mut b2) = ground();
        let mut a = PointMass::new(Vec2::ZERO, 1.0);
        a.velocity = Vec2::new(2.0, -1.0);
        resolve_contact(&floor_contact(0.01, 0.5), &mut a, &mut b1, &mut b2, &params(0.0, 0.5));
        assert!((a.velocity.x - 1.0).abs() < EPS, "half the sliding speed removed: {}", a.velocity);
        assert!(a.velocity.y.abs() < EPS);
    }
}
