//! Narrowphase contact generation: vertices of one body inside another.

use glam::Vec2;

use super::body::Body;
use super::contact::ContactInfo;

/// Find every point mass of `vertex_body` inside `edge_body`'s polygon and
/// pair it with an edge of `edge_body`.
///
/// Edges whose outward normal opposes the vertex normal ("away" edges) are
/// preferred. A closer edge facing the same way is used instead only when
/// the best away edge is deeper than `deep_threshold`, which keeps vertices
/// that tunnelled far into a body from being pushed out through the far side.
///
/// Call with the pair in both orders to catch vertices of either body.
pub fn intersects(edge_body: &Body, vertex_body: &Body, deep_threshold: f32) -> Vec<ContactInfo> {
    let mut contacts = Vec::new();

    let vertices = vertex_body.point_masses();
    let edges = edge_body.point_masses();
    let n = vertices.len();
    let m = edges.len();
    let bounds = edge_body.aabb();
    let deep_sq = deep_threshold * deep_threshold;

    for i in 0..n {
        let pt = vertices[i].position;
        if !bounds.contains(pt) || !edge_body.contains(pt) {
            continue;
        }

        let prev = vertices[(i + n - 1) % n].position;
        let next = vertices[(i + 1) % n].position;
        let vertex_normal = ((pt - prev) + (next - pt)).perp() * vertex_body.outward_sign();

        let mut closest_away = f32::MAX;
        let mut closest_same = f32::MAX;
        let mut away: Option<ContactInfo> = None;
        let mut same: Option<ContactInfo> = None;

        for j in 0..m {
            let k = (j + 1) % m;
            if !edge_may_beat(pt, edges[j].position, edges[k].position, closest_away.max(closest_same)) {
                continue;
            }

            let hit = edge_body.closest_point_on_edge_squared(pt, j);
            let candidate = ContactInfo {
                vertex: i,
                edge_start: j,
                edge_end: k,
                edge_distance: hit.edge_distance,
                normal: hit.normal,
                point: hit.point,
                penetration: hit.distance,
            };

            if vertex_normal.dot(hit.normal) <= 0.0 {
                if hit.distance < closest_away {
                    closest_away = hit.distance;
                    away = Some(candidate);
                }
            } else if hit.distance < closest_same {
                closest_same = hit.distance;
                same = Some(candidate);
            }
        }

        let chosen = match (away, same) {
            (Some(_), Some(s)) if closest_away > deep_sq && closest_same < closest_away => s,
            (Some(a), _) => a,
            (None, Some(s)) => s,
            (None, None) => continue,
        };

        contacts.push(ContactInfo {
            penetration: chosen.penetration.sqrt(),
            ..chosen
        });
    }

    contacts
}

/// Cheap lower bound on the squared distance from `pt` to segment `a`-`b`,
/// compared against the best squared distance found so far.
#[inline]
fn edge_may_beat(pt: Vec2, a: Vec2, b: Vec2, best_sq: f32) -> bool {
    if best_sq == f32::MAX {
        return true;
    }
    let reach = pt.distance((a + b) * 0.5) - a.distance(b) * 0.5;
    reach <= 0.0 || reach * reach <= best_sq
}
