//! Broadphase collision detection: per-axis grid bitmasks, then AABB overlap.

use glam::Vec2;

use super::aabb::Aabb;
use super::bitmask::Bitmask;
use super::body::Body;

/// Number of grid cells along each world axis.
pub const GRID_CELLS: usize = 32;

/// The world bounds split into a `GRID_CELLS` x `GRID_CELLS` grid.
///
/// Bodies outside the bounds are clamped onto the border cells, so distant
/// bodies can share bits. The exact AABB test filters those pairs out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldGrid {
    aabb: Aabb,
    size: Vec2,
    cell: Vec2,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO)
    }
}

impl WorldGrid {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        let aabb = Aabb::new(min, max);
        let size = aabb.size();
        Self {
            aabb,
            size,
            cell: size / GRID_CELLS as f32,
        }
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn cell(&self) -> Vec2 {
        self.cell
    }

    /// X and Y occupancy masks for a box.
    pub fn bitmasks(&self, aabb: &Aabb) -> (Bitmask, Bitmask) {
        (
            axis_mask(aabb.min.x, aabb.max.x, self.aabb.min.x, self.cell.x),
            axis_mask(aabb.min.y, aabb.max.y, self.aabb.min.y, self.cell.y),
        )
    }

    /// Recompute a body's masks from its current AABB.
    pub fn update_bitmask(&self, body: &mut Body) {
        let (x, y) = self.bitmasks(body.aabb());
        body.set_bitmasks(x, y);
    }

    /// Find all pairs of bodies that may be touching.
    ///
    /// Bodies must already carry masks from [`WorldGrid::update_bitmask`].
    pub fn find_pairs(&self, world: &hecs::World) -> Vec<(hecs::Entity, hecs::Entity)> {
        let mut query = world.query::<&Body>();
        let entries: Vec<(hecs::Entity, &Body)> = query.iter().collect();

        let mut pairs = Vec::new();
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let (entity_a, body_a) = entries[i];
                let (entity_b, body_b) = entries[j];
                if is_candidate(body_a, body_b) {
                    pairs.push((entity_a, entity_b));
                }
            }
        }
        pairs
    }
}

/// Not both static, sharing a grid row or column, and overlapping AABBs.
pub fn is_candidate(a: &Body, b: &Body) -> bool {
    if a.is_static() && b.is_static() {
        return false;
    }
    if !a.bitmask_x().overlaps(&b.bitmask_x()) && !a.bitmask_y().overlaps(&b.bitmask_y()) {
        return false;
    }
    a.aabb().intersects(b.aabb())
}

fn axis_mask(min: f32, max: f32, origin: f32, cell: f32) -> Bitmask {
    // A zero-extent world axis cannot be gridded; let the AABB test decide.
    if !(cell > 0.0 && cell.is_finite()) {
        return Bitmask::full();
    }
    let mut mask = Bitmask::new();
    mask.set_range(cell_index(min, origin, cell), cell_index(max, origin, cell));
    mask
}

#[inline]
fn cell_index(value: f32, origin: f32, cell: f32) -> usize {
    let index = ((value - origin) / cell).floor();
    index.clamp(0.0, Bitmask::MAX_INDEX as f32) as usize
}
