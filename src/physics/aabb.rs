//! Axis-aligned bounding box for broadphase culling.

use glam::Vec2;

/// Axis-aligned bounding box grown incrementally with [`Aabb::add`].
///
/// A cleared box is invalid: it contains nothing until the first point is added.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
    valid: bool,
}

impl Aabb {
    /// Create a valid box from explicit corners.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
            valid: true,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Reset to the empty (invalid) state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Grow the box to include `point`.
    #[inline]
    pub fn add(&mut self, point: Vec2) {
        if self.valid {
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        } else {
            self.min = point;
            self.max = point;
            self.valid = true;
        }
    }

    /// Grow the box to include `other`.
    pub fn merge(&mut self, other: &Aabb) {
        if other.valid {
            self.add(other.min);
            self.add(other.max);
        }
    }

    /// Point containment, boundary inclusive. An invalid box contains nothing.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.valid
            && point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Test whether two boxes overlap (touching counts). Invalid boxes
    /// overlap nothing.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.valid
            && other.valid
            && self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_grows_box() {
        let mut aabb = Aabb::default();
        assert!(!aabb.is_valid());
        aabb.add(Vec2::new(1.0, 2.0));
        assert_eq!(aabb.min, Vec2::new(1.0, 2.0));
        assert_eq!(aabb.max, Vec2::new(1.0, 2.0));
        aabb.add(Vec2::new(-1.0, 5.0));
        aabb.add(Vec2::new(3.0, -4.0));
        assert_eq!(aabb.min, Vec2::new(-1.0, -4.0));
        assert_eq!(aabb.max, Vec2::new(3.0, 5.0));
    }

    #[test]
    fn test_clear_invalidates() {
        let mut aabb = Aabb::new(Vec2::ZERO, Vec2::ONE);
        assert!(aabb.contains(Vec2::splat(0.5)));
        aabb.clear();
        assert!(!aabb.is_valid());
        assert!(!aabb.contains(Vec2::ZERO));
    }

    #[test]
    fn test_contains_boundary() {
        let aabb = Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        assert!(aabb.contains(Vec2::new(1.0, 0.0)));
        assert!(aabb.contains(Vec2::new(-1.0, -1.0)));
        assert!(!aabb.contains(Vec2::new(1.01, 0.0)));
    }

    #[test]
    fn test_intersects_symmetric() {
        let boxes = [
            Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)),
            Aabb::new(Vec2::new(0.5, 0.5), Vec2::new(2.0, 2.0)),
            Aabb::new(Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0)),
            Aabb::new(Vec2::new(-5.0, -0.1), Vec2::new(5.0, 0.1)),
            Aabb::new(Vec2::new(10.0, 10.0), Vec2::new(11.0, 11.0)),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.intersects(b), b.intersects(a), "{a:?} vs {b:?}");
            }
        }
        assert!(boxes[0].intersects(&boxes[1]));
        assert!(!boxes[0].intersects(&boxes[2]));
        assert!(boxes[0].intersects(&boxes[3]));
    }

    #[test]
    fn test_cleared_box_intersects_nothing() {
        let around_origin = Aabb::new(Vec2::splat(-1.0), Vec2::splat(1.0));
        let mut cleared = Aabb::new(Vec2::ZERO, Vec2::ONE);
        cleared.clear();
        assert!(!cleared.intersects(&around_origin));
        assert!(!around_origin.intersects(&cleared));
        assert!(!cleared.intersects(&cleared));
    }

    #[test]
    fn test_size_of_normalized_corners() {
        let aabb = Aabb::new(Vec2::new(3.0, 1.0), Vec2::new(-1.0, -2.0));
        assert_eq!(aabb.size(), Vec2::new(4.0, 3.0));
    }

    #[test]
    fn test_merge() {
        let mut a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        a.merge(&Aabb::new(Vec2::new(-2.0, 0.5), Vec2::new(0.0, 3.0)));
        assert_eq!(a.min, Vec2::new(-2.0, 0.0));
        assert_eq!(a.max, Vec2::new(1.0, 3.0));
        a.merge(&Aabb::default());
        assert_eq!(a.max, Vec2::new(1.0, 3.0));
    }
}
