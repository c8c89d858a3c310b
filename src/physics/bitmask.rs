//! Per-axis grid occupancy mask used to pre-filter broadphase pairs.

/// 32-bit occupancy mask.
///
/// Valid cell indices are `0..=32`: index `i > 0` maps to bit `i - 1` and
/// index 0 shares bit 0 with index 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitmask {
    mask: u32,
}

impl Bitmask {
    /// Largest cell index accepted by [`Bitmask::set_on`].
    pub const MAX_INDEX: usize = 32;

    pub const fn new() -> Self {
        Self { mask: 0 }
    }

    /// Mask with every bit set.
    pub const fn full() -> Self {
        Self { mask: u32::MAX }
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn clear(&mut self) {
        self.mask = 0;
    }

    #[inline]
    fn bit(index: usize) -> u32 {
        let shift = index.saturating_sub(1).min(31);
        1u32 << shift
    }

    #[inline]
    pub fn set_on(&mut self, index: usize) {
        self.mask |= Self::bit(index);
    }

    #[inline]
    pub fn set_off(&mut self, index: usize) {
        self.mask &= !Self::bit(index);
    }

    #[inline]
    pub fn is_on(&self, index: usize) -> bool {
        self.mask & Self::bit(index) != 0
    }

    /// Set every cell in `from..=to`.
    pub fn set_range(&mut self, from: usize, to: usize) {
        for i in from..=to {
            self.set_on(i);
        }
    }

    /// True when the two masks share at least one occupied cell.
    #[inline]
    pub fn overlaps(&self, other: &Bitmask) -> bool {
        self.mask & other.mask != 0
    }
}
