//! Per-cube runtime state, structure of arrays.
//!
//! Index `i` in every array is cube `i` of the Entity Store and instance
//! `i` of the renderer, for as long as a model stays loaded.

use voxtoy_shared::{Quaternion, Vec3};

/// Transient per-cube flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CubeFlags(u8);

impl CubeFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Held by the drag controller.
    pub const DRAGGED: Self = Self(1 << 0);
    /// Held by the grab controller.
    pub const GRABBED: Self = Self(1 << 1);
    /// In the live pointer highlight.
    pub const HIGHLIGHTED: Self = Self(1 << 2);
    /// In the persistent selection.
    pub const SELECTED: Self = Self(1 << 3);
    /// Instance currently shows the highlight color.
    pub const TINTED: Self = Self(1 << 4);

    /// Either controller holds the cube.
    pub const HELD: Self = Self(Self::DRAGGED.0 | Self::GRABBED.0);

    /// True if any bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True if every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the bits of `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the bits of `other`.
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Held by drag or grab.
    #[inline]
    #[must_use]
    pub const fn is_held(self) -> bool {
        self.intersects(Self::HELD)
    }
}

/// Runtime arrays for every loaded cube.
#[derive(Debug, Clone, Default)]
pub struct RuntimeState {
    /// Current center positions.
    pub positions: Vec<Vec3>,
    /// Current XYZ Euler rotations (radians).
    pub rotations: Vec<Vec3>,
    /// Linear velocity, units per frame.
    pub velocities: Vec<Vec3>,
    /// Angular velocity, radians per frame per axis.
    pub angular: Vec<Vec3>,
    /// Transient flags.
    pub flags: Vec<CubeFlags>,
}

impl RuntimeState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards everything and places one resting cube at each position.
    pub fn reset(&mut self, positions: &[Vec3]) {
        let n = positions.len();
        self.positions.clear();
        self.positions.extend_from_slice(positions);
        reset_vec(&mut self.rotations, n, Vec3::ZERO);
        reset_vec(&mut self.velocities, n, Vec3::ZERO);
        reset_vec(&mut self.angular, n, Vec3::ZERO);
        reset_vec(&mut self.flags, n, CubeFlags::NONE);
    }

    /// Resizes to `count` cubes keeping existing motion state.
    ///
    /// New cubes rest at `spawn(i)` with no rotation; all flags are cleared.
    pub fn resize_with(&mut self, count: usize, spawn: impl Fn(usize) -> Vec3) {
        let old = self.positions.len();
        self.positions.truncate(count);
        self.positions.extend((old..count).map(spawn));
        self.rotations.resize(count, Vec3::ZERO);
        self.velocities.resize(count, Vec3::ZERO);
        self.angular.resize(count, Vec3::ZERO);
        reset_vec(&mut self.flags, count, CubeFlags::NONE);
    }

    /// Number of cubes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Upload rotation of cube `index`.
    #[inline]
    #[must_use]
    pub fn quaternion(&self, index: usize) -> Quaternion {
        self.rotations
            .get(index)
            .map_or(Quaternion::IDENTITY, |r| Quaternion::from_euler(*r))
    }

    /// Stops all motion of cube `index`.
    #[inline]
    pub fn halt(&mut self, index: usize) {
        if let (Some(v), Some(w)) = (self.velocities.get_mut(index), self.angular.get_mut(index)) {
            *v = Vec3::ZERO;
            *w = Vec3::ZERO;
        }
    }

    /// Flags of cube `index`, empty when out of range.
    #[inline]
    #[must_use]
    pub fn flags(&self, index: usize) -> CubeFlags {
        self.flags.get(index).copied().unwrap_or_default()
    }

    /// True when any cube is held by a controller.
    #[must_use]
    pub fn any_held(&self) -> bool {
        self.flags.iter().any(|f| f.is_held())
    }
}

fn reset_vec<T: Copy>(v: &mut Vec<T>, n: usize, value: T) {
    v.clear();
    v.resize(n, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let mut f = CubeFlags::NONE;
        f.insert(CubeFlags::GRABBED);
        f.insert(CubeFlags::SELECTED);
        assert!(f.is_held());
        assert!(f.contains(CubeFlags::SELECTED));
        assert!(!f.contains(CubeFlags::HELD));

        f.remove(CubeFlags::GRABBED);
        assert!(!f.is_held());
        assert_eq!(f, CubeFlags::SELECTED);
    }

    #[test]
    fn test_reset_parity() {
        let mut rt = RuntimeState::new();
        rt.reset(&[Vec3::ZERO, Vec3::Y]);
        assert_eq!(rt.len(), 2);
        assert_eq!(rt.rotations.len(), 2);
        assert_eq!(rt.velocities.len(), 2);
        assert_eq!(rt.angular.len(), 2);
        assert_eq!(rt.flags.len(), 2);
    }

    #[test]
    fn test_resize_keeps_existing_positions() {
        let mut rt = RuntimeState::new();
        rt.reset(&[Vec3::new(1.0, 2.0, 3.0)]);
        rt.velocities[0] = Vec3::Y;

        rt.resize_with(3, |i| Vec3::new(i as f32, 0.5, 0.0));
        assert_eq!(rt.positions[0], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(rt.velocities[0], Vec3::Y);
        assert_eq!(rt.positions[2], Vec3::new(2.0, 0.5, 0.0));

        rt.resize_with(1, |_| Vec3::ZERO);
        assert_eq!(rt.len(), 1);
        assert_eq!(rt.flags.len(), 1);
    }
}
