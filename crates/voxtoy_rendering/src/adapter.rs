//! The seam between the engine and whatever draws the cubes.

use voxtoy_shared::{Color, Quaternion, Ray, Vec3};

/// Which buffers a [`RenderAdapter::flush`] actually pushed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Transform buffer was dirty and got a new generation.
    pub transforms: bool,
    /// Color buffer was dirty and got a new generation.
    pub colors: bool,
}

impl FlushStats {
    /// True when nothing was uploaded.
    #[must_use]
    pub const fn is_idle(self) -> bool {
        !self.transforms && !self.colors
    }
}

/// Instanced renderer as seen by the engine.
///
/// Instance `i` always corresponds to cube `i` of the loaded model.
/// Writes are batched; nothing is visible until [`flush`](Self::flush).
/// Out-of-range writes are ignored.
pub trait RenderAdapter {
    /// (Re)allocates exactly `count` slots. Previous contents are gone.
    fn allocate(&mut self, count: usize);

    /// Number of allocated slots.
    fn instance_count(&self) -> usize;

    /// Writes one instance transform.
    fn set_transform(&mut self, index: usize, position: Vec3, rotation: Quaternion);

    /// Writes one instance color.
    fn set_color(&mut self, index: usize, color: Color);

    /// Publishes batched writes. Called once per frame.
    fn flush(&mut self) -> FlushStats;

    /// Closest cube hit by `ray` among those `accept` lets through.
    ///
    /// Each cube is tested as a unit AABB around its current position.
    /// When several are hit, the one whose center is nearest `eye` wins.
    fn pick_closest(&self, ray: &Ray, eye: Vec3, accept: &dyn Fn(usize) -> bool) -> Option<usize>;
}
