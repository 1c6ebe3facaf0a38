//! Instanced renderer implementation.

use tracing::{debug, trace};
use voxtoy_shared::{Aabb, Color, Quaternion, Ray, Vec3};

use super::buffer::InstanceBuffer;
use super::instance_data::{InstanceColor, InstanceTransform};
use crate::adapter::{FlushStats, RenderAdapter};

/// Cubes are unit boxes.
const CUBE_SIZE: f32 = 1.0;

/// CPU-side instanced renderer for the cube model.
///
/// Holds the staging copies of the transform and color buffers. A GPU
/// backend reads them through [`transforms`](Self::transforms) and
/// [`colors`](Self::colors) after each flush.
#[derive(Debug, Default)]
pub struct InstancedRenderer {
    /// Per-instance transforms.
    transforms: InstanceBuffer<InstanceTransform>,
    /// Per-instance colors.
    colors: InstanceBuffer<InstanceColor>,
    /// Statistics from the last flush.
    stats: RenderStats,
}

/// Rendering statistics for performance monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Draw calls per frame. Always 1 with a model loaded.
    pub draw_calls: u32,
    /// Instances drawn.
    pub instance_count: u32,
    /// Flushes that published a new transform generation.
    pub transform_uploads: u64,
    /// Flushes that published a new color generation.
    pub color_uploads: u64,
}

impl InstancedRenderer {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform staging buffer.
    #[must_use]
    pub const fn transforms(&self) -> &InstanceBuffer<InstanceTransform> {
        &self.transforms
    }

    /// Color staging buffer.
    #[must_use]
    pub const fn colors(&self) -> &InstanceBuffer<InstanceColor> {
        &self.colors
    }

    /// Current position of instance `index`.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.transforms.get(index).map(InstanceTransform::position)
    }

    /// Current color of instance `index`.
    #[must_use]
    pub fn color(&self, index: usize) -> Option<[f32; 4]> {
        self.colors.get(index).map(|c| c.rgba)
    }

    /// Statistics accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }
}

impl RenderAdapter for InstancedRenderer {
    fn allocate(&mut self, count: usize) {
        self.transforms.allocate(count);
        self.colors.allocate(count);
        self.stats.instance_count = u32::try_from(count).unwrap_or(u32::MAX);
        self.stats.draw_calls = u32::from(count > 0);
        debug!(count, "allocated instance slots");
    }

    fn instance_count(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    fn set_transform(&mut self, index: usize, position: Vec3, rotation: Quaternion) {
        self.transforms.write(index, InstanceTransform::new(position, rotation));
    }

    #[inline]
    fn set_color(&mut self, index: usize, color: Color) {
        self.colors.write(index, color.into());
    }

    fn flush(&mut self) -> FlushStats {
        let stats = FlushStats {
            transforms: self.transforms.flush(),
            colors: self.colors.flush(),
        };
        self.stats.transform_uploads += u64::from(stats.transforms);
        self.stats.color_uploads += u64::from(stats.colors);
        if !stats.is_idle() {
            trace!(
                transforms = stats.transforms,
                colors = stats.colors,
                generation = self.transforms.generation(),
                "flushed instance buffers"
            );
        }
        stats
    }

    fn pick_closest(&self, ray: &Ray, eye: Vec3, accept: &dyn Fn(usize) -> bool) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;

        for (index, instance) in self.transforms.as_slice().iter().enumerate() {
            if !accept(index) {
                continue;
            }
            let center = instance.position();
            if ray.intersect_aabb(&Aabb::from_center(center, CUBE_SIZE)).is_none() {
                continue;
            }
            let distance = center.distance_squared(eye);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }

        best.map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of_three() -> InstancedRenderer {
        let mut renderer = InstancedRenderer::new();
        renderer.allocate(3);
        for i in 0..3 {
            // Cubes at z = 0, -2, -4 along the view axis
            renderer.set_transform(i, Vec3::new(0.0, 0.0, -2.0 * i as f32), Quaternion::IDENTITY);
        }
        renderer.flush();
        renderer
    }

    #[test]
    fn test_renderer_creation() {
        let renderer = InstancedRenderer::new();
        assert_eq!(renderer.instance_count(), 0);
        assert_eq!(renderer.stats().draw_calls, 0);
    }

    #[test]
    fn test_single_draw_call() {
        let mut renderer = InstancedRenderer::new();
        renderer.allocate(500);
        assert_eq!(renderer.stats().draw_calls, 1);
        assert_eq!(renderer.stats().instance_count, 500);
    }

    #[test]
    fn test_flush_marks_only_written_buffers() {
        let mut renderer = row_of_three();
        renderer.set_color(1, Color::RED);
        let stats = renderer.flush();
        assert!(stats.colors);
        assert!(!stats.transforms);
        assert_eq!(renderer.color(1), Some([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_pick_prefers_nearest_to_eye() {
        let renderer = row_of_three();
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let ray = Ray::new(eye, Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(renderer.pick_closest(&ray, eye, &|_| true), Some(0));
    }

    #[test]
    fn test_pick_respects_filter() {
        let renderer = row_of_three();
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let ray = Ray::new(eye, Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(renderer.pick_closest(&ray, eye, &|i| i != 0), Some(1));
        assert_eq!(renderer.pick_closest(&ray, eye, &|_| false), None);
    }

    #[test]
    fn test_pick_miss() {
        let renderer = row_of_three();
        let eye = Vec3::new(5.0, 0.0, 10.0);
        let ray = Ray::new(eye, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(renderer.pick_closest(&ray, eye, &|_| true), None);
    }
}
