//! Instance records for GPU upload.

use bytemuck::{Pod, Zeroable};
use voxtoy_shared::{Color, Quaternion, Vec3};

/// Per-instance transform consumed by the vertex shader.
///
/// 16-byte aligned rows: position + uniform scale, then the rotation
/// quaternion (x, y, z, w).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    /// World position in xyz, uniform scale in w.
    pub position_scale: [f32; 4],
    /// Rotation quaternion.
    pub rotation: [f32; 4],
}

impl InstanceTransform {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Unit-scale transform.
    #[must_use]
    pub fn new(position: Vec3, rotation: Quaternion) -> Self {
        Self {
            position_scale: [position.x, position.y, position.z, 1.0],
            rotation: rotation.to_array(),
        }
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position_scale[0], self.position_scale[1], self.position_scale[2])
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quaternion::IDENTITY)
    }
}

/// Per-instance color, linear 0..1 RGBA.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceColor {
    /// RGBA.
    pub rgba: [f32; 4],
}

impl InstanceColor {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

impl From<Color> for InstanceColor {
    fn from(color: Color) -> Self {
        Self { rgba: color.to_rgba_f32() }
    }
}

impl Default for InstanceColor {
    fn default() -> Self {
        Color::WHITE.into()
    }
}
