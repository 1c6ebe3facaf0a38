//! WGPU upload of the instance buffers.
//!
//! Two vertex buffers stepped per instance: transforms at shader
//! locations 2..=3, colors at 4. Locations 0 and 1 belong to the shared
//! unit-cube mesh (position, normal).

use tracing::debug;

use crate::instancing::{InstanceBuffer, InstanceColor, InstanceTransform, InstancedRenderer};
use crate::RenderAdapter;

impl InstanceTransform {
    /// Vertex attributes for the transform buffer.
    pub const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        2 => Float32x4, // position_scale
        3 => Float32x4, // rotation
    ];

    /// Instance-stepped layout.
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl InstanceColor {
    /// Vertex attributes for the color buffer.
    pub const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![
        4 => Float32x4, // rgba
    ];

    /// Instance-stepped layout.
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// One GPU buffer mirroring one [`InstanceBuffer`].
struct UploadSlot {
    buffer: wgpu::Buffer,
    capacity: usize,
    /// Generation last written; `None` forces the next upload.
    uploaded: Option<u64>,
}

impl UploadSlot {
    fn create(device: &wgpu::Device, label: &'static str, capacity: usize, stride: usize) -> Self {
        // Zero-sized vertex buffers cannot be bound
        let size = (capacity.max(1) * stride) as wgpu::BufferAddress;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, capacity, uploaded: None }
    }

    fn sync<T: bytemuck::Pod + Default>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &'static str,
        source: &InstanceBuffer<T>,
    ) -> bool {
        if source.len() != self.capacity {
            *self = Self::create(device, label, source.len(), std::mem::size_of::<T>());
        }
        if self.uploaded == Some(source.generation()) {
            return false;
        }
        if !source.is_empty() {
            queue.write_buffer(&self.buffer, 0, source.as_bytes());
        }
        self.uploaded = Some(source.generation());
        true
    }
}

/// GPU mirror of an [`InstancedRenderer`].
pub struct GpuInstanceBuffers {
    transforms: UploadSlot,
    colors: UploadSlot,
    instance_count: u32,
}

impl GpuInstanceBuffers {
    /// Creates buffers sized for the renderer's current allocation.
    #[must_use]
    pub fn new(device: &wgpu::Device, renderer: &InstancedRenderer) -> Self {
        let count = renderer.instance_count();
        Self {
            transforms: UploadSlot::create(device, "voxtoy_instance_transforms", count, InstanceTransform::SIZE),
            colors: UploadSlot::create(device, "voxtoy_instance_colors", count, InstanceColor::SIZE),
            instance_count: u32::try_from(count).unwrap_or(u32::MAX),
        }
    }

    /// Uploads every buffer whose generation moved since the last sync.
    /// Recreates buffers when the instance count changed.
    ///
    /// Returns the number of buffers written.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, renderer: &InstancedRenderer) -> usize {
        let wrote_transforms =
            self.transforms.sync(device, queue, "voxtoy_instance_transforms", renderer.transforms());
        let wrote_colors = self.colors.sync(device, queue, "voxtoy_instance_colors", renderer.colors());
        self.instance_count = u32::try_from(renderer.instance_count()).unwrap_or(u32::MAX);

        let written = usize::from(wrote_transforms) + usize::from(wrote_colors);
        if written > 0 {
            debug!(written, instances = self.instance_count, "uploaded instance buffers");
        }
        written
    }

    /// Transform vertex buffer (slot 1).
    #[must_use]
    pub fn transform_buffer(&self) -> &wgpu::Buffer {
        &self.transforms.buffer
    }

    /// Color vertex buffer (slot 2).
    #[must_use]
    pub fn color_buffer(&self) -> &wgpu::Buffer {
        &self.colors.buffer
    }

    /// Instances to draw.
    #[must_use]
    pub const fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Binds both instance buffers to a render pass at slots 1 and 2.
    pub fn bind<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(1, self.transforms.buffer.slice(..));
        pass.set_vertex_buffer(2, self.colors.buffer.slice(..));
    }
}
