use std::ops::{Deref, DerefMut};
use std::{any, mem};

use bytemuck::Pod;

use crate::buffers::Bindable;

/// Uniform buffer mirrored on the CPU.
///
/// The mirror gets overwritten every frame (whether anything changed or not),
/// so instead of tracking writes, [`Self::flush()`] compares the mirror with
/// the last upload.
#[derive(Debug)]
pub struct UniformBuffer<T> {
    buffer: wgpu::Buffer,
    data: T,
    uploaded: Option<Vec<u8>>,
}

impl<T> UniformBuffer<T>
where
    T: Pod,
{
    pub fn new(device: &wgpu::Device, label: impl AsRef<str>, data: T) -> Self {
        let label = label.as_ref();
        let size = wgpu::util::align_to(mem::size_of::<T>(), 16);

        log::debug!(
            "Allocating uniform buffer `{label}`; ty={}, size={size}",
            any::type_name::<T>(),
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
            size: size as _,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            data,
            uploaded: None,
        }
    }

    /// Uploads the mirror, if it differs from what the GPU has got.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        let data = bytemuck::bytes_of(&self.data);

        if self.uploaded.as_deref() == Some(data) {
            return;
        }

        queue.write_buffer(&self.buffer, 0, data);
        self.uploaded = Some(data.to_vec());
    }
}

impl<T> Deref for UniformBuffer<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for UniformBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T> Bindable for UniformBuffer<T> {
    fn layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    fn resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}
