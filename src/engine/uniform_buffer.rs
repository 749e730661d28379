use std::cell::RefCell;

use wgpu::util::DeviceExt;

use super::renderer::Renderer;

/// A single uniform value `B` living in a GPU buffer, with its own bind group.
///
/// A CPU copy is kept so callers can update part of the value and upload the whole thing.
pub struct UniformBuffer<B: bytemuck::NoUninit + Default> {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,

    data: RefCell<B>,
}

impl<B: bytemuck::NoUninit + Default> UniformBuffer<B> {
    /// Layout with a single uniform binding sized for `B`. Any number of [UniformBuffer]s can be
    /// created against the same layout.
    pub fn create_bind_group_layout(
        renderer: &Renderer,
        label: &str,
        visibility: wgpu::ShaderStages,
    ) -> wgpu::BindGroupLayout {
        renderer
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<B>() as u64),
                    },
                    count: None,
                }],
            })
    }

    pub fn new(renderer: &Renderer, label: &str, layout: &wgpu::BindGroupLayout) -> Self {
        let data = RefCell::new(B::default());

        let buffer = renderer
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&[*data.borrow()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = renderer
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });

        Self {
            buffer,
            bind_group,

            data,
        }
    }

    pub fn upload(&self, queue: &wgpu::Queue, mut f: impl FnMut(&mut B)) {
        f(&mut *self.data.borrow_mut());
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[*self.data.borrow()]),
        );
    }
}
