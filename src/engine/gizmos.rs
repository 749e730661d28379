use glam::{Mat4, Vec3, Vec4};

use super::renderer::{BufferLayout, Renderer};

#[derive(Clone, Copy, Debug, bytemuck::NoUninit)]
#[repr(C)]
pub struct GizmoVertex {
    position: Vec3,
    _padding: f32,
    color: Vec4,
}

impl GizmoVertex {
    pub fn new(position: Vec3, color: Vec4) -> Self {
        Self {
            position,
            _padding: 1.0,
            color,
        }
    }
}

#[cfg(test)]
impl GizmoVertex {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }
}

impl BufferLayout for GizmoVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const VERTEX_ATTR_ARRAY: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
            0 => Float32x4, // position
            1 => Float32x4, // color
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GizmoVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: VERTEX_ATTR_ARRAY,
        }
    }
}

/// A vertex buffer that grows to fit the lines of the current frame.
struct LineBuffer {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
}

impl LineBuffer {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            buffer: None,
            vertex_count: 0,
        }
    }

    fn write(&mut self, renderer: &Renderer, vertices: &[GizmoVertex]) {
        self.vertex_count = vertices.len() as u32;
        if vertices.is_empty() {
            return;
        }

        let size = std::mem::size_of_val(vertices) as wgpu::BufferAddress;
        let fits = self
            .buffer
            .as_ref()
            .is_some_and(|buffer| buffer.size() >= size);

        if fits {
            if let Some(buffer) = &self.buffer {
                renderer
                    .queue
                    .write_buffer(buffer, 0, bytemuck::cast_slice(vertices));
            }
        } else {
            self.buffer = Some(renderer.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: size.next_power_of_two(),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.write(renderer, vertices);
        }
    }

    fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        if self.vertex_count == 0 {
            return;
        }
        if let Some(buffer) = &self.buffer {
            render_pass.set_vertex_buffer(0, buffer.slice(..));
            render_pass.draw(0..self.vertex_count, 0..1);
        }
    }
}

/// Renders colored line lists. Depth tested lines are hidden behind geometry, overlay lines are
/// always drawn on top.
pub struct GizmosRenderer {
    depth_tested_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,

    depth_tested: LineBuffer,
    overlay: LineBuffer,
}

impl GizmosRenderer {
    pub fn new(renderer: &Renderer, camera_bind_group_layout: &wgpu::BindGroupLayout) -> Self {
        let shader = renderer.create_shader_module("gizmos", include_str!("gizmos.wgsl"));

        let primitive = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        };

        let depth_tested_pipeline = renderer
            .build_render_pipeline::<GizmoVertex>("gizmos_depth_tested", &shader)
            .binding(camera_bind_group_layout)
            .with_primitive(primitive)
            .with_depth_compare(wgpu::CompareFunction::LessEqual)
            .build();

        let overlay_pipeline = renderer
            .build_render_pipeline::<GizmoVertex>("gizmos_overlay", &shader)
            .binding(camera_bind_group_layout)
            .with_primitive(primitive)
            .build();

        Self {
            depth_tested_pipeline,
            overlay_pipeline,
            depth_tested: LineBuffer::new("gizmos_depth_tested_vertex_buffer"),
            overlay: LineBuffer::new("gizmos_overlay_vertex_buffer"),
        }
    }

    /// Upload the lines for this frame. Must be called before the render pass is started.
    pub fn prepare(
        &mut self,
        renderer: &Renderer,
        depth_tested: &[GizmoVertex],
        overlay: &[GizmoVertex],
    ) {
        self.depth_tested.write(renderer, depth_tested);
        self.overlay.write(renderer, overlay);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, camera_bind_group: &wgpu::BindGroup) {
        render_pass.set_bind_group(0, camera_bind_group, &[]);

        render_pass.set_pipeline(&self.depth_tested_pipeline);
        self.depth_tested.draw(render_pass);

        render_pass.set_pipeline(&self.overlay_pipeline);
        self.overlay.draw(render_pass);
    }

    /// Red, green and blue lines along the X, Y and Z axis of `transform`.
    pub fn create_axis(transform: Mat4, size: f32) -> Vec<GizmoVertex> {
        let zero = transform.transform_point3(Vec3::ZERO);
        [
            (Vec3::X, Vec4::new(1.0, 0.0, 0.0, 1.0)),
            (Vec3::Y, Vec4::new(0.0, 1.0, 0.0, 1.0)),
            (Vec3::Z, Vec4::new(0.0, 0.0, 1.0, 1.0)),
        ]
        .into_iter()
        .flat_map(|(axis, color)| {
            [
                GizmoVertex::new(zero, color),
                GizmoVertex::new(transform.transform_point3(axis * size), color),
            ]
        })
        .collect()
    }
}
