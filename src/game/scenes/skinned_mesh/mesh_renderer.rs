use glam::Mat4;
use skinning::MAX_SEGMENTS;
use tracing::warn;

use crate::engine::{
    lights::{AmbientLight, LightsUniform, PointLight},
    material::{Material, ObjectUniform},
    prelude::*,
};

const MAX_BONES: usize = MAX_SEGMENTS + 1;

#[derive(Clone, Copy, Debug, bytemuck::NoUninit)]
#[repr(C)]
pub struct BonesUniform {
    pub matrices: [Mat4; MAX_BONES],
}

impl Default for BonesUniform {
    fn default() -> Self {
        Self {
            matrices: [Mat4::IDENTITY; MAX_BONES],
        }
    }
}

/// A mesh on the GPU with its own transform and material.
pub struct RenderObject {
    mesh: GpuMesh,
    object: UniformBuffer<ObjectUniform>,
    /// Only set for skinned meshes.
    bones: Option<UniformBuffer<BonesUniform>>,
    pub visible: bool,
}

impl RenderObject {
    pub fn set_transform_and_material(
        &self,
        queue: &wgpu::Queue,
        transform: Mat4,
        material: &Material,
    ) {
        self.object.upload(queue, |object| {
            *object = ObjectUniform::new(transform, material);
        });
    }

    /// Upload the skinning matrices, one per bone. Does nothing for static meshes.
    pub fn set_bone_matrices(&self, queue: &wgpu::Queue, matrices: &[Mat4]) {
        let Some(ref bones) = self.bones else {
            return;
        };

        if matrices.len() > MAX_BONES {
            warn!(
                "Only {MAX_BONES} of {} bone matrices are uploaded",
                matrices.len()
            );
        }

        bones.upload(queue, |bones| {
            for (target, matrix) in bones.matrices.iter_mut().zip(matrices) {
                *target = *matrix;
            }
        });
    }
}

/// Renders static and skinned meshes lit by a single ambient and a single point light.
pub struct MeshRenderer {
    object_bind_group_layout: wgpu::BindGroupLayout,
    bones_bind_group_layout: wgpu::BindGroupLayout,

    lights: UniformBuffer<LightsUniform>,

    static_pipeline: wgpu::RenderPipeline,
    skinned_pipeline: wgpu::RenderPipeline,
}

impl MeshRenderer {
    pub fn new(renderer: &Renderer, camera_bind_group_layout: &wgpu::BindGroupLayout) -> Self {
        let shader =
            renderer.create_shader_module("mesh_renderer", include_str!("mesh_renderer.wgsl"));

        let lights_bind_group_layout = UniformBuffer::<LightsUniform>::create_bind_group_layout(
            renderer,
            "lights_bind_group_layout",
            wgpu::ShaderStages::FRAGMENT,
        );
        let object_bind_group_layout = UniformBuffer::<ObjectUniform>::create_bind_group_layout(
            renderer,
            "object_bind_group_layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let bones_bind_group_layout = UniformBuffer::<BonesUniform>::create_bind_group_layout(
            renderer,
            "bones_bind_group_layout",
            wgpu::ShaderStages::VERTEX,
        );

        let lights = UniformBuffer::new(renderer, "lights", &lights_bind_group_layout);

        let primitive = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        };

        let static_pipeline = renderer
            .build_render_pipeline::<Vertex>("mesh_renderer_static", &shader)
            .with_primitive(primitive)
            .with_depth_compare(wgpu::CompareFunction::Less)
            .with_vertex_entry("vertex_static")
            .binding(camera_bind_group_layout)
            .binding(&lights_bind_group_layout)
            .binding(&object_bind_group_layout)
            .build();

        let skinned_pipeline = renderer
            .build_render_pipeline::<SkinnedVertex>("mesh_renderer_skinned", &shader)
            .with_primitive(primitive)
            .with_depth_compare(wgpu::CompareFunction::Less)
            .with_vertex_entry("vertex_skinned")
            .binding(camera_bind_group_layout)
            .binding(&lights_bind_group_layout)
            .binding(&object_bind_group_layout)
            .binding(&bones_bind_group_layout)
            .build();

        Self {
            object_bind_group_layout,
            bones_bind_group_layout,
            lights,
            static_pipeline,
            skinned_pipeline,
        }
    }

    pub fn create_object(
        &self,
        renderer: &Renderer,
        label: &str,
        mesh: &Mesh<Vertex>,
    ) -> RenderObject {
        RenderObject {
            mesh: mesh.to_gpu(renderer, label),
            object: UniformBuffer::new(
                renderer,
                &format!("{label}_object"),
                &self.object_bind_group_layout,
            ),
            bones: None,
            visible: true,
        }
    }

    pub fn create_skinned_object(
        &self,
        renderer: &Renderer,
        label: &str,
        mesh: &Mesh<SkinnedVertex>,
    ) -> RenderObject {
        RenderObject {
            mesh: mesh.to_gpu(renderer, label),
            object: UniformBuffer::new(
                renderer,
                &format!("{label}_object"),
                &self.object_bind_group_layout,
            ),
            bones: Some(UniformBuffer::new(
                renderer,
                &format!("{label}_bones"),
                &self.bones_bind_group_layout,
            )),
            visible: true,
        }
    }

    pub fn set_lights(&self, queue: &wgpu::Queue, ambient: &AmbientLight, point: &PointLight) {
        self.lights.upload(queue, |lights| {
            *lights = LightsUniform::new(ambient, point);
        });
    }

    pub fn draw<'o>(
        &self,
        render_pass: &mut wgpu::RenderPass,
        camera_bind_group: &wgpu::BindGroup,
        objects: impl IntoIterator<Item = &'o RenderObject>,
    ) {
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.lights.bind_group, &[]);

        for object in objects.into_iter().filter(|object| object.visible) {
            if let Some(ref bones) = object.bones {
                render_pass.set_pipeline(&self.skinned_pipeline);
                render_pass.set_bind_group(3, &bones.bind_group, &[]);
            } else {
                render_pass.set_pipeline(&self.static_pipeline);
            }

            render_pass.set_bind_group(2, &object.object.bind_group, &[]);
            render_pass.draw_mesh(&object.mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_is_valid() {
        let module = naga::front::wgsl::parse_str(include_str!("mesh_renderer.wgsl")).unwrap();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap();

        let entry_points: Vec<&str> = module
            .entry_points
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(
            entry_points,
            vec!["vertex_static", "vertex_skinned", "fragment_main"]
        );
    }

    #[test]
    fn uniform_sizes_match_the_shader() {
        // The bone array in the shader has a fixed length.
        assert_eq!(MAX_BONES, 16);
        assert_eq!(std::mem::size_of::<BonesUniform>(), 16 * 64);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 64 * 2 + 16 * 2);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 16 * 4);
    }
}
