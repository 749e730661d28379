use glam::{Vec2, Vec3};
use skinning::{Geometry, SkinAttributes};

use super::renderer::{BufferLayout, Renderer};

#[derive(Clone, Copy, Debug, bytemuck::NoUninit)]
#[repr(C)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

impl BufferLayout for Vertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
            0 => Float32x3, // position
            1 => Float32x3, // normal
            2 => Float32x2, // tex_coord
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRIBUTES,
        }
    }
}

/// A vertex bound to up to four bones.
#[derive(Clone, Copy, Debug, bytemuck::NoUninit)]
#[repr(C)]
pub struct SkinnedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
    pub skin_indices: [u16; 4],
    pub skin_weights: [f32; 4],
}

impl BufferLayout for SkinnedVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
            0 => Float32x3, // position
            1 => Float32x3, // normal
            2 => Float32x2, // tex_coord
            3 => Uint16x4, // skin_indices
            4 => Float32x4, // skin_weights
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRIBUTES,
        }
    }
}

#[derive(Default)]
pub struct Mesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl Mesh<Vertex> {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let vertices = geometry
            .positions
            .iter()
            .zip(&geometry.normals)
            .zip(&geometry.tex_coords)
            .map(|((&position, &normal), &tex_coord)| Vertex {
                position,
                normal,
                tex_coord,
            })
            .collect();

        Self {
            vertices,
            indices: geometry.indices.clone(),
        }
    }
}

impl Mesh<SkinnedVertex> {
    pub fn from_skinned_geometry(geometry: &Geometry, skin: &SkinAttributes) -> Self {
        debug_assert_eq!(geometry.vertex_count(), skin.len());

        let vertices = Mesh::<Vertex>::from_geometry(geometry)
            .vertices
            .into_iter()
            .zip(skin.skin_indices.iter().zip(&skin.skin_weights))
            .map(|(vertex, (&skin_indices, &skin_weights))| SkinnedVertex {
                position: vertex.position,
                normal: vertex.normal,
                tex_coord: vertex.tex_coord,
                skin_indices,
                skin_weights,
            })
            .collect();

        Self {
            vertices,
            indices: geometry.indices.clone(),
        }
    }
}

pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl<V: bytemuck::NoUninit> Mesh<V> {
    pub fn to_gpu(&self, renderer: &Renderer, label: &str) -> GpuMesh {
        debug_assert!(!self.vertices.is_empty(), "Uploading empty vertex buffer.");
        debug_assert!(!self.indices.is_empty(), "Uploading empty index buffer.");

        let vertex_buffer = renderer.create_buffer_init(
            &format!("{label}_vertex_buffer"),
            &self.vertices,
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = renderer.create_buffer_init(
            &format!("{label}_index_buffer"),
            &self.indices,
            wgpu::BufferUsages::INDEX,
        );

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

pub trait RenderPassMeshExt {
    fn draw_mesh(&mut self, mesh: &GpuMesh);
}

impl RenderPassMeshExt for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &GpuMesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinning::{CylinderGeometry, SkinWeightCalculator};

    #[test]
    fn vertex_layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(std::mem::size_of::<SkinnedVertex>(), 56);
        assert_eq!(
            SkinnedVertex::layout().array_stride,
            std::mem::size_of::<SkinnedVertex>() as u64
        );
    }

    #[test]
    fn skinned_mesh_carries_skin_attributes() {
        let geometry = CylinderGeometry {
            height: 5.0,
            radial_segments: 5,
            height_segments: 15,
            open_ended: true,
            ..Default::default()
        }
        .build();
        let skin = SkinWeightCalculator::new(5.0, 1)
            .unwrap()
            .compute_attributes(&geometry.positions);

        let mesh = Mesh::<SkinnedVertex>::from_skinned_geometry(&geometry, &skin);

        assert_eq!(mesh.vertices.len(), geometry.vertex_count());
        assert_eq!(mesh.indices, geometry.indices);
        for (vertex, weights) in mesh.vertices.iter().zip(&skin.skin_weights) {
            assert_eq!(&vertex.skin_weights, weights);
        }
    }
}
