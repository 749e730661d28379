pub mod depth_buffer;
pub mod gizmos;
pub mod input;
pub mod lights;
pub mod material;
pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod uniform_buffer;

pub mod prelude {
    pub use super::depth_buffer::*;
    pub use super::input::*;
    pub use super::mesh::*;
    pub use super::renderer::*;
    pub use super::scene::*;
    pub use super::uniform_buffer::*;
    pub use glam::{Mat4, Quat, UVec2, Vec2, Vec3, Vec4};
}

#[cfg(feature = "egui")]
pub mod egui_integration;
