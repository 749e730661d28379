mod render;
mod surface;

pub use render::*;
pub use surface::*;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Could not create window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("No suitable graphics adapter found")]
    NoAdapter,

    #[error("Could not request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Window surface is not supported by the adapter")]
    UnsupportedSurface,
}
