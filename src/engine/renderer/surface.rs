use glam::UVec2;

pub struct Surface {
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
}

impl Surface {
    pub fn new(
        surface: wgpu::Surface<'static>,
        surface_config: wgpu::SurfaceConfiguration,
    ) -> Self {
        Self {
            surface,
            surface_config,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.surface_config.width, self.surface_config.height)
    }

    pub fn configure(&self, device: &wgpu::Device) {
        self.surface.configure(device, &self.surface_config);
    }

    /// Reconfigure the surface for a new size. A zero sized surface can not be configured, so the
    /// size is clamped to at least 1x1.
    pub fn resize(&mut self, device: &wgpu::Device, size: UVec2) {
        let size = size.max(UVec2::ONE);
        self.surface_config.width = size.x;
        self.surface_config.height = size.y;
        self.configure(device);
    }

    pub fn get_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }
}
