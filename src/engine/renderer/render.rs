use std::sync::Arc;

use glam::UVec2;
use tracing::{info, warn};
use wgpu::util::DeviceExt;

use crate::engine::depth_buffer::DepthBuffer;

use super::{RendererError, surface::Surface};

/// Owns the GPU device and the window surface it presents to.
pub struct Renderer {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    pub surface: Surface,
}

/// Describes how a vertex type is laid out in a vertex buffer.
pub trait BufferLayout: Clone {
    fn layout() -> wgpu::VertexBufferLayout<'static>;
}

impl Renderer {
    pub fn new(window: Arc<winit::window::Window>) -> Result<Self, RendererError> {
        let winit::dpi::PhysicalSize { width, height } = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptionsBase {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            }))
            .ok_or(RendererError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!(
            "Using adapter: {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let format = preferred_surface_format(&surface.get_capabilities(&adapter).formats)
            .ok_or(RendererError::UnsupportedSurface)?;
        if !format.is_srgb() {
            warn!("No sRGB surface format available, using {format:?}");
        }

        let mut surface_config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or(RendererError::UnsupportedSurface)?;
        surface_config.format = format;
        surface_config.present_mode = wgpu::PresentMode::AutoVsync;

        let surface = Surface::new(surface, surface_config);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("skin_scene_device"),
                ..Default::default()
            },
            None,
        ))?;

        surface.configure(&device);

        Ok(Self {
            device,
            queue,
            surface,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = UVec2::new(width, height);
        self.surface.resize(&self.device, size);
    }

    pub fn create_buffer_init<B>(
        &self,
        label: &str,
        contents: &[B],
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer
    where
        B: bytemuck::NoUninit,
    {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(contents),
                usage,
            })
    }

    pub fn create_shader_module(&self, label: &str, source: &str) -> wgpu::ShaderModule {
        let shader_module_label = format!("{label}_shader_module");
        self.device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&shader_module_label),
                source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(source)),
            })
    }

    #[must_use]
    pub fn build_render_pipeline<'a, B>(
        &'a self,
        label: &'a str,
        module: &'a wgpu::ShaderModule,
    ) -> RenderPipelineBuilder<'a, B>
    where
        B: BufferLayout,
    {
        RenderPipelineBuilder {
            renderer: self,
            label,
            bindings: vec![],
            module,
            primitive_state: None,
            depth_compare: None,
            vertex_entry: None,
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Surface preferred for presenting: the first sRGB format, otherwise whatever comes first.
fn preferred_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|format| format.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

/// Everything the scene needs to record one frame.
pub struct Frame<'r> {
    pub queue: wgpu::Queue,

    /// The encoder to use for creating render passes.
    pub encoder: wgpu::CommandEncoder,

    /// The window surface.
    pub surface: wgpu::TextureView,

    /// The [Renderer] we belong to.
    pub renderer: &'r Renderer,
}

pub struct RenderPipelineBuilder<'a, V>
where
    V: BufferLayout,
{
    renderer: &'a Renderer,

    label: &'a str,

    bindings: Vec<&'a wgpu::BindGroupLayout>,

    module: &'a wgpu::ShaderModule,

    /// A specific primitive state, otherwise use the default.
    primitive_state: Option<wgpu::PrimitiveState>,

    /// Use depth testing (and writing) in the pipeline.
    depth_compare: Option<wgpu::CompareFunction>,

    /// Vertex shader entry point, only required if the module has more than one.
    vertex_entry: Option<&'a str>,

    _phantom: std::marker::PhantomData<V>,
}

impl<'a, V> RenderPipelineBuilder<'a, V>
where
    V: BufferLayout,
{
    pub fn with_primitive(mut self, primitive_state: wgpu::PrimitiveState) -> Self {
        self.primitive_state = Some(primitive_state);
        self
    }

    pub fn with_depth_compare(mut self, compare: wgpu::CompareFunction) -> Self {
        self.depth_compare = Some(compare);
        self
    }

    pub fn binding(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bindings.push(layout);
        self
    }

    pub fn with_vertex_entry(mut self, entry: &'a str) -> Self {
        self.vertex_entry = Some(entry);
        self
    }

    pub fn build(self) -> wgpu::RenderPipeline {
        let layout = self
            .renderer
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(self.label),
                bind_group_layouts: &self.bindings,
                push_constant_ranges: &[],
            });

        // Pipelines without a depth compare still have to match the depth attachment of the pass
        // they are used in, so they get an always-pass test.
        let depth_stencil = DepthBuffer::depth_stencil_state(
            self.depth_compare.unwrap_or(wgpu::CompareFunction::Always),
            self.depth_compare.is_some(),
        );

        self.renderer
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(self.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: self.module,
                    entry_point: self.vertex_entry,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[V::layout()],
                },
                primitive: self.primitive_state.unwrap_or_default(),
                depth_stencil: Some(depth_stencil),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: self.module,
                    entry_point: None,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.renderer.surface.format(),
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            })
    }
}
