use std::time::Duration;

use winit::{event::WindowEvent, event_loop::ActiveEventLoop, window::Window};

use super::{renderer::Renderer, scene::Scene};

/// Drives egui from winit events and paints its output over the frame.
pub struct EguiIntegration {
    state: egui_winit::State,
    painter: egui_wgpu::Renderer,
}

/// Everything needed to paint one egui frame.
struct PaintJob {
    primitives: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    screen: egui_wgpu::ScreenDescriptor,
}

impl EguiIntegration {
    pub fn new(event_loop: &ActiveEventLoop, renderer: &Renderer) -> Self {
        let state = egui_winit::State::new(
            egui::Context::default(),
            egui::ViewportId::default(),
            event_loop,
            None,
            None,
            None,
        );

        let painter =
            egui_wgpu::Renderer::new(&renderer.device, renderer.surface.format(), None, 1, false);

        Self { state, painter }
    }

    /// Returns true if egui used the event, in which case the scene should not see it.
    pub fn window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Build the frame time overlay and the debug panel of `scene`, then paint them on top of
    /// `view`.
    pub fn render(
        &mut self,
        window: &Window,
        renderer: &Renderer,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        frame_time: Duration,
        scene: &mut dyn Scene,
    ) {
        let job = self.run(window, renderer, |ctx| {
            frame_time_overlay(ctx, frame_time);
            scene.debug_panel(ctx);
        });

        self.paint(renderer, encoder, view, job);
    }

    fn run(
        &mut self,
        window: &Window,
        renderer: &Renderer,
        run_ui: impl FnMut(&egui::Context),
    ) -> PaintJob {
        let raw_input = self.state.take_egui_input(window);
        let output = self.state.egui_ctx().run(raw_input, run_ui);

        self.state
            .handle_platform_output(window, output.platform_output);

        let primitives = self
            .state
            .egui_ctx()
            .tessellate(output.shapes, output.pixels_per_point);

        PaintJob {
            primitives,
            textures: output.textures_delta,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: renderer.surface.size().to_array(),
                pixels_per_point: output.pixels_per_point,
            },
        }
    }

    fn paint(
        &mut self,
        renderer: &Renderer,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        job: PaintJob,
    ) {
        for (id, delta) in &job.textures.set {
            self.painter
                .update_texture(&renderer.device, &renderer.queue, *id, delta);
        }

        self.painter.update_buffers(
            &renderer.device,
            &renderer.queue,
            encoder,
            &job.primitives,
            &job.screen,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.painter.render(
                &mut render_pass.forget_lifetime(),
                &job.primitives,
                &job.screen,
            );
        }

        // Textures can only be freed once nothing in this frame refers to them.
        for id in &job.textures.free {
            self.painter.free_texture(id);
        }
    }
}

/// Frames per second in the top left corner.
fn frame_time_overlay(ctx: &egui::Context, frame_time: Duration) {
    use egui::Widget;

    egui::Area::new(egui::Id::new("frame_time")).show(ctx, |ui| {
        let fps = 1.0 / frame_time.as_secs_f64().max(f64::EPSILON);
        let text = egui::RichText::new(format!("{fps:0.1}"))
            .background_color(egui::Color32::from_rgba_premultiplied(0, 0, 0, 127))
            .color(egui::Color32::WHITE)
            .monospace();

        egui::Label::new(text)
            .wrap_mode(egui::TextWrapMode::Extend)
            .ui(ui);
    });
}
