use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Instant};

use clap::Parser;
use engine::{
    input::InputState,
    renderer::{Frame, Renderer, RendererError},
    scene::Scene,
};
use game::{config::SceneConfig, scenes::skinned_mesh::SkinnedMeshScene};
use tracing::{error, info, warn};

mod engine;
mod game;

#[derive(clap::Parser)]
struct Opts {
    /// Scene config file. The built in scene is used if not specified.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial width of the window in logical pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial height of the window in logical pixels.
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Most verbose level of log messages to show.
    #[arg(long, default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("Could not create main window: {0}")]
    CreateWindow(#[from] winit::error::OsError),

    #[error(transparent)]
    Renderer(#[from] RendererError),

    #[error("Could not create scene: {0}")]
    Scene(#[from] skinning::SkinningError),
}

enum App {
    Uninitialized {
        opts: Opts,
        config: SceneConfig,
    },
    Initialized {
        window: Arc<winit::window::Window>,

        /// The renderer.
        renderer: Renderer,

        #[cfg(feature = "egui")]
        egui_integration: engine::egui_integration::EguiIntegration,

        /// State of the mouse and keyboard, reset after each frame.
        input: InputState,

        // The instant that the last frame started to render.
        last_frame_time: Instant,

        /// The scene we are currently rendering to the screen.
        scene: Box<dyn Scene>,
    },
    /// Initialization failed, the event loop is shutting down.
    Failed,
}

impl App {
    fn initialize(
        event_loop: &winit::event_loop::ActiveEventLoop,
        opts: &Opts,
        config: &SceneConfig,
    ) -> Result<Self, AppError> {
        let attributes = winit::window::WindowAttributes::default()
            .with_title("Skinned mesh")
            .with_inner_size(winit::dpi::LogicalSize::new(opts.width, opts.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let renderer = Renderer::new(Arc::clone(&window))?;

        #[cfg(feature = "egui")]
        let egui_integration = engine::egui_integration::EguiIntegration::new(event_loop, &renderer);

        let scene = Box::new(SkinnedMeshScene::new(&renderer, config)?);

        Ok(App::Initialized {
            window,
            renderer,
            #[cfg(feature = "egui")]
            egui_integration,
            input: InputState::default(),
            last_frame_time: Instant::now(),
            scene,
        })
    }
}

impl winit::application::ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        match self {
            App::Uninitialized { opts, config } => {
                event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

                match App::initialize(event_loop, opts, config) {
                    Ok(app) => {
                        *self = app;
                        info!("Application initialized!");
                    }
                    Err(err) => {
                        error!("{err}");
                        *self = App::Failed;
                        event_loop.exit();
                    }
                }
            }

            App::Initialized { .. } => {
                warn!("Application already initialized!");
            }

            App::Failed => {}
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        use winit::event::WindowEvent;

        let App::Initialized {
            window,
            renderer,
            #[cfg(feature = "egui")]
            egui_integration,
            input,
            last_frame_time,
            scene,
        } = self
        else {
            warn!("Can't process events for uninitialized application.");
            return;
        };

        if window_id != window.id() {
            return;
        }

        #[cfg(feature = "egui")]
        if egui_integration.window_event(window.as_ref(), &event) {
            input.handle_consumed_window_event(&event);
            return;
        }

        input.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(winit::dpi::PhysicalSize { width, height }) => {
                renderer.resize(width, height);
                scene.resize(renderer);

                window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let last_frame_duration = now - *last_frame_time;
                *last_frame_time = now;

                scene.update(last_frame_duration.as_secs_f32(), input);
                input.reset_current_frame();

                let output = match renderer.surface.get_texture() {
                    Ok(output) => output,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        warn!("Surface lost, reconfiguring");
                        renderer.surface.configure(&renderer.device);
                        window.request_redraw();
                        return;
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("Out of memory acquiring the surface texture");
                        event_loop.exit();
                        return;
                    }
                    Err(err) => {
                        warn!("Skipping frame: {err}");
                        window.request_redraw();
                        return;
                    }
                };

                let renderer: &Renderer = renderer;

                let mut frame = Frame {
                    queue: renderer.queue.clone(),
                    encoder: renderer.device.create_command_encoder(
                        &wgpu::CommandEncoderDescriptor {
                            label: Some("main_command_encoder"),
                        },
                    ),
                    surface: output
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default()),
                    renderer,
                };

                scene.render(&mut frame);

                #[cfg(feature = "egui")]
                egui_integration.render(
                    window.as_ref(),
                    renderer,
                    &mut frame.encoder,
                    &frame.surface,
                    last_frame_duration,
                    scene.as_mut(),
                );

                let Frame { encoder, .. } = frame;
                renderer.queue.submit(std::iter::once(encoder.finish()));

                output.present();

                window.request_redraw();
            }

            _ => {}
        }
    }
}

fn main() -> ExitCode {
    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_max_level(opts.log_level)
        .init();

    let config = match opts.config.as_deref().map(SceneConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match winit::event_loop::EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Could not create event loop: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::Uninitialized { opts, config };
    if let Err(err) = event_loop.run_app(&mut app) {
        error!("Event loop terminated: {err}");
        return ExitCode::FAILURE;
    }

    match app {
        App::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
