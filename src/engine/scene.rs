use super::{
    input::InputState,
    renderer::{Frame, Renderer},
};

/// Something the application can show in the window. The application calls `update` and then
/// `render` once per redraw.
#[allow(unused)]
pub trait Scene {
    /// The window surface was reconfigured, `renderer.surface.size()` holds the new size.
    fn resize(&mut self, renderer: &Renderer) {}

    /// Advance by `delta_time` seconds. `input` holds what happened since the previous update.
    fn update(&mut self, delta_time: f32, input: &InputState) {}

    /// Record the commands that draw the scene into `frame`.
    fn render(&mut self, frame: &mut Frame);

    /// Add debug windows for the scene's tweakable values.
    #[cfg(feature = "egui")]
    fn debug_panel(&mut self, egui: &egui::Context) {}
}
