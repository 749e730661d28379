use std::collections::HashSet;

use glam::{IVec2, UVec2};
use winit::{
    event::{ElementState, MouseScrollDelta, WindowEvent},
    keyboard::PhysicalKey,
};

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Pixels of a pixel based scroll that count as one line of a line based scroll.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Default)]
pub struct InputState {
    /// The current position of the mouse inside the window client area in pixels. Set to `None` If
    /// the mouse is not over the client area.
    mouse_position: Option<UVec2>,
    /// How far the mouse moved this frame, in pixels.
    mouse_delta: Option<IVec2>,

    mouse_pressed: HashSet<MouseButton>,

    key_pressed: HashSet<KeyCode>,
    key_just_pressed: HashSet<KeyCode>,

    /// Scroll this frame in lines, positive when scrolling up/away from the user.
    wheel_delta: f32,
}

impl InputState {
    pub(crate) fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } if !event.repeat => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state == ElementState::Pressed {
                        self.key_pressed.insert(key);
                        self.key_just_pressed.insert(key);
                    } else {
                        self.key_pressed.remove(&key);
                    }
                }
            }

            WindowEvent::CursorMoved {
                position: winit::dpi::PhysicalPosition { x, y },
                ..
            } => {
                let current = UVec2::new(x.max(0.0).round() as u32, y.max(0.0).round() as u32);

                if let Some(last) = self.mouse_position {
                    let delta = current.as_ivec2() - last.as_ivec2();
                    self.mouse_delta = Some(self.mouse_delta.unwrap_or_default() + delta);
                }

                self.mouse_position = Some(current);
            }

            WindowEvent::CursorLeft { .. } => self.mouse_position = None,

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition { y, .. }) => {
                        *y as f32 / PIXELS_PER_LINE
                    }
                };
                self.wheel_delta += delta;
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if state.is_pressed() {
                    self.mouse_pressed.insert(*button);
                } else {
                    self.mouse_pressed.remove(button);
                }
            }

            WindowEvent::Focused(false) => {
                // Releases are never delivered to an unfocused window.
                self.mouse_pressed.clear();
                self.key_pressed.clear();
            }

            _ => {}
        }
    }

    /// For events something else handled first. Releases still count, otherwise a button let go
    /// over a debug window would stay held.
    #[cfg_attr(not(feature = "egui"), allow(unused))]
    pub(crate) fn handle_consumed_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            }
            | WindowEvent::Focused(false) => self.handle_window_event(event),

            WindowEvent::KeyboardInput { event: key, .. } if !key.state.is_pressed() => {
                self.handle_window_event(event)
            }

            _ => {}
        }
    }

    /// Reset data being tracked per frame.
    pub(crate) fn reset_current_frame(&mut self) {
        self.key_just_pressed.clear();
        self.mouse_delta = None;
        self.wheel_delta = 0.0;
    }
}

impl InputState {
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.key_pressed.contains(&key)
    }

    pub fn key_just_pressed(&self, key: KeyCode) -> bool {
        self.key_just_pressed.contains(&key)
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    pub fn mouse_delta(&self) -> Option<IVec2> {
        self.mouse_delta
    }

    pub fn wheel_delta(&self) -> f32 {
        self.wheel_delta
    }
}

#[cfg(test)]
impl InputState {
    pub(crate) fn press_mouse(&mut self, button: MouseButton) {
        self.mouse_pressed.insert(button);
    }

    pub(crate) fn move_mouse(&mut self, delta: IVec2) {
        self.mouse_delta = Some(self.mouse_delta.unwrap_or_default() + delta);
    }

    pub(crate) fn scroll(&mut self, lines: f32) {
        self.wheel_delta += lines;
    }

    pub(crate) fn press_key(&mut self, key: KeyCode) {
        self.key_pressed.insert(key);
        self.key_just_pressed.insert(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_frame_state_is_reset() {
        let mut input = InputState::default();
        input.press_mouse(MouseButton::Left);
        input.move_mouse(IVec2::new(3, -2));
        input.scroll(1.0);
        input.press_key(KeyCode::Space);

        assert!(input.key_just_pressed(KeyCode::Space));
        assert_eq!(input.mouse_delta(), Some(IVec2::new(3, -2)));

        input.reset_current_frame();

        assert!(input.mouse_pressed(MouseButton::Left));
        assert!(input.key_pressed(KeyCode::Space));
        assert!(!input.key_just_pressed(KeyCode::Space));
        assert_eq!(input.mouse_delta(), None);
        assert_eq!(input.wheel_delta(), 0.0);
    }

    #[test]
    fn losing_focus_releases_everything() {
        let mut input = InputState::default();
        input.press_mouse(MouseButton::Right);
        input.press_key(KeyCode::ArrowUp);

        input.handle_window_event(&WindowEvent::Focused(false));

        assert!(!input.mouse_pressed(MouseButton::Right));
        assert!(!input.key_pressed(KeyCode::ArrowUp));
    }

    fn mouse_input(state: ElementState, button: MouseButton) -> WindowEvent {
        WindowEvent::MouseInput {
            // Only used to build events, never handed back to winit.
            device_id: unsafe { winit::event::DeviceId::dummy() },
            state,
            button,
        }
    }

    #[test]
    fn consumed_releases_still_release() {
        let mut input = InputState::default();
        input.press_mouse(MouseButton::Left);

        let event = mouse_input(ElementState::Released, MouseButton::Left);
        input.handle_consumed_window_event(&event);
        assert!(!input.mouse_pressed(MouseButton::Left));
    }

    #[test]
    fn consumed_presses_are_ignored() {
        let mut input = InputState::default();

        let event = mouse_input(ElementState::Pressed, MouseButton::Left);
        input.handle_consumed_window_event(&event);
        assert!(!input.mouse_pressed(MouseButton::Left));

        input.handle_window_event(&mouse_input(ElementState::Pressed, MouseButton::Left));
        assert!(input.mouse_pressed(MouseButton::Left));
    }
}
