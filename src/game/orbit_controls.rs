use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::engine::input::{InputState, KeyCode, MouseButton};

use super::camera::Camera;

pub const DEFAULT_DAMPING_FACTOR: f32 = 0.05;

/// Keeps the polar angle away from the poles, where the view direction and up vector line up.
const POLAR_EPSILON: f32 = 0.000001;

/// Pixels panned per arrow key press.
const KEY_PAN_SPEED: f32 = 7.0;

/// Orbits a camera around a target point. Left mouse rotates, right mouse pans, the wheel zooms
/// and the arrow keys pan.
///
/// Input is collected with [OrbitControls::handle_input] and applied to the camera in
/// [OrbitControls::update], which has to be called every frame for damping to work.
#[derive(Debug)]
pub struct OrbitControls {
    pub target: Vec3,

    /// Fraction of the pending rotation and pan applied each update. `0.0` applies input
    /// immediately.
    pub damping_factor: f32,

    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,

    pub min_distance: f32,
    pub max_distance: f32,

    pub enabled: bool,

    /// Pending change of (theta, phi).
    spherical_delta: Vec2,
    /// Pending change of the distance to the target.
    scale: f32,
    /// Pending movement of the target.
    pan_offset: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            enabled: true,
            spherical_delta: Vec2::ZERO,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }
}

/// (radius, theta, phi) of `offset`. Theta is measured around Y starting at +Z, phi from +Y.
fn to_spherical(offset: Vec3) -> (f32, f32, f32) {
    let radius = offset.length();
    if radius == 0.0 {
        return (0.0, 0.0, 0.0);
    }

    let theta = offset.x.atan2(offset.z);
    let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

    (radius, theta, phi)
}

fn from_spherical(radius: f32, theta: f32, phi: f32) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    Vec3::new(
        radius * sin_phi * sin_theta,
        radius * cos_phi,
        radius * sin_phi * cos_theta,
    )
}

impl OrbitControls {
    pub fn new(target: Vec3, damping_factor: f32) -> Self {
        Self {
            target,
            damping_factor,
            ..Default::default()
        }
    }

    fn damping_enabled(&self) -> bool {
        self.damping_factor > 0.0
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.x -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.y -= angle;
    }

    /// Pan by a distance in pixels, so that the point under the cursor follows the cursor.
    fn pan(&mut self, delta: Vec2, viewport_height: f32, camera: &Camera) {
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov.to_radians() * 0.5).tan();

        let camera_matrix = camera.view_matrix().inverse();
        let right = camera_matrix.x_axis.truncate();
        let up = camera_matrix.y_axis.truncate();

        let left_distance = 2.0 * delta.x * target_distance / viewport_height;
        let up_distance = 2.0 * delta.y * target_distance / viewport_height;

        self.pan_offset += right * -left_distance + up * up_distance;
    }

    pub fn handle_input(&mut self, input: &InputState, viewport_height: f32, camera: &Camera) {
        if !self.enabled {
            return;
        }

        let viewport_height = viewport_height.max(1.0);

        if let Some(delta) = input.mouse_delta() {
            let delta = delta.as_vec2();

            if input.mouse_pressed(MouseButton::Left) {
                let delta = delta * self.rotate_speed;
                self.rotate_left(TAU * delta.x / viewport_height);
                self.rotate_up(TAU * delta.y / viewport_height);
            } else if input.mouse_pressed(MouseButton::Right) {
                self.pan(delta * self.pan_speed, viewport_height, camera);
            }
        }

        let wheel = input.wheel_delta();
        if wheel > 0.0 {
            self.scale *= self.zoom_scale();
        } else if wheel < 0.0 {
            self.scale /= self.zoom_scale();
        }

        let mut key_pan = Vec2::ZERO;
        if input.key_pressed(KeyCode::ArrowUp) {
            key_pan.y += KEY_PAN_SPEED;
        }
        if input.key_pressed(KeyCode::ArrowDown) {
            key_pan.y -= KEY_PAN_SPEED;
        }
        if input.key_pressed(KeyCode::ArrowLeft) {
            key_pan.x += KEY_PAN_SPEED;
        }
        if input.key_pressed(KeyCode::ArrowRight) {
            key_pan.x -= KEY_PAN_SPEED;
        }
        if key_pan != Vec2::ZERO {
            self.pan(key_pan * self.pan_speed, viewport_height, camera);
        }
    }

    /// Apply pending input to `camera`. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let (radius, mut theta, mut phi) = to_spherical(camera.position - self.target);

        if self.damping_enabled() {
            theta += self.spherical_delta.x * self.damping_factor;
            phi += self.spherical_delta.y * self.damping_factor;
            self.target += self.pan_offset * self.damping_factor;
        } else {
            theta += self.spherical_delta.x;
            phi += self.spherical_delta.y;
            self.target += self.pan_offset;
        }

        let phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let position = self.target + from_spherical(radius, theta, phi);
        let moved = position.distance_squared(camera.position) > 1e-10
            || camera.target != self.target;

        camera.position = position;
        camera.target = self.target;

        if self.damping_enabled() {
            self.spherical_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Vec2::ZERO;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        moved
    }

    /// The rotation of the camera relative to the target, for display.
    pub fn spherical(&self, camera: &Camera) -> (f32, f32, f32) {
        to_spherical(camera.position - self.target)
    }
}
