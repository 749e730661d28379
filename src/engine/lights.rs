use glam::{Vec3, Vec4};

/// Convert a single sRGB encoded channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// Convert a `0xRRGGBB` color to linear RGB.
pub fn color_from_hex(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB.
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    /// Linear RGB.
    pub color: Vec3,
    pub intensity: f32,
    /// Distance at which the light reaches zero. `0.0` means no cutoff.
    pub distance: f32,
    pub decay: f32,
    pub position: Vec3,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: color_from_hex(0xFF9000),
            intensity: 0.5,
            distance: 10.0,
            decay: 2.0,
            position: Vec3::new(1.0, -0.5, 1.0),
        }
    }
}

impl PointLight {
    /// How much of the light reaches a point `distance` units away.
    pub fn attenuation(&self, distance: f32) -> f32 {
        attenuation(distance, self.distance, self.decay)
    }
}

/// Same falloff as `point_attenuation` in the mesh shader.
pub fn attenuation(distance: f32, cutoff: f32, decay: f32) -> f32 {
    if cutoff > 0.0 && decay > 0.0 {
        (1.0 - distance / cutoff).clamp(0.0, 1.0).powf(decay)
    } else {
        1.0
    }
}

#[derive(Clone, Copy, Debug, Default, bytemuck::NoUninit)]
#[repr(C)]
pub struct LightsUniform {
    /// rgb = color * intensity
    pub ambient: Vec4,
    /// rgb = color * intensity
    pub point_color: Vec4,
    /// xyz = position, w = cutoff distance
    pub point_position: Vec4,
    /// x = decay
    pub point_params: Vec4,
}

impl LightsUniform {
    pub fn new(ambient: &AmbientLight, point: &PointLight) -> Self {
        Self {
            ambient: (ambient.color * ambient.intensity).extend(1.0),
            point_color: (point.color * point.intensity).extend(1.0),
            point_position: point.position.extend(point.distance),
            point_params: Vec4::new(point.decay, 0.0, 0.0, 0.0),
        }
    }
}
