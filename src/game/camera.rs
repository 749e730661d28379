use glam::{Mat4, Vec3, Vec4};

/// A perspective camera looking at `target`, using a right-handed, Y-up coordinate system.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub const UP: Vec3 = Vec3::Y;

    pub fn new(position: Vec3, fov: f32, aspect_ratio: f32) -> Self {
        Self {
            position,
            target: Vec3::ZERO,
            fov,
            aspect_ratio,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect_ratio = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Self::UP)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn calculate_matrices(&self) -> CameraUniform {
        CameraUniform {
            projection: self.projection_matrix(),
            view: self.view_matrix(),
            position: self.position.extend(1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, bytemuck::NoUninit)]
#[repr(C)]
pub struct CameraUniform {
    pub projection: Mat4,
    pub view: Mat4,
    pub position: Vec4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_in_front_of_the_camera() {
        let camera = Camera::new(Vec3::new(1.0, 1.0, 2.0), 75.0, 16.0 / 9.0);
        let matrices = camera.calculate_matrices();

        let view_space = matrices.view.transform_point3(camera.target);
        assert!(view_space.z < 0.0);
        assert!(view_space.x.abs() < 1e-5 && view_space.y.abs() < 1e-5);

        let clip = matrices.projection * view_space.extend(1.0);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn resize_updates_aspect_ratio() {
        let mut camera = Camera::new(Vec3::Z, 75.0, 1.0);
        camera.resize(1920, 1080);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);

        // A minimized window must not produce an infinite aspect ratio.
        camera.resize(800, 0);
        assert_eq!(camera.aspect_ratio, 800.0);
    }
}
