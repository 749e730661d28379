use glam::{Mat4, Quat, Vec3};

/// Rest placement of a bone relative to its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Rotation is applied first, so a child offset swings around the parent's origin.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_stack_along_a_chain() {
        let root = Transform::from_translation(Vec3::NEG_Y * 2.5).to_mat4();
        let child = Transform::from_translation(Vec3::Y * 5.0).to_mat4();

        assert_eq!(root * child, Mat4::from_translation(Vec3::Y * 2.5));
        assert_eq!(Transform::default().to_mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn rotation_turns_the_offset() {
        let quarter_turn = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        let bone = Transform::new(Vec3::Y, quarter_turn).to_mat4();

        // The child offset is turned onto +Z before the bone offset is added.
        let tip = bone.transform_point3(Vec3::Y);
        assert!(tip.abs_diff_eq(Vec3::new(0.0, 1.0, 1.0), 1e-6), "{tip}");
    }
}
