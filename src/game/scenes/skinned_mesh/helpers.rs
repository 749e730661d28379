use glam::{Mat4, Vec4};
use skinning::{Pose, Skeleton};

use crate::engine::gizmos::{GizmoVertex, GizmosRenderer};

bitflags::bitflags! {
    /// Which debug helpers are drawn over the scene.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct HelperFlags: u8 {
        const AXES = 1 << 0;
        const SKELETON = 1 << 1;
    }
}

impl Default for HelperFlags {
    fn default() -> Self {
        Self::all()
    }
}

pub const AXES_SIZE: f32 = 10.0;

const BONE_COLOR: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
const PARENT_COLOR: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);

/// A line from every bone to its parent. The bone end is blue, the parent end green.
pub fn skeleton_lines(skeleton: &Skeleton, pose: &Pose, model: Mat4) -> Vec<GizmoVertex> {
    skeleton
        .bones()
        .iter()
        .zip(&pose.bones)
        .filter(|(bone, _)| !bone.is_root())
        .filter_map(|(bone, matrix)| {
            let parent = pose.bones.get(bone.parent as usize)?;
            Some([
                GizmoVertex::new((model * *matrix).w_axis.truncate(), BONE_COLOR),
                GizmoVertex::new((model * *parent).w_axis.truncate(), PARENT_COLOR),
            ])
        })
        .flatten()
        .collect()
}

/// Split the enabled helpers into lines hidden by geometry and lines drawn on top.
pub fn helper_lines(
    flags: HelperFlags,
    skeleton: &Skeleton,
    pose: &Pose,
) -> (Vec<GizmoVertex>, Vec<GizmoVertex>) {
    let depth_tested = if flags.contains(HelperFlags::AXES) {
        GizmosRenderer::create_axis(Mat4::IDENTITY, AXES_SIZE)
    } else {
        Vec::new()
    };

    let overlay = if flags.contains(HelperFlags::SKELETON) {
        skeleton_lines(skeleton, pose, Mat4::IDENTITY)
    } else {
        Vec::new()
    };

    (depth_tested, overlay)
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;

    #[test]
    fn one_line_per_child_bone() {
        let skeleton = Skeleton::chain(3, 1.0).unwrap();
        let pose = Pose::rest(&skeleton);

        let lines = skeleton_lines(&skeleton, &pose, Mat4::IDENTITY);
        assert_eq!(lines.len(), 3 * 2);

        // First child sits at the middle of the chain, its parent at the bottom.
        assert!(lines[0].position().abs_diff_eq(Vec3::new(0.0, -0.5, 0.0), 1e-6));
        assert!(lines[1].position().abs_diff_eq(Vec3::new(0.0, -1.5, 0.0), 1e-6));
        assert_eq!(lines[0].color(), BONE_COLOR);
        assert_eq!(lines[1].color(), PARENT_COLOR);
    }

    #[test]
    fn lines_follow_the_pose() {
        let skeleton = Skeleton::chain(1, 5.0).unwrap();
        let rotations = [Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)];
        let pose = skinning::generate_pose(&skeleton, &rotations);

        let lines = skeleton_lines(&skeleton, &pose, Mat4::IDENTITY);
        // Rotating the root a quarter turn about X swings the tip from +Y to +Z.
        assert!(lines[0].position().abs_diff_eq(Vec3::new(0.0, -2.5, 5.0), 1e-5));
    }

    #[test]
    fn disabled_helpers_produce_nothing() {
        let skeleton = Skeleton::chain(1, 5.0).unwrap();
        let pose = Pose::rest(&skeleton);

        let (depth_tested, overlay) = helper_lines(HelperFlags::empty(), &skeleton, &pose);
        assert!(depth_tested.is_empty());
        assert!(overlay.is_empty());

        let (depth_tested, overlay) = helper_lines(HelperFlags::AXES, &skeleton, &pose);
        assert_eq!(depth_tested.len(), 6);
        assert!(overlay.is_empty());
    }
}
