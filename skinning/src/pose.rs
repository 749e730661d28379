use glam::{Mat4, Quat, Vec3};

use crate::{SkinInfluence, Skeleton, Transform};

/// Model space matrices for every bone of a [Skeleton], in skeleton order.
#[derive(Clone, Debug, Default)]
pub struct Pose {
    pub bones: Vec<Mat4>,
}

impl Pose {
    /// The pose of the skeleton with every bone at its rest transform.
    pub fn rest(skeleton: &Skeleton) -> Self {
        generate_pose(skeleton, &[])
    }

    /// Inverse of every bone matrix. Taken from the rest pose these are the inverse bind matrices.
    pub fn inverse(&self) -> Vec<Mat4> {
        self.bones.iter().map(Mat4::inverse).collect()
    }

    /// Matrices that move a vertex from bind space to its posed position.
    pub fn skinning_matrices(&self, inverse_bind: &[Mat4]) -> Vec<Mat4> {
        debug_assert_eq!(self.bones.len(), inverse_bind.len());

        self.bones
            .iter()
            .zip(inverse_bind)
            .map(|(bone, inverse)| *bone * *inverse)
            .collect()
    }

    pub fn bone_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.bones.iter().map(|m| m.transform_point3(Vec3::ZERO))
    }
}

/// Compose parent and local transforms for each bone. `local_rotations` replaces the rest rotation
/// of the bone with the same index; bones past the end of the slice keep their rest rotation.
pub fn generate_pose(skeleton: &Skeleton, local_rotations: &[Quat]) -> Pose {
    let mut bones: Vec<Mat4> = Vec::with_capacity(skeleton.len());

    for (bone_index, bone) in skeleton.bones().iter().enumerate() {
        let parent_transform = if bone.is_root() {
            Mat4::IDENTITY
        } else {
            bones[bone.parent as usize]
        };

        let rotation = local_rotations
            .get(bone_index)
            .copied()
            .unwrap_or(bone.transform.rotation);

        let local = Transform::new(bone.transform.translation, rotation).to_mat4();

        bones.push(parent_transform * local);
    }

    Pose { bones }
}

fn blend_matrix(influence: &SkinInfluence, matrices: &[Mat4]) -> Mat4 {
    influence
        .indices
        .iter()
        .zip(influence.weights)
        .filter(|(_, weight)| *weight != 0.0)
        .fold(Mat4::ZERO, |acc, (index, weight)| {
            let matrix = matrices
                .get(*index as usize)
                .copied()
                .unwrap_or(Mat4::IDENTITY);
            acc + matrix * weight
        })
}

/// Linear blend skinning of a single position on the CPU. Mirrors the skinned vertex shader.
pub fn skin_position(position: Vec3, influence: &SkinInfluence, matrices: &[Mat4]) -> Vec3 {
    blend_matrix(influence, matrices).transform_point3(position)
}

pub fn skin_normal(normal: Vec3, influence: &SkinInfluence, matrices: &[Mat4]) -> Vec3 {
    blend_matrix(influence, matrices)
        .transform_vector3(normal)
        .normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SkinWeightCalculator;

    #[test]
    fn rest_pose_accumulates_translations() {
        let skeleton = Skeleton::chain(2, 5.0).unwrap();
        let pose = Pose::rest(&skeleton);

        let positions: Vec<Vec3> = pose.bone_positions().collect();
        assert_eq!(
            positions,
            vec![
                Vec3::new(0.0, -5.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 5.0, 0.0),
            ]
        );
    }

    #[test]
    fn rest_pose_skinning_is_identity() {
        let skeleton = Skeleton::chain(1, 5.0).unwrap();
        let rest = Pose::rest(&skeleton);
        let inverse_bind = rest.inverse();

        for matrix in rest.skinning_matrices(&inverse_bind) {
            assert!(matrix.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn child_follows_parent_rotation() {
        let skeleton = Skeleton::chain(1, 5.0).unwrap();
        let rotations = [Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)];
        let pose = generate_pose(&skeleton, &rotations);

        let tip = pose.bones[1].transform_point3(Vec3::ZERO);
        // The child sits 5 units up the root's local Y, which now points along +Z.
        assert!(tip.abs_diff_eq(Vec3::new(0.0, -2.5, 5.0), 1e-5), "{tip}");
    }

    #[test]
    fn skinned_vertices_blend_between_bones() {
        let skeleton = Skeleton::chain(1, 5.0).unwrap();
        let calculator = SkinWeightCalculator::new(5.0, 1).unwrap();
        let inverse_bind = Pose::rest(&skeleton).inverse();

        // Rotate only the upper bone; vertices at the bottom must not move.
        let pose = generate_pose(
            &skeleton,
            &[Quat::IDENTITY, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)],
        );
        let matrices = pose.skinning_matrices(&inverse_bind);

        let bottom = Vec3::new(1.0, -2.5, 0.0);
        let skinned = skin_position(bottom, &calculator.influence_for_vertex(bottom.y), &matrices);
        assert!(skinned.abs_diff_eq(bottom, 1e-5), "{skinned}");

        let top = Vec3::new(0.0, 2.5, 0.0);
        let skinned = skin_position(top, &calculator.influence_for_vertex(top.y), &matrices);
        // Fully bound to the upper bone, which sits exactly at the top, so it pivots in place.
        assert!(skinned.abs_diff_eq(top, 1e-5), "{skinned}");

        let side = Vec3::new(0.0, 2.5, 1.0);
        let normal = skin_normal(Vec3::Z, &calculator.influence_for_vertex(side.y), &matrices);
        assert!(normal.abs_diff_eq(Vec3::NEG_Y, 1e-5), "{normal}");
    }
}
