use glam::Vec3;

use crate::{SkinningError, Transform, validate_chain};

pub type BoneIndex = u32;

/// Parent index of a root bone.
pub const BONE_SENTINEL: BoneIndex = BoneIndex::MAX;

#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent: BoneIndex,
    /// Rest transform, relative to the parent.
    pub transform: Transform,
}

impl Bone {
    pub fn is_root(&self) -> bool {
        self.parent == BONE_SENTINEL
    }
}

/// Bones ordered so that every parent comes before its children.
#[derive(Clone, Debug)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    pub fn new(bones: Vec<Bone>) -> Result<Self, SkinningError> {
        for (index, bone) in bones.iter().enumerate() {
            if !bone.is_root() && bone.parent as usize >= index {
                return Err(SkinningError::ParentOutOfOrder {
                    bone: index,
                    parent: bone.parent,
                });
            }
        }

        Ok(Self { bones })
    }

    /// A strictly linear chain of `segment_count + 1` bones stacked along +Y. The root sits at the
    /// bottom of a chain centered on the origin and every bone after it is the only child of the
    /// one before.
    pub fn chain(segment_count: usize, segment_height: f32) -> Result<Self, SkinningError> {
        validate_chain(segment_height, segment_count)?;

        let half_height = segment_height * segment_count as f32 * 0.5;

        let bones = (0..=segment_count)
            .map(|index| {
                if index == 0 {
                    Bone {
                        name: String::from("root"),
                        parent: BONE_SENTINEL,
                        transform: Transform::from_translation(Vec3::NEG_Y * half_height),
                    }
                } else {
                    Bone {
                        name: format!("bone_{index}"),
                        parent: index as BoneIndex - 1,
                        transform: Transform::from_translation(Vec3::Y * segment_height),
                    }
                }
            })
            .collect();

        Self::new(bones)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn get(&self, index: BoneIndex) -> Option<&Bone> {
        self.bones.get(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_linear() {
        let skeleton = Skeleton::chain(3, 2.0).unwrap();
        assert_eq!(skeleton.len(), 4);

        let root = skeleton.get(0).unwrap();
        assert!(root.is_root());
        assert_eq!(root.transform.translation, Vec3::new(0.0, -3.0, 0.0));

        for (index, bone) in skeleton.bones().iter().enumerate().skip(1) {
            assert_eq!(bone.parent as usize, index - 1);
            assert_eq!(bone.transform.translation, Vec3::new(0.0, 2.0, 0.0));
        }
    }

    #[test]
    fn rejects_out_of_order_parents() {
        let bones = vec![
            Bone {
                name: String::from("child"),
                parent: 1,
                transform: Transform::default(),
            },
            Bone {
                name: String::from("root"),
                parent: BONE_SENTINEL,
                transform: Transform::default(),
            },
        ];

        assert_eq!(
            Skeleton::new(bones).unwrap_err(),
            SkinningError::ParentOutOfOrder { bone: 0, parent: 1 }
        );
    }

    #[test]
    fn chain_rejects_bad_parameters() {
        assert_eq!(Skeleton::chain(0, 1.0).unwrap_err(), SkinningError::NoSegments);
        assert!(Skeleton::chain(2, -1.0).is_err());
        assert_eq!(
            Skeleton::chain(crate::MAX_SEGMENTS + 1, 1.0).unwrap_err(),
            SkinningError::TooManySegments(crate::MAX_SEGMENTS + 1)
        );
    }
}
