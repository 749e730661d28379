use glam::Quat;
use tracing::warn;

use crate::{BoneIndex, Skeleton};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumIter, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Wave {
    #[default]
    Cos,
    Sin,
}

impl Wave {
    pub fn sample(self, x: f32) -> f32 {
        match self {
            Wave::Cos => x.cos(),
            Wave::Sin => x.sin(),
        }
    }
}

/// Rotates a single bone back and forth around its local X axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneSwing {
    pub bone: BoneIndex,
    /// Peak rotation in *degrees*.
    pub amplitude_degrees: f32,
    /// Angular frequency in radians per second.
    pub angular_frequency: f32,
    pub wave: Wave,
}

impl BoneSwing {
    pub fn new(bone: BoneIndex, wave: Wave, amplitude_degrees: f32, angular_frequency: f32) -> Self {
        Self {
            bone,
            amplitude_degrees,
            angular_frequency,
            wave,
        }
    }

    /// Rotation angle in radians at `time` seconds.
    pub fn angle(&self, time: f32) -> f32 {
        (self.amplitude_degrees * self.wave.sample(self.angular_frequency * time)).to_radians()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwingAnimation {
    pub swings: Vec<BoneSwing>,
}

impl Default for SwingAnimation {
    fn default() -> Self {
        Self {
            swings: vec![
                BoneSwing::new(0, Wave::Cos, 90.0, 3.0),
                BoneSwing::new(1, Wave::Sin, 110.0, 3.0),
            ],
        }
    }
}

impl SwingAnimation {
    /// Local rotation for every bone of `skeleton` at `time` seconds. Bones without a swing keep
    /// their rest rotation. If more than one swing targets a bone, the rotations are combined.
    pub fn sample(&self, skeleton: &Skeleton, time: f32) -> Vec<Quat> {
        let mut rotations: Vec<Quat> = skeleton
            .bones()
            .iter()
            .map(|bone| bone.transform.rotation)
            .collect();

        for swing in &self.swings {
            let Some(rotation) = rotations.get_mut(swing.bone as usize) else {
                warn!(
                    "Swing targets bone {} but the skeleton only has {} bones",
                    swing.bone,
                    skeleton.len()
                );
                continue;
            };

            *rotation = Quat::from_rotation_x(swing.angle(time)) * *rotation;
        }

        rotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_swings_match_angles() {
        let animation = SwingAnimation::default();

        let root = animation.swings[0];
        assert!((root.angle(0.0) - 90.0_f32.to_radians()).abs() < 1e-6);

        let tip = animation.swings[1];
        assert_eq!(tip.angle(0.0), 0.0);

        let quarter = std::f32::consts::FRAC_PI_2 / 3.0;
        assert!((tip.angle(quarter) - 110.0_f32.to_radians()).abs() < 1e-5);
        assert!(root.angle(quarter).abs() < 1e-5);
    }

    #[test]
    fn sample_covers_every_bone() {
        let skeleton = Skeleton::chain(3, 1.0).unwrap();
        let rotations = SwingAnimation::default().sample(&skeleton, 0.0);
        assert_eq!(rotations.len(), 4);

        let expected = Quat::from_rotation_x(90.0_f32.to_radians());
        assert!(rotations[0].abs_diff_eq(expected, 1e-6));
        assert!(rotations[1].abs_diff_eq(Quat::IDENTITY, 1e-6));
        assert_eq!(rotations[2], Quat::IDENTITY);
        assert_eq!(rotations[3], Quat::IDENTITY);
    }

    #[test]
    fn swings_past_the_skeleton_are_ignored() {
        let skeleton = Skeleton::chain(1, 1.0).unwrap();
        let animation = SwingAnimation {
            swings: vec![BoneSwing::new(7, Wave::Sin, 45.0, 1.0)],
        };

        let rotations = animation.sample(&skeleton, 1.0);
        assert_eq!(rotations, vec![Quat::IDENTITY, Quat::IDENTITY]);
    }
}
