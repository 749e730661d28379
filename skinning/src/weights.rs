use glam::Vec3;

use crate::{SkinningError, validate_chain};

/// Four bone influences for a single vertex. Only the first two slots are ever used by a linear
/// chain, the last two stay `(0, 0.0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SkinInfluence {
    pub indices: [u16; 4],
    pub weights: [f32; 4],
}

impl SkinInfluence {
    /// The bone at the bottom of the vertex's segment and its share of the vertex.
    pub fn lower_bone(&self) -> (u16, f32) {
        (self.indices[0], self.weights[0])
    }

    pub fn upper_bone(&self) -> (u16, f32) {
        (self.indices[1], self.weights[1])
    }

    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// Per-vertex skin attributes, laid out for upload as two `vec4` vertex attributes.
#[derive(Debug, Default)]
pub struct SkinAttributes {
    pub skin_indices: Vec<[u16; 4]>,
    pub skin_weights: Vec<[f32; 4]>,
}

impl SkinAttributes {
    pub fn len(&self) -> usize {
        self.skin_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skin_indices.is_empty()
    }

    pub fn get(&self, vertex_index: usize) -> Option<SkinInfluence> {
        Some(SkinInfluence {
            indices: *self.skin_indices.get(vertex_index)?,
            weights: *self.skin_weights.get(vertex_index)?,
        })
    }
}

/// Distributes vertex influence between the two bones enclosing a vertex in a chain of equally
/// sized segments stacked along +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinWeightCalculator {
    segment_height: f32,
    segment_count: usize,
}

impl SkinWeightCalculator {
    pub fn new(segment_height: f32, segment_count: usize) -> Result<Self, SkinningError> {
        validate_chain(segment_height, segment_count)?;

        Ok(Self {
            segment_height,
            segment_count,
        })
    }

    pub fn segment_height(&self) -> f32 {
        self.segment_height
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Number of bones in the chain, one more than the number of segments.
    pub fn bone_count(&self) -> usize {
        self.segment_count + 1
    }

    pub fn total_height(&self) -> f32 {
        self.segment_height * self.segment_count as f32
    }

    pub fn half_height(&self) -> f32 {
        self.total_height() * 0.5
    }

    /// Influence for a height `y` measured from the bottom of the chain.
    ///
    /// `y` is clamped to the chain, so the result is always a valid binding. The two weights are
    /// non-negative and add up to 1.
    pub fn influence(&self, y: f32) -> SkinInfluence {
        let y = if y.is_nan() {
            0.0
        } else {
            y.clamp(0.0, self.total_height())
        };

        // Index and weight both come from `t` so a boundary never lands on the wrong side.
        let t = y / self.segment_height;
        let floor = t.floor();

        let max_index = self.segment_count;
        let index = (floor as usize).min(max_index);
        let weight = (t - floor).clamp(0.0, 1.0);

        let next_index = (index + 1).min(max_index);

        SkinInfluence {
            indices: [index as u16, next_index as u16, 0, 0],
            weights: [1.0 - weight, weight, 0.0, 0.0],
        }
    }

    /// Influence for a vertex of a mesh centered on the origin, shifted so the bottom of the mesh
    /// lines up with the root bone.
    pub fn influence_for_vertex(&self, vertex_y: f32) -> SkinInfluence {
        self.influence(vertex_y + self.half_height())
    }

    pub fn compute_attributes(&self, positions: &[Vec3]) -> SkinAttributes {
        let mut attributes = SkinAttributes {
            skin_indices: Vec::with_capacity(positions.len()),
            skin_weights: Vec::with_capacity(positions.len()),
        };

        for position in positions {
            let influence = self.influence_for_vertex(position.y);
            attributes.skin_indices.push(influence.indices);
            attributes.skin_weights.push(influence.weights);
        }

        tracing::debug!(
            "Computed skin attributes for {} vertices over {} bones",
            attributes.len(),
            self.bone_count()
        );

        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_SEGMENTS;

    const EPSILON: f32 = 1e-5;

    fn single_segment() -> SkinWeightCalculator {
        SkinWeightCalculator::new(5.0, 1).unwrap()
    }

    #[test]
    fn rejects_bad_parameters() {
        assert_eq!(
            SkinWeightCalculator::new(0.0, 1),
            Err(SkinningError::InvalidSegmentHeight(0.0))
        );
        assert!(SkinWeightCalculator::new(f32::NAN, 1).is_err());
        assert_eq!(
            SkinWeightCalculator::new(1.0, 0),
            Err(SkinningError::NoSegments)
        );
        assert_eq!(
            SkinWeightCalculator::new(1.0, MAX_SEGMENTS + 1),
            Err(SkinningError::TooManySegments(MAX_SEGMENTS + 1))
        );
    }

    #[test]
    fn bottom_of_chain() {
        let influence = single_segment().influence(0.0);
        assert_eq!(influence.lower_bone(), (0, 1.0));
        assert_eq!(influence.upper_bone(), (1, 0.0));
        assert_eq!(&influence.indices[2..], &[0, 0]);
        assert_eq!(&influence.weights[2..], &[0.0, 0.0]);
    }

    #[test]
    fn just_below_the_top() {
        let calculator = SkinWeightCalculator::new(2.0, 4).unwrap();
        let influence = calculator.influence(calculator.total_height() - 1e-4);
        assert_eq!(
            influence.indices[0] as usize,
            calculator.segment_count() - 1
        );
        assert!(influence.weights[1] > 0.99);
    }

    #[test]
    fn top_of_chain_stays_in_range() {
        let calculator = SkinWeightCalculator::new(2.0, 3).unwrap();
        let influence = calculator.influence(calculator.total_height());
        assert!(influence.indices[0] as usize <= calculator.segment_count());
        assert!(influence.indices[1] as usize <= calculator.segment_count());
        assert!((influence.weight_sum() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn weights_sum_to_one() {
        let calculator = SkinWeightCalculator::new(1.5, 6).unwrap();
        let steps = 1000;
        for step in 0..=steps {
            let y = calculator.total_height() * step as f32 / steps as f32;
            let influence = calculator.influence(y);
            assert!(
                (influence.weight_sum() - 1.0).abs() < EPSILON,
                "y = {y}: {influence:?}"
            );
            assert!(influence.weights.iter().all(|w| *w >= 0.0), "y = {y}");
        }
    }

    #[test]
    fn boundaries_bind_to_their_own_bone() {
        let calculator = SkinWeightCalculator::new(0.1, 10).unwrap();
        for k in 0..=10 {
            let y = k as f32 * 0.1;
            let influence = calculator.influence(y);
            let (lower, lower_weight) = influence.lower_bone();
            let (upper, upper_weight) = influence.upper_bone();

            // The weighted bone index is where the vertex sits along the chain.
            let position = lower as f32 * lower_weight + upper as f32 * upper_weight;
            assert!(
                (position - y / 0.1).abs() < 1e-3,
                "y = {y}: {influence:?}"
            );
        }
    }

    #[test]
    fn interpolates_inside_a_segment() {
        let calculator = SkinWeightCalculator::new(2.0, 3).unwrap();
        let influence = calculator.influence(3.5);
        assert_eq!(influence.indices[..2], [1, 2]);
        assert!((influence.weights[0] - 0.25).abs() < EPSILON);
        assert!((influence.weights[1] - 0.75).abs() < EPSILON);
    }

    #[test]
    fn out_of_range_heights_are_clamped() {
        let calculator = single_segment();
        assert_eq!(calculator.influence(-3.0), calculator.influence(0.0));
        assert_eq!(calculator.influence(f32::NAN), calculator.influence(0.0));
        let above = calculator.influence(100.0);
        assert!(above.indices.iter().all(|i| *i as usize <= 1));
    }

    #[test]
    fn centered_vertices_are_shifted() {
        let calculator = single_segment();
        assert_eq!(calculator.half_height(), 2.5);
        assert_eq!(
            calculator.influence_for_vertex(-2.5),
            calculator.influence(0.0)
        );

        let middle = calculator.influence_for_vertex(0.0);
        assert!((middle.weights[0] - 0.5).abs() < EPSILON);
        assert!((middle.weights[1] - 0.5).abs() < EPSILON);
    }

    #[test]
    fn attributes_for_positions() {
        let calculator = single_segment();
        let positions = [
            Vec3::new(1.0, -2.5, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-1.0, 1.25, 0.0),
        ];

        let attributes = calculator.compute_attributes(&positions);
        assert_eq!(attributes.len(), 3);

        let top = attributes.get(2).unwrap();
        assert_eq!(top.indices, [0, 1, 0, 0]);
        assert!((top.weights[1] - 0.75).abs() < EPSILON);

        assert!(attributes.get(3).is_none());
    }
}
