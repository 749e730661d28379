//! Math for a bone-driven, linear blend skinned mesh.
//!
//! Nothing in here touches the GPU. The application crate uploads what these types produce.

mod animation;
mod geometry;
mod pose;
mod skeleton;
mod transform;
mod weights;

pub use animation::*;
pub use geometry::*;
pub use pose::*;
pub use skeleton::*;
pub use transform::*;
pub use weights::*;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SkinningError {
    #[error("Segment height must be a positive number, got {0}")]
    InvalidSegmentHeight(f32),

    #[error("A bone chain needs at least one segment")]
    NoSegments,

    #[error("Bone chain has {0} segments, at most {max} are supported", max = MAX_SEGMENTS)]
    TooManySegments(usize),

    #[error("Bone {bone} references parent {parent} which does not precede it")]
    ParentOutOfOrder { bone: usize, parent: BoneIndex },
}

/// Largest segment count a chain may have. Skin indices are stored as `u16`, and the shader keeps
/// its bone matrices in a fixed size uniform array of `MAX_SEGMENTS + 1` entries.
pub const MAX_SEGMENTS: usize = 15;

/// Checks shared by everything built from a segment height and count.
pub(crate) fn validate_chain(
    segment_height: f32,
    segment_count: usize,
) -> Result<(), SkinningError> {
    if !segment_height.is_finite() || segment_height <= 0.0 {
        return Err(SkinningError::InvalidSegmentHeight(segment_height));
    }
    if segment_count == 0 {
        return Err(SkinningError::NoSegments);
    }
    if segment_count > MAX_SEGMENTS {
        return Err(SkinningError::TooManySegments(segment_count));
    }
    Ok(())
}
