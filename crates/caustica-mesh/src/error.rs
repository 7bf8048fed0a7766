//! Mesh construction error types.

/// Errors returned when a heightfield cannot be built from its parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// A segment count was zero.
    #[error("segment counts must be positive, got {width_segments}x{depth_segments}")]
    InvalidSegments {
        /// Segments along X.
        width_segments: u32,
        /// Segments along Z.
        depth_segments: u32,
    },

    /// A grid step (or the extent it was derived from) was not positive and finite.
    #[error("grid steps must be positive and finite, got ({step_x}, {step_z})")]
    InvalidStep {
        /// Spacing between vertices along X.
        step_x: f32,
        /// Spacing between vertices along Z.
        step_z: f32,
    },
}
