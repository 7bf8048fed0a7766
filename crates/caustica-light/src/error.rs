//! Light simulation error types.

/// Errors returned for light-casting or compositing parameters that cannot
/// produce an image.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LightError {
    /// Output resolution was zero.
    #[error("resolution must be positive")]
    InvalidResolution,

    /// Fewer than one supersampling pass was requested.
    #[error("at least one supersampling pass is required")]
    InvalidPassCount,

    /// A refractive index was not positive and finite.
    #[error("refractive indices must be positive and finite, got n1={incident} n2={refracting}")]
    InvalidRefractiveIndex {
        /// Index of the medium the light arrives from.
        incident: f32,
        /// Index of the medium the light enters.
        refracting: f32,
    },

    /// Blur window was zero pixels wide.
    #[error("blur window must be at least one pixel")]
    InvalidBlurSize,
}
