//! Error types for targeting and spatial queries.
//!
//! Only configuration mistakes and degenerate inputs are errors. An unreachable intercept
//! or a ray that hits nothing is a normal outcome and is reported through `Option`.

/// Errors that can occur while configuring or running a query.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum TargetingError {
    /// Grid cell size must be positive and finite.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    /// Search tolerance must be non-negative and not NaN.
    #[error("search tolerance must be non-negative, got {0}")]
    InvalidTolerance(f32),

    /// Integration time step must be positive and finite.
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f32),

    /// Projectile speed must be positive and finite.
    #[error("projectile speed must be positive and finite, got {0}")]
    InvalidProjectileSpeed(f32),

    /// Surface offset for chained casts must be positive and finite.
    #[error("surface offset must be positive and finite, got {0}")]
    InvalidSurfaceOffset(f32),

    /// An input vector or scalar contained NaN or infinity.
    #[error("non-finite value in `{0}`")]
    NonFiniteInput(&'static str),

    /// A direction vector had (near) zero length and cannot be normalized.
    #[error("direction vector has zero length")]
    DegenerateDirection,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TargetingError>;
