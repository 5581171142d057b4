//! Error types for grid construction and compatibility checks.

/// Result type for grid operations.
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Errors that can occur when building or comparing voxel grids.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SpatialError {
    /// At least one grid dimension is zero.
    #[error("invalid grid dimensions: {}x{}x{}", shape[0], shape[1], shape[2])]
    InvalidDimensions {
        /// The rejected shape.
        shape: [usize; 3],
    },

    /// A voxel spacing is not a positive finite number.
    #[error("voxel spacing on axis {axis} must be positive and finite, got {value}")]
    InvalidSpacing {
        /// Axis index (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// The rejected spacing.
        value: f64,
    },

    /// The voxel-to-world affine cannot be inverted.
    #[error("voxel-to-world affine is singular or non-finite")]
    SingularAffine,

    /// Backing storage does not match the declared shape.
    #[error("volume data has {actual} elements, shape requires {expected}")]
    DataLengthMismatch {
        /// Number of voxels implied by the shape.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Two grids have different shapes.
    #[error("grid shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Shape of the reference grid.
        expected: [usize; 3],
        /// Shape of the candidate grid.
        actual: [usize; 3],
    },

    /// Two grids have different voxel-to-world transforms.
    #[error("grid affine transform mismatch")]
    AffineMismatch,

    /// Two grids are expressed in different physical units.
    #[error("grid unit mismatch: expected {expected}, got {actual}")]
    UnitMismatch {
        /// Unit of the reference grid.
        expected: crate::SpatialUnit,
        /// Unit of the candidate grid.
        actual: crate::SpatialUnit,
    },
}
