//! Error types for planning sessions.

use std::path::PathBuf;

use ablation_grid::SpatialError;
use ablation_raster::MarginError;
use ablation_types::TypesError;
use thiserror::Error;

use crate::overlap::MaskList;

/// Result type for volume composition.
pub type CompositeResult<T> = Result<T, CompositeError>;

/// Result type for plan and geometry files.
pub type PlanResult<T> = Result<T, PlanError>;

/// Result type for mask registration.
pub type MaskResult<T> = Result<T, MaskError>;

/// Result type for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that abort a redraw.
///
/// Needles that miss the grid are skipped, not reported here; these errors
/// mean an internal invariant did not hold.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CompositeError {
    /// The margin field of a rasterized needle could not be computed.
    #[error("margin field for needle {index} failed: {source}")]
    Margin {
        /// 1-based needle label.
        index: usize,
        /// Underlying failure.
        source: MarginError,
    },
}

/// Errors reading or writing plan and geometry files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlanError {
    /// The file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid JSON or does not have the expected fields and types.
    #[error("malformed file: {0}")]
    Json(#[from] serde_json::Error),

    /// A needle record is not a usable trajectory.
    #[error("needle {index} is invalid: {source}")]
    InvalidNeedle {
        /// 1-based position in the file.
        index: usize,
        /// Validation failure.
        source: TypesError,
    },

    /// The diameter/safezone pair is out of range or inconsistent.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[source] TypesError),
}

/// Errors registering or removing anatomical masks.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MaskError {
    /// The mask's grid does not match the session grid.
    #[error("mask '{name}' is not on the session grid: {source}")]
    Incompatible {
        /// Mask name.
        name: String,
        /// First mismatch found.
        source: SpatialError,
    },

    /// A mask with the same name is already in the list.
    #[error("a {list} mask named '{name}' is already registered")]
    Duplicate {
        /// Mask name.
        name: String,
        /// List it was added to.
        list: MaskList,
    },

    /// No mask with that name is in the list.
    #[error("no {list} mask named '{name}'")]
    NotFound {
        /// Mask name.
        name: String,
        /// List searched.
        list: MaskList,
    },
}

/// Invalid [`crate::PlanConfig`] values.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Shell border is negative or not finite.
    #[error("shell border must be finite and non-negative, got {0}")]
    InvalidShellBorder(f64),

    /// Margin epsilon is negative or not finite.
    #[error("margin epsilon must be finite and non-negative, got {0}")]
    InvalidMarginEpsilon(f64),

    /// A point tolerance is negative or not finite.
    #[error("point tolerance must be finite and non-negative, got rtol {rtol}, atol {atol}")]
    InvalidTolerance {
        /// Relative tolerance.
        rtol: f64,
        /// Absolute tolerance.
        atol: f64,
    },

    /// A needle limit of zero would forbid every insert.
    #[error("needle limit must be at least 1")]
    ZeroNeedleLimit,
}

/// Errors from session operations.
///
/// A failed operation leaves the session exactly as it was.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The operation is not allowed while an insert or update is open.
    #[error("an edit is already in progress")]
    EditInProgress,

    /// The operation needs an open edit.
    #[error("no edit is in progress")]
    NoEdit,

    /// Submit was requested before both points were marked.
    #[error("both entry and target must be set before submitting")]
    IncompleteEdit,

    /// Entry and target coincide.
    #[error("entry and target coincide")]
    DegenerateNeedle,

    /// A point is not usable as a needle endpoint.
    #[error("invalid needle: {0}")]
    InvalidNeedle(#[source] TypesError),

    /// No needle has this 1-based index.
    #[error("no needle #{index} (list has {count})")]
    NeedleIndex {
        /// Requested 1-based index.
        index: usize,
        /// Current number of needles.
        count: usize,
    },

    /// The needle list is full.
    #[error("needle limit of {limit} reached")]
    NeedleLimit {
        /// Configured maximum.
        limit: usize,
    },

    /// A geometry value was rejected.
    #[error("geometry: {0}")]
    Geometry(#[from] TypesError),

    /// A mask could not be registered or removed.
    #[error(transparent)]
    Mask(#[from] MaskError),

    /// A plan or geometry file could not be read or written.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Redrawing failed.
    #[error(transparent)]
    Composite(#[from] CompositeError),

    /// The session configuration is invalid.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// The session grid is unusable.
    #[error("grid: {0}")]
    Grid(#[from] SpatialError),
}
