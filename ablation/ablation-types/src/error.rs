//! Error types for planning values.

use thiserror::Error;

/// Result type for value construction and mutation.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors raised when a value would violate its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TypesError {
    /// Entry and target coincide within tolerance.
    #[error("entry and target points should differ")]
    DegenerateNeedle,

    /// A coordinate is NaN or infinite.
    #[error("point has a non-finite coordinate: {point:?}")]
    NonFinitePoint {
        /// The offending coordinates.
        point: [f64; 3],
    },

    /// Needle diameter outside the accepted range.
    #[error("diameter must be within 1..=20 mm, got {value}")]
    DiameterOutOfRange {
        /// Rejected value.
        value: u32,
    },

    /// Safety-zone radius outside the accepted range.
    #[error("safezone radius must be within 1..=50 mm, got {value}")]
    SafezoneOutOfRange {
        /// Rejected value.
        value: u32,
    },

    /// Diameter exceeds twice the safety-zone radius.
    #[error("diameter {diameter} mm exceeds twice the safezone radius {safezone} mm")]
    DiameterExceedsSafezone {
        /// Needle diameter in mm.
        diameter: u32,
        /// Safety-zone radius in mm.
        safezone: u32,
    },
}
