//! Core value types for needle ablation planning.
//!
//! - [`Needle`] - A straight trajectory from an entry point to a target point
//! - [`GeometryConfig`] - Needle diameter and safety-zone radius, kept mutually consistent
//! - [`DrawMode`] - How needles are rendered into the output volume
//! - [`EditState`] - The single in-progress insert or update of a needle
//!
//! All points are world-space `nalgebra::Point3<f64>` in the image's native unit.
//! Geometry sizes are whole millimeters.
//!
//! # Example
//!
//! ```
//! use ablation_types::{EditState, Endpoint, GeometryConfig, Needle};
//! use nalgebra::Point3;
//!
//! let needle = Needle::new(Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)).unwrap();
//! assert!((needle.length() - 5.0).abs() < 1e-12);
//!
//! // Widening the needle past the safety zone drags the safety zone along
//! let mut geometry = GeometryConfig::default();
//! geometry.set_diameter(15).unwrap();
//! assert_eq!(geometry.safezone_radius_mm(), 8);
//!
//! // An insert only becomes dirty once both points are marked
//! let mut edit = EditState::insert();
//! edit.set_point(Endpoint::Entry, Point3::origin());
//! assert!(!edit.is_dirty());
//! edit.set_point(Endpoint::Target, Point3::new(1.0, 2.0, 3.0));
//! assert!(edit.is_dirty());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod edit;
mod error;
mod geometry;
mod mode;
mod needle;

pub use edit::{EditKind, EditState, Endpoint};
pub use error::{TypesError, TypesResult};
pub use geometry::{DIAMETER_RANGE_MM, GeometryConfig, SAFEZONE_RANGE_MM};
pub use mode::DrawMode;
pub use needle::{Needle, PointTolerance};

pub use nalgebra::Point3;
