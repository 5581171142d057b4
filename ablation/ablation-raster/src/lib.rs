//! Needle rasterization and margin distance fields.
//!
//! Two stages turn a needle into voxels:
//!
//! 1. [`rasterize`] samples the straight segment from entry to target and
//!    collects the voxels it passes through into a sparse [`Centerline`].
//! 2. [`margin_field`] computes the Euclidean distance, in millimeters, from
//!    voxels near the centerline to the nearest centerline voxel. The field is
//!    only evaluated inside the centerline's bounding box grown by the largest
//!    radius of interest, which is far cheaper than a whole-grid transform.
//!
//! [`MarginBands`] then classifies the field into the ablated core, the drawn
//! safety shell and the safety region used for overlap analysis.
//!
//! # Example
//!
//! ```
//! use ablation_grid::{AffineMapper, GridGeometry, SpatialUnit, VoxelCoord};
//! use ablation_raster::{MarginBands, margin_field, rasterize};
//! use ablation_types::GeometryConfig;
//! use nalgebra::Point3;
//!
//! let grid = GridGeometry::from_spacing([16, 16, 16], [1.0; 3], SpatialUnit::Millimeter).unwrap();
//! let mapper = AffineMapper::new(&grid).unwrap();
//!
//! let centerline = rasterize(
//!     &Point3::new(2.5, 8.5, 8.5),
//!     &Point3::new(7.5, 8.5, 8.5),
//!     &mapper,
//!     &grid,
//! )
//! .unwrap();
//! assert_eq!(centerline.len(), 6);
//!
//! let bands = MarginBands::new(&GeometryConfig::new(3, 5).unwrap());
//! let field = margin_field(&centerline, bands.field_bound(), &grid, 1.0).unwrap();
//!
//! assert!(bands.core(&field).get(VoxelCoord::new(4, 9, 8)).unwrap());
//! assert!(bands.shell(&field).get(VoxelCoord::new(4, 12, 8)).unwrap());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod centerline;
mod edt;
mod error;
mod margin;
mod trajectory;

pub use centerline::Centerline;
pub use error::{MarginError, MarginResult, RasterError, RasterResult};
pub use margin::{MARGIN_EPSILON_MM, MarginBands, MarginField, SHELL_BORDER_MM, margin_field};
pub use trajectory::{rasterize, rasterize_needle, sample_count};
