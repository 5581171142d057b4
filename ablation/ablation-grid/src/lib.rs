//! Voxel grid primitives for needle ablation planning.
//!
//! This crate provides the spatial foundation shared by the rasterizer, the
//! margin field and the compositor:
//!
//! - [`VoxelCoord`] - Integer voxel coordinates
//! - [`GridBounds`] - Inclusive axis-aligned bounds in voxel space
//! - [`VoxelVolume`] - Dense 3D array with [`VoxelMask`] and [`LabelVolume`] aliases
//! - [`GridGeometry`] - Shape, spacing, voxel-to-world affine and physical unit
//! - [`CoordinateMapper`] and [`AffineMapper`] - World/voxel conversion
//!
//! # Layer 0 Crate
//!
//! No host or UI dependencies. The mapper is a narrow trait so the geometry
//! pipeline can be driven by any image host, or by a plain affine in tests.
//!
//! # Coordinate Systems
//!
//! - **World space**: continuous `f64` coordinates in the grid's physical unit.
//! - **Voxel space**: discrete `i32` indices; world points map to voxels by
//!   truncation toward zero of the continuous voxel position.
//!
//! Dense storage is x-fastest: `index = x + y * nx + z * nx * ny`.
//!
//! # Example
//!
//! ```
//! use ablation_grid::{AffineMapper, CoordinateMapper, GridGeometry, SpatialUnit, VoxelCoord};
//! use nalgebra::Point3;
//!
//! let geometry = GridGeometry::from_spacing([10, 10, 10], [2.0, 2.0, 2.0], SpatialUnit::Millimeter)
//!     .unwrap();
//! let mapper = AffineMapper::new(&geometry).unwrap();
//!
//! // 5mm along x with 2mm voxels lands in voxel 2
//! let coord = mapper.world_to_voxel(&Point3::new(5.0, 0.0, 0.0));
//! assert_eq!(coord, VoxelCoord::new(2, 0, 0));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod error;
mod geometry;
mod mapper;
mod voxel;
mod volume;

pub use bounds::{GridBounds, GridBoundsIter};
pub use error::{SpatialError, SpatialResult};
pub use geometry::{GridGeometry, SpatialUnit};
pub use mapper::{AffineMapper, CoordinateMapper};
pub use volume::{LabelVolume, VoxelMask, VoxelVolume};
pub use voxel::VoxelCoord;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};
