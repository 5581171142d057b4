//! Straight-segment rasterization.

use ablation_grid::{CoordinateMapper, GridGeometry, VoxelCoord};
use ablation_types::{Needle, PointTolerance};
use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::centerline::Centerline;
use crate::error::{RasterError, RasterResult};

/// Returns the number of samples taken along a world-space displacement.
///
/// The count is the displacement measured in voxels along each axis, summed,
/// rounded half to even, plus one for the starting point. It never drops
/// below 1.
///
/// # Example
///
/// ```
/// use ablation_raster::sample_count;
/// use nalgebra::Vector3;
///
/// assert_eq!(sample_count(&Vector3::new(5.0, 0.0, 0.0), [1.0; 3]), 6);
/// assert_eq!(sample_count(&Vector3::new(3.0, 4.0, 0.0), [0.5, 1.0, 1.0]), 11);
/// assert_eq!(sample_count(&Vector3::zeros(), [1.0; 3]), 1);
/// // 2.5 voxels round to 2
/// assert_eq!(sample_count(&Vector3::new(2.5, 0.0, 0.0), [1.0; 3]), 3);
/// ```
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn sample_count(displacement: &Vector3<f64>, spacing: [f64; 3]) -> usize {
    let steps: f64 = displacement
        .iter()
        .zip(spacing)
        .map(|(d, s)| d.abs() / s)
        .sum();
    if !steps.is_finite() {
        return 1;
    }
    // steps is finite and non-negative here; the cast saturates
    (steps.round_ties_even() as usize).saturating_add(1).max(1)
}

/// Rasterizes the segment from `entry` to `target` into the voxels it passes through.
///
/// Samples are taken at `t = k / (n - 1)` for `k` in `0..n`, where `n` is
/// [`sample_count`] of the displacement in native grid units. Each sample is
/// mapped to a voxel by truncation. The voxels holding `entry` and `target`
/// are always included when they lie inside the grid. Samples outside the grid
/// are dropped.
///
/// # Errors
///
/// - [`RasterError::DegenerateTrajectory`] if `entry` and `target` coincide
/// - [`RasterError::OutsideGrid`] if no sample lands inside the grid
///
/// # Example
///
/// ```
/// use ablation_grid::{AffineMapper, GridGeometry, SpatialUnit, VoxelCoord};
/// use ablation_raster::rasterize;
/// use nalgebra::Point3;
///
/// let grid = GridGeometry::from_spacing([10, 10, 10], [1.0; 3], SpatialUnit::Millimeter).unwrap();
/// let mapper = AffineMapper::new(&grid).unwrap();
///
/// let centerline = rasterize(&Point3::origin(), &Point3::new(5.0, 0.0, 0.0), &mapper, &grid).unwrap();
///
/// assert_eq!(centerline.len(), 6);
/// assert!((0..=5).all(|x| centerline.contains(VoxelCoord::new(x, 0, 0))));
/// ```
pub fn rasterize<M: CoordinateMapper>(
    entry: &Point3<f64>,
    target: &Point3<f64>,
    mapper: &M,
    geometry: &GridGeometry,
) -> RasterResult<Centerline> {
    if PointTolerance::default().coincide(entry, target) {
        return Err(RasterError::DegenerateTrajectory);
    }

    let displacement = target - entry;
    let samples = sample_count(&displacement, geometry.spacing());
    let grid = geometry.bounds();
    let mut voxels = Vec::with_capacity(samples.max(2));
    let mut clipped = 0usize;

    let mut mark = |coord: VoxelCoord| {
        if grid.contains(coord) {
            voxels.push(coord);
        } else {
            clipped += 1;
        }
    };

    mark(mapper.world_to_voxel(entry));
    if samples > 1 {
        #[allow(clippy::cast_precision_loss)]
        let last = (samples - 1) as f64;
        for k in 1..samples - 1 {
            #[allow(clippy::cast_precision_loss)]
            let t = k as f64 / last;
            mark(mapper.world_to_voxel(&(entry + displacement * t)));
        }
    }
    mark(mapper.world_to_voxel(target));

    if clipped > 0 {
        debug!(
            clipped,
            samples, "Trajectory samples fell outside the grid and were clipped"
        );
    }

    let centerline = Centerline::from_voxels(geometry.shape(), voxels);
    if centerline.is_empty() {
        return Err(RasterError::OutsideGrid { samples });
    }

    debug!(samples, voxels = centerline.len(), "Rasterized trajectory");
    Ok(centerline)
}

/// Rasterizes a validated [`Needle`].
///
/// # Errors
///
/// Returns [`RasterError::OutsideGrid`] if the needle misses the grid entirely.
/// A [`Needle`] is never degenerate under the default tolerance, but one built
/// with a looser tolerance may still be rejected here.
pub fn rasterize_needle<M: CoordinateMapper>(
    needle: &Needle,
    mapper: &M,
    geometry: &GridGeometry,
) -> RasterResult<Centerline> {
    rasterize(needle.entry(), needle.target(), mapper, geometry)
}
