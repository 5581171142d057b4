//! Bounded distance fields around a centerline and their band classification.

use ablation_grid::{GridBounds, GridGeometry, VoxelCoord, VoxelMask};
use ablation_types::GeometryConfig;
use tracing::debug;

use crate::centerline::Centerline;
use crate::edt::squared_distances;
use crate::error::{MarginError, MarginResult};

/// Width of the drawn safety shell, inward from the safety-zone radius.
pub const SHELL_BORDER_MM: f64 = 2.0;

/// Slack added to the largest band radius when bounding a margin field.
pub const MARGIN_EPSILON_MM: f64 = 1.0;

/// Distances in millimeters from voxels near a centerline to the centerline.
///
/// Only voxels inside [`MarginField::window`] carry a computed distance. Every
/// other coordinate reports [`MarginField::max_distance`], so queries whose
/// radius stays below that bound see exactly the voxels they would see with a
/// whole-grid transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginField {
    shape: [usize; 3],
    window: GridBounds,
    extent: [usize; 3],
    distances: Vec<f64>,
    max_distance: f64,
}

/// Computes the margin field of a centerline.
///
/// The field is evaluated over the centerline's bounding box grown on each
/// axis by `round(max_distance_mm / spacing_mm)` voxels and clamped to the
/// grid. `unit_factor` converts the grid's native spacing to millimeters. The
/// work done is proportional to that window, not to the grid.
///
/// # Errors
///
/// - [`MarginError::EmptyCenterline`] if `centerline` has no voxels
/// - [`MarginError::InvalidDistance`] if `max_distance_mm` is not positive and finite
/// - [`MarginError::InvalidUnitFactor`] if `unit_factor` is not positive and finite
/// - [`MarginError::ShapeMismatch`] if `centerline` is not shaped like the grid
///
/// # Example
///
/// ```
/// use ablation_grid::{GridGeometry, SpatialUnit, VoxelCoord};
/// use ablation_raster::{Centerline, margin_field};
///
/// let grid = GridGeometry::from_spacing([20, 20, 20], [1.0; 3], SpatialUnit::Millimeter).unwrap();
/// let centerline = Centerline::from_voxels(grid.shape(), vec![VoxelCoord::new(10, 10, 10)]);
///
/// let field = margin_field(&centerline, 4.0, &grid, 1.0).unwrap();
///
/// assert_eq!(field.distance(VoxelCoord::new(13, 10, 10)), 3.0);
/// assert_eq!(field.window().min, VoxelCoord::new(6, 6, 6));
/// // Outside the window the bound is reported
/// assert_eq!(field.distance(VoxelCoord::new(0, 0, 0)), 4.0);
/// ```
pub fn margin_field(
    centerline: &Centerline,
    max_distance_mm: f64,
    geometry: &GridGeometry,
    unit_factor: f64,
) -> MarginResult<MarginField> {
    if !(max_distance_mm > 0.0 && max_distance_mm.is_finite()) {
        return Err(MarginError::InvalidDistance(max_distance_mm));
    }
    if !(unit_factor > 0.0 && unit_factor.is_finite()) {
        return Err(MarginError::InvalidUnitFactor(unit_factor));
    }
    if centerline.shape() != geometry.shape() {
        return Err(MarginError::ShapeMismatch {
            expected: geometry.shape(),
            actual: centerline.shape(),
        });
    }

    let occupied = centerline.bounds().ok_or(MarginError::EmptyCenterline)?;
    let spacing_mm = geometry.spacing_mm(unit_factor);
    #[allow(clippy::cast_possible_truncation)]
    let padding = spacing_mm.map(|s| (max_distance_mm / s).round().min(f64::from(i32::MAX)) as i32);

    let grid = geometry.bounds();
    // The occupied box lies inside the grid, so the intersection is never empty
    let window = occupied.grow(padding).intersection(&grid).unwrap_or(occupied);
    let extent = window.extent();

    let mut features = vec![false; window.volume()];
    for &coord in centerline.voxels() {
        if let Some(i) = local_index(&window, extent, coord) {
            features[i] = true;
        }
    }
    let distances: Vec<f64> = squared_distances(&features, extent, spacing_mm)
        .into_iter()
        .map(f64::sqrt)
        .collect();

    debug!(
        window = ?extent,
        windowed = window != grid,
        max_distance_mm,
        "Computed margin field"
    );

    Ok(MarginField {
        shape: geometry.shape(),
        window,
        extent,
        distances,
        max_distance: max_distance_mm,
    })
}

impl MarginField {
    /// Returns the shape of the grid the field belongs to.
    #[must_use]
    pub const fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Returns the box of voxels whose distance was computed.
    #[must_use]
    pub const fn window(&self) -> GridBounds {
        self.window
    }

    /// Returns the distance reported outside the window.
    #[must_use]
    pub const fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Returns `true` if the window is smaller than the whole grid.
    #[must_use]
    pub fn is_windowed(&self) -> bool {
        GridBounds::from_shape(self.shape).is_some_and(|grid| grid != self.window)
    }

    /// Returns the distance in millimeters at a coordinate.
    ///
    /// Coordinates outside the window, including those outside the grid,
    /// report [`MarginField::max_distance`].
    #[must_use]
    pub fn distance(&self, coord: VoxelCoord) -> f64 {
        self.local_index(coord)
            .map_or(self.max_distance, |i| self.distances[i])
    }

    /// Iterates over every window voxel with its distance.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelCoord, f64)> + '_ {
        self.window.iter().zip(self.distances.iter().copied())
    }

    /// Iterates over window voxels with `inner_exclusive < d <= outer_inclusive`.
    ///
    /// Voxels outside the window are never yielded, whatever the bounds.
    pub fn band_coords(
        &self,
        inner_exclusive: f64,
        outer_inclusive: f64,
    ) -> impl Iterator<Item = VoxelCoord> + '_ {
        self.iter()
            .filter(move |&(_, d)| inner_exclusive < d && d <= outer_inclusive)
            .map(|(coord, _)| coord)
    }

    /// Returns a grid-shaped mask of voxels with `inner_exclusive < d <= outer_inclusive`.
    #[must_use]
    pub fn band(&self, inner_exclusive: f64, outer_inclusive: f64) -> VoxelMask {
        let selects = |d: f64| inner_exclusive < d && d <= outer_inclusive;
        let mut mask = VoxelMask::new(self.shape, selects(self.max_distance));
        for (coord, d) in self.iter() {
            mask.set(coord, selects(d));
        }
        mask
    }

    /// Returns a grid-shaped mask of voxels with `d <= radius`.
    #[must_use]
    pub fn within(&self, radius: f64) -> VoxelMask {
        self.band(f64::NEG_INFINITY, radius)
    }

    fn local_index(&self, coord: VoxelCoord) -> Option<usize> {
        local_index(&self.window, self.extent, coord)
    }
}

/// Index of `coord` in an x-fastest buffer covering `window`.
fn local_index(window: &GridBounds, extent: [usize; 3], coord: VoxelCoord) -> Option<usize> {
    if !window.contains(coord) {
        return None;
    }
    let [x, y, z] = (coord - window.min).to_unsigned()?;
    let [nx, ny, _] = extent;
    Some(x + nx * (y + ny * z))
}

/// Distance bands of a needle's ablation geometry.
///
/// | band   | selection                                  |
/// |--------|--------------------------------------------|
/// | core   | `d <= diameter / 2`                        |
/// | shell  | `safezone - border < d <= safezone`        |
/// | region | `d <= safezone`                            |
///
/// # Example
///
/// ```
/// use ablation_raster::MarginBands;
/// use ablation_types::GeometryConfig;
///
/// let bands = MarginBands::new(&GeometryConfig::default());
/// assert_eq!(bands.core_radius(), 1.5);
/// assert_eq!(bands.shell_range(), (3.0, 5.0));
/// assert_eq!(bands.field_bound(), 6.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginBands {
    core_radius: f64,
    safezone: f64,
    border: f64,
    epsilon: f64,
}

impl MarginBands {
    /// Creates bands with the default shell border and margin epsilon.
    #[must_use]
    pub fn new(geometry: &GeometryConfig) -> Self {
        Self::with_params(geometry, SHELL_BORDER_MM, MARGIN_EPSILON_MM)
    }

    /// Creates bands with an explicit shell border and margin epsilon, in millimeters.
    #[must_use]
    pub fn with_params(geometry: &GeometryConfig, border_mm: f64, epsilon_mm: f64) -> Self {
        Self {
            core_radius: geometry.core_radius_mm(),
            safezone: f64::from(geometry.safezone_radius_mm()),
            border: border_mm,
            epsilon: epsilon_mm,
        }
    }

    /// Returns the ablated core radius.
    #[must_use]
    pub const fn core_radius(&self) -> f64 {
        self.core_radius
    }

    /// Returns the safety-zone radius.
    #[must_use]
    pub const fn safezone(&self) -> f64 {
        self.safezone
    }

    /// Returns the shell as `(inner_exclusive, outer_inclusive)`.
    #[must_use]
    pub fn shell_range(&self) -> (f64, f64) {
        (self.safezone - self.border, self.safezone)
    }

    /// Returns the distance bound a margin field needs to resolve every band.
    #[must_use]
    pub fn field_bound(&self) -> f64 {
        self.core_radius.max(self.safezone) + self.epsilon
    }

    /// Iterates over core voxels of a field.
    pub fn core_coords<'a>(&self, field: &'a MarginField) -> impl Iterator<Item = VoxelCoord> + 'a {
        field.band_coords(f64::NEG_INFINITY, self.core_radius)
    }

    /// Iterates over shell voxels of a field.
    pub fn shell_coords<'a>(&self, field: &'a MarginField) -> impl Iterator<Item = VoxelCoord> + 'a {
        let (inner, outer) = self.shell_range();
        field.band_coords(inner, outer)
    }

    /// Iterates over safety-region voxels of a field.
    pub fn region_coords<'a>(&self, field: &'a MarginField) -> impl Iterator<Item = VoxelCoord> + 'a {
        field.band_coords(f64::NEG_INFINITY, self.safezone)
    }

    /// Returns the core as a grid-shaped mask.
    #[must_use]
    pub fn core(&self, field: &MarginField) -> VoxelMask {
        field.within(self.core_radius)
    }

    /// Returns the shell as a grid-shaped mask.
    #[must_use]
    pub fn shell(&self, field: &MarginField) -> VoxelMask {
        let (inner, outer) = self.shell_range();
        field.band(inner, outer)
    }

    /// Returns the safety region as a grid-shaped mask.
    #[must_use]
    pub fn region(&self, field: &MarginField) -> VoxelMask {
        field.within(self.safezone)
    }
}
