//! Combining needles into the rendered and analysis volumes.

use ablation_grid::{CoordinateMapper, GridGeometry, LabelVolume};
use ablation_raster::{Centerline, MarginBands, margin_field, rasterize_needle};
use ablation_types::{DrawMode, Needle};
use tracing::{debug, info, warn};

use crate::error::{CompositeError, CompositeResult};

/// The two volumes produced by a redraw.
///
/// `output` is what the user sees, including a provisional needle from an open
/// edit. `analysis` holds committed needles only and feeds overlap statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Rendered labels.
    pub output: LabelVolume,
    /// Committed-needle labels, by plain 1-based index.
    pub analysis: LabelVolume,
}

impl Composition {
    /// Creates an all-zero composition for a grid shape.
    #[must_use]
    pub fn empty(shape: [usize; 3]) -> Self {
        Self {
            output: LabelVolume::new(shape, 0),
            analysis: LabelVolume::new(shape, 0),
        }
    }
}

/// Label of needle `index` (1-based) in Line mode and in the analysis volume.
#[must_use]
pub fn line_label(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Label of the ablated core of needle `index` in Full mode.
#[must_use]
pub fn core_label(index: usize) -> i32 {
    line_label(index).saturating_mul(10)
}

/// Label of the safety shell of needle `index` in Full mode.
#[must_use]
pub fn shell_label(index: usize) -> i32 {
    core_label(index).saturating_add(1)
}

/// Renders needle lists onto one grid.
///
/// Needles are drawn in list order, so where two needles cover the same voxel
/// the later one wins.
///
/// # Example
///
/// ```
/// use ablation_grid::{AffineMapper, GridGeometry, SpatialUnit, VoxelCoord};
/// use ablation_plan::Compositor;
/// use ablation_raster::MarginBands;
/// use ablation_types::{DrawMode, GeometryConfig, Needle};
/// use nalgebra::Point3;
///
/// let grid = GridGeometry::from_spacing([16, 16, 16], [1.0; 3], SpatialUnit::Millimeter).unwrap();
/// let mapper = AffineMapper::new(&grid).unwrap();
/// let bands = MarginBands::new(&GeometryConfig::default());
/// let compositor = Compositor::new(&grid, &mapper, 1.0, bands);
///
/// let needle = Needle::new(Point3::new(2.5, 8.5, 8.5), Point3::new(12.5, 8.5, 8.5)).unwrap();
/// let composition = compositor
///     .compose(&[needle], None, DrawMode::Full, false)
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(composition.output.get(VoxelCoord::new(6, 8, 8)), Some(10));
/// assert_eq!(composition.output.get(VoxelCoord::new(6, 12, 8)), Some(11));
/// assert_eq!(composition.analysis.get(VoxelCoord::new(6, 12, 8)), Some(1));
/// ```
#[derive(Debug)]
pub struct Compositor<'a, M> {
    geometry: &'a GridGeometry,
    mapper: &'a M,
    unit_factor: f64,
    bands: MarginBands,
}

impl<'a, M: CoordinateMapper> Compositor<'a, M> {
    /// Creates a compositor for one grid and needle geometry.
    #[must_use]
    pub const fn new(
        geometry: &'a GridGeometry,
        mapper: &'a M,
        unit_factor: f64,
        bands: MarginBands,
    ) -> Self {
        Self {
            geometry,
            mapper,
            unit_factor,
            bands,
        }
    }

    /// Builds fresh output and analysis volumes.
    ///
    /// `provisional` is the needle of a dirty edit. It is drawn last, labeled
    /// as needle `needles.len() + 1`, and never enters the analysis volume.
    ///
    /// Returns `Ok(None)` in [`DrawMode::None`] without `force_clear`: the
    /// caller's volumes stay as they are. With `force_clear` that mode yields
    /// an all-zero composition.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::Margin`] if a margin field cannot be computed
    /// for a needle that did rasterize.
    pub fn compose(
        &self,
        needles: &[Needle],
        provisional: Option<&Needle>,
        mode: DrawMode,
        force_clear: bool,
    ) -> CompositeResult<Option<Composition>> {
        let shape = self.geometry.shape();
        if mode == DrawMode::None {
            return Ok(force_clear.then(|| Composition::empty(shape)));
        }

        let mut composition = Composition::empty(shape);
        for (i, needle) in needles.iter().enumerate() {
            self.draw(&mut composition, mode, i + 1, needle, true)?;
        }
        if let Some(needle) = provisional {
            self.draw(&mut composition, mode, needles.len() + 1, needle, false)?;
        }

        info!(
            ?mode,
            needles = needles.len(),
            provisional = provisional.is_some(),
            "Composed ablation volumes"
        );
        Ok(Some(composition))
    }

    fn draw(
        &self,
        composition: &mut Composition,
        mode: DrawMode,
        index: usize,
        needle: &Needle,
        committed: bool,
    ) -> CompositeResult<()> {
        let Some(centerline) = self.centerline(index, needle) else {
            return Ok(());
        };

        if !mode.needs_margin() {
            let voxels = centerline.voxels().iter().copied();
            composition.output.paint_coords(voxels.clone(), line_label(index));
            if committed {
                composition.analysis.paint_coords(voxels, line_label(index));
            }
            return Ok(());
        }

        let field = margin_field(
            &centerline,
            self.bands.field_bound(),
            self.geometry,
            self.unit_factor,
        )
        .map_err(|source| {
            warn!(index, error = %source, "Margin field failed for a rasterized needle");
            CompositeError::Margin { index, source }
        })?;

        let output = &mut composition.output;
        output.paint_coords(self.bands.shell_coords(&field), shell_label(index));
        output.paint_coords(self.bands.core_coords(&field), core_label(index));
        if committed {
            composition
                .analysis
                .paint_coords(self.bands.region_coords(&field), line_label(index));
        }
        Ok(())
    }

    fn centerline(&self, index: usize, needle: &Needle) -> Option<Centerline> {
        match rasterize_needle(needle, self.mapper, self.geometry) {
            Ok(centerline) => {
                debug!(index, voxels = centerline.len(), "Rasterized needle");
                Some(centerline)
            }
            Err(error) => {
                warn!(index, %error, "Skipping needle");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ablation_grid::{AffineMapper, SpatialUnit, VoxelCoord};
    use ablation_types::GeometryConfig;
    use nalgebra::Point3;

    fn fixture() -> (GridGeometry, AffineMapper) {
        let grid =
            GridGeometry::from_spacing([48, 48, 48], [1.0; 3], SpatialUnit::Millimeter).unwrap();
        let mapper = AffineMapper::new(&grid).unwrap();
        (grid, mapper)
    }

    fn bands() -> MarginBands {
        MarginBands::new(&GeometryConfig::default())
    }

    fn needle(entry: [f64; 3], target: [f64; 3]) -> Needle {
        Needle::new(Point3::from(entry), Point3::from(target)).unwrap()
    }

    fn labeled(volume: &LabelVolume) -> usize {
        volume.as_slice().iter().filter(|&&v| v != 0).count()
    }

    #[test]
    fn test_line_mode_paints_centerline_only() {
        let (grid, mapper) = fixture();
        let compositor = Compositor::new(&grid, &mapper, 1.0, bands());
        let needles = [needle([30.5, 40.5, 44.5], [40.5, 40.5, 44.5])];

        let composition = compositor
            .compose(&needles, None, DrawMode::Line, false)
            .unwrap()
            .unwrap();

        assert_eq!(labeled(&composition.output), 11);
        assert_eq!(composition.output.get(VoxelCoord::new(35, 40, 44)), Some(1));
        assert_eq!(composition.analysis, composition.output);
    }

    #[test]
    fn test_full_mode_stays_near_needle() {
        let (grid, mapper) = fixture();
        let compositor = Compositor::new(&grid, &mapper, 1.0, bands());
        let needles = [needle([30.5, 40.5, 40.5], [40.5, 40.5, 40.5])];

        let composition = compositor
            .compose(&needles, None, DrawMode::Full, false)
            .unwrap()
            .unwrap();

        assert_eq!(composition.output.get(VoxelCoord::new(35, 40, 40)), Some(10));
        assert_eq!(composition.output.get(VoxelCoord::new(35, 45, 40)), Some(11));
        assert_eq!(composition.output.get(VoxelCoord::new(35, 46, 40)), Some(0));
        assert_eq!(composition.output.get(VoxelCoord::new(0, 0, 0)), Some(0));
        assert_eq!(composition.analysis.get(VoxelCoord::new(35, 43, 40)), Some(1));
    }

    #[test]
    fn test_provisional_is_output_only() {
        let (grid, mapper) = fixture();
        let compositor = Compositor::new(&grid, &mapper, 1.0, bands());
        let committed = [needle([0.5, 0.5, 0.5], [8.5, 0.5, 0.5])];
        let provisional = needle([4.5, 0.5, 0.5], [4.5, 8.5, 0.5]);

        let composition = compositor
            .compose(&committed, Some(&provisional), DrawMode::Line, false)
            .unwrap()
            .unwrap();

        assert_eq!(composition.output.get(VoxelCoord::new(4, 0, 0)), Some(2));
        assert_eq!(composition.output.get(VoxelCoord::new(4, 6, 0)), Some(2));
        assert_eq!(composition.analysis.get(VoxelCoord::new(4, 0, 0)), Some(1));
        assert_eq!(composition.analysis.get(VoxelCoord::new(4, 6, 0)), Some(0));
    }

    #[test]
    fn test_none_mode() {
        let (grid, mapper) = fixture();
        let compositor = Compositor::new(&grid, &mapper, 1.0, bands());
        let needles = [needle([0.5, 0.5, 0.5], [8.5, 0.5, 0.5])];

        assert_eq!(compositor.compose(&needles, None, DrawMode::None, false), Ok(None));
        let cleared = compositor
            .compose(&needles, None, DrawMode::None, true)
            .unwrap()
            .unwrap();
        assert_eq!(cleared, Composition::empty(grid.shape()));
    }

    #[test]
    fn test_labels() {
        assert_eq!(line_label(3), 3);
        assert_eq!(core_label(3), 30);
        assert_eq!(shell_label(3), 31);
        assert_eq!(shell_label(usize::MAX), i32::MAX);
    }
}
