//! The planning session: needle list, edit cycle, redraw and overlap.

use std::path::Path;
use std::sync::Arc;

use ablation_grid::{AffineMapper, CoordinateMapper, GridGeometry, LabelVolume};
use ablation_types::{DrawMode, EditKind, EditState, Endpoint, GeometryConfig, Needle, TypesError};
use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::compositor::{Composition, Compositor};
use crate::config::PlanConfig;
use crate::error::{SessionError, SessionResult};
use crate::io::{self, Plan};
use crate::overlap::{Mask, MaskList, MaskRegistry, OverlapReport, analyze};
use crate::view::SessionView;

/// One planning session over one image grid.
///
/// The session owns the needle list, the needle geometry, the draw mode, at
/// most one open edit, the registered masks and the two rendered volumes.
/// Every mutation redraws before returning, so [`Session::output`],
/// [`Session::analysis_volume`] and [`Session::overlap`] always reflect the
/// current state.
///
/// While an insert or update is open, the needle list itself cannot be
/// changed: inserting, updating, deleting and loading a plan are rejected.
///
/// # Example
///
/// ```
/// use ablation_grid::{GridGeometry, SpatialUnit, VoxelCoord};
/// use ablation_plan::Session;
/// use ablation_types::Endpoint;
/// use nalgebra::Point3;
///
/// let grid = GridGeometry::from_spacing([16, 16, 16], [1.0; 3], SpatialUnit::Millimeter).unwrap();
/// let mut session = Session::new(grid).unwrap();
///
/// session.begin_insert().unwrap();
/// session.mark(Endpoint::Entry, Point3::new(2.5, 2.5, 2.5)).unwrap();
/// session.mark(Endpoint::Target, Point3::new(9.5, 2.5, 2.5)).unwrap();
/// assert_eq!(session.submit().unwrap(), 1);
///
/// assert_eq!(session.output().get(VoxelCoord::new(5, 2, 2)), Some(1));
/// ```
#[derive(Debug)]
pub struct Session<M = AffineMapper> {
    grid: GridGeometry,
    mapper: M,
    unit_factor: f64,
    config: PlanConfig,
    needles: Vec<Needle>,
    geometry: GeometryConfig,
    draw_mode: DrawMode,
    edit: Option<EditState>,
    masks: MaskRegistry,
    composition: Composition,
    report: OverlapReport,
}

impl Session<AffineMapper> {
    /// Creates an empty session with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Grid`] if the grid's affine cannot be inverted.
    pub fn new(grid: GridGeometry) -> SessionResult<Self> {
        Self::with_config(grid, PlanConfig::default())
    }

    /// Creates an empty session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Config`] if `config` does not validate
    /// - [`SessionError::Grid`] if the grid's affine cannot be inverted
    pub fn with_config(grid: GridGeometry, config: PlanConfig) -> SessionResult<Self> {
        config.validate()?;
        let mapper = AffineMapper::new(&grid)?;
        Self::with_mapper(grid, mapper, config)
    }

    /// Creates a session from a plan file.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Config`] if `config` does not validate
    /// - [`SessionError::Grid`] if the grid's affine cannot be inverted
    /// - [`SessionError::Plan`] if the file cannot be read or is invalid
    pub fn load_plan<P: AsRef<Path>>(
        grid: GridGeometry,
        path: P,
        config: PlanConfig,
    ) -> SessionResult<Self> {
        let plan = io::load_plan(path, &config.tolerance())?;
        let mut session = Self::with_config(grid, config)?;
        session.replace_plan(plan)?;
        Ok(session)
    }
}

impl<M: CoordinateMapper> Session<M> {
    /// Creates an empty session with a host-supplied coordinate mapper.
    ///
    /// The unit factor is taken from the grid once, here.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if `config` does not validate.
    pub fn with_mapper(grid: GridGeometry, mapper: M, config: PlanConfig) -> SessionResult<Self> {
        config.validate()?;
        let unit_factor = grid.unit_factor();
        let composition = Composition::empty(grid.shape());
        info!(
            shape = ?grid.shape(),
            unit = %grid.unit(),
            unit_factor,
            "Opened planning session"
        );
        Ok(Self {
            grid,
            mapper,
            unit_factor,
            config,
            needles: Vec::new(),
            geometry: GeometryConfig::default(),
            draw_mode: DrawMode::default(),
            edit: None,
            masks: MaskRegistry::new(),
            composition,
            report: OverlapReport::default(),
        })
    }

    /// Ends the session and hands back its final volumes.
    #[must_use]
    pub fn close(self) -> Composition {
        info!(needles = self.needles.len(), "Closed planning session");
        self.composition
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the session grid.
    #[must_use]
    pub const fn grid(&self) -> &GridGeometry {
        &self.grid
    }

    /// Returns the coordinate mapper.
    #[must_use]
    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Returns the native-unit to millimeter factor.
    #[must_use]
    pub const fn unit_factor(&self) -> f64 {
        self.unit_factor
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Returns the committed needles in priority order.
    #[must_use]
    pub fn needles(&self) -> &[Needle] {
        &self.needles
    }

    /// Returns needle `index` (1-based).
    #[must_use]
    pub fn needle(&self, index: usize) -> Option<&Needle> {
        index.checked_sub(1).and_then(|i| self.needles.get(i))
    }

    /// Returns the needle geometry.
    #[must_use]
    pub const fn geometry(&self) -> &GeometryConfig {
        &self.geometry
    }

    /// Returns the draw mode.
    #[must_use]
    pub const fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Returns the open edit, if any.
    #[must_use]
    pub const fn edit(&self) -> Option<&EditState> {
        self.edit.as_ref()
    }

    /// Returns the registered masks.
    #[must_use]
    pub const fn masks(&self) -> &MaskRegistry {
        &self.masks
    }

    /// Returns the rendered label volume.
    #[must_use]
    pub const fn output(&self) -> &LabelVolume {
        &self.composition.output
    }

    /// Returns the committed-needle label volume used for overlap statistics.
    #[must_use]
    pub const fn analysis_volume(&self) -> &LabelVolume {
        &self.composition.analysis
    }

    /// Returns the overlap statistics of the last redraw.
    #[must_use]
    pub const fn overlap(&self) -> &OverlapReport {
        &self.report
    }

    /// Returns `true` if a new insert may be started now.
    #[must_use]
    pub fn can_insert(&self) -> bool {
        self.edit.is_none() && self.config.allows_insert(self.needles.len())
    }

    /// Projects the session into a view model.
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView::project(
            &self.needles,
            self.edit.as_ref(),
            self.config.allows_insert(self.needles.len()),
            self.draw_mode,
            self.geometry,
        )
    }

    // =========================================================================
    // Edit cycle
    // =========================================================================

    /// Opens an insert with no points marked.
    ///
    /// # Errors
    ///
    /// - [`SessionError::EditInProgress`] if an edit is already open
    /// - [`SessionError::NeedleLimit`] if the list is full
    pub fn begin_insert(&mut self) -> SessionResult<()> {
        self.ensure_no_edit()?;
        if let Some(limit) = self.config.max_needles {
            if self.needles.len() >= limit {
                return Err(SessionError::NeedleLimit { limit });
            }
        }
        self.edit = Some(EditState::insert());
        debug!("Began insert");
        Ok(())
    }

    /// Opens an update of needle `index` (1-based), pre-filled with its points.
    ///
    /// The pre-filled edit is dirty, so it is drawn immediately.
    ///
    /// # Errors
    ///
    /// - [`SessionError::EditInProgress`] if an edit is already open
    /// - [`SessionError::NeedleIndex`] if there is no such needle
    pub fn begin_update(&mut self, index: usize) -> SessionResult<()> {
        self.ensure_no_edit()?;
        let needle = *self.checked_needle(index)?;
        self.edit = Some(EditState::update(index, &needle));
        debug!(index, "Began update");
        self.redraw(false)
    }

    /// Sets an edit point, typically from the host's cursor position.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoEdit`] if no edit is open
    /// - [`SessionError::Composite`] if the redraw of a dirty edit fails; the
    ///   point stays marked
    pub fn mark(&mut self, endpoint: Endpoint, point: Point3<f64>) -> SessionResult<()> {
        let edit = self.edit.as_mut().ok_or(SessionError::NoEdit)?;
        edit.set_point(endpoint, point);
        debug!(?endpoint, ?point, "Marked point");
        if edit.is_dirty() {
            self.redraw(false)?;
        }
        Ok(())
    }

    /// Returns an edit point so the host can navigate to it.
    #[must_use]
    pub fn edit_point(&self, endpoint: Endpoint) -> Option<Point3<f64>> {
        self.edit.as_ref()?.point(endpoint)
    }

    /// Returns the world position of the voxel holding an edit point, for
    /// placing the host cursor exactly on it.
    #[must_use]
    pub fn edit_point_voxel(&self, endpoint: Endpoint) -> Option<Point3<f64>> {
        let point = self.edit_point(endpoint)?;
        Some(self.mapper.voxel_to_world(self.mapper.world_to_voxel(&point)))
    }

    /// Commits the open edit and returns the 1-based index of the needle.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoEdit`] if no edit is open
    /// - [`SessionError::IncompleteEdit`] if a point is missing
    /// - [`SessionError::DegenerateNeedle`] if entry and target coincide
    /// - [`SessionError::InvalidNeedle`] if a point is not finite
    /// - [`SessionError::Composite`] if the redraw fails
    ///
    /// On error the edit stays open and the needle list is unchanged.
    pub fn submit(&mut self) -> SessionResult<usize> {
        let edit = self.edit.ok_or(SessionError::NoEdit)?;
        let (entry, target) = edit.points().ok_or(SessionError::IncompleteEdit)?;
        let needle = Needle::with_tolerance(entry, target, &self.config.tolerance())
            .map_err(|e| match e {
                TypesError::DegenerateNeedle => SessionError::DegenerateNeedle,
                other => SessionError::InvalidNeedle(other),
            })?;

        let (index, replaced) = match edit.kind() {
            EditKind::Insert => {
                self.needles.push(needle);
                (self.needles.len(), None)
            }
            EditKind::Update(index) => {
                let count = self.needles.len();
                let slot = index
                    .checked_sub(1)
                    .and_then(|i| self.needles.get_mut(i))
                    .ok_or(SessionError::NeedleIndex { index, count })?;
                (index, Some(std::mem::replace(slot, needle)))
            }
        };
        self.edit = None;

        if let Err(error) = self.redraw(false) {
            match replaced {
                Some(previous) => {
                    if let Some(slot) = self.needles.get_mut(index - 1) {
                        *slot = previous;
                    }
                }
                None => {
                    self.needles.pop();
                }
            }
            self.edit = Some(edit);
            warn!(index, %error, "Commit rolled back");
            return Err(error);
        }

        info!(index, kind = ?edit.kind(), "Committed needle");
        Ok(index)
    }

    /// Discards the open edit.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoEdit`] if no edit is open.
    pub fn cancel(&mut self) -> SessionResult<()> {
        let edit = self.edit.take().ok_or(SessionError::NoEdit)?;
        debug!(kind = ?edit.kind(), "Cancelled edit");
        if edit.is_dirty() {
            self.redraw(false)?;
        }
        Ok(())
    }

    // =========================================================================
    // List and geometry
    // =========================================================================

    /// Removes needle `index` (1-based); later needles move up one place.
    ///
    /// # Errors
    ///
    /// - [`SessionError::EditInProgress`] if an edit is open
    /// - [`SessionError::NeedleIndex`] if there is no such needle
    pub fn delete(&mut self, index: usize) -> SessionResult<Needle> {
        self.ensure_no_edit()?;
        self.checked_needle(index)?;
        let needle = self.needles.remove(index - 1);
        info!(index, remaining = self.needles.len(), "Deleted needle");
        self.redraw(false)?;
        Ok(needle)
    }

    /// Sets the needle diameter, raising the safety zone if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Geometry`] if the value is out of range.
    pub fn set_diameter(&mut self, diameter_mm: u32) -> SessionResult<()> {
        self.geometry.set_diameter(diameter_mm)?;
        debug!(geometry = ?self.geometry, "Set diameter");
        self.redraw(false)
    }

    /// Sets the safety-zone radius, lowering the diameter if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Geometry`] if the value is out of range.
    pub fn set_safezone(&mut self, safezone_mm: u32) -> SessionResult<()> {
        self.geometry.set_safezone(safezone_mm)?;
        debug!(geometry = ?self.geometry, "Set safezone");
        self.redraw(false)
    }

    /// Switches the draw mode and redraws from a cleared state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Composite`] if the redraw fails.
    pub fn set_draw_mode(&mut self, mode: DrawMode) -> SessionResult<()> {
        self.draw_mode = mode;
        debug!(?mode, "Set draw mode");
        self.redraw(true)
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Replaces the needle list and geometry with a plan file's.
    ///
    /// # Errors
    ///
    /// - [`SessionError::EditInProgress`] if an edit is open
    /// - [`SessionError::Plan`] if the file cannot be read or is invalid
    /// - [`SessionError::NeedleLimit`] if the plan has more needles than allowed
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> SessionResult<()> {
        self.ensure_no_edit()?;
        let plan = io::load_plan(path, &self.config.tolerance())?;
        self.replace_plan(plan)
    }

    /// Writes the committed needles and geometry to a plan file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Plan`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SessionResult<()> {
        let plan = Plan {
            needles: self.needles.clone(),
            geometry: self.geometry,
        };
        io::save_plan(&plan, path)?;
        Ok(())
    }

    /// Replaces the geometry with a geometry file's.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Plan`] if the file cannot be read or is invalid.
    pub fn load_geometry<P: AsRef<Path>>(&mut self, path: P) -> SessionResult<()> {
        self.geometry = io::load_geometry(path)?;
        self.redraw(false)
    }

    /// Writes the geometry to a geometry file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Plan`] if the file cannot be written.
    pub fn save_geometry<P: AsRef<Path>>(&self, path: P) -> SessionResult<()> {
        io::save_geometry(&self.geometry, path)?;
        Ok(())
    }

    // =========================================================================
    // Masks
    // =========================================================================

    /// Registers a target mask and re-evaluates overlap.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Mask`] if the mask is on another grid or its
    /// name is taken.
    pub fn add_target_mask(&mut self, mask: Arc<Mask>) -> SessionResult<()> {
        self.add_mask(MaskList::Target, mask)
    }

    /// Registers a danger mask and re-evaluates overlap.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Mask`] if the mask is on another grid or its
    /// name is taken.
    pub fn add_danger_mask(&mut self, mask: Arc<Mask>) -> SessionResult<()> {
        self.add_mask(MaskList::Danger, mask)
    }

    /// Unregisters a target mask.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Mask`] if no target has this name.
    pub fn remove_target_mask(&mut self, name: &str) -> SessionResult<Arc<Mask>> {
        self.remove_mask(MaskList::Target, name)
    }

    /// Unregisters a danger mask.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Mask`] if no danger mask has this name.
    pub fn remove_danger_mask(&mut self, name: &str) -> SessionResult<Arc<Mask>> {
        self.remove_mask(MaskList::Danger, name)
    }

    // =========================================================================
    // Redraw
    // =========================================================================

    /// Rebuilds the output and analysis volumes and re-evaluates overlap.
    ///
    /// In [`DrawMode::None`] the volumes are left untouched unless
    /// `force_clear` is set, which zeroes them.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Composite`] if a rasterized needle has no
    /// margin field. The previous volumes are kept in that case.
    pub fn redraw(&mut self, force_clear: bool) -> SessionResult<()> {
        let provisional = self.provisional_needle();
        let compositor = Compositor::new(
            &self.grid,
            &self.mapper,
            self.unit_factor,
            self.config.bands(&self.geometry),
        );
        if let Some(composition) =
            compositor.compose(&self.needles, provisional.as_ref(), self.draw_mode, force_clear)?
        {
            self.composition = composition;
        }
        self.reanalyze();
        Ok(())
    }

    fn reanalyze(&mut self) {
        let committed = self.needles.len();
        self.report = analyze(
            &self.composition.analysis,
            &self.masks,
            committed,
            self.edit.map(|e| e.display_index(committed)),
        );
    }

    /// The dirty edit as a needle, or `None` if there is none or it is degenerate.
    fn provisional_needle(&self) -> Option<Needle> {
        let (entry, target) = self.edit.as_ref()?.points()?;
        Needle::with_tolerance(entry, target, &self.config.tolerance())
            .inspect_err(|error| debug!(%error, "Provisional needle not drawn"))
            .ok()
    }

    fn replace_plan(&mut self, plan: Plan) -> SessionResult<()> {
        if let Some(limit) = self.config.max_needles {
            if plan.needles.len() > limit {
                return Err(SessionError::NeedleLimit { limit });
            }
        }
        self.needles = plan.needles;
        self.geometry = plan.geometry;
        info!(needles = self.needles.len(), geometry = ?self.geometry, "Replaced plan");
        self.redraw(false)
    }

    fn add_mask(&mut self, list: MaskList, mask: Arc<Mask>) -> SessionResult<()> {
        self.masks.add(list, mask, &self.grid)?;
        self.reanalyze();
        Ok(())
    }

    fn remove_mask(&mut self, list: MaskList, name: &str) -> SessionResult<Arc<Mask>> {
        let mask = self.masks.remove(list, name)?;
        self.reanalyze();
        Ok(mask)
    }

    fn ensure_no_edit(&self) -> SessionResult<()> {
        if self.edit.is_some() {
            return Err(SessionError::EditInProgress);
        }
        Ok(())
    }

    fn checked_needle(&self, index: usize) -> SessionResult<&Needle> {
        self.needle(index).ok_or(SessionError::NeedleIndex {
            index,
            count: self.needles.len(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use ablation_grid::{SpatialUnit, VoxelCoord};

    fn session() -> Session {
        let grid =
            GridGeometry::from_spacing([16, 16, 16], [1.0; 3], SpatialUnit::Millimeter).unwrap();
        Session::new(grid).unwrap()
    }

    fn add(session: &mut Session, entry: [f64; 3], target: [f64; 3]) -> usize {
        session.begin_insert().unwrap();
        session.mark(Endpoint::Entry, Point3::from(entry)).unwrap();
        session.mark(Endpoint::Target, Point3::from(target)).unwrap();
        session.submit().unwrap()
    }

    #[test]
    fn test_insert_submit() {
        let mut s = session();
        assert_eq!(add(&mut s, [1.5, 1.5, 1.5], [6.5, 1.5, 1.5]), 1);
        assert_eq!(s.needles().len(), 1);
        assert!(s.edit().is_none());
        assert_eq!(s.output().get(VoxelCoord::new(3, 1, 1)), Some(1));
        assert_eq!(s.analysis_volume().get(VoxelCoord::new(3, 1, 1)), Some(1));
    }

    #[test]
    fn test_only_one_edit() {
        let mut s = session();
        s.begin_insert().unwrap();
        assert!(matches!(s.begin_insert(), Err(SessionError::EditInProgress)));
        assert!(matches!(s.begin_update(1), Err(SessionError::EditInProgress)));
    }

    #[test]
    fn test_submit_requires_both_points() {
        let mut s = session();
        assert!(matches!(s.submit(), Err(SessionError::NoEdit)));
        s.begin_insert().unwrap();
        s.mark(Endpoint::Entry, Point3::origin()).unwrap();
        assert!(matches!(s.submit(), Err(SessionError::IncompleteEdit)));
        assert!(s.edit().is_some());
    }

    #[test]
    fn test_degenerate_submit_keeps_edit_open() {
        let mut s = session();
        s.begin_insert().unwrap();
        s.mark(Endpoint::Entry, Point3::new(3.0, 3.0, 3.0)).unwrap();
        s.mark(Endpoint::Target, Point3::new(3.0, 3.0, 3.0)).unwrap();

        assert!(matches!(s.submit(), Err(SessionError::DegenerateNeedle)));
        assert!(s.edit().is_some());
        assert!(s.needles().is_empty());
        // Not drawn either
        assert_eq!(s.output().as_slice().iter().filter(|&&v| v != 0).count(), 0);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut s = session();
        add(&mut s, [1.5, 1.5, 1.5], [6.5, 1.5, 1.5]);
        add(&mut s, [1.5, 8.5, 1.5], [6.5, 8.5, 1.5]);

        s.begin_update(1).unwrap();
        assert_eq!(s.edit_point(Endpoint::Entry), Some(Point3::new(1.5, 1.5, 1.5)));
        s.mark(Endpoint::Target, Point3::new(1.5, 1.5, 9.5)).unwrap();
        assert_eq!(s.submit().unwrap(), 1);

        assert_eq!(s.needles().len(), 2);
        assert_eq!(*s.needle(1).unwrap().target(), Point3::new(1.5, 1.5, 9.5));
        assert_eq!(s.output().get(VoxelCoord::new(1, 1, 7)), Some(1));
        assert_eq!(s.output().get(VoxelCoord::new(4, 1, 1)), Some(0));
    }

    #[test]
    fn test_cancel_discards() {
        let mut s = session();
        s.begin_insert().unwrap();
        s.mark(Endpoint::Entry, Point3::new(1.5, 1.5, 1.5)).unwrap();
        s.mark(Endpoint::Target, Point3::new(6.5, 1.5, 1.5)).unwrap();
        assert_eq!(s.output().get(VoxelCoord::new(3, 1, 1)), Some(1));

        s.cancel().unwrap();
        assert!(s.edit().is_none());
        assert_eq!(s.output().get(VoxelCoord::new(3, 1, 1)), Some(0));
        assert!(matches!(s.cancel(), Err(SessionError::NoEdit)));
    }

    #[test]
    fn test_delete_renumbers() {
        let mut s = session();
        add(&mut s, [1.5, 1.5, 1.5], [6.5, 1.5, 1.5]);
        add(&mut s, [1.5, 8.5, 1.5], [6.5, 8.5, 1.5]);

        s.delete(1).unwrap();
        assert_eq!(s.needles().len(), 1);
        assert_eq!(s.output().get(VoxelCoord::new(3, 8, 1)), Some(1));
        assert_eq!(s.output().get(VoxelCoord::new(3, 1, 1)), Some(0));
        assert!(matches!(
            s.delete(2),
            Err(SessionError::NeedleIndex { index: 2, count: 1 })
        ));
        assert!(matches!(s.delete(0), Err(SessionError::NeedleIndex { .. })));
    }

    #[test]
    fn test_needle_limit() {
        let grid = GridGeometry::from_spacing([8, 8, 8], [1.0; 3], SpatialUnit::Millimeter).unwrap();
        let mut s = Session::with_config(grid, PlanConfig::with_needle_limit(1)).unwrap();
        add(&mut s, [0.5, 0.5, 0.5], [4.5, 0.5, 0.5]);

        assert!(!s.can_insert());
        assert!(!s.view().insert_enabled);
        assert!(matches!(
            s.begin_insert(),
            Err(SessionError::NeedleLimit { limit: 1 })
        ));
    }

    #[test]
    fn test_geometry_setters() {
        let mut s = session();
        s.set_diameter(15).unwrap();
        assert_eq!(s.geometry().safezone_radius_mm(), 8);
        assert!(matches!(s.set_safezone(0), Err(SessionError::Geometry(_))));
        assert_eq!(s.geometry().safezone_radius_mm(), 8);
    }

    #[test]
    fn test_edit_point_voxel() {
        let mut s = session();
        s.begin_insert().unwrap();
        s.mark(Endpoint::Entry, Point3::new(3.7, 2.2, 9.9)).unwrap();
        assert_eq!(
            s.edit_point_voxel(Endpoint::Entry),
            Some(Point3::new(3.0, 2.0, 9.0))
        );
        assert_eq!(s.edit_point_voxel(Endpoint::Target), None);
    }

    #[test]
    fn test_view_projection() {
        let mut s = session();
        add(&mut s, [1.5, 1.5, 1.5], [6.5, 1.5, 1.5]);
        s.begin_update(1).unwrap();

        let view = s.view();
        assert_eq!(view.needles.len(), 1);
        assert!(view.needles[0].editing);
        assert_eq!(view.needles[0].entry, [1.5, 1.5, 1.5]);
        assert!(!view.insert_enabled);
        let form = view.form.unwrap();
        assert_eq!(form.title, "update item #1");
        assert!(form.submit_enabled);
        assert_eq!(view.draw_mode, DrawMode::Line);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let grid = GridGeometry::from_spacing([8, 8, 8], [1.0; 3], SpatialUnit::Millimeter).unwrap();
        let config = PlanConfig::default().margin_epsilon_mm(-2.0);
        assert!(matches!(
            Session::with_config(grid, config),
            Err(SessionError::Config(ConfigError::InvalidMarginEpsilon(_)))
        ));
    }

    #[test]
    fn test_failed_redraw_rolls_back_submit() {
        let mut s = session();
        add(&mut s, [1.5, 1.5, 1.5], [6.5, 1.5, 1.5]);
        s.set_draw_mode(DrawMode::Full).unwrap();
        let output = s.output().clone();

        // Bypasses validation: the next Full redraw cannot bound its margin field
        s.config.margin_epsilon_mm = f64::NEG_INFINITY;

        s.begin_insert().unwrap();
        s.mark(Endpoint::Entry, Point3::new(1.5, 9.5, 1.5)).unwrap();
        // The provisional redraw already fails
        s.mark(Endpoint::Target, Point3::new(6.5, 9.5, 1.5)).unwrap_err();
        assert!(matches!(s.submit(), Err(SessionError::Composite(_))));
        assert_eq!(s.needles().len(), 1);
        assert!(matches!(s.edit().unwrap().kind(), EditKind::Insert));
        assert_eq!(s.output(), &output);

        s.config.margin_epsilon_mm = 1.0;
        s.cancel().unwrap();
        assert_eq!(s.output(), &output);

        s.begin_update(1).unwrap();
        s.config.margin_epsilon_mm = f64::NEG_INFINITY;
        s.mark(Endpoint::Target, Point3::new(1.5, 1.5, 9.5)).unwrap_err();
        assert!(s.submit().is_err());
        assert_eq!(*s.needle(1).unwrap().target(), Point3::new(6.5, 1.5, 1.5));
        assert!(matches!(s.edit().unwrap().kind(), EditKind::Update(1)));
    }

    #[test]
    fn test_close_returns_volumes() {
        let mut s = session();
        add(&mut s, [1.5, 1.5, 1.5], [6.5, 1.5, 1.5]);
        let composition = s.close();
        assert_eq!(composition.output.get(VoxelCoord::new(2, 1, 1)), Some(1));
    }
}
