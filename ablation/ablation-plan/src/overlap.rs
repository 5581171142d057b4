//! Coverage and collision statistics against anatomical masks.

use std::fmt;
use std::sync::Arc;

use ablation_grid::{GridGeometry, LabelVolume, VoxelMask};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MaskError, MaskResult};

/// A named boolean volume supplied by the host, such as a segmented lesion or vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    name: String,
    geometry: GridGeometry,
    voxels: VoxelMask,
}

impl Mask {
    /// Creates a mask on a grid.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::Incompatible`] if the voxels are not shaped like the grid.
    pub fn new(name: impl Into<String>, geometry: GridGeometry, voxels: VoxelMask) -> MaskResult<Self> {
        let name = name.into();
        if voxels.shape() != geometry.shape() {
            return Err(MaskError::Incompatible {
                name,
                source: ablation_grid::SpatialError::ShapeMismatch {
                    expected: geometry.shape(),
                    actual: voxels.shape(),
                },
            });
        }
        Ok(Self {
            name,
            geometry,
            voxels,
        })
    }

    /// Returns the mask name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the grid the mask was segmented on.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Returns the mask voxels.
    #[must_use]
    pub const fn voxels(&self) -> &VoxelMask {
        &self.voxels
    }
}

/// Which list a mask belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskList {
    /// Tissue that should be covered.
    Target,
    /// Tissue that should be avoided.
    Danger,
}

impl fmt::Display for MaskList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Target => "target",
            Self::Danger => "danger",
        })
    }
}

/// Target and danger masks registered with a session.
///
/// Masks are shared read-only with the host. The same mask may sit in both
/// lists, but names are unique within a list.
#[derive(Debug, Clone, Default)]
pub struct MaskRegistry {
    targets: Vec<Arc<Mask>>,
    dangers: Vec<Arc<Mask>>,
}

impl MaskRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mask to a list after checking it against the session grid.
    ///
    /// # Errors
    ///
    /// - [`MaskError::Incompatible`] if shape, affine or unit differ from `grid`
    /// - [`MaskError::Duplicate`] if the list already has a mask with this name
    pub fn add(&mut self, list: MaskList, mask: Arc<Mask>, grid: &GridGeometry) -> MaskResult<()> {
        if let Err(source) = grid.ensure_compatible(mask.geometry()) {
            warn!(name = mask.name(), %list, %source, "Rejected mask");
            return Err(MaskError::Incompatible {
                name: mask.name().to_owned(),
                source,
            });
        }
        let masks = self.list_mut(list);
        if masks.iter().any(|m| m.name() == mask.name()) {
            warn!(name = mask.name(), %list, "Rejected duplicate mask");
            return Err(MaskError::Duplicate {
                name: mask.name().to_owned(),
                list,
            });
        }
        debug!(name = mask.name(), %list, voxels = mask.voxels().count(), "Registered mask");
        masks.push(mask);
        Ok(())
    }

    /// Removes a mask by name and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::NotFound`] if the list has no mask with this name.
    pub fn remove(&mut self, list: MaskList, name: &str) -> MaskResult<Arc<Mask>> {
        let masks = self.list_mut(list);
        let position = masks
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| MaskError::NotFound {
                name: name.to_owned(),
                list,
            })?;
        Ok(masks.remove(position))
    }

    /// Returns the masks of one list in registration order.
    #[must_use]
    pub fn list(&self, list: MaskList) -> &[Arc<Mask>] {
        match list {
            MaskList::Target => &self.targets,
            MaskList::Danger => &self.dangers,
        }
    }

    /// Returns the target masks.
    #[must_use]
    pub fn targets(&self) -> &[Arc<Mask>] {
        &self.targets
    }

    /// Returns the danger masks.
    #[must_use]
    pub fn dangers(&self) -> &[Arc<Mask>] {
        &self.dangers
    }

    fn list_mut(&mut self, list: MaskList) -> &mut Vec<Arc<Mask>> {
        match list {
            MaskList::Target => &mut self.targets,
            MaskList::Danger => &mut self.dangers,
        }
    }
}

/// How much of a target mask is ablated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetCoverage {
    /// Mask name.
    pub name: String,
    /// Covered share of the mask in whole percent, or `None` for an empty mask.
    pub percent: Option<u32>,
}

/// Whether a danger mask is touched by any needle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DangerHit {
    /// Mask name.
    pub name: String,
    /// `true` if any ablated voxel lies in the mask.
    pub flagged: bool,
    /// Highest needle index touching the mask, when flagged.
    pub offending_index: Option<usize>,
}

/// Overlap statistics for every registered mask, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverlapReport {
    /// One entry per target mask.
    pub targets: Vec<TargetCoverage>,
    /// One entry per danger mask.
    pub dangers: Vec<DangerHit>,
}

impl OverlapReport {
    /// Returns the coverage entry for a named target.
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&TargetCoverage> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Returns the entry for a named danger mask.
    #[must_use]
    pub fn danger(&self, name: &str) -> Option<&DangerHit> {
        self.dangers.iter().find(|d| d.name == name)
    }

    /// Returns `true` if any danger mask is flagged.
    #[must_use]
    pub fn any_danger(&self) -> bool {
        self.dangers.iter().any(|d| d.flagged)
    }
}

/// Percentage of `mask` covered by labeled voxels, rounded half to even.
///
/// Returns `None` when the mask is empty.
///
/// # Example
///
/// ```
/// use ablation_grid::{LabelVolume, VoxelCoord, VoxelMask};
/// use ablation_plan::coverage_percent;
///
/// let mut mask = VoxelMask::empty([8, 1, 1]);
/// let mut analysis = LabelVolume::new([8, 1, 1], 0);
/// for x in 0..8 {
///     mask.set(VoxelCoord::new(x, 0, 0), true);
/// }
/// for x in 0..3 {
///     analysis.set(VoxelCoord::new(x, 0, 0), 1);
/// }
///
/// // 3 of 8 is 37.5%, which rounds to the even neighbor
/// assert_eq!(coverage_percent(&analysis, &mask), Some(38));
/// ```
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn coverage_percent(analysis: &LabelVolume, mask: &VoxelMask) -> Option<u32> {
    let total = mask.count();
    if total == 0 {
        return None;
    }
    let covered = analysis.count_labeled_in(mask);
    Some((100.0 * covered as f64 / total as f64).round_ties_even() as u32)
}

/// Evaluates every registered mask against an analysis volume.
///
/// `committed` is the number of committed needles and `edit_index` the display
/// index of an open edit. An offending label above `committed` can only come
/// from the edit, so it is reported as `edit_index`.
#[must_use]
pub fn analyze(
    analysis: &LabelVolume,
    masks: &MaskRegistry,
    committed: usize,
    edit_index: Option<usize>,
) -> OverlapReport {
    let targets = masks
        .targets()
        .iter()
        .map(|mask| TargetCoverage {
            name: mask.name().to_owned(),
            percent: coverage_percent(analysis, mask.voxels()),
        })
        .collect();

    let dangers = masks
        .dangers()
        .iter()
        .map(|mask| {
            let offending_index = analysis
                .max_labeled_in(mask.voxels())
                .and_then(|label| usize::try_from(label).ok())
                .map(|index| match edit_index {
                    Some(edit) if index > committed => edit,
                    _ => index,
                });
            DangerHit {
                name: mask.name().to_owned(),
                flagged: offending_index.is_some(),
                offending_index,
            }
        })
        .collect();

    let report = OverlapReport { targets, dangers };
    debug!(
        targets = report.targets.len(),
        dangers = report.dangers.len(),
        flagged = report.any_danger(),
        "Evaluated overlap"
    );
    report
}
