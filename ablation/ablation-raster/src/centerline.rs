//! Sparse voxel sets produced by rasterization.

use ablation_grid::{GridBounds, VoxelCoord, VoxelMask};

/// The voxels a trajectory passes through, kept sparse.
///
/// Voxels are stored once each in x-fastest order together with their tight
/// bounds, so consumers can work inside the bounding box without scanning the
/// whole grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Centerline {
    shape: [usize; 3],
    voxels: Vec<VoxelCoord>,
    bounds: Option<GridBounds>,
}

const fn order_key(coord: &VoxelCoord) -> (i32, i32, i32) {
    (coord.z, coord.y, coord.x)
}

impl Centerline {
    /// Builds a centerline from voxels of a grid with the given shape.
    ///
    /// Duplicates are removed. Voxels are not checked against the shape.
    #[must_use]
    pub fn from_voxels(shape: [usize; 3], mut voxels: Vec<VoxelCoord>) -> Self {
        voxels.sort_unstable_by_key(order_key);
        voxels.dedup();
        let bounds = voxels.split_first().map(|(&first, rest)| {
            let mut bounds = GridBounds::from_point(first);
            for &coord in rest {
                bounds.expand_to_include(coord);
            }
            bounds
        });
        Self {
            shape,
            voxels,
            bounds,
        }
    }

    /// Collects the `true` voxels of a mask.
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_grid::{VoxelCoord, VoxelMask};
    /// use ablation_raster::Centerline;
    ///
    /// let mut mask = VoxelMask::empty([8, 8, 8]);
    /// mask.set(VoxelCoord::new(4, 3, 2), true);
    /// mask.set(VoxelCoord::new(1, 5, 2), true);
    ///
    /// let centerline = Centerline::from_mask(&mask);
    /// assert_eq!(centerline.len(), 2);
    /// assert_eq!(centerline.bounds().unwrap().min, VoxelCoord::new(1, 3, 2));
    /// ```
    #[must_use]
    pub fn from_mask(mask: &VoxelMask) -> Self {
        Self::from_voxels(mask.shape(), mask.occupied().collect())
    }

    /// Returns the shape of the grid the voxels belong to.
    #[must_use]
    pub const fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Returns the voxels in x-fastest order.
    #[must_use]
    pub fn voxels(&self) -> &[VoxelCoord] {
        &self.voxels
    }

    /// Returns the number of voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Returns `true` if there are no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Returns the tight bounds of the voxels, or `None` if there are none.
    #[must_use]
    pub const fn bounds(&self) -> Option<GridBounds> {
        self.bounds
    }

    /// Returns `true` if `coord` is one of the voxels.
    #[must_use]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.voxels
            .binary_search_by_key(&order_key(&coord), order_key)
            .is_ok()
    }

    /// Expands into a grid-shaped mask.
    #[must_use]
    pub fn to_mask(&self) -> VoxelMask {
        let mut mask = VoxelMask::empty(self.shape);
        for &coord in &self.voxels {
            mask.set(coord, true);
        }
        mask
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_order() {
        let centerline = Centerline::from_voxels(
            [4, 4, 4],
            vec![
                VoxelCoord::new(2, 0, 1),
                VoxelCoord::new(0, 0, 0),
                VoxelCoord::new(2, 0, 1),
                VoxelCoord::new(3, 1, 0),
            ],
        );
        assert_eq!(
            centerline.voxels(),
            &[
                VoxelCoord::new(0, 0, 0),
                VoxelCoord::new(3, 1, 0),
                VoxelCoord::new(2, 0, 1),
            ]
        );
        let bounds = centerline.bounds().unwrap();
        assert_eq!(bounds.min, VoxelCoord::new(0, 0, 0));
        assert_eq!(bounds.max, VoxelCoord::new(3, 1, 1));
        assert!(centerline.contains(VoxelCoord::new(3, 1, 0)));
        assert!(!centerline.contains(VoxelCoord::new(1, 0, 0)));
    }

    #[test]
    fn test_mask_roundtrip() {
        let mut mask = VoxelMask::empty([5, 5, 5]);
        mask.set(VoxelCoord::new(1, 2, 3), true);
        mask.set(VoxelCoord::new(4, 0, 0), true);
        let centerline = Centerline::from_mask(&mask);
        assert_eq!(centerline.to_mask(), mask);
        assert_eq!(centerline.voxels().to_vec(), mask.occupied().collect::<Vec<_>>());
    }

    #[test]
    fn test_empty() {
        let centerline = Centerline::from_voxels([2, 2, 2], Vec::new());
        assert!(centerline.is_empty());
        assert!(centerline.bounds().is_none());
    }
}
