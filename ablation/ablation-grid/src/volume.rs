//! Dense voxel volumes.

use crate::bounds::GridBounds;
use crate::error::{SpatialError, SpatialResult};
use crate::voxel::VoxelCoord;

/// Boolean voxel volume (centerlines, margin bands, anatomical masks).
pub type VoxelMask = VoxelVolume<bool>;

/// Integer-labeled voxel volume (rendered output, analysis volume).
pub type LabelVolume = VoxelVolume<i32>;

/// A dense 3D array of voxel values.
///
/// Values are stored x-fastest. Every voxel of the shape is materialized, so
/// reads never miss; out-of-shape coordinates return `None` and writes to them
/// are ignored.
///
/// # Example
///
/// ```
/// use ablation_grid::{LabelVolume, VoxelCoord};
///
/// let mut volume = LabelVolume::new([4, 4, 4], 0);
/// volume.set(VoxelCoord::new(1, 2, 3), 7);
///
/// assert_eq!(volume.get(VoxelCoord::new(1, 2, 3)), Some(7));
/// assert_eq!(volume.get(VoxelCoord::new(4, 0, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelVolume<T> {
    /// Values stored in x-fastest order.
    values: Vec<T>,
    /// Dimensions (nx, ny, nz).
    shape: [usize; 3],
}

impl<T: Copy> VoxelVolume<T> {
    /// Creates a volume with every voxel set to `fill`.
    #[must_use]
    pub fn new(shape: [usize; 3], fill: T) -> Self {
        Self {
            values: vec![fill; shape[0] * shape[1] * shape[2]],
            shape,
        }
    }

    /// Wraps existing x-fastest data.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::DataLengthMismatch`] if `values` does not hold
    /// exactly one value per voxel.
    pub fn from_vec(shape: [usize; 3], values: Vec<T>) -> SpatialResult<Self> {
        let expected = shape[0] * shape[1] * shape[2];
        if values.len() != expected {
            return Err(SpatialError::DataLengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { values, shape })
    }

    /// Returns the volume dimensions.
    #[must_use]
    pub const fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Returns the number of voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the volume has no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the bounds covering the whole volume, or `None` if it is empty.
    #[must_use]
    pub fn bounds(&self) -> Option<GridBounds> {
        GridBounds::from_shape(self.shape)
    }

    /// Returns the linear index of a coordinate, or `None` if it lies outside the volume.
    #[must_use]
    pub fn index_of(&self, coord: VoxelCoord) -> Option<usize> {
        let [x, y, z] = coord.to_unsigned()?;
        let [nx, ny, nz] = self.shape;
        (x < nx && y < ny && z < nz).then(|| x + nx * (y + ny * z))
    }

    /// Returns the coordinate of a linear index.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn coord_of(&self, index: usize) -> VoxelCoord {
        let [nx, ny, _] = self.shape;
        let x = index % nx;
        let y = (index / nx) % ny;
        let z = index / (nx * ny);
        VoxelCoord::new(x as i32, y as i32, z as i32)
    }

    /// Checks if a coordinate lies inside the volume.
    #[must_use]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.index_of(coord).is_some()
    }

    /// Returns the value at a coordinate.
    #[must_use]
    pub fn get(&self, coord: VoxelCoord) -> Option<T> {
        self.index_of(coord).map(|i| self.values[i])
    }

    /// Sets the value at a coordinate.
    ///
    /// Returns `false` (and leaves the volume untouched) if the coordinate is outside.
    pub fn set(&mut self, coord: VoxelCoord, value: T) -> bool {
        match self.index_of(coord) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// Sets every voxel to `value`.
    pub fn fill(&mut self, value: T) {
        self.values.fill(value);
    }

    /// Returns the raw x-fastest values.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Iterates over every voxel with its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelCoord, T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.coord_of(i), v))
    }
}

impl VoxelVolume<bool> {
    /// Creates an all-`false` mask.
    #[must_use]
    pub fn empty(shape: [usize; 3]) -> Self {
        Self::new(shape, false)
    }

    /// Returns the number of `true` voxels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }

    /// Returns `true` if no voxel is set.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        !self.values.iter().any(|&v| v)
    }

    /// Iterates over the coordinates of `true` voxels.
    pub fn occupied(&self) -> impl Iterator<Item = VoxelCoord> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(|(i, _)| self.coord_of(i))
    }
}

impl VoxelVolume<i32> {
    /// Writes `label` at each coordinate, ignoring coordinates outside the volume.
    pub fn paint_coords<I>(&mut self, coords: I, label: i32)
    where
        I: IntoIterator<Item = VoxelCoord>,
    {
        for coord in coords {
            self.set(coord, label);
        }
    }

    /// Returns a mask of voxels with a positive label.
    #[must_use]
    pub fn labeled(&self) -> VoxelMask {
        VoxelVolume {
            values: self.values.iter().map(|&v| v > 0).collect(),
            shape: self.shape,
        }
    }

    /// Counts the voxels selected by `mask` that carry a positive label.
    #[must_use]
    pub fn count_labeled_in(&self, mask: &VoxelMask) -> usize {
        self.values
            .iter()
            .zip(&mask.values)
            .filter(|&(&v, &m)| m && v > 0)
            .count()
    }

    /// Returns the largest positive label among voxels selected by `mask`.
    ///
    /// Returns `None` when no selected voxel is labeled.
    #[must_use]
    pub fn max_labeled_in(&self, mask: &VoxelMask) -> Option<i32> {
        self.values
            .iter()
            .zip(&mask.values)
            .filter(|&(&v, &m)| m && v > 0)
            .map(|(&v, _)| v)
            .max()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_volume() {
        let volume = LabelVolume::new([3, 4, 5], 0);
        assert_eq!(volume.len(), 60);
        assert_eq!(volume.shape(), [3, 4, 5]);
        assert!(!volume.is_empty());
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        let result = VoxelMask::from_vec([2, 2, 2], vec![false; 7]);
        assert!(matches!(
            result,
            Err(SpatialError::DataLengthMismatch {
                expected: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_index_roundtrip() {
        let volume = LabelVolume::new([3, 4, 5], 0);
        for i in 0..volume.len() {
            let coord = volume.coord_of(i);
            assert_eq!(volume.index_of(coord), Some(i));
        }
    }

    #[test]
    fn test_x_fastest_layout() {
        let volume = LabelVolume::new([3, 4, 5], 0);
        assert_eq!(volume.index_of(VoxelCoord::new(1, 0, 0)), Some(1));
        assert_eq!(volume.index_of(VoxelCoord::new(0, 1, 0)), Some(3));
        assert_eq!(volume.index_of(VoxelCoord::new(0, 0, 1)), Some(12));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut volume = LabelVolume::new([2, 2, 2], 0);
        assert!(!volume.set(VoxelCoord::new(-1, 0, 0), 5));
        assert!(!volume.set(VoxelCoord::new(0, 2, 0), 5));
        assert_eq!(volume.get(VoxelCoord::new(2, 0, 0)), None);
        assert!(volume.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_mask_count_and_occupied() {
        let mut mask = VoxelMask::empty([5, 5, 5]);
        assert!(mask.is_clear());

        mask.set(VoxelCoord::new(1, 1, 1), true);
        mask.set(VoxelCoord::new(3, 2, 4), true);
        assert_eq!(mask.count(), 2);
        assert_eq!(
            mask.occupied().collect::<Vec<_>>(),
            vec![VoxelCoord::new(1, 1, 1), VoxelCoord::new(3, 2, 4)]
        );
    }

    #[test]
    fn test_paint_last_write_wins() {
        let mut volume = LabelVolume::new([4, 1, 1], 0);
        volume.paint_coords([VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 0, 0)], 1);
        volume.paint_coords([VoxelCoord::new(1, 0, 0), VoxelCoord::new(2, 0, 0)], 2);
        // Outside the volume: ignored
        volume.paint_coords([VoxelCoord::new(4, 0, 0)], 3);

        assert_eq!(volume.as_slice(), &[1, 2, 2, 0]);
    }

    #[test]
    fn test_labeled_queries() {
        let volume = LabelVolume::from_vec([4, 1, 1], vec![0, 3, 1, 2]).unwrap();
        let mut mask = VoxelMask::empty([4, 1, 1]);
        mask.set(VoxelCoord::new(0, 0, 0), true);
        mask.set(VoxelCoord::new(2, 0, 0), true);
        mask.set(VoxelCoord::new(3, 0, 0), true);

        assert_eq!(volume.count_labeled_in(&mask), 2);
        assert_eq!(volume.max_labeled_in(&mask), Some(2));
        assert_eq!(volume.labeled().count(), 3);

        let empty = VoxelMask::empty([4, 1, 1]);
        assert_eq!(volume.max_labeled_in(&empty), None);
    }
}
