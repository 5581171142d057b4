//! Axis-aligned bounds in voxel space.

use crate::voxel::VoxelCoord;

/// Axis-aligned bounds in voxel space.
///
/// Represents a box of voxels defined by minimum and maximum coordinates.
/// Both bounds are inclusive.
///
/// # Example
///
/// ```
/// use ablation_grid::{GridBounds, VoxelCoord};
///
/// let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(10, 10, 10));
///
/// assert!(bounds.contains(VoxelCoord::new(5, 5, 5)));
/// assert!(!bounds.contains(VoxelCoord::new(15, 5, 5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    /// Minimum corner (inclusive).
    pub min: VoxelCoord,
    /// Maximum corner (inclusive).
    pub max: VoxelCoord,
}

impl GridBounds {
    /// Creates new bounds from two corners, ordering them so min ≤ max on each axis.
    #[must_use]
    pub fn new(a: VoxelCoord, b: VoxelCoord) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates bounds containing a single voxel.
    #[must_use]
    pub const fn from_point(coord: VoxelCoord) -> Self {
        Self {
            min: coord,
            max: coord,
        }
    }

    /// Creates bounds covering every voxel of a volume with the given shape.
    ///
    /// Returns `None` for an empty shape or one that does not fit in `i32`.
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_grid::{GridBounds, VoxelCoord};
    ///
    /// let bounds = GridBounds::from_shape([4, 5, 6]).unwrap();
    /// assert_eq!(bounds.max, VoxelCoord::new(3, 4, 5));
    /// assert_eq!(bounds.volume(), 120);
    /// ```
    #[must_use]
    pub fn from_shape(shape: [usize; 3]) -> Option<Self> {
        let last = |n: usize| i32::try_from(n.checked_sub(1)?).ok();
        Some(Self {
            min: VoxelCoord::origin(),
            max: VoxelCoord::new(last(shape[0])?, last(shape[1])?, last(shape[2])?),
        })
    }

    /// Returns the number of voxels along each axis.
    #[must_use]
    pub fn extent(&self) -> [usize; 3] {
        let span = |lo: i32, hi: i32| usize::try_from(hi.abs_diff(lo)).map_or(usize::MAX, |d| d + 1);
        [
            span(self.min.x, self.max.x),
            span(self.min.y, self.max.y),
            span(self.min.z, self.max.z),
        ]
    }

    /// Returns the total number of voxels in these bounds.
    #[must_use]
    pub fn volume(&self) -> usize {
        let [w, h, d] = self.extent();
        w.saturating_mul(h).saturating_mul(d)
    }

    /// Checks if the bounds contain a coordinate.
    #[must_use]
    pub const fn contains(&self, coord: VoxelCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
            && coord.z >= self.min.z
            && coord.z <= self.max.z
    }

    /// Expands the bounds to include a coordinate.
    pub fn expand_to_include(&mut self, coord: VoxelCoord) {
        self.min = self.min.min(coord);
        self.max = self.max.max(coord);
    }

    /// Grows the bounds by a per-axis number of voxels on both sides.
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_grid::{GridBounds, VoxelCoord};
    ///
    /// let grown = GridBounds::from_point(VoxelCoord::new(5, 5, 5)).grow([1, 2, 0]);
    /// assert_eq!(grown.min, VoxelCoord::new(4, 3, 5));
    /// assert_eq!(grown.max, VoxelCoord::new(6, 7, 5));
    /// ```
    #[must_use]
    pub fn grow(&self, margin: [i32; 3]) -> Self {
        let margin = VoxelCoord::from(margin);
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// Returns the intersection of two bounds, or `None` if they don't overlap.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);

        if min.x <= max.x && min.y <= max.y && min.z <= max.z {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Returns an iterator over all coordinates in these bounds.
    ///
    /// Iterates in Z-Y-X order (X varies fastest), matching dense storage order.
    #[must_use]
    pub const fn iter(&self) -> GridBoundsIter {
        GridBoundsIter {
            bounds: *self,
            current: Some(self.min),
        }
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::from_point(VoxelCoord::origin())
    }
}

impl IntoIterator for GridBounds {
    type Item = VoxelCoord;
    type IntoIter = GridBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &GridBounds {
    type Item = VoxelCoord;
    type IntoIter = GridBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over all coordinates in a [`GridBounds`].
#[derive(Debug, Clone)]
pub struct GridBoundsIter {
    bounds: GridBounds,
    current: Option<VoxelCoord>,
}

impl Iterator for GridBoundsIter {
    type Item = VoxelCoord;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        let mut next = current;
        if next.x < self.bounds.max.x {
            next.x += 1;
        } else {
            next.x = self.bounds.min.x;
            if next.y < self.bounds.max.y {
                next.y += 1;
            } else {
                next.y = self.bounds.min.y;
                if next.z < self.bounds.max.z {
                    next.z += 1;
                } else {
                    self.current = None;
                    return Some(current);
                }
            }
        }
        self.current = Some(next);

        Some(current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_corners() {
        let bounds = GridBounds::new(VoxelCoord::new(10, 0, 5), VoxelCoord::new(0, 10, 5));
        assert_eq!(bounds.min, VoxelCoord::new(0, 0, 5));
        assert_eq!(bounds.max, VoxelCoord::new(10, 10, 5));
    }

    #[test]
    fn test_from_shape_empty() {
        assert!(GridBounds::from_shape([0, 4, 4]).is_none());
        assert!(GridBounds::from_shape([1, 1, 1]).is_some());
    }

    #[test]
    fn test_extent_and_volume() {
        let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(9, 19, 29));
        assert_eq!(bounds.extent(), [10, 20, 30]);
        assert_eq!(bounds.volume(), 6000);
    }

    #[test]
    fn test_expand_to_include() {
        let mut bounds = GridBounds::from_point(VoxelCoord::new(5, 5, 5));
        bounds.expand_to_include(VoxelCoord::new(10, 2, 5));
        assert_eq!(bounds.min, VoxelCoord::new(5, 2, 5));
        assert_eq!(bounds.max, VoxelCoord::new(10, 5, 5));
    }

    #[test]
    fn test_grow_then_clamp() {
        let grid = GridBounds::from_shape([8, 8, 8]).unwrap();
        let window = GridBounds::from_point(VoxelCoord::new(1, 6, 4))
            .grow([3, 3, 1])
            .intersection(&grid)
            .unwrap();
        assert_eq!(window.min, VoxelCoord::new(0, 3, 3));
        assert_eq!(window.max, VoxelCoord::new(4, 7, 5));
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(2, 2, 2));
        let b = GridBounds::new(VoxelCoord::new(3, 0, 0), VoxelCoord::new(5, 2, 2));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_iter_order_and_count() {
        let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 2, 1));
        let coords: Vec<_> = bounds.iter().collect();
        assert_eq!(coords.len(), 12);
        assert_eq!(coords[0], VoxelCoord::new(0, 0, 0));
        assert_eq!(coords[1], VoxelCoord::new(1, 0, 0));
        assert_eq!(coords[2], VoxelCoord::new(0, 1, 0));
        assert_eq!(coords[11], VoxelCoord::new(1, 2, 1));
    }

    #[test]
    fn test_iter_single_voxel() {
        let bounds = GridBounds::from_point(VoxelCoord::new(-3, 4, 9));
        assert_eq!(bounds.iter().count(), 1);
    }
}
