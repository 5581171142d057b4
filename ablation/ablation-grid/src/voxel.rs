//! Voxel coordinate types.

use nalgebra::Point3;

/// A discrete 3D coordinate in voxel space.
///
/// Uses `i32` so that world points falling before the grid origin map to
/// negative indices instead of wrapping. Whether a coordinate is inside a
/// particular volume is decided by that volume's shape.
///
/// # Example
///
/// ```
/// use ablation_grid::VoxelCoord;
///
/// let coord = VoxelCoord::new(1, 2, 3);
/// assert_eq!(coord.as_array(), [1, 2, 3]);
/// assert_eq!(VoxelCoord::new(-1, 0, 0).to_unsigned(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// X index.
    pub x: i32,
    /// Y index.
    pub y: i32,
    /// Z index.
    pub z: i32,
}

impl VoxelCoord {
    /// Creates a new voxel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Creates a coordinate at the origin (0, 0, 0).
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// Returns the coordinate as an array.
    #[must_use]
    pub const fn as_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns the component on the given axis (0 = x, 1 = y, anything else = z).
    #[must_use]
    pub const fn axis(self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Converts to a floating-point point in voxel space.
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_grid::VoxelCoord;
    /// use nalgebra::Point3;
    ///
    /// assert_eq!(VoxelCoord::new(1, 2, 3).to_point(), Point3::new(1.0, 2.0, 3.0));
    /// ```
    #[must_use]
    pub fn to_point(self) -> Point3<f64> {
        Point3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Truncates a continuous voxel-space position toward zero.
    ///
    /// Non-finite components map to 0 and out-of-range components saturate,
    /// following the semantics of an `as` cast.
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_grid::VoxelCoord;
    /// use nalgebra::Point3;
    ///
    /// let coord = VoxelCoord::truncate(&Point3::new(2.9, 0.5, -0.5));
    /// assert_eq!(coord, VoxelCoord::new(2, 0, 0));
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn truncate(point: &Point3<f64>) -> Self {
        Self::new(point.x as i32, point.y as i32, point.z as i32)
    }

    /// Returns the coordinate as unsigned indices, or `None` if any component is negative.
    #[must_use]
    pub fn to_unsigned(self) -> Option<[usize; 3]> {
        Some([
            usize::try_from(self.x).ok()?,
            usize::try_from(self.y).ok()?,
            usize::try_from(self.z).ok()?,
        ])
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }
}

impl From<[i32; 3]> for VoxelCoord {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<VoxelCoord> for [i32; 3] {
    fn from(coord: VoxelCoord) -> Self {
        coord.as_array()
    }
}

impl std::ops::Add for VoxelCoord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.x.saturating_add(other.x),
            self.y.saturating_add(other.y),
            self.z.saturating_add(other.z),
        )
    }
}

impl std::ops::Sub for VoxelCoord {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(
            self.x.saturating_sub(other.x),
            self.y.saturating_sub(other.y),
            self.z.saturating_sub(other.z),
        )
    }
}
