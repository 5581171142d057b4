//! World/voxel coordinate conversion.

use nalgebra::{Matrix4, Point3};

use crate::error::{SpatialError, SpatialResult};
use crate::geometry::GridGeometry;
use crate::voxel::VoxelCoord;

/// Converts between world and voxel coordinates for one fixed grid.
///
/// The host image owns the actual transform; the planning pipeline only needs
/// these two conversions, which keeps the geometry core testable without a host.
pub trait CoordinateMapper {
    /// Maps a world point to the voxel containing it, truncating toward zero.
    ///
    /// The result may lie outside the grid; callers check containment.
    fn world_to_voxel(&self, point: &Point3<f64>) -> VoxelCoord;

    /// Maps a voxel index to its world position.
    fn voxel_to_world(&self, coord: VoxelCoord) -> Point3<f64>;
}

/// A [`CoordinateMapper`] backed by a homogeneous voxel-to-world affine.
///
/// The inverse is computed once at construction.
///
/// # Example
///
/// ```
/// use ablation_grid::{AffineMapper, CoordinateMapper, GridGeometry, SpatialUnit, VoxelCoord};
/// use nalgebra::{Matrix4, Point3, Vector3};
///
/// // 1mm voxels with the first voxel at world (-10, -10, -10)
/// let affine = Matrix4::new_translation(&Vector3::new(-10.0, -10.0, -10.0));
/// let geometry = GridGeometry::new([20, 20, 20], [1.0; 3], affine, SpatialUnit::Millimeter)
///     .unwrap();
/// let mapper = AffineMapper::new(&geometry).unwrap();
///
/// assert_eq!(mapper.world_to_voxel(&Point3::origin()), VoxelCoord::new(10, 10, 10));
/// assert_eq!(mapper.voxel_to_world(VoxelCoord::new(10, 10, 10)), Point3::origin());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AffineMapper {
    voxel_to_world: Matrix4<f64>,
    world_to_voxel: Matrix4<f64>,
}

impl AffineMapper {
    /// Creates a mapper from a grid's affine.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::SingularAffine`] if the affine cannot be inverted.
    pub fn new(geometry: &GridGeometry) -> SpatialResult<Self> {
        Self::from_affine(*geometry.affine())
    }

    /// Creates a mapper from a raw voxel-to-world affine.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::SingularAffine`] if the affine cannot be inverted.
    pub fn from_affine(voxel_to_world: Matrix4<f64>) -> SpatialResult<Self> {
        let world_to_voxel = voxel_to_world
            .try_inverse()
            .ok_or(SpatialError::SingularAffine)?;
        Ok(Self {
            voxel_to_world,
            world_to_voxel,
        })
    }

    /// Maps a world point to continuous voxel space without truncation.
    #[must_use]
    pub fn world_to_continuous(&self, point: &Point3<f64>) -> Point3<f64> {
        self.world_to_voxel.transform_point(point)
    }
}

impl CoordinateMapper for AffineMapper {
    fn world_to_voxel(&self, point: &Point3<f64>) -> VoxelCoord {
        VoxelCoord::truncate(&self.world_to_continuous(point))
    }

    fn voxel_to_world(&self, coord: VoxelCoord) -> Point3<f64> {
        self.voxel_to_world.transform_point(&coord.to_point())
    }
}

impl<M: CoordinateMapper + ?Sized> CoordinateMapper for &M {
    fn world_to_voxel(&self, point: &Point3<f64>) -> VoxelCoord {
        (**self).world_to_voxel(point)
    }

    fn voxel_to_world(&self, coord: VoxelCoord) -> Point3<f64> {
        (**self).voxel_to_world(coord)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::SpatialUnit;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn scaled(spacing: [f64; 3]) -> AffineMapper {
        let geometry =
            GridGeometry::from_spacing([32, 32, 32], spacing, SpatialUnit::Millimeter).unwrap();
        AffineMapper::new(&geometry).unwrap()
    }

    #[test]
    fn test_identity_roundtrip() {
        let mapper = scaled([1.0; 3]);
        for coord in [
            VoxelCoord::new(0, 0, 0),
            VoxelCoord::new(5, 0, 0),
            VoxelCoord::new(3, 7, 11),
        ] {
            let world = mapper.voxel_to_world(coord);
            assert_eq!(mapper.world_to_voxel(&world), coord);
        }
    }

    #[test]
    fn test_anisotropic_truncation() {
        let mapper = scaled([0.5, 1.0, 2.0]);
        let coord = mapper.world_to_voxel(&Point3::new(1.2, 1.2, 5.9));
        assert_eq!(coord, VoxelCoord::new(2, 1, 2));
    }

    #[test]
    fn test_voxel_to_world_scaled() {
        let mapper = scaled([0.5, 1.0, 2.0]);
        let world = mapper.voxel_to_world(VoxelCoord::new(4, 4, 4));
        assert_relative_eq!(world.x, 2.0);
        assert_relative_eq!(world.y, 4.0);
        assert_relative_eq!(world.z, 8.0);
    }

    #[test]
    fn test_translated_affine() {
        let affine = Matrix4::new_translation(&Vector3::new(100.0, 0.0, -50.0));
        let mapper = AffineMapper::from_affine(affine).unwrap();
        assert_eq!(
            mapper.world_to_voxel(&Point3::new(103.5, 2.0, -48.0)),
            VoxelCoord::new(3, 2, 2)
        );
    }

    #[test]
    fn test_singular_affine() {
        assert!(matches!(
            AffineMapper::from_affine(Matrix4::zeros()),
            Err(SpatialError::SingularAffine)
        ));
    }

    #[test]
    fn test_mapper_by_reference() {
        fn lookup<M: CoordinateMapper>(mapper: M) -> VoxelCoord {
            mapper.world_to_voxel(&Point3::new(2.0, 2.0, 2.0))
        }
        let mapper = scaled([1.0; 3]);
        assert_eq!(lookup(&mapper), VoxelCoord::new(2, 2, 2));
    }
}
