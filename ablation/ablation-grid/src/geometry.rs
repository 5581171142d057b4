//! Physical description of a voxel grid.

use std::fmt;

use nalgebra::{Matrix4, Vector3};
use tracing::warn;

use crate::bounds::GridBounds;
use crate::error::{SpatialError, SpatialResult};

/// Physical unit of a grid's world space.
///
/// Codes follow the NIfTI `xyzt_units` spatial convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpatialUnit {
    /// Unit not recorded in the image header.
    #[default]
    Unknown,
    /// Meters (code 1).
    Meter,
    /// Millimeters (code 2).
    Millimeter,
    /// Micrometers (code 3).
    Micrometer,
}

impl SpatialUnit {
    /// Decodes a NIfTI spatial unit code. Unrecognized codes are [`SpatialUnit::Unknown`].
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_grid::SpatialUnit;
    ///
    /// assert_eq!(SpatialUnit::from_code(2), SpatialUnit::Millimeter);
    /// assert_eq!(SpatialUnit::from_code(0), SpatialUnit::Unknown);
    /// ```
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Meter,
            2 => Self::Millimeter,
            3 => Self::Micrometer,
            _ => Self::Unknown,
        }
    }

    /// Returns the NIfTI code for this unit.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Meter => 1,
            Self::Millimeter => 2,
            Self::Micrometer => 3,
        }
    }

    /// Millimeters per unit, or `None` when the unit is unknown.
    #[must_use]
    pub const fn millimeters(self) -> Option<f64> {
        match self {
            Self::Meter => Some(1e3),
            Self::Millimeter => Some(1.0),
            Self::Micrometer => Some(1e-3),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for SpatialUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Meter => "m",
            Self::Millimeter => "mm",
            Self::Micrometer => "um",
        };
        f.write_str(name)
    }
}

/// Shape, spacing, voxel-to-world affine and unit of a voxel grid.
///
/// This is the host image's header as far as the planning pipeline is
/// concerned. Masks are only comparable with a grid whose shape, affine and
/// unit match exactly.
///
/// # Example
///
/// ```
/// use ablation_grid::{GridGeometry, SpatialUnit};
///
/// let geometry = GridGeometry::from_spacing([64, 64, 32], [0.5, 0.5, 2.0], SpatialUnit::Millimeter)
///     .unwrap();
/// assert_eq!(geometry.voxel_count(), 64 * 64 * 32);
/// assert_eq!(geometry.spacing_mm(1.0), [0.5, 0.5, 2.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridGeometry {
    shape: [usize; 3],
    spacing: [f64; 3],
    affine: Matrix4<f64>,
    unit: SpatialUnit,
}

impl GridGeometry {
    /// Creates a grid description.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::InvalidDimensions`] if any dimension is zero or exceeds `i32::MAX`
    /// - [`SpatialError::InvalidSpacing`] if a spacing is not positive and finite
    /// - [`SpatialError::SingularAffine`] if the affine has no inverse
    pub fn new(
        shape: [usize; 3],
        spacing: [f64; 3],
        affine: Matrix4<f64>,
        unit: SpatialUnit,
    ) -> SpatialResult<Self> {
        if GridBounds::from_shape(shape).is_none() {
            return Err(SpatialError::InvalidDimensions { shape });
        }
        for (axis, &value) in spacing.iter().enumerate() {
            if value <= 0.0 || !value.is_finite() {
                return Err(SpatialError::InvalidSpacing { axis, value });
            }
        }
        if affine.iter().any(|v| !v.is_finite()) || affine.try_inverse().is_none() {
            return Err(SpatialError::SingularAffine);
        }
        Ok(Self {
            shape,
            spacing,
            affine,
            unit,
        })
    }

    /// Creates an axis-aligned grid whose origin voxel sits at the world origin.
    ///
    /// # Errors
    ///
    /// Same as [`GridGeometry::new`].
    pub fn from_spacing(
        shape: [usize; 3],
        spacing: [f64; 3],
        unit: SpatialUnit,
    ) -> SpatialResult<Self> {
        let affine = Matrix4::new_nonuniform_scaling(&Vector3::from(spacing));
        Self::new(shape, spacing, affine, unit)
    }

    /// Returns the grid dimensions.
    #[must_use]
    pub const fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Returns the per-axis voxel spacing in native units.
    #[must_use]
    pub const fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Returns the voxel-to-world affine.
    #[must_use]
    pub const fn affine(&self) -> &Matrix4<f64> {
        &self.affine
    }

    /// Returns the physical unit.
    #[must_use]
    pub const fn unit(&self) -> SpatialUnit {
        self.unit
    }

    /// Returns the total number of voxels.
    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns bounds covering the whole grid.
    #[must_use]
    pub fn bounds(&self) -> GridBounds {
        // Shape validated at construction
        GridBounds::from_shape(self.shape).unwrap_or_default()
    }

    /// Returns the factor converting native units to millimeters.
    ///
    /// An unknown unit is assumed to be millimeters and logged as a warning.
    #[must_use]
    pub fn unit_factor(&self) -> f64 {
        self.unit.millimeters().unwrap_or_else(|| {
            warn!(
                unit_code = self.unit.code(),
                "Grid unit is unspecified, assuming millimeters"
            );
            1.0
        })
    }

    /// Returns the per-axis spacing converted to millimeters.
    #[must_use]
    pub fn spacing_mm(&self, unit_factor: f64) -> [f64; 3] {
        self.spacing.map(|s| s * unit_factor)
    }

    /// Checks that another grid has exactly the same shape, affine and unit.
    ///
    /// Spacing is implied by the affine and is not compared separately.
    ///
    /// # Errors
    ///
    /// Returns the first mismatch found, in the order shape, affine, unit.
    pub fn ensure_compatible(&self, other: &Self) -> SpatialResult<()> {
        if self.shape != other.shape {
            return Err(SpatialError::ShapeMismatch {
                expected: self.shape,
                actual: other.shape,
            });
        }
        if self.affine != other.affine {
            return Err(SpatialError::AffineMismatch);
        }
        if self.unit != other.unit {
            return Err(SpatialError::UnitMismatch {
                expected: self.unit,
                actual: other.unit,
            });
        }
        Ok(())
    }
}
