//! Needle diameter and safety-zone configuration.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{TypesError, TypesResult};

/// Accepted needle diameters, in millimeters.
pub const DIAMETER_RANGE_MM: RangeInclusive<u32> = 1..=20;

/// Accepted safety-zone radii, in millimeters.
pub const SAFEZONE_RANGE_MM: RangeInclusive<u32> = 1..=50;

/// Needle diameter and safety-zone radius in whole millimeters.
///
/// The invariant `diameter <= 2 * safezone` is maintained in both directions:
/// growing the diameter raises the safety zone, shrinking the safety zone
/// lowers the diameter.
///
/// Serializes as `{ "diameter": <int>, "safezone": <int> }`; deserialization
/// validates ranges and the invariant.
///
/// # Example
///
/// ```
/// use ablation_types::GeometryConfig;
///
/// let mut geometry = GeometryConfig::new(4, 10).unwrap();
/// geometry.set_safezone(1).unwrap();
/// assert_eq!(geometry.diameter_mm(), 2);
///
/// assert!(GeometryConfig::new(12, 5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GeometryRecord", into = "GeometryRecord")]
pub struct GeometryConfig {
    diameter_mm: u32,
    safezone_radius_mm: u32,
}

/// Wire form of [`GeometryConfig`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct GeometryRecord {
    diameter: u32,
    safezone: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            diameter_mm: 3,
            safezone_radius_mm: 5,
        }
    }
}

impl GeometryConfig {
    /// Creates a geometry, validating ranges and the diameter/safezone relation.
    ///
    /// # Errors
    ///
    /// - [`TypesError::DiameterOutOfRange`] if `diameter_mm` is outside 1..=20
    /// - [`TypesError::SafezoneOutOfRange`] if `safezone_radius_mm` is outside 1..=50
    /// - [`TypesError::DiameterExceedsSafezone`] if `diameter_mm > 2 * safezone_radius_mm`
    pub fn new(diameter_mm: u32, safezone_radius_mm: u32) -> TypesResult<Self> {
        check_diameter(diameter_mm)?;
        check_safezone(safezone_radius_mm)?;
        if diameter_mm > 2 * safezone_radius_mm {
            return Err(TypesError::DiameterExceedsSafezone {
                diameter: diameter_mm,
                safezone: safezone_radius_mm,
            });
        }
        Ok(Self {
            diameter_mm,
            safezone_radius_mm,
        })
    }

    /// Returns the needle diameter in millimeters.
    #[must_use]
    pub const fn diameter_mm(&self) -> u32 {
        self.diameter_mm
    }

    /// Returns the safety-zone radius in millimeters.
    #[must_use]
    pub const fn safezone_radius_mm(&self) -> u32 {
        self.safezone_radius_mm
    }

    /// Returns the ablated-core radius (half the diameter) in millimeters.
    #[must_use]
    pub fn core_radius_mm(&self) -> f64 {
        f64::from(self.diameter_mm) / 2.0
    }

    /// Sets the diameter, raising the safety zone to `ceil(diameter / 2)` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::DiameterOutOfRange`] and leaves the geometry
    /// unchanged if `diameter_mm` is outside 1..=20.
    pub fn set_diameter(&mut self, diameter_mm: u32) -> TypesResult<()> {
        check_diameter(diameter_mm)?;
        self.diameter_mm = diameter_mm;
        if diameter_mm > 2 * self.safezone_radius_mm {
            self.safezone_radius_mm = diameter_mm.div_ceil(2);
        }
        Ok(())
    }

    /// Sets the safety-zone radius, lowering the diameter to `2 * safezone` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::SafezoneOutOfRange`] and leaves the geometry
    /// unchanged if `safezone_radius_mm` is outside 1..=50.
    pub fn set_safezone(&mut self, safezone_radius_mm: u32) -> TypesResult<()> {
        check_safezone(safezone_radius_mm)?;
        self.safezone_radius_mm = safezone_radius_mm;
        if 2 * safezone_radius_mm < self.diameter_mm {
            self.diameter_mm = 2 * safezone_radius_mm;
        }
        Ok(())
    }
}

fn check_diameter(value: u32) -> TypesResult<()> {
    if DIAMETER_RANGE_MM.contains(&value) {
        Ok(())
    } else {
        Err(TypesError::DiameterOutOfRange { value })
    }
}

fn check_safezone(value: u32) -> TypesResult<()> {
    if SAFEZONE_RANGE_MM.contains(&value) {
        Ok(())
    } else {
        Err(TypesError::SafezoneOutOfRange { value })
    }
}

impl TryFrom<GeometryRecord> for GeometryConfig {
    type Error = TypesError;

    fn try_from(record: GeometryRecord) -> TypesResult<Self> {
        Self::new(record.diameter, record.safezone)
    }
}

impl From<GeometryConfig> for GeometryRecord {
    fn from(geometry: GeometryConfig) -> Self {
        Self {
            diameter: geometry.diameter_mm,
            safezone: geometry.safezone_radius_mm,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let geometry = GeometryConfig::default();
        assert_eq!(
            GeometryConfig::new(geometry.diameter_mm(), geometry.safezone_radius_mm()),
            Ok(geometry)
        );
        assert_eq!(geometry.core_radius_mm(), 1.5);
    }

    #[test]
    fn test_range_validation() {
        assert_eq!(
            GeometryConfig::new(0, 5),
            Err(TypesError::DiameterOutOfRange { value: 0 })
        );
        assert_eq!(
            GeometryConfig::new(21, 50),
            Err(TypesError::DiameterOutOfRange { value: 21 })
        );
        assert_eq!(
            GeometryConfig::new(3, 51),
            Err(TypesError::SafezoneOutOfRange { value: 51 })
        );
        assert!(GeometryConfig::new(20, 10).is_ok());
        assert!(GeometryConfig::new(1, 50).is_ok());
    }

    #[test]
    fn test_diameter_raises_safezone() {
        let mut geometry = GeometryConfig::new(3, 5).unwrap();
        geometry.set_diameter(11).unwrap();
        assert_eq!(geometry.diameter_mm(), 11);
        assert_eq!(geometry.safezone_radius_mm(), 6);

        geometry.set_diameter(12).unwrap();
        assert_eq!(geometry.safezone_radius_mm(), 6);
    }

    #[test]
    fn test_safezone_lowers_diameter() {
        let mut geometry = GeometryConfig::new(9, 5).unwrap();
        geometry.set_safezone(4).unwrap();
        assert_eq!(geometry.safezone_radius_mm(), 4);
        assert_eq!(geometry.diameter_mm(), 8);

        // No clamp when still consistent
        geometry.set_safezone(20).unwrap();
        assert_eq!(geometry.diameter_mm(), 8);
    }

    #[test]
    fn test_out_of_range_setter_leaves_state() {
        let mut geometry = GeometryConfig::new(4, 6).unwrap();
        assert!(geometry.set_diameter(25).is_err());
        assert!(geometry.set_safezone(0).is_err());
        assert_eq!(geometry, GeometryConfig::new(4, 6).unwrap());
    }

    #[test]
    fn test_invariant_holds_after_any_setter() {
        let mut geometry = GeometryConfig::default();
        for d in DIAMETER_RANGE_MM {
            geometry.set_diameter(d).unwrap();
            assert!(geometry.diameter_mm() <= 2 * geometry.safezone_radius_mm());
        }
        for s in SAFEZONE_RANGE_MM.rev() {
            geometry.set_safezone(s).unwrap();
            assert!(geometry.diameter_mm() <= 2 * geometry.safezone_radius_mm());
        }
    }

    #[test]
    fn test_json_shape() {
        let geometry = GeometryConfig::new(4, 7).unwrap();
        let json = serde_json::to_string(&geometry).unwrap();
        assert_eq!(json, r#"{"diameter":4,"safezone":7}"#);
        let back: GeometryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, geometry);
    }

    #[test]
    fn test_json_rejects_relation() {
        let result: Result<GeometryConfig, _> =
            serde_json::from_str(r#"{"diameter":12,"safezone":5}"#);
        assert!(result.is_err());
    }
}
