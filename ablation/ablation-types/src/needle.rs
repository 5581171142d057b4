//! Needle trajectories.

use nalgebra::{Point3, Vector3};

use crate::error::{TypesError, TypesResult};

/// Tolerance used to decide whether two points coincide.
///
/// Points `a` and `b` coincide when `|a_i - b_i| <= atol + rtol * |b_i|` on
/// every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointTolerance {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance in world units.
    pub atol: f64,
}

impl Default for PointTolerance {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl PointTolerance {
    /// Returns `true` if the two points coincide within this tolerance.
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_types::PointTolerance;
    /// use nalgebra::Point3;
    ///
    /// let tol = PointTolerance::default();
    /// assert!(tol.coincide(&Point3::new(1.0, 2.0, 3.0), &Point3::new(1.0, 2.0, 3.0 + 1e-9)));
    /// assert!(!tol.coincide(&Point3::new(1.0, 2.0, 3.0), &Point3::new(1.0, 2.0, 3.1)));
    /// ```
    #[must_use]
    pub fn coincide(&self, a: &Point3<f64>, b: &Point3<f64>) -> bool {
        a.iter()
            .zip(b.iter())
            .all(|(&ai, &bi)| (ai - bi).abs() <= self.atol + self.rtol * bi.abs())
    }
}

/// A straight needle trajectory from `entry` to `target`.
///
/// Construction guarantees finite coordinates and distinct endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Needle {
    entry: Point3<f64>,
    target: Point3<f64>,
}

impl Needle {
    /// Creates a needle using the default [`PointTolerance`].
    ///
    /// # Errors
    ///
    /// - [`TypesError::NonFinitePoint`] if a coordinate is NaN or infinite
    /// - [`TypesError::DegenerateNeedle`] if entry and target coincide
    pub fn new(entry: Point3<f64>, target: Point3<f64>) -> TypesResult<Self> {
        Self::with_tolerance(entry, target, &PointTolerance::default())
    }

    /// Creates a needle, rejecting endpoints that coincide within `tolerance`.
    ///
    /// # Errors
    ///
    /// Same as [`Needle::new`].
    pub fn with_tolerance(
        entry: Point3<f64>,
        target: Point3<f64>,
        tolerance: &PointTolerance,
    ) -> TypesResult<Self> {
        for point in [&entry, &target] {
            if point.iter().any(|v| !v.is_finite()) {
                return Err(TypesError::NonFinitePoint {
                    point: [point.x, point.y, point.z],
                });
            }
        }
        if tolerance.coincide(&entry, &target) {
            return Err(TypesError::DegenerateNeedle);
        }
        Ok(Self { entry, target })
    }

    /// Returns the entry point.
    #[must_use]
    pub const fn entry(&self) -> &Point3<f64> {
        &self.entry
    }

    /// Returns the target point.
    #[must_use]
    pub const fn target(&self) -> &Point3<f64> {
        &self.target
    }

    /// Returns the vector from entry to target.
    #[must_use]
    pub fn direction(&self) -> Vector3<f64> {
        self.target - self.entry
    }

    /// Returns the trajectory length in world units.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Returns the point at parameter `t`, where 0 is the entry and 1 the target.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        Point3::from(self.entry.coords * (1.0 - t) + self.target.coords * t)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_needle() {
        let needle = Needle::new(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 6.0, 3.0)).unwrap();
        assert_eq!(needle.entry(), &Point3::new(1.0, 2.0, 3.0));
        assert_eq!(needle.target(), &Point3::new(4.0, 6.0, 3.0));
        assert_relative_eq!(needle.length(), 5.0);
    }

    #[test]
    fn test_degenerate_rejected() {
        let p = Point3::new(10.0, -3.0, 7.5);
        assert_eq!(Needle::new(p, p), Err(TypesError::DegenerateNeedle));
        // Within relative tolerance of the target magnitude
        let near = Point3::new(10.0 + 5e-5, -3.0, 7.5);
        assert_eq!(Needle::new(p, near), Err(TypesError::DegenerateNeedle));
    }

    #[test]
    fn test_custom_tolerance() {
        let tolerance = PointTolerance {
            rtol: 0.0,
            atol: 0.5,
        };
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.4, 0.0, 0.0);
        assert!(Needle::with_tolerance(a, b, &tolerance).is_err());
        assert!(Needle::new(a, b).is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        let result = Needle::new(Point3::new(f64::NAN, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        assert!(matches!(result, Err(TypesError::NonFinitePoint { .. })));
        let result = Needle::new(Point3::origin(), Point3::new(0.0, f64::INFINITY, 0.0));
        assert!(matches!(result, Err(TypesError::NonFinitePoint { .. })));
    }

    #[test]
    fn test_point_at() {
        let needle = Needle::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 20.0, -4.0)).unwrap();
        assert_eq!(needle.point_at(0.0), *needle.entry());
        assert_eq!(needle.point_at(1.0), *needle.target());
        let mid = needle.point_at(0.5);
        assert_relative_eq!(mid.x, 5.0);
        assert_relative_eq!(mid.y, 10.0);
        assert_relative_eq!(mid.z, -2.0);
    }
}
