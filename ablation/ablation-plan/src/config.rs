//! Session configuration.

use ablation_raster::{MARGIN_EPSILON_MM, MarginBands, SHELL_BORDER_MM};
use ablation_types::{GeometryConfig, PointTolerance};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Parameters of a planning session.
///
/// # Example
///
/// ```
/// use ablation_plan::PlanConfig;
///
/// // Unlimited needles, 2mm shell
/// let config = PlanConfig::default();
/// assert_eq!(config.max_needles, None);
/// assert!((config.shell_border_mm - 2.0).abs() < 1e-10);
///
/// // Five-needle cap
/// let capped = PlanConfig::with_needle_limit(5);
/// assert_eq!(capped.max_needles, Some(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Width of the drawn safety shell inside the safety-zone radius, in mm.
    pub shell_border_mm: f64,

    /// Slack added to the largest band radius when bounding margin fields, in mm.
    pub margin_epsilon_mm: f64,

    /// Maximum number of needles. `None` for no limit.
    pub max_needles: Option<usize>,

    /// Relative tolerance for deciding that entry and target coincide.
    pub point_rtol: f64,

    /// Absolute tolerance for deciding that entry and target coincide.
    pub point_atol: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            shell_border_mm: SHELL_BORDER_MM,
            margin_epsilon_mm: MARGIN_EPSILON_MM,
            max_needles: None,
            point_rtol: 1e-5,
            point_atol: 1e-8,
        }
    }
}

impl PlanConfig {
    /// Create a config that refuses to insert more than `limit` needles.
    #[must_use]
    pub const fn with_needle_limit(limit: usize) -> Self {
        Self {
            shell_border_mm: SHELL_BORDER_MM,
            margin_epsilon_mm: MARGIN_EPSILON_MM,
            max_needles: Some(limit),
            point_rtol: 1e-5,
            point_atol: 1e-8,
        }
    }

    /// Set the shell border width.
    #[must_use]
    pub const fn shell_border_mm(mut self, border: f64) -> Self {
        self.shell_border_mm = border;
        self
    }

    /// Set the margin field slack.
    #[must_use]
    pub const fn margin_epsilon_mm(mut self, epsilon: f64) -> Self {
        self.margin_epsilon_mm = epsilon;
        self
    }

    /// Set or clear the needle limit.
    #[must_use]
    pub const fn max_needles(mut self, limit: Option<usize>) -> Self {
        self.max_needles = limit;
        self
    }

    /// Set the coincident-point tolerance.
    #[must_use]
    pub const fn point_tolerance(mut self, rtol: f64, atol: f64) -> Self {
        self.point_rtol = rtol;
        self.point_atol = atol;
        self
    }

    /// Validates the parameters.
    ///
    /// Sessions call this when they are created, so a bad value is reported
    /// up front rather than from a later redraw.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] of the first invalid parameter found.
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_plan::{ConfigError, PlanConfig};
    ///
    /// assert!(PlanConfig::default().validate().is_ok());
    /// assert_eq!(
    ///     PlanConfig::default().margin_epsilon_mm(-1.0).validate(),
    ///     Err(ConfigError::InvalidMarginEpsilon(-1.0))
    /// );
    /// ```
    pub fn validate(&self) -> ConfigResult<()> {
        let usable = |v: f64| v.is_finite() && v >= 0.0;
        if !usable(self.shell_border_mm) {
            return Err(ConfigError::InvalidShellBorder(self.shell_border_mm));
        }
        if !usable(self.margin_epsilon_mm) {
            return Err(ConfigError::InvalidMarginEpsilon(self.margin_epsilon_mm));
        }
        if !usable(self.point_rtol) || !usable(self.point_atol) {
            return Err(ConfigError::InvalidTolerance {
                rtol: self.point_rtol,
                atol: self.point_atol,
            });
        }
        if self.max_needles == Some(0) {
            return Err(ConfigError::ZeroNeedleLimit);
        }
        Ok(())
    }

    /// Returns the coincident-point tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> PointTolerance {
        PointTolerance {
            rtol: self.point_rtol,
            atol: self.point_atol,
        }
    }

    /// Returns the distance bands for a needle geometry.
    #[must_use]
    pub fn bands(&self, geometry: &GeometryConfig) -> MarginBands {
        MarginBands::with_params(geometry, self.shell_border_mm, self.margin_epsilon_mm)
    }

    /// Returns `true` if another needle may be inserted into a list of `count`.
    #[must_use]
    pub fn allows_insert(&self, count: usize) -> bool {
        self.max_needles.is_none_or(|limit| count < limit)
    }
}
