//! Plan and geometry files.
//!
//! A plan file stores the committed needles and the needle geometry:
//!
//! ```json
//! { "needles": [ { "entry": [10.0, 20.0, 30.0], "target": [15.0, 20.0, 30.0] } ],
//!   "diameter": 3, "safezone": 5 }
//! ```
//!
//! A geometry file holds only `{ "diameter": 3, "safezone": 5 }`.
//!
//! Loading validates everything before returning, so a failed load never
//! yields a partial plan. Saving writes a temporary sibling file and renames it
//! over the destination.

use std::fs;
use std::io::Write;
use std::path::Path;

use ablation_types::{GeometryConfig, Needle, PointTolerance};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{PlanError, PlanResult};

/// Committed needles and the geometry they are drawn with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    /// Needles in priority order.
    pub needles: Vec<Needle>,
    /// Needle diameter and safety-zone radius.
    pub geometry: GeometryConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct NeedleRecord {
    entry: [f64; 3],
    target: [f64; 3],
}

#[derive(Debug, Serialize, Deserialize)]
struct PlanRecord {
    needles: Vec<NeedleRecord>,
    diameter: u32,
    safezone: u32,
}

impl Plan {
    /// Parses and validates a plan from JSON text.
    ///
    /// # Errors
    ///
    /// - [`PlanError::Json`] for malformed JSON, missing fields or wrong types
    /// - [`PlanError::InvalidGeometry`] for out-of-range or inconsistent geometry
    /// - [`PlanError::InvalidNeedle`] for a needle whose endpoints coincide
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_plan::Plan;
    /// use ablation_types::PointTolerance;
    ///
    /// let text = r#"{"needles": [{"entry": [0, 0, 0], "target": [5, 0, 0]}], "diameter": 4, "safezone": 6}"#;
    /// let plan = Plan::from_json(text, &PointTolerance::default()).unwrap();
    ///
    /// assert_eq!(plan.needles.len(), 1);
    /// assert_eq!(plan.geometry.diameter_mm(), 4);
    /// ```
    pub fn from_json(text: &str, tolerance: &PointTolerance) -> PlanResult<Self> {
        let record: PlanRecord = serde_json::from_str(text)?;
        let geometry =
            GeometryConfig::new(record.diameter, record.safezone).map_err(PlanError::InvalidGeometry)?;
        let needles = record
            .needles
            .into_iter()
            .enumerate()
            .map(|(i, n)| {
                Needle::with_tolerance(Point3::from(n.entry), Point3::from(n.target), tolerance)
                    .map_err(|source| PlanError::InvalidNeedle {
                        index: i + 1,
                        source,
                    })
            })
            .collect::<PlanResult<Vec<_>>>()?;
        Ok(Self { needles, geometry })
    }

    /// Serializes the plan as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Json`] if serialization fails.
    pub fn to_json(&self) -> PlanResult<String> {
        let record = PlanRecord {
            needles: self
                .needles
                .iter()
                .map(|n| NeedleRecord {
                    entry: n.entry().coords.into(),
                    target: n.target().coords.into(),
                })
                .collect(),
            diameter: self.geometry.diameter_mm(),
            safezone: self.geometry.safezone_radius_mm(),
        };
        Ok(serde_json::to_string_pretty(&record)?)
    }
}

/// Load a plan file.
///
/// # Errors
///
/// Returns [`PlanError::Io`] if the file cannot be read, otherwise the errors
/// of [`Plan::from_json`].
///
/// # Example
///
/// ```no_run
/// use ablation_plan::load_plan;
/// use ablation_types::PointTolerance;
///
/// let plan = load_plan("liver.plan.json", &PointTolerance::default()).unwrap();
/// println!("{} needles", plan.needles.len());
/// ```
pub fn load_plan<P: AsRef<Path>>(path: P, tolerance: &PointTolerance) -> PlanResult<Plan> {
    let path = path.as_ref();
    let plan = Plan::from_json(&read(path)?, tolerance)?;
    info!(path = %path.display(), needles = plan.needles.len(), "Loaded plan");
    Ok(plan)
}

/// Save a plan file atomically.
///
/// # Errors
///
/// Returns [`PlanError::Io`] if the file cannot be written.
pub fn save_plan<P: AsRef<Path>>(plan: &Plan, path: P) -> PlanResult<()> {
    let path = path.as_ref();
    write_atomic(path, plan.to_json()?.as_bytes())?;
    info!(path = %path.display(), needles = plan.needles.len(), "Saved plan");
    Ok(())
}

/// Load a geometry file.
///
/// # Errors
///
/// - [`PlanError::Io`] if the file cannot be read
/// - [`PlanError::Json`] for malformed JSON, missing fields, wrong types or
///   invalid values
pub fn load_geometry<P: AsRef<Path>>(path: P) -> PlanResult<GeometryConfig> {
    let path = path.as_ref();
    let geometry: GeometryConfig = serde_json::from_str(&read(path)?)?;
    debug!(path = %path.display(), ?geometry, "Loaded geometry");
    Ok(geometry)
}

/// Save a geometry file atomically.
///
/// # Errors
///
/// Returns [`PlanError::Io`] if the file cannot be written.
pub fn save_geometry<P: AsRef<Path>>(geometry: &GeometryConfig, path: P) -> PlanResult<()> {
    let path = path.as_ref();
    write_atomic(path, serde_json::to_string_pretty(geometry)?.as_bytes())?;
    debug!(path = %path.display(), ?geometry, "Saved geometry");
    Ok(())
}

fn read(path: &Path) -> PlanResult<String> {
    fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, contents: &[u8]) -> PlanResult<()> {
    let io_error = |source| PlanError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(contents).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}
