//! Needle ablation planning sessions.
//!
//! A [`Session`] owns a list of straight needle trajectories over one image
//! grid and keeps two label volumes in sync with it:
//!
//! - the **output** volume, what the user sees, including a provisional needle
//!   while an insert or update is open
//! - the **analysis** volume, committed needles only, from which target
//!   coverage and danger collisions are computed
//!
//! # Draw modes
//!
//! | mode   | output labels                                     | analysis selection |
//! |--------|---------------------------------------------------|--------------------|
//! | `None` | left as-is (zeroed on forced clear)               | left as-is         |
//! | `Line` | centerline voxels = `i`                           | centerline         |
//! | `Full` | shell = `10i + 1`, core = `10i`                   | safety region      |
//!
//! Needles are drawn in list order, so a later needle overwrites an earlier
//! one where they meet.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use ablation_grid::{GridGeometry, SpatialUnit, VoxelCoord, VoxelMask};
//! use ablation_plan::{Mask, Session};
//! use ablation_types::{DrawMode, Endpoint};
//! use nalgebra::Point3;
//!
//! let grid = GridGeometry::from_spacing([32, 32, 32], [1.0; 3], SpatialUnit::Millimeter).unwrap();
//! let mut session = Session::new(grid.clone()).unwrap();
//! session.set_draw_mode(DrawMode::Full).unwrap();
//!
//! // A small lesion around (16, 16, 16)
//! let mut lesion = VoxelMask::empty(grid.shape());
//! for x in 15..=17 {
//!     lesion.set(VoxelCoord::new(x, 16, 16), true);
//! }
//! session
//!     .add_target_mask(Arc::new(Mask::new("lesion", grid, lesion).unwrap()))
//!     .unwrap();
//!
//! session.begin_insert().unwrap();
//! session.mark(Endpoint::Entry, Point3::new(16.5, 4.5, 16.5)).unwrap();
//! session.mark(Endpoint::Target, Point3::new(16.5, 16.5, 16.5)).unwrap();
//! session.submit().unwrap();
//!
//! assert_eq!(session.overlap().target("lesion").unwrap().percent, Some(100));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod compositor;
mod config;
mod error;
mod io;
mod overlap;
mod session;
mod view;

pub use compositor::{Composition, Compositor, core_label, line_label, shell_label};
pub use config::PlanConfig;
pub use error::{
    CompositeError, CompositeResult, ConfigError, ConfigResult, MaskError, MaskResult, PlanError,
    PlanResult, SessionError, SessionResult,
};
pub use io::{Plan, load_geometry, load_plan, save_geometry, save_plan};
pub use overlap::{
    DangerHit, Mask, MaskList, MaskRegistry, OverlapReport, TargetCoverage, analyze,
    coverage_percent,
};
pub use session::Session;
pub use view::{EditForm, NeedleRow, SessionView};
