//! Read-only projection of session state for a host UI.

use ablation_types::{DrawMode, EditKind, EditState, Endpoint, GeometryConfig, Needle};
use serde::Serialize;

/// One row of the needle table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeedleRow {
    /// 1-based display index.
    pub index: usize,
    /// Entry point in world coordinates.
    pub entry: [f64; 3],
    /// Target point in world coordinates.
    pub target: [f64; 3],
    /// `true` if this needle is being updated.
    pub editing: bool,
}

/// The insert/update form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditForm {
    /// Form heading, e.g. `insert item` or `update item #2`.
    pub title: String,
    /// Entry point, once marked.
    pub entry: Option<[f64; 3]>,
    /// Target point, once marked.
    pub target: Option<[f64; 3]>,
    /// `true` once both points are marked.
    pub submit_enabled: bool,
}

/// Everything a host needs to render the planning panel.
///
/// Built by [`crate::Session::view`]; holds no references into the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// Committed needles in list order.
    pub needles: Vec<NeedleRow>,
    /// `true` if a new insert may be started.
    pub insert_enabled: bool,
    /// The open edit, if any.
    pub form: Option<EditForm>,
    /// Current draw mode.
    pub draw_mode: DrawMode,
    /// Current needle geometry.
    pub geometry: GeometryConfig,
}

impl SessionView {
    pub(crate) fn project(
        needles: &[Needle],
        edit: Option<&EditState>,
        can_insert: bool,
        draw_mode: DrawMode,
        geometry: GeometryConfig,
    ) -> Self {
        let editing = edit.and_then(|e| match e.kind() {
            EditKind::Update(index) => Some(index),
            EditKind::Insert => None,
        });
        let needles = needles
            .iter()
            .enumerate()
            .map(|(i, n)| NeedleRow {
                index: i + 1,
                entry: n.entry().coords.into(),
                target: n.target().coords.into(),
                editing: editing == Some(i + 1),
            })
            .collect();
        let form = edit.map(|e| EditForm {
            title: e.title(),
            entry: e.point(Endpoint::Entry).map(|p| p.coords.into()),
            target: e.point(Endpoint::Target).map(|p| p.coords.into()),
            submit_enabled: e.is_dirty(),
        });

        Self {
            needles,
            insert_enabled: edit.is_none() && can_insert,
            form,
            draw_mode,
            geometry,
        }
    }
}
