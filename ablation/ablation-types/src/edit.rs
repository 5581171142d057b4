//! The in-progress needle edit.

use nalgebra::Point3;

use crate::needle::Needle;

/// Which end of a needle a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Skin entry point.
    Entry,
    /// Lesion target point.
    Target,
}

/// What an edit will do when submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Append a new needle to the end of the list.
    Insert,
    /// Replace the needle with this 1-based index.
    Update(usize),
}

/// A single open insert or update of a needle.
///
/// Points are filled in one at a time. The edit is *dirty* once both are
/// set; only a dirty edit is rendered as a provisional needle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditState {
    kind: EditKind,
    entry: Option<Point3<f64>>,
    target: Option<Point3<f64>>,
}

impl EditState {
    /// Starts inserting a new needle with no points set.
    #[must_use]
    pub const fn insert() -> Self {
        Self {
            kind: EditKind::Insert,
            entry: None,
            target: None,
        }
    }

    /// Starts updating needle `index` (1-based), pre-filled with its points.
    #[must_use]
    pub const fn update(index: usize, needle: &Needle) -> Self {
        Self {
            kind: EditKind::Update(index),
            entry: Some(*needle.entry()),
            target: Some(*needle.target()),
        }
    }

    /// Returns what this edit does on submit.
    #[must_use]
    pub const fn kind(&self) -> EditKind {
        self.kind
    }

    /// Returns one of the edit's points, if set.
    #[must_use]
    pub const fn point(&self, endpoint: Endpoint) -> Option<Point3<f64>> {
        match endpoint {
            Endpoint::Entry => self.entry,
            Endpoint::Target => self.target,
        }
    }

    /// Sets one of the edit's points.
    pub fn set_point(&mut self, endpoint: Endpoint, point: Point3<f64>) {
        match endpoint {
            Endpoint::Entry => self.entry = Some(point),
            Endpoint::Target => self.target = Some(point),
        }
    }

    /// Returns `true` once both points are set.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.entry.is_some() && self.target.is_some()
    }

    /// Returns `(entry, target)` when both points are set.
    #[must_use]
    pub fn points(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        Some((self.entry?, self.target?))
    }

    /// Returns the index this edit is displayed under, given the committed needle count.
    ///
    /// An insert is shown after the last committed needle; an update keeps the
    /// index of the needle it replaces.
    ///
    /// # Example
    ///
    /// ```
    /// use ablation_types::EditState;
    ///
    /// assert_eq!(EditState::insert().display_index(4), 5);
    /// ```
    #[must_use]
    pub const fn display_index(&self, committed: usize) -> usize {
        match self.kind {
            EditKind::Insert => committed + 1,
            EditKind::Update(index) => index,
        }
    }

    /// Returns the form title for this edit.
    #[must_use]
    pub fn title(&self) -> String {
        match self.kind {
            EditKind::Insert => "insert item".to_string(),
            EditKind::Update(index) => format!("update item #{index}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn needle() -> Needle {
        Needle::new(Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 3.0, 4.0)).unwrap()
    }

    #[test]
    fn test_insert_starts_clean() {
        let edit = EditState::insert();
        assert_eq!(edit.kind(), EditKind::Insert);
        assert!(!edit.is_dirty());
        assert!(edit.points().is_none());
        assert_eq!(edit.title(), "insert item");
    }

    #[test]
    fn test_dirty_needs_both_points() {
        let mut edit = EditState::insert();
        edit.set_point(Endpoint::Target, Point3::new(5.0, 0.0, 0.0));
        assert!(!edit.is_dirty());
        edit.set_point(Endpoint::Entry, Point3::origin());
        assert!(edit.is_dirty());
        assert_eq!(
            edit.points(),
            Some((Point3::origin(), Point3::new(5.0, 0.0, 0.0)))
        );
    }

    #[test]
    fn test_update_prefilled() {
        let needle = needle();
        let edit = EditState::update(3, &needle);
        assert!(edit.is_dirty());
        assert_eq!(edit.point(Endpoint::Entry), Some(*needle.entry()));
        assert_eq!(edit.point(Endpoint::Target), Some(*needle.target()));
        assert_eq!(edit.title(), "update item #3");
    }

    #[test]
    fn test_display_index() {
        assert_eq!(EditState::insert().display_index(0), 1);
        assert_eq!(EditState::update(2, &needle()).display_index(7), 2);
    }

    #[test]
    fn test_set_point_overwrites() {
        let mut edit = EditState::update(1, &needle());
        edit.set_point(Endpoint::Entry, Point3::new(9.0, 9.0, 9.0));
        assert_eq!(edit.point(Endpoint::Entry), Some(Point3::new(9.0, 9.0, 9.0)));
    }
}
