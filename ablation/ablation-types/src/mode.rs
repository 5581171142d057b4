//! Rendering fidelity.

use serde::{Deserialize, Serialize};

/// How needles are rendered into the output volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    /// Nothing is drawn; the output is left as-is unless a clear is forced.
    None,
    /// Centerline voxels only, labeled by needle index.
    #[default]
    Line,
    /// Ablated core and safety shell from the margin field.
    Full,
}

impl DrawMode {
    /// Returns `true` if this mode needs the margin field.
    #[must_use]
    pub const fn needs_margin(self) -> bool {
        matches!(self, Self::Full)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_line() {
        assert_eq!(DrawMode::default(), DrawMode::Line);
    }

    #[test]
    fn test_needs_margin() {
        assert!(!DrawMode::None.needs_margin());
        assert!(!DrawMode::Line.needs_margin());
        assert!(DrawMode::Full.needs_margin());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&DrawMode::Full).unwrap(), r#""full""#);
        let mode: DrawMode = serde_json::from_str(r#""none""#).unwrap();
        assert_eq!(mode, DrawMode::None);
    }
}
