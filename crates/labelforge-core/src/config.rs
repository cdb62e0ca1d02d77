//! Editor tuning knobs.

use crate::commands::{DEFAULT_UNDO_LIMIT, UndoStack};
use crate::selection::{HANDLE_SIZE, HANDLE_SPACE, MIN_ITEM_SIZE, ROTATE_HANDLE_DISTANCE};
use crate::snap::{ANGLE_SNAP_INCREMENT, GRID_SIZE};
use serde::{Deserialize, Serialize};

/// Step used by arrow-key nudges.
pub const NUDGE_STEP: f64 = 1.0;
/// Step used by arrow-key nudges with Shift held.
pub const NUDGE_STEP_LARGE: f64 = 10.0;
/// Offset applied to duplicated items.
pub const PASTE_OFFSET: f64 = 10.0;

/// Interaction settings shared by the controller and the document factories.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub handle_size: f64,
    pub handle_space: f64,
    pub rotate_handle_distance: f64,
    pub min_item_size: f64,
    /// Maximum undo depth; 0 means unbounded.
    pub undo_limit: usize,
    pub grid_size: f64,
    pub snap_to_grid: bool,
    /// Rotation snaps to this increment while Shift is held.
    pub angle_snap_increment: f64,
    pub nudge_step: f64,
    pub nudge_step_large: f64,
    pub paste_offset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handle_size: HANDLE_SIZE,
            handle_space: HANDLE_SPACE,
            rotate_handle_distance: ROTATE_HANDLE_DISTANCE,
            min_item_size: MIN_ITEM_SIZE,
            undo_limit: DEFAULT_UNDO_LIMIT,
            grid_size: GRID_SIZE,
            snap_to_grid: false,
            angle_snap_increment: ANGLE_SNAP_INCREMENT,
            nudge_step: NUDGE_STEP,
            nudge_step_large: NUDGE_STEP_LARGE,
            paste_offset: PASTE_OFFSET,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Empty history holding at most `undo_limit` commands.
    pub fn undo_stack(&self) -> UndoStack {
        UndoStack::with_limit(self.undo_limit)
    }

    /// Margin around an item reserved for its selection decorations.
    pub fn decoration_margin(&self) -> f64 {
        self.handle_size + self.handle_space
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.handle_size, 8.0);
        assert_eq!(config.rotate_handle_distance, 20.0);
        assert_eq!(config.min_item_size, 10.0);
        assert_eq!(config.undo_limit, 50);
        assert_eq!(config.decoration_margin(), 12.0);
        assert_eq!(config.undo_stack().limit(), 50);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(r#"{"snapToGrid": true, "gridSize": 5}"#).unwrap();
        assert!(config.snap_to_grid);
        assert_eq!(config.grid_size, 5.0);
        assert_eq!(config.nudge_step_large, 10.0);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EditorConfig {
            undo_limit: 5,
            ..EditorConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }
}
