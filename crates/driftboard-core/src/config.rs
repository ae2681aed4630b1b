//! Tunable engine constants.

use crate::nodes::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MIN_HEIGHT, MIN_WIDTH};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine configuration. Every field has a default, so partial JSON is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Undo entries kept per document.
    pub history_limit: usize,
    /// Distance (plane units) within which alignment and edge snaps engage.
    pub snap_threshold: f64,
    /// Padding added around the selection when creating a group.
    pub group_padding: f64,
    pub min_node_width: f64,
    pub min_node_height: f64,
    pub default_node_width: f64,
    pub default_node_height: f64,
    /// Quiet period before a pending autosave is written.
    pub autosave_debounce_ms: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            history_limit: 30,
            snap_threshold: 8.0,
            group_padding: 20.0,
            min_node_width: MIN_WIDTH,
            min_node_height: MIN_HEIGHT,
            default_node_width: DEFAULT_WIDTH,
            default_node_height: DEFAULT_HEIGHT,
            autosave_debounce_ms: 500,
        }
    }
}

impl CanvasConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CanvasConfig::default();
        assert_eq!(config.history_limit, 30);
        assert!((config.snap_threshold - 8.0).abs() < f64::EPSILON);
        assert_eq!(config.autosave_debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_json() {
        let config = CanvasConfig::from_json(r#"{ "historyLimit": 5, "snapThreshold": 4.0 }"#).unwrap();
        assert_eq!(config.history_limit, 5);
        assert!((config.snap_threshold - 4.0).abs() < f64::EPSILON);
        assert!((config.group_padding - 20.0).abs() < f64::EPSILON);
    }
}
