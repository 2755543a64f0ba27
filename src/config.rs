//! Editor configuration.
//!
//! All tunables live here so a shell can persist and restore them. Every
//! field has a serde default, so configs written by older versions keep
//! loading.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HISTORY_DEPTH, DEFAULT_HIT_TOLERANCE_PX, DEFAULT_SIMPLIFY_BUDGET,
    DEFAULT_SIMPLIFY_THRESHOLD, DEFAULT_ZOOM_MAX, DEFAULT_ZOOM_MIN,
};
use crate::keybindings::KeyBindings;
use crate::reload::RetryPolicy;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Configuration for the polygon editor engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Minimum zoom level
    #[serde(default = "default_zoom_min")]
    pub zoom_min: f64,

    /// Maximum zoom level
    #[serde(default = "default_zoom_max")]
    pub zoom_max: f64,

    /// Vertex/edge pick radius in screen pixels; divided by zoom so the
    /// effective radius is constant on screen
    #[serde(default = "default_hit_tolerance_px")]
    pub hit_tolerance_px: f64,

    /// Point count above which polygons are simplified for rendering
    #[serde(default = "default_simplify_threshold")]
    pub simplify_threshold: usize,

    /// Target point count for simplified render output
    #[serde(default = "default_simplify_budget")]
    pub simplify_budget: usize,

    /// Undo/redo stack depth
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// Retry schedule for segmentation reloads
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Keyboard shortcuts
    #[serde(default)]
    pub keybindings: KeyBindings,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_zoom_min() -> f64 {
    DEFAULT_ZOOM_MIN
}

fn default_zoom_max() -> f64 {
    DEFAULT_ZOOM_MAX
}

fn default_hit_tolerance_px() -> f64 {
    DEFAULT_HIT_TOLERANCE_PX
}

fn default_simplify_threshold() -> usize {
    DEFAULT_SIMPLIFY_THRESHOLD
}

fn default_simplify_budget() -> usize {
    DEFAULT_SIMPLIFY_BUDGET
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_min: default_zoom_min(),
            zoom_max: default_zoom_max(),
            hit_tolerance_px: default_hit_tolerance_px(),
            simplify_threshold: default_simplify_threshold(),
            simplify_budget: default_simplify_budget(),
            history_depth: default_history_depth(),
            retry: RetryPolicy::default(),
            keybindings: KeyBindings::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl EditorConfig {
    /// Hit tolerance in image units at the given zoom level.
    pub fn hit_tolerance_at(&self, zoom: f64) -> f64 {
        self.hit_tolerance_px / zoom.max(f64::MIN_POSITIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.zoom_min, DEFAULT_ZOOM_MIN);
        assert_eq!(config.zoom_max, DEFAULT_ZOOM_MAX);
        assert_eq!(config.history_depth, DEFAULT_HISTORY_DEPTH);
    }

    #[test]
    fn test_partial_config_loads() {
        let config: EditorConfig = serde_json::from_str(r#"{"zoom_max": 40.0}"#).unwrap();
        assert_eq!(config.zoom_max, 40.0);
        assert_eq!(config.zoom_min, DEFAULT_ZOOM_MIN);
        assert_eq!(config.hit_tolerance_px, DEFAULT_HIT_TOLERANCE_PX);
    }

    #[test]
    fn test_hit_tolerance_scales_with_zoom() {
        let config = EditorConfig::default();
        let at_1x = config.hit_tolerance_at(1.0);
        let at_4x = config.hit_tolerance_at(4.0);
        assert!((at_1x / at_4x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let config = EditorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EditorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.zoom_max, config.zoom_max);
        assert_eq!(back.keybindings, config.keybindings);
    }
}
