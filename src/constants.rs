//! Global constants for the polygon-editing engine

/// Minimum number of points a live polygon may have
pub const MIN_POLYGON_POINTS: usize = 3;

/// Default vertex/edge pick radius in screen pixels (divided by zoom at use sites)
pub const DEFAULT_HIT_TOLERANCE_PX: f64 = 8.0;

/// Default minimum zoom level
pub const DEFAULT_ZOOM_MIN: f64 = 0.1;

/// Default maximum zoom level
pub const DEFAULT_ZOOM_MAX: f64 = 20.0;

/// Zoom factor applied per wheel notch when zooming in
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Zoom factor applied per wheel notch when zooming out
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Point count above which render-side simplification kicks in
pub const DEFAULT_SIMPLIFY_THRESHOLD: usize = 100;

/// Target point count for simplified render output
pub const DEFAULT_SIMPLIFY_BUDGET: usize = 100;

/// Silhouette tolerance for render-side simplification, in image units
pub const SIMPLIFY_EPSILON: f64 = 0.75;

/// Default undo/redo stack depth
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Default number of fetch attempts for a reload (1 initial + 3 retries)
pub const DEFAULT_RELOAD_ATTEMPTS: u32 = 4;

/// Base retry delay in milliseconds; doubles per retry (1s, 2s, 4s)
pub const DEFAULT_RELOAD_BASE_DELAY_MS: u64 = 1000;
