//! polyseg - interactive polygon segmentation editor
//!
//! A UI-agnostic engine for reviewing and correcting polygonal cell
//! boundaries on microscopy images: hit-testing, mode-driven editing,
//! slicing, undo/redo, and resilient reloading of backend segmentations.

pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod keybindings;
pub mod model;
pub mod reload;
pub mod render;
pub mod store;
pub mod transform;

pub use config::EditorConfig;
pub use editor::{EditMode, Editor, InputEvent, PointerButton, Signal};
pub use model::{Point, Polygon, PolygonType};
pub use reload::{ReloadCoordinator, ReloadOutcome, SegmentationFetch};
pub use render::RenderCache;
pub use store::PolygonStore;
pub use transform::Transform;
