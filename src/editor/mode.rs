//! Edit modes of the polygon editor.

use serde::{Deserialize, Serialize};

/// The active editing mode; exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditMode {
    /// Browse and select polygons.
    #[default]
    View,
    /// Drag, add, and remove vertices of the selected polygon.
    EditVertices,
    /// Click polygons to delete them; the mode persists across deletions.
    DeletePolygon,
    /// Split a polygon in two along a two-point cut.
    Slice,
    /// Splice a chain of new points into a polygon boundary.
    AddPoints,
    /// Draw a new polygon point by point.
    CreatePolygon,
}

impl EditMode {
    /// Display name for UI purposes.
    pub fn name(&self) -> &'static str {
        match self {
            EditMode::View => "view",
            EditMode::EditVertices => "edit vertices",
            EditMode::DeletePolygon => "delete polygon",
            EditMode::Slice => "slice",
            EditMode::AddPoints => "add points",
            EditMode::CreatePolygon => "create polygon",
        }
    }

    /// All modes, in menu order.
    pub fn all() -> &'static [EditMode] {
        &[
            EditMode::View,
            EditMode::EditVertices,
            EditMode::DeletePolygon,
            EditMode::Slice,
            EditMode::AddPoints,
            EditMode::CreatePolygon,
        ]
    }
}
