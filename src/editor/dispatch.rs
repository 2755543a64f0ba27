//! Pointer-down dispatch: the (mode, hit target) transition table.
//!
//! Primary-button presses are resolved in two steps: a hit test classifies
//! what the pointer landed on, then `transition` maps the current mode and
//! that classification to an action. The table is data; guards that depend
//! on gesture state (an accumulating slice, a pending chain) live in the
//! executor, not here.

use super::mode::EditMode;
use crate::geometry::VertexRef;

/// What a pointer press landed on, from the hit test.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    /// A polygon vertex within pick tolerance.
    Vertex(VertexRef),
    /// The interior of a polygon (topmost wins).
    Polygon(String),
    /// Empty canvas.
    Canvas,
}

impl HitTarget {
    /// The target kind, for table lookup.
    pub fn kind(&self) -> HitKind {
        match self {
            HitTarget::Vertex(_) => HitKind::Vertex,
            HitTarget::Polygon(_) => HitKind::Polygon,
            HitTarget::Canvas => HitKind::Canvas,
        }
    }
}

/// Hit target classification without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Vertex,
    Polygon,
    Canvas,
}

/// Action selected by the transition table for a primary pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Select the hit polygon and switch to EditVertices.
    SelectAndEdit,
    /// Select the hit polygon; the mode stays as it is.
    Select,
    /// Select the vertex's polygon for slicing, unless a cut is already
    /// accumulating (then the click is ignored).
    SelectUnlessSlicing,
    /// Clear the selection; the mode stays as it is. Starts a pan.
    ClearSelection,
    /// Clear the selection and fall back to View. Starts a pan.
    ClearSelectionToView,
    /// Begin dragging the hit vertex.
    BeginDrag,
    /// Delete the polygon that owns the hit; the mode stays as it is.
    DeletePolygon,
    /// Record a slice cut point; the second one attempts the slice.
    AddSlicePoint,
    /// End the add-points chain at the hit vertex and splice it in.
    CommitAddChain,
    /// Append the click position to the pending point chain.
    AppendTempPoint,
    /// Append to the pending outline, or close it when the click lands on
    /// its first point.
    CreatePoint,
    /// Nothing to do.
    Ignore,
}

/// The pointer-down transition table. One row per (mode, target kind);
/// new modes and targets are new rows, not edits to existing logic.
pub fn transition(mode: EditMode, target: HitKind) -> Action {
    use Action::*;
    use HitKind::*;

    match (mode, target) {
        (EditMode::View, Polygon | Vertex) => SelectAndEdit,
        (EditMode::View, Canvas) => ClearSelection,

        (EditMode::EditVertices, Polygon) => Select,
        (EditMode::EditVertices, Vertex) => BeginDrag,
        (EditMode::EditVertices, Canvas) => ClearSelectionToView,

        (EditMode::DeletePolygon, Polygon | Vertex) => DeletePolygon,
        (EditMode::DeletePolygon, Canvas) => Ignore,

        (EditMode::Slice, Polygon) => Select,
        (EditMode::Slice, Vertex) => SelectUnlessSlicing,
        (EditMode::Slice, Canvas) => AddSlicePoint,

        (EditMode::AddPoints, Vertex) => CommitAddChain,
        (EditMode::AddPoints, Polygon | Canvas) => AppendTempPoint,

        (EditMode::CreatePolygon, _) => CreatePoint,
    }
}
