//! Transient, mode-scoped interaction state.
//!
//! Everything here is scratch state for an in-progress gesture: a vertex
//! drag, a pan, an accumulating slice cut, or a pending point chain. None
//! of it touches the stored polygons until the gesture commits through the
//! mutation manager.

use crate::geometry::VertexRef;
use crate::model::Point;

/// An in-progress vertex drag.
///
/// The offset is applied to the stored position for rendering only; the
/// polygon itself is updated once, on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexDrag {
    /// The vertex being dragged.
    pub target: VertexRef,
    /// Stored position at drag start.
    pub original: Point,
    /// Pointer position at drag start, image space. The vertex moves by
    /// the pointer delta, not to the pointer, so grabbing a vertex
    /// slightly off-center does not make it jump.
    pub grab: Point,
    /// Accumulated drag offset in image units, X.
    pub dx: f64,
    /// Accumulated drag offset in image units, Y.
    pub dy: f64,
}

impl VertexDrag {
    /// Start a drag with zero offset.
    pub fn new(target: VertexRef, original: Point, grab: Point) -> Self {
        Self {
            target,
            original,
            grab,
            dx: 0.0,
            dy: 0.0,
        }
    }

    /// The position the vertex would commit to right now.
    pub fn current(&self) -> Point {
        self.original.offset_by(self.dx, self.dy)
    }

    /// Whether the drag has any net offset.
    pub fn has_moved(&self) -> bool {
        self.dx != 0.0 || self.dy != 0.0
    }
}

/// An in-progress canvas pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanState {
    /// Last pointer position seen, in screen space.
    pub last_screen: Point,
}

/// All transient interaction state, cleared on mode changes and Escape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    /// Active vertex drag, if any.
    pub drag: Option<VertexDrag>,
    /// Active canvas pan, if any.
    pub pan: Option<PanState>,
    /// First cut point of an accumulating slice.
    pub slice_start: Option<Point>,
    /// Start anchor of an add-points chain.
    pub add_start: Option<VertexRef>,
    /// Pending points: the chain in AddPoints mode, the outline in
    /// CreatePolygon mode.
    pub temp_points: Vec<Point>,
}

impl InteractionState {
    /// Drop all in-progress gesture state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether any gesture is in progress.
    pub fn is_idle(&self) -> bool {
        self.drag.is_none()
            && self.pan.is_none()
            && self.slice_start.is_none()
            && self.add_start.is_none()
            && self.temp_points.is_empty()
    }
}
