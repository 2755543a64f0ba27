//! Render list preparation: culling, simplification, and overlays.
//!
//! The editor itself never draws. A shell asks [`RenderCache`] for a frame;
//! it gets back screen-space outlines, already culled to the viewport and
//! simplified where a polygon is dense enough to warrant it. The base list
//! is cached against the store version and the transform, so pure redraws
//! and pointer motion cost nothing; overlays (drag preview, pending points,
//! slice cut) are rebuilt every frame because they change every frame.

use crate::editor::Editor;
use crate::geometry::{polygon_in_viewport, simplify_points};
use crate::model::{BoundingBox, Point, PolygonType};
use crate::transform::Transform;

// ============================================================================
// Output types
// ============================================================================

/// One polygon outline ready to draw, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPolygon {
    pub id: String,
    /// Closed ring in screen coordinates; the last point connects back to
    /// the first.
    pub points: Vec<Point>,
    pub kind: PolygonType,
    pub selected: bool,
    /// Whether the outline was decimated for display. Hit-testing always
    /// runs against the full stored ring, never this one.
    pub simplified: bool,
}

/// Per-frame overlay state, in screen space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOverlay {
    /// The dragged polygon with the drag offset applied. Drawn instead of
    /// the base-list entry with the same id.
    pub dragged: Option<RenderPolygon>,
    /// Pending chain (AddPoints) or outline (CreatePolygon).
    pub temp_points: Vec<Point>,
    /// First cut point of an accumulating slice.
    pub slice_start: Option<Point>,
}

/// Everything a shell needs to draw one frame.
#[derive(Debug)]
pub struct Frame<'a> {
    /// Culled, simplified outlines in draw order.
    pub polygons: &'a [RenderPolygon],
    pub overlay: FrameOverlay,
}

// ============================================================================
// Render cache
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    version: u64,
    transform: Transform,
    width: f64,
    height: f64,
}

/// Caches the base render list between frames.
#[derive(Debug, Default)]
pub struct RenderCache {
    key: Option<CacheKey>,
    polygons: Vec<RenderPolygon>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the frame for a viewport of `width` x `height` screen pixels.
    ///
    /// The base list is rebuilt only when the collection, selection,
    /// transform, or viewport changed since the last call.
    pub fn frame(&mut self, editor: &Editor, width: f64, height: f64) -> Frame<'_> {
        let transform = editor.transform();
        let key = CacheKey {
            version: editor.store().version(),
            transform,
            width,
            height,
        };
        if self.key.as_ref() != Some(&key) {
            self.rebuild(editor, width, height);
            self.key = Some(key);
        }

        Frame {
            polygons: &self.polygons,
            overlay: self.build_overlay(editor),
        }
    }

    fn rebuild(&mut self, editor: &Editor, width: f64, height: f64) {
        let transform = editor.transform();
        let viewport = image_viewport(&transform, width, height);
        let config = editor.config();
        let selected = editor.store().selected();

        self.polygons.clear();
        for polygon in editor.store().polygons() {
            if !polygon_in_viewport(polygon, &viewport) {
                continue;
            }
            let is_selected = selected == Some(polygon.id.as_str());
            // The selected outline keeps every vertex so its handles match
            // the pick targets.
            let (points, simplified) = if is_selected {
                (polygon.points.as_slice().into(), false)
            } else {
                let simplified = polygon.points.len() > config.simplify_threshold;
                (
                    simplify_points(
                        &polygon.points,
                        config.simplify_threshold,
                        config.simplify_budget,
                    ),
                    simplified,
                )
            };
            self.polygons.push(RenderPolygon {
                id: polygon.id.clone(),
                points: points.iter().map(|p| transform.to_screen(*p)).collect(),
                kind: polygon.kind,
                selected: is_selected,
                simplified,
            });
        }
        log::debug!(
            "render list rebuilt: {} of {} polygon(s) visible",
            self.polygons.len(),
            editor.store().len()
        );
    }

    fn build_overlay(&self, editor: &Editor) -> FrameOverlay {
        let transform = editor.transform();
        let interaction = editor.interaction();

        let dragged = interaction
            .drag
            .as_ref()
            .and_then(|drag| dragged_polygon(editor, drag, &transform));

        FrameOverlay {
            dragged,
            temp_points: interaction
                .temp_points
                .iter()
                .map(|p| transform.to_screen(*p))
                .collect(),
            slice_start: interaction.slice_start.map(|p| transform.to_screen(p)),
        }
    }
}

/// The dragged polygon with the drag offset applied to its target vertex,
/// unsimplified so the moving vertex is always present.
fn dragged_polygon(
    editor: &Editor,
    drag: &crate::editor::VertexDrag,
    transform: &Transform,
) -> Option<RenderPolygon> {
    let polygon = editor.store().get(&drag.target.polygon_id)?;
    let mut points: Vec<Point> = polygon.points.clone();
    let vertex = points.get_mut(drag.target.vertex_index)?;
    *vertex = drag.current();
    Some(RenderPolygon {
        id: polygon.id.clone(),
        points: points.iter().map(|p| transform.to_screen(*p)).collect(),
        kind: polygon.kind,
        selected: true,
        simplified: false,
    })
}

/// The image-space rectangle visible in a `width` x `height` screen.
fn image_viewport(transform: &Transform, width: f64, height: f64) -> BoundingBox {
    let top_left = transform.to_image(Point::new(0.0, 0.0));
    let bottom_right = transform.to_image(Point::new(width, height));
    BoundingBox::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
}

// ============================================================================
// Tests
// ============================================================================
