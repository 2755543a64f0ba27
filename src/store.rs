//! Selection & mutation manager: the single writer of the polygon
//! collection.
//!
//! All edits to the live polygons go through `PolygonStore`. Every mutator
//! validates its references and the 3-point minimum before touching
//! anything; a rejection leaves the collection unchanged. The store keeps
//! a version counter so derived geometry (culling, simplification) can be
//! recomputed only when something actually changed.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_POLYGON_POINTS;
use crate::error::MutationError;
use crate::model::{Point, Polygon};

// ============================================================================
// Snapshot
// ============================================================================

/// An immutable capture of the full polygon collection plus selection,
/// taken at the granularity of completed user operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The polygon collection in draw order.
    pub polygons: Vec<Polygon>,
    /// Selected polygon id, if any.
    pub selected_id: Option<String>,
}

// ============================================================================
// Polygon Store
// ============================================================================

/// Owner of the live polygon collection and the current selection.
///
/// Polygons are kept in draw order (last entry is topmost). Only this type
/// mutates them; everything else reads through accessors.
#[derive(Debug, Clone, Default)]
pub struct PolygonStore {
    /// The live collection in draw order.
    polygons: Vec<Polygon>,
    /// Currently selected polygon id.
    selected_id: Option<String>,
    /// Bumped on every successful mutation or selection change.
    version: u64,
}

impl PolygonStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// All live polygons in draw order.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Look up a polygon by id.
    pub fn get(&self, id: &str) -> Option<&Polygon> {
        self.polygons.iter().find(|p| p.id == id)
    }

    /// Number of live polygons.
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// The selected polygon id, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// Monotonic change counter; equal versions imply an identical
    /// collection and selection.
    pub fn version(&self) -> u64 {
        self.version
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Capture the current collection and selection.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            polygons: self.polygons.clone(),
            selected_id: self.selected_id.clone(),
        }
    }

    /// Install a snapshot (undo/redo path).
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.polygons = snapshot.polygons;
        self.selected_id = snapshot.selected_id;
        self.bump();
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Replace the whole collection (reload path). Clears a selection that
    /// no longer resolves.
    pub fn set_polygons(&mut self, polygons: Vec<Polygon>) {
        log::debug!("loading {} polygon(s)", polygons.len());
        self.polygons = polygons;
        if let Some(id) = &self.selected_id
            && self.get(id).is_none()
        {
            self.selected_id = None;
        }
        self.bump();
    }

    /// Select a polygon, or clear the selection with `None`.
    ///
    /// Selecting an id that does not exist clears the selection instead of
    /// failing.
    pub fn select(&mut self, id: Option<&str>) {
        let resolved = id.filter(|id| self.get(id).is_some()).map(String::from);
        if resolved.is_none() && id.is_some() {
            log::debug!("select: unknown polygon id, clearing selection");
        }
        if self.selected_id != resolved {
            self.selected_id = resolved;
            self.bump();
        }
    }

    /// Append a polygon (creation path) and return its id.
    pub fn add_polygon(&mut self, polygon: Polygon) -> String {
        let id = polygon.id.clone();
        self.polygons.push(polygon);
        self.bump();
        id
    }

    /// Delete a polygon by id.
    pub fn delete_polygon(&mut self, id: &str) -> Result<Polygon, MutationError> {
        let index = self.index_of(id)?;
        let removed = self.polygons.remove(index);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        log::debug!("deleted polygon '{id}'");
        self.bump();
        Ok(removed)
    }

    /// Move a vertex to a new position (drag commit).
    pub fn move_vertex(
        &mut self,
        id: &str,
        index: usize,
        point: Point,
    ) -> Result<(), MutationError> {
        if !point.is_finite() {
            return Err(MutationError::NonFinitePoint { id: id.to_string() });
        }
        let polygon = self.polygon_mut(id)?;
        let len = polygon.points.len();
        let vertex = polygon
            .points
            .get_mut(index)
            .ok_or(MutationError::VertexOutOfRange {
                id: id.to_string(),
                index,
                len,
            })?;
        *vertex = point;
        self.bump();
        Ok(())
    }

    /// Delete a vertex. Rejected if the polygon has exactly 3 points.
    pub fn delete_vertex(&mut self, id: &str, index: usize) -> Result<(), MutationError> {
        let polygon = self.polygon_mut(id)?;
        let len = polygon.points.len();
        if index >= len {
            return Err(MutationError::VertexOutOfRange {
                id: id.to_string(),
                index,
                len,
            });
        }
        if len <= MIN_POLYGON_POINTS {
            log::warn!("rejected vertex delete on 3-point polygon '{id}'");
            return Err(MutationError::TooFewPoints { id: id.to_string() });
        }
        polygon.points.remove(index);
        self.bump();
        Ok(())
    }

    /// Insert a vertex after `after_index` (AddPoints on an edge).
    pub fn insert_vertex(
        &mut self,
        id: &str,
        after_index: usize,
        point: Point,
    ) -> Result<(), MutationError> {
        self.insert_vertices(id, after_index, &[point])
    }

    /// Insert a chain of vertices after `after_index`, in order.
    pub fn insert_vertices(
        &mut self,
        id: &str,
        after_index: usize,
        points: &[Point],
    ) -> Result<(), MutationError> {
        if points.iter().any(|p| !p.is_finite()) {
            return Err(MutationError::NonFinitePoint { id: id.to_string() });
        }
        let polygon = self.polygon_mut(id)?;
        let len = polygon.points.len();
        if after_index >= len {
            return Err(MutationError::VertexOutOfRange {
                id: id.to_string(),
                index: after_index,
                len,
            });
        }
        if points.is_empty() {
            return Ok(());
        }
        polygon
            .points
            .splice(after_index + 1..after_index + 1, points.iter().copied());
        self.bump();
        Ok(())
    }

    /// Splice a chain of new points between two anchor vertices, replacing
    /// the shorter arc between them (AddPoints commit).
    ///
    /// The anchors themselves are kept. Rejected if the anchors coincide,
    /// either index is out of range, or the result would drop below 3
    /// points.
    pub fn splice_between(
        &mut self,
        id: &str,
        start_index: usize,
        end_index: usize,
        chain: &[Point],
    ) -> Result<(), MutationError> {
        if chain.iter().any(|p| !p.is_finite()) {
            return Err(MutationError::NonFinitePoint { id: id.to_string() });
        }
        let polygon = self.polygon_mut(id)?;
        let len = polygon.points.len();
        if start_index >= len || end_index >= len {
            let index = start_index.max(end_index);
            return Err(MutationError::VertexOutOfRange {
                id: id.to_string(),
                index,
                len,
            });
        }
        if start_index == end_index {
            return Err(MutationError::InvalidSpliceAnchors { id: id.to_string() });
        }

        // Walk both arcs between the anchors; replace the one with fewer
        // interior vertices.
        let forward: Vec<usize> = arc_between(start_index, end_index, len);
        let backward: Vec<usize> = arc_between(end_index, start_index, len);
        let (replaced, reversed) = if forward.len() <= backward.len() {
            (forward, false)
        } else {
            (backward, true)
        };

        let mut points: Vec<Point> = Vec::with_capacity(len - replaced.len() + chain.len());
        let keep: Vec<Point> = polygon
            .points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| (!replaced.contains(&i)).then_some(*p))
            .collect();

        // Rebuild the ring: kept points in order, with the chain inserted
        // right after the start anchor (or reversed when the replaced arc
        // ran the other way).
        let anchor = if reversed { end_index } else { start_index };
        for (i, p) in polygon.points.iter().enumerate() {
            if replaced.contains(&i) {
                continue;
            }
            points.push(*p);
            if i == anchor {
                if reversed {
                    points.extend(chain.iter().rev().copied());
                } else {
                    points.extend(chain.iter().copied());
                }
            }
        }
        debug_assert_eq!(points.len(), keep.len() + chain.len());

        if points.len() < MIN_POLYGON_POINTS {
            return Err(MutationError::TooFewPoints { id: id.to_string() });
        }
        polygon.points = points;
        self.bump();
        Ok(())
    }

    /// Replace a polygon with the two children of a slice, preserving its
    /// position in the draw order.
    pub fn replace_with_slice(
        &mut self,
        id: &str,
        children: (Polygon, Polygon),
    ) -> Result<(String, String), MutationError> {
        let index = self.index_of(id)?;
        let (a, b) = children;
        let ids = (a.id.clone(), b.id.clone());
        self.polygons.splice(index..=index, [a, b]);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        log::debug!("sliced polygon '{id}' into '{}' and '{}'", ids.0, ids.1);
        self.bump();
        Ok(ids)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn index_of(&self, id: &str) -> Result<usize, MutationError> {
        self.polygons
            .iter()
            .position(|p| p.id == id)
            .ok_or(MutationError::PolygonNotFound { id: id.to_string() })
    }

    fn polygon_mut(&mut self, id: &str) -> Result<&mut Polygon, MutationError> {
        self.polygons
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(MutationError::PolygonNotFound { id: id.to_string() })
    }
}

/// Indices strictly between `from` and `to` walking forward around a ring
/// of length `len`.
fn arc_between(from: usize, to: usize, len: usize) -> Vec<usize> {
    let mut indices = Vec::new();
    let mut i = (from + 1) % len;
    while i != to {
        indices.push(i);
        i = (i + 1) % len;
    }
    indices
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PolygonType;

    fn square(id: &str) -> Polygon {
        Polygon {
            id: id.to_string(),
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            kind: PolygonType::External,
            parent_id: None,
            confidence: None,
        }
    }

    fn triangle(id: &str) -> Polygon {
        Polygon {
            id: id.to_string(),
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(5.0, 10.0),
            ],
            kind: PolygonType::External,
            parent_id: None,
            confidence: None,
        }
    }

    #[test]
    fn test_select_and_clear() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a")]);

        store.select(Some("a"));
        assert_eq!(store.selected(), Some("a"));

        store.select(None);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_select_unknown_id_clears() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a")]);
        store.select(Some("a"));
        store.select(Some("ghost"));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_set_polygons_drops_stale_selection() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a")]);
        store.select(Some("a"));

        store.set_polygons(vec![square("b")]);
        assert_eq!(store.selected(), None);

        store.select(Some("b"));
        store.set_polygons(vec![square("b"), square("c")]);
        assert_eq!(store.selected(), Some("b"));
    }

    #[test]
    fn test_delete_polygon_clears_its_selection() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a"), square("b")]);
        store.select(Some("a"));

        store.delete_polygon("a").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected(), None);

        assert!(matches!(
            store.delete_polygon("a"),
            Err(MutationError::PolygonNotFound { .. })
        ));
    }

    #[test]
    fn test_move_vertex() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a")]);

        store.move_vertex("a", 1, Point::new(12.0, -1.0)).unwrap();
        assert_eq!(store.get("a").unwrap().points[1], Point::new(12.0, -1.0));

        assert!(matches!(
            store.move_vertex("a", 9, Point::new(0.0, 0.0)),
            Err(MutationError::VertexOutOfRange { .. })
        ));
        assert!(matches!(
            store.move_vertex("a", 0, Point::new(f64::NAN, 0.0)),
            Err(MutationError::NonFinitePoint { .. })
        ));
    }

    #[test]
    fn test_delete_vertex_minimum_enforced() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a"), triangle("t")]);

        store.delete_vertex("a", 0).unwrap();
        assert_eq!(store.get("a").unwrap().points.len(), 3);

        // Now at the minimum: further deletes are rejected, nothing changes
        let before = store.snapshot();
        assert!(matches!(
            store.delete_vertex("a", 0),
            Err(MutationError::TooFewPoints { .. })
        ));
        assert!(matches!(
            store.delete_vertex("t", 1),
            Err(MutationError::TooFewPoints { .. })
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_insert_vertex() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a")]);

        store.insert_vertex("a", 0, Point::new(5.0, 0.0)).unwrap();
        let points = &store.get("a").unwrap().points;
        assert_eq!(points.len(), 5);
        assert_eq!(points[1], Point::new(5.0, 0.0));
    }

    #[test]
    fn test_splice_between_adjacent_anchors_inserts() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a")]);

        let chain = [Point::new(3.0, -1.0), Point::new(7.0, -1.0)];
        store.splice_between("a", 0, 1, &chain).unwrap();

        let points = &store.get("a").unwrap().points;
        assert_eq!(points.len(), 6);
        assert_eq!(points[1], Point::new(3.0, -1.0));
        assert_eq!(points[2], Point::new(7.0, -1.0));
        assert_eq!(points[3], Point::new(10.0, 0.0));
    }

    #[test]
    fn test_splice_between_replaces_shorter_arc() {
        // Hexagon: anchors 0 and 2; vertex 1 sits on the shorter arc and is
        // replaced by the chain.
        let mut store = PolygonStore::new();
        let hexagon = Polygon {
            id: "h".to_string(),
            points: (0..6)
                .map(|i| {
                    let angle = (i as f64) * std::f64::consts::TAU / 6.0;
                    Point::new(angle.cos() * 10.0, angle.sin() * 10.0)
                })
                .collect(),
            kind: PolygonType::External,
            parent_id: None,
            confidence: None,
        };
        let original = hexagon.points.clone();
        store.set_polygons(vec![hexagon]);

        let chain = [Point::new(20.0, 5.0)];
        store.splice_between("h", 0, 2, &chain).unwrap();

        let points = &store.get("h").unwrap().points;
        // 6 - 1 replaced + 1 inserted
        assert_eq!(points.len(), 6);
        assert!(!points.contains(&original[1]));
        assert!(points.contains(&Point::new(20.0, 5.0)));
        // Both anchors survive
        assert!(points.contains(&original[0]));
        assert!(points.contains(&original[2]));
    }

    #[test]
    fn test_splice_between_rejects_bad_anchors() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a")]);
        let before = store.snapshot();

        assert!(matches!(
            store.splice_between("a", 1, 1, &[Point::new(0.0, -5.0)]),
            Err(MutationError::InvalidSpliceAnchors { .. })
        ));
        assert!(matches!(
            store.splice_between("a", 0, 9, &[Point::new(0.0, -5.0)]),
            Err(MutationError::VertexOutOfRange { .. })
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_replace_with_slice_preserves_draw_order() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a"), square("b"), square("c")]);
        store.select(Some("b"));

        let child1 = triangle("x");
        let child2 = triangle("y");
        let (id1, id2) = store
            .replace_with_slice("b", (child1, child2))
            .unwrap();
        assert_eq!(id1, "x");
        assert_eq!(id2, "y");

        let order: Vec<&str> = store.polygons().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["a", "x", "y", "c"]);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_version_counter_tracks_changes() {
        let mut store = PolygonStore::new();
        let v0 = store.version();

        store.set_polygons(vec![square("a")]);
        assert!(store.version() > v0);

        let v1 = store.version();
        // Rejected mutation leaves the version alone
        let _ = store.delete_polygon("ghost");
        assert_eq!(store.version(), v1);

        // Re-selecting the same value is a no-op
        store.select(None);
        assert_eq!(store.version(), v1);
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut store = PolygonStore::new();
        store.set_polygons(vec![square("a")]);
        store.select(Some("a"));
        let snapshot = store.snapshot();

        store.delete_polygon("a").unwrap();
        assert!(store.is_empty());

        store.restore(snapshot.clone());
        assert_eq!(store.snapshot(), snapshot);
        assert_eq!(store.selected(), Some("a"));
    }
}
