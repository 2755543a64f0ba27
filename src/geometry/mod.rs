//! Geometry engine: hit-testing, containment, and viewport culling.
//!
//! All functions here are pure and operate in image space. Tolerances are
//! given in image units; callers divide a fixed screen-pixel radius by the
//! current zoom so the effective pick radius stays constant on screen.

mod simplify;
mod slice;

pub use simplify::simplify_points;
pub use slice::slice_polygon;

use crate::model::{BoundingBox, Point, Polygon};

// ============================================================================
// Hit-Test Results
// ============================================================================

/// Reference to a single vertex of a polygon in the live collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRef {
    /// Owning polygon id.
    pub polygon_id: String,
    /// Index into the polygon's point ring.
    pub vertex_index: usize,
}

/// A hit on a polygon edge: the segment and the projection of the query
/// point onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentHit {
    /// Index of the segment; segment `i` runs from point `i` to point
    /// `(i + 1) % n`.
    pub segment_index: usize,
    /// The query point projected onto the segment.
    pub projected: Point,
    /// Distance from the query point to the projection.
    pub distance: f64,
}

// ============================================================================
// Containment
// ============================================================================

/// Ray-casting point-in-polygon test over a closed ring.
///
/// Rings with fewer than 3 points contain nothing.
pub fn point_in_polygon(point: &Point, ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = &ring[i];
        let vj = &ring[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Find the topmost polygon containing `point`, searching from the end of
/// the draw order (last-drawn wins).
pub fn topmost_polygon_at<'a>(point: &Point, polygons: &'a [Polygon]) -> Option<&'a Polygon> {
    polygons
        .iter()
        .rev()
        .find(|poly| point_in_polygon(point, &poly.points))
}

// ============================================================================
// Nearest Vertex / Segment
// ============================================================================

/// Find the vertex closest to `point` across all polygons, within
/// `tolerance` image units.
///
/// Ties are broken by draw order (last-drawn polygon wins), then by lowest
/// vertex index within a polygon.
pub fn find_closest_vertex(
    point: &Point,
    polygons: &[Polygon],
    tolerance: f64,
) -> Option<VertexRef> {
    let mut best: Option<(VertexRef, f64)> = None;

    for polygon in polygons {
        let mut local: Option<(usize, f64)> = None;
        for (index, vertex) in polygon.points.iter().enumerate() {
            let dist = point.distance_to(vertex);
            if dist > tolerance {
                continue;
            }
            // Strict < keeps the lowest index on equal distance
            if local.is_none_or(|(_, d)| dist < d) {
                local = Some((index, dist));
            }
        }
        if let Some((index, dist)) = local {
            // <= lets a later-drawn polygon take an equally close vertex
            if best.as_ref().is_none_or(|(_, d)| dist <= *d) {
                best = Some((
                    VertexRef {
                        polygon_id: polygon.id.clone(),
                        vertex_index: index,
                    },
                    dist,
                ));
            }
        }
    }

    best.map(|(vertex, _)| vertex)
}

/// Project `p` onto the segment `a`-`b`, returning the projection point and
/// its distance from `p`.
pub fn project_onto_segment(p: &Point, a: &Point, b: &Point) -> (Point, f64) {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;

    let projected = if len_sq == 0.0 {
        *a
    } else {
        let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
        Point::new(a.x + t * abx, a.y + t * aby)
    };
    let dist = p.distance_to(&projected);
    (projected, dist)
}

/// Find the polygon edge closest to `point`, within `tolerance` image
/// units. Lowest segment index wins ties.
pub fn find_closest_segment(
    point: &Point,
    polygon: &Polygon,
    tolerance: f64,
) -> Option<SegmentHit> {
    let n = polygon.points.len();
    if n < 2 {
        return None;
    }

    let mut best: Option<SegmentHit> = None;
    for i in 0..n {
        let a = &polygon.points[i];
        let b = &polygon.points[(i + 1) % n];
        let (projected, distance) = project_onto_segment(point, a, b);
        if distance > tolerance {
            continue;
        }
        if best.as_ref().is_none_or(|hit| distance < hit.distance) {
            best = Some(SegmentHit {
                segment_index: i,
                projected,
                distance,
            });
        }
    }
    best
}

// ============================================================================
// Viewport Culling
// ============================================================================

/// Check whether any part of the polygon may be visible inside the
/// viewport (image-space bounds).
///
/// Uses bounding-box intersection, so it can report an off-screen polygon
/// as visible (a performance cost) but never the reverse.
pub fn polygon_in_viewport(polygon: &Polygon, viewport: &BoundingBox) -> bool {
    polygon.bounding_box().intersects(viewport)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PolygonType;

    fn square(id: &str, origin: f64, size: f64) -> Polygon {
        Polygon {
            id: id.to_string(),
            points: vec![
                Point::new(origin, origin),
                Point::new(origin + size, origin),
                Point::new(origin + size, origin + size),
                Point::new(origin, origin + size),
            ],
            kind: PolygonType::External,
            parent_id: None,
            confidence: None,
        }
    }

    #[test]
    fn test_point_in_polygon() {
        let ring = square("s", 0.0, 100.0).points;
        assert!(point_in_polygon(&Point::new(50.0, 50.0), &ring));
        assert!(!point_in_polygon(&Point::new(150.0, 50.0), &ring));
        assert!(!point_in_polygon(&Point::new(-1.0, 50.0), &ring));
    }

    #[test]
    fn test_point_in_polygon_degenerate_ring() {
        let two = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!(!point_in_polygon(&Point::new(5.0, 0.0), &two));
        assert!(!point_in_polygon(&Point::new(0.0, 0.0), &[]));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // A "U" shape; the notch is outside
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        assert!(point_in_polygon(&Point::new(5.0, 20.0), &ring));
        assert!(point_in_polygon(&Point::new(25.0, 20.0), &ring));
        assert!(!point_in_polygon(&Point::new(15.0, 20.0), &ring));
    }

    #[test]
    fn test_topmost_polygon_wins() {
        let bottom = square("bottom", 0.0, 100.0);
        let top = square("top", 40.0, 100.0);
        let polygons = vec![bottom, top];

        let hit = topmost_polygon_at(&Point::new(60.0, 60.0), &polygons).unwrap();
        assert_eq!(hit.id, "top");

        let only_bottom = topmost_polygon_at(&Point::new(10.0, 10.0), &polygons).unwrap();
        assert_eq!(only_bottom.id, "bottom");

        assert!(topmost_polygon_at(&Point::new(500.0, 500.0), &polygons).is_none());
    }

    #[test]
    fn test_find_closest_vertex() {
        let polygons = vec![square("a", 0.0, 10.0)];
        let hit = find_closest_vertex(&Point::new(10.4, 0.3), &polygons, 1.0).unwrap();
        assert_eq!(hit.polygon_id, "a");
        assert_eq!(hit.vertex_index, 1);
    }

    #[test]
    fn test_find_closest_vertex_outside_tolerance() {
        let polygons = vec![square("a", 0.0, 10.0)];
        assert!(find_closest_vertex(&Point::new(5.0, 5.0), &polygons, 1.0).is_none());
    }

    #[test]
    fn test_find_closest_vertex_tie_last_drawn_wins() {
        // Two polygons sharing the corner (10, 10)
        let a = square("a", 0.0, 10.0);
        let b = square("b", 10.0, 10.0);
        let polygons = vec![a, b];

        let hit = find_closest_vertex(&Point::new(10.0, 10.0), &polygons, 1.0).unwrap();
        assert_eq!(hit.polygon_id, "b");
        assert_eq!(hit.vertex_index, 0);
    }

    #[test]
    fn test_find_closest_vertex_tie_lowest_index_wins() {
        // Degenerate polygon with two vertices at the same spot
        let mut poly = square("a", 0.0, 10.0);
        poly.points.push(Point::new(0.0, 0.0));
        let hit = find_closest_vertex(&Point::new(0.1, 0.0), &[poly], 1.0).unwrap();
        assert_eq!(hit.vertex_index, 0);
    }

    #[test]
    fn test_project_onto_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);

        let (proj, dist) = project_onto_segment(&Point::new(5.0, 3.0), &a, &b);
        assert_eq!(proj, Point::new(5.0, 0.0));
        assert!((dist - 3.0).abs() < 1e-9);

        // Beyond the endpoint clamps to it
        let (proj, _) = project_onto_segment(&Point::new(15.0, 0.0), &a, &b);
        assert_eq!(proj, Point::new(10.0, 0.0));

        // Zero-length segment projects to the point itself
        let (proj, _) = project_onto_segment(&Point::new(3.0, 4.0), &a, &a);
        assert_eq!(proj, a);
    }

    #[test]
    fn test_find_closest_segment() {
        let poly = square("a", 0.0, 10.0);
        let hit = find_closest_segment(&Point::new(5.0, -0.5), &poly, 1.0).unwrap();
        assert_eq!(hit.segment_index, 0);
        assert_eq!(hit.projected, Point::new(5.0, 0.0));

        // The closing segment (index 3) runs from (0,10) back to (0,0)
        let hit = find_closest_segment(&Point::new(-0.5, 5.0), &poly, 1.0).unwrap();
        assert_eq!(hit.segment_index, 3);
        assert_eq!(hit.projected, Point::new(0.0, 5.0));
    }

    #[test]
    fn test_find_closest_segment_outside_tolerance() {
        let poly = square("a", 0.0, 10.0);
        assert!(find_closest_segment(&Point::new(5.0, -3.0), &poly, 1.0).is_none());
    }

    #[test]
    fn test_polygon_in_viewport() {
        let poly = square("a", 0.0, 10.0);

        let inside = BoundingBox::new(-5.0, -5.0, 50.0, 50.0);
        assert!(polygon_in_viewport(&poly, &inside));

        let partial = BoundingBox::new(8.0, 8.0, 50.0, 50.0);
        assert!(polygon_in_viewport(&poly, &partial));

        let outside = BoundingBox::new(100.0, 100.0, 200.0, 200.0);
        assert!(!polygon_in_viewport(&poly, &outside));

        // Edge contact still counts as visible
        let touching = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert!(polygon_in_viewport(&poly, &touching));
    }
}
