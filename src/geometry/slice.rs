//! Polygon slicing: splitting one polygon into two along a two-point cut.
//!
//! Both cut points are snapped to the nearest edge within tolerance. The
//! original ring is walked from the first cut to the second in each
//! direction, producing two closed rings that share the two cut points.
//! On any failure the source polygon is left untouched.

use crate::constants::MIN_POLYGON_POINTS;
use crate::error::SliceError;
use crate::geometry::find_closest_segment;
use crate::model::{Point, Polygon, fresh_id};

/// Cut points closer than this (image units) are treated as coincident.
const COINCIDENT_EPSILON: f64 = 1e-6;

/// Split `polygon` into two along the cut line `cut_a`-`cut_b`.
///
/// The cut points must lie on the polygon boundary within `tolerance`.
/// Both children receive fresh ids and inherit the source's type, parent
/// and confidence. Errors leave the source unchanged:
/// - [`SliceError::CutOffBoundary`] if a cut point cannot be snapped,
/// - [`SliceError::SameEdge`] / [`SliceError::CoincidentCuts`] for
///   degenerate cuts,
/// - [`SliceError::DegenerateChild`] if a resulting ring would have fewer
///   than 3 distinct points.
pub fn slice_polygon(
    polygon: &Polygon,
    cut_a: &Point,
    cut_b: &Point,
    tolerance: f64,
) -> Result<(Polygon, Polygon), SliceError> {
    let n = polygon.points.len();
    if n < MIN_POLYGON_POINTS {
        return Err(SliceError::InvalidSource);
    }

    let hit_a =
        find_closest_segment(cut_a, polygon, tolerance).ok_or(SliceError::CutOffBoundary)?;
    let hit_b =
        find_closest_segment(cut_b, polygon, tolerance).ok_or(SliceError::CutOffBoundary)?;

    if hit_a.projected.distance_to(&hit_b.projected) < COINCIDENT_EPSILON {
        return Err(SliceError::CoincidentCuts);
    }
    if hit_a.segment_index == hit_b.segment_index {
        return Err(SliceError::SameEdge);
    }

    // Order the cuts by segment index so the walk below is forward-only.
    let (first, second) = if hit_a.segment_index < hit_b.segment_index {
        (&hit_a, &hit_b)
    } else {
        (&hit_b, &hit_a)
    };
    let (sa, pa) = (first.segment_index, first.projected);
    let (sb, pb) = (second.segment_index, second.projected);

    // Walk from the first cut forward to the second.
    let mut ring_a: Vec<Point> = Vec::with_capacity(sb - sa + 2);
    ring_a.push(pa);
    ring_a.extend_from_slice(&polygon.points[sa + 1..=sb]);
    ring_a.push(pb);

    // And from the second cut around the end of the ring back to the first.
    let mut ring_b: Vec<Point> = Vec::with_capacity(n - (sb - sa) + 2);
    ring_b.push(pb);
    ring_b.extend_from_slice(&polygon.points[sb + 1..]);
    ring_b.extend_from_slice(&polygon.points[..=sa]);
    ring_b.push(pa);

    let ring_a = dedup_ring(ring_a);
    let ring_b = dedup_ring(ring_b);
    if ring_a.len() < MIN_POLYGON_POINTS || ring_b.len() < MIN_POLYGON_POINTS {
        return Err(SliceError::DegenerateChild);
    }

    Ok((child_of(polygon, ring_a), child_of(polygon, ring_b)))
}

/// Remove consecutive duplicate points (cuts snapped exactly onto a vertex
/// produce them), including the wrap-around pair.
fn dedup_ring(ring: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len());
    for p in ring {
        if out
            .last()
            .is_none_or(|last| last.distance_to(&p) >= COINCIDENT_EPSILON)
        {
            out.push(p);
        }
    }
    while out.len() > 1 {
        let wraps = {
            let (first, last) = (&out[0], &out[out.len() - 1]);
            first.distance_to(last) < COINCIDENT_EPSILON
        };
        if !wraps {
            break;
        }
        out.pop();
    }
    out
}

/// Build a slice child: fresh id, source type/parent/confidence carried over.
fn child_of(source: &Polygon, points: Vec<Point>) -> Polygon {
    Polygon {
        id: fresh_id(),
        points,
        kind: source.kind,
        parent_id: source.parent_id.clone(),
        confidence: source.confidence,
    }
}
