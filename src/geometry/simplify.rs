//! Render-side polygon simplification.
//!
//! Dense inference output can carry hundreds of points per polygon. For
//! rendering we reduce the point count once it exceeds a threshold, without
//! ever touching the stored data. A Douglas-Peucker pass removes points that
//! deviate less than a small epsilon from the silhouette; if the result is
//! still over budget, uniform decimation brings it down the rest of the way.

use std::borrow::Cow;

use crate::constants::{MIN_POLYGON_POINTS, SIMPLIFY_EPSILON};
use crate::model::Point;

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn perpendicular_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return p.distance_to(a);
    }
    ((dy * p.x - dx * p.y + b.x * a.y - b.y * a.x) / len).abs()
}

/// Douglas-Peucker over an index range; marks kept points in `keep`.
fn douglas_peucker(points: &[Point], first: usize, last: usize, epsilon: f64, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_index = first;
    for i in (first + 1)..last {
        let dist = perpendicular_distance(&points[i], &points[first], &points[last]);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > epsilon {
        keep[max_index] = true;
        douglas_peucker(points, first, max_index, epsilon, keep);
        douglas_peucker(points, max_index, last, epsilon, keep);
    }
}

/// Uniformly decimate `points` down to at most `budget` points, always
/// keeping the first point.
fn decimate(points: Vec<Point>, budget: usize) -> Vec<Point> {
    let n = points.len();
    if n <= budget {
        return points;
    }
    let stride = n as f64 / budget as f64;
    let mut out = Vec::with_capacity(budget);
    let mut next = 0.0;
    for (i, p) in points.into_iter().enumerate() {
        if i as f64 >= next {
            out.push(p);
            next += stride;
        }
    }
    out
}

/// Reduce a polygon ring for rendering when it exceeds `threshold` points.
///
/// Returns the input unchanged (borrowed) at or below the threshold. The
/// output always has at least 3 points for valid input and preserves the
/// silhouette within [`SIMPLIFY_EPSILON`] before decimation.
pub fn simplify_points(points: &[Point], threshold: usize, budget: usize) -> Cow<'_, [Point]> {
    let n = points.len();
    if n <= threshold.max(MIN_POLYGON_POINTS) {
        return Cow::Borrowed(points);
    }

    // The ring is opened between the last and first point; both anchors are
    // always kept, so closure survives simplification.
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;
    douglas_peucker(points, 0, n - 1, SIMPLIFY_EPSILON, &mut keep);

    let mut reduced: Vec<Point> = points
        .iter()
        .zip(keep.iter())
        .filter_map(|(p, k)| k.then_some(*p))
        .collect();

    // Epsilon can collapse a nearly-straight ring too far
    if reduced.len() < MIN_POLYGON_POINTS {
        return Cow::Owned(decimate(points.to_vec(), budget.max(MIN_POLYGON_POINTS)));
    }

    if reduced.len() > budget {
        reduced = decimate(reduced, budget.max(MIN_POLYGON_POINTS));
    }
    Cow::Owned(reduced)
}
