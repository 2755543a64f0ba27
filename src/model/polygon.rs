//! Core polygon data model.
//!
//! Polygons are closed regions annotated on a microscopy image, either
//! spheroid/cell boundaries (`External`) or holes inside them (`Internal`).
//! All coordinates are in image space.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Check that both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Return this point shifted by an offset.
    pub fn offset_by(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// An axis-aligned bounding box in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The zero box returned for degenerate input.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Compute the bounding box of a point sequence.
    ///
    /// Non-finite points are ignored. Empty or all-invalid input yields the
    /// zero box, never a panic.
    pub fn from_points(points: &[Point]) -> Self {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut any = false;

        for p in points.iter().filter(|p| p.is_finite()) {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
            any = true;
        }

        if any {
            Self::new(min_x, min_y, max_x, max_y)
        } else {
            Self::zero()
        }
    }

    /// Check if two boxes overlap (edge contact counts as overlap).
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

// ============================================================================
// Polygon
// ============================================================================

/// Whether a polygon is a region boundary or a hole inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolygonType {
    /// A spheroid/cell boundary.
    #[default]
    External,
    /// A hole, logically subtracted from its parent external polygon.
    Internal,
}

/// A closed polygon annotated on the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Unique identifier within the live collection.
    pub id: String,
    /// The vertices of the polygon in ring order.
    pub points: Vec<Point>,
    /// Boundary or hole.
    #[serde(rename = "type", default)]
    pub kind: PolygonType,
    /// Enclosing external polygon, set for holes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Model confidence in [0, 1], if the polygon came from inference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Polygon {
    /// Create a polygon with a fresh unique id.
    pub fn new(points: Vec<Point>, kind: PolygonType) -> Self {
        Self {
            id: fresh_id(),
            points,
            kind,
            parent_id: None,
            confidence: None,
        }
    }

    /// Create an external polygon with a fresh id.
    pub fn external(points: Vec<Point>) -> Self {
        Self::new(points, PolygonType::External)
    }

    /// Get the bounding box of the polygon.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }
}

/// Generate a fresh polygon id.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Tests
// ============================================================================
