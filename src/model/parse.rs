//! Strict parse boundary for polygon data from the segmentation backend.
//!
//! The backend payload is loosely typed: points may be missing coordinates,
//! carry non-numeric values, or leave a polygon with too few usable points.
//! Everything is sanitized here, once, so the interaction engine only ever
//! sees valid polygons. Invalid points are dropped; polygons left with fewer
//! than 3 valid points are rejected and logged, never mutated in place.

use serde::Deserialize;
use serde_json::Value;

use crate::constants::MIN_POLYGON_POINTS;
use crate::error::ParseError;
use crate::model::polygon::{Point, Polygon, PolygonType, fresh_id};

// ============================================================================
// Raw Wire Types
// ============================================================================

/// A polygon as it arrives from the network, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPolygon {
    /// Backend-assigned id, if any.
    #[serde(default)]
    pub id: Option<String>,
    /// Point list; entries may be `{x, y}` objects or `[x, y]` arrays.
    #[serde(default)]
    pub points: Option<Vec<Value>>,
    /// "external" or "internal"; defaults to external when absent.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Enclosing polygon id for holes.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Model confidence; kept loose because backends send strings too.
    #[serde(default)]
    pub confidence: Option<Value>,
}

/// The segmentation fetch response shape.
///
/// `polygons: null` means "no segmentation exists for this image" and is
/// not an error; backend 404/absence maps here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentationPayload {
    /// Polygon list, or `null` when no segmentation exists.
    #[serde(default)]
    pub polygons: Option<Vec<RawPolygon>>,
    /// Source image width in pixels, if known.
    #[serde(default, alias = "imageWidth")]
    pub image_width: Option<f64>,
    /// Source image height in pixels, if known.
    #[serde(default, alias = "imageHeight")]
    pub image_height: Option<f64>,
}

impl SegmentationPayload {
    /// Deserialize a payload from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Result of parsing a raw polygon list: the valid polygons plus the
/// rejection reasons for everything that was excluded.
#[derive(Debug, Default)]
pub struct ParsedCollection {
    /// Polygons that passed validation, in received (draw) order.
    pub polygons: Vec<Polygon>,
    /// Why the remaining entries were excluded.
    pub rejected: Vec<ParseError>,
}

/// Extract a point from a loose JSON value.
///
/// Accepts `{"x": 1.0, "y": 2.0}` and `[1.0, 2.0]`. Returns `None` for
/// missing, non-numeric, or non-finite coordinates.
fn point_from_value(value: &Value) -> Option<Point> {
    let (x, y) = match value {
        Value::Object(map) => (map.get("x")?.as_f64()?, map.get("y")?.as_f64()?),
        Value::Array(arr) => (arr.first()?.as_f64()?, arr.get(1)?.as_f64()?),
        _ => return None,
    };
    let point = Point::new(x, y);
    point.is_finite().then_some(point)
}

/// Validate a single raw polygon into a `Polygon`.
pub fn parse_polygon(raw: RawPolygon) -> Result<Polygon, ParseError> {
    let id = raw.id.unwrap_or_else(fresh_id);

    let kind = match raw.kind.as_deref() {
        None | Some("external") => PolygonType::External,
        Some("internal") => PolygonType::Internal,
        Some(other) => {
            return Err(ParseError::UnknownType {
                id,
                kind: other.to_string(),
            });
        }
    };

    let Some(raw_points) = raw.points else {
        return Err(ParseError::MissingPoints { id });
    };

    let total = raw_points.len();
    let points: Vec<Point> = raw_points.iter().filter_map(point_from_value).collect();
    if points.len() < total {
        log::debug!(
            "polygon '{}': dropped {} invalid point(s)",
            id,
            total - points.len()
        );
    }

    if points.len() < MIN_POLYGON_POINTS {
        return Err(ParseError::TooFewValidPoints {
            id,
            valid: points.len(),
        });
    }

    // parent_id is only meaningful for holes
    let parent_id = match kind {
        PolygonType::Internal => raw.parent_id,
        PolygonType::External => None,
    };

    let confidence = raw
        .confidence
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0));

    Ok(Polygon {
        id,
        points,
        kind,
        parent_id,
        confidence,
    })
}

/// Validate a raw polygon list, keeping received order for the survivors.
pub fn parse_collection(raws: Vec<RawPolygon>) -> ParsedCollection {
    let mut parsed = ParsedCollection::default();
    for raw in raws {
        match parse_polygon(raw) {
            Ok(polygon) => parsed.polygons.push(polygon),
            Err(reason) => {
                log::warn!("excluding polygon from load: {reason}");
                parsed.rejected.push(reason);
            }
        }
    }
    parsed
}

// ============================================================================
// Tests
// ============================================================================
