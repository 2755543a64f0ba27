//! Polygon data model and the parse boundary for backend payloads.

mod parse;
mod polygon;

pub use parse::{ParsedCollection, RawPolygon, SegmentationPayload, parse_collection, parse_polygon};
pub use polygon::{BoundingBox, Point, Polygon, PolygonType, fresh_id};
