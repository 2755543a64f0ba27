//! Error types for polygon editing operations.

use thiserror::Error;

/// Errors produced at the polygon parse/load boundary.
///
/// These describe why a polygon from the segmentation backend was rejected.
/// They are logged and reported, never thrown into the interaction engine.
#[derive(Error, Debug)]
pub enum ParseError {
    /// JSON payload could not be deserialized at all
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polygon had fewer than 3 valid points after dropping invalid ones
    #[error("polygon '{id}' has only {valid} valid point(s), need at least 3")]
    TooFewValidPoints {
        /// Id of the rejected polygon
        id: String,
        /// Number of points that survived coordinate validation
        valid: usize,
    },

    /// Polygon carried no point list at all
    #[error("polygon '{id}' has no points field")]
    MissingPoints {
        /// Id of the rejected polygon
        id: String,
    },

    /// Unknown polygon type string
    #[error("polygon '{id}' has unknown type '{kind}'")]
    UnknownType {
        /// Id of the rejected polygon
        id: String,
        /// The unrecognized type value
        kind: String,
    },
}

/// Errors from the selection & mutation manager.
///
/// Every variant is a rejection: the polygon collection is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// Referenced polygon does not exist in the live collection
    #[error("polygon '{id}' not found")]
    PolygonNotFound {
        /// The missing polygon id
        id: String,
    },

    /// Vertex index is out of range for the polygon
    #[error("vertex {index} out of range for polygon '{id}' ({len} points)")]
    VertexOutOfRange {
        /// The polygon id
        id: String,
        /// The offending vertex index
        index: usize,
        /// Current point count of the polygon
        len: usize,
    },

    /// Operation would reduce the polygon below the 3-point minimum
    #[error("polygon '{id}' would drop below 3 points")]
    TooFewPoints {
        /// The polygon id
        id: String,
    },

    /// New coordinates are not finite numbers
    #[error("non-finite coordinates for polygon '{id}'")]
    NonFinitePoint {
        /// The polygon id
        id: String,
    },

    /// Splice anchors are identical or otherwise unusable
    #[error("invalid splice anchors for polygon '{id}'")]
    InvalidSpliceAnchors {
        /// The polygon id
        id: String,
    },
}

/// Errors from the polygon slice operation.
///
/// On any of these the source polygon is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SliceError {
    /// A cut point could not be snapped to the polygon boundary within tolerance
    #[error("cut point is not on the polygon boundary")]
    CutOffBoundary,

    /// The two cut points resolve to the same location
    #[error("cut points coincide")]
    CoincidentCuts,

    /// Both cut points landed on the same edge, which cannot split the ring
    #[error("both cut points lie on the same edge")]
    SameEdge,

    /// One of the resulting rings would have fewer than 3 points
    #[error("slice would produce a polygon with fewer than 3 points")]
    DegenerateChild,

    /// The source polygon itself is not sliceable
    #[error("source polygon has fewer than 3 points")]
    InvalidSource,
}
