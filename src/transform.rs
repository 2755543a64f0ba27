//! Screen/image coordinate transform and zoom-to-cursor mathematics.
//!
//! The transform maps image-space coordinates to screen space via
//! `screen = image * zoom + translate`. Both directions are pure and
//! mutually inverse to floating-point precision. Zooming anchors on the
//! cursor: the image point under the pointer stays fixed across the change.

use crate::constants::{ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use crate::model::Point;

/// Direction of a wheel zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Zoom factor, always positive.
    pub zoom: f64,
    /// Screen-space translation, X.
    pub translate_x: f64,
    /// Screen-space translation, Y.
    pub translate_y: f64,
}

impl Transform {
    /// Create a new transform with the given zoom and translation.
    pub fn new(zoom: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            zoom,
            translate_x,
            translate_y,
        }
    }

    /// Create an identity transform (zoom=1, no translation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Convert a screen-space point to image space.
    pub fn to_image(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate_x) / self.zoom,
            (screen.y - self.translate_y) / self.zoom,
        )
    }

    /// Convert an image-space point to screen space.
    pub fn to_screen(&self, image: Point) -> Point {
        Point::new(
            image.x * self.zoom + self.translate_x,
            image.y * self.zoom + self.translate_y,
        )
    }

    /// Zoom to a new level while keeping the image point under `cursor`
    /// (screen space) fixed.
    ///
    /// The translation is recomputed so that the pre-zoom image coordinate
    /// under the pointer equals the post-zoom one.
    pub fn zoom_at(&self, cursor: Point, new_zoom: f64) -> Transform {
        let anchor = self.to_image(cursor);
        Transform {
            zoom: new_zoom,
            translate_x: cursor.x - anchor.x * new_zoom,
            translate_y: cursor.y - anchor.y * new_zoom,
        }
    }

    /// Apply one wheel notch of zoom at the cursor, clamped to
    /// `[zoom_min, zoom_max]`.
    pub fn zoom_step(
        &self,
        cursor: Point,
        direction: ZoomDirection,
        zoom_min: f64,
        zoom_max: f64,
    ) -> Transform {
        let factor = match direction {
            ZoomDirection::In => ZOOM_IN_FACTOR,
            ZoomDirection::Out => ZOOM_OUT_FACTOR,
        };
        let new_zoom = (self.zoom * factor).clamp(zoom_min, zoom_max);
        self.zoom_at(cursor, new_zoom)
    }

    /// Apply a pan delta (screen space) to the transform.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Transform {
        Transform {
            zoom: self.zoom,
            translate_x: self.translate_x + dx,
            translate_y: self.translate_y + dy,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
