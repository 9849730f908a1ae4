//! Pixel geometry for the mask and its overlay.
//!
//! All coordinates use the rasterizer's convention: origin at the top-left,
//! y growing downwards. Shapes deliberately overshoot the canvas on the
//! left and bottom so the fill reaches the corner regardless of rounding
//! and the outline is only visible along the inner edge.

use crate::config::{MaskConfig, MaskShape, Overlay};

/// A point in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The outline of the mask shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Polygon(Vec<Point>),
    Rectangle { top_left: Point, bottom_right: Point },
}

/// Where and how large the overlay is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayGeometry {
    /// Overlay image resized to `width` (aspect preserved by the rasterizer),
    /// offset from the bottom-left corner.
    Image { width: f64, x: f64, y: f64 },
    /// Symbol text with its baseline anchored at (`x`, `y`) from the top-left.
    Text { point_size: f64, x: f64, y: f64 },
}

/// Concrete geometry for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGeometry {
    pub width: f64,
    pub height: f64,
    pub mask_width: f64,
    pub mask_height: f64,
    /// `None` means no outline at all, never a zero-width one.
    pub stroke_width: Option<f64>,
    pub shape: ShapeGeometry,
    pub overlay: OverlayGeometry,
}

impl PixelGeometry {
    /// Compute the geometry for a `width` x `height` pixel image.
    pub fn compute(width: f64, height: f64, config: &MaskConfig) -> Self {
        let mask_width = width * config.x_size_ratio;
        let mask_height = height * config.y_size_ratio;
        let stroke_width = config.stroke_width(width, height);

        // Far enough off-canvas that the stroke on the outer edges is clipped.
        let overshoot = stroke_width.unwrap_or(0.0) + 1.0;

        let shape = config
            .shape
            .outline(width, height, mask_width, mask_height, overshoot);

        let overlay = match config.overlay {
            Overlay::File(_) => OverlayGeometry::Image {
                width: width * config.size_offset,
                x: width * config.x_offset,
                y: height * config.y_offset,
            },
            Overlay::Symbol { .. } => OverlayGeometry::Text {
                point_size: height * config.size_offset * 2.0,
                x: width * config.x_offset,
                y: height - height * config.y_offset,
            },
        };

        Self {
            width,
            height,
            mask_width,
            mask_height,
            stroke_width,
            shape,
            overlay,
        }
    }
}

impl MaskShape {
    /// Outline of this shape anchored at the bottom-left corner.
    fn outline(
        self,
        width: f64,
        height: f64,
        mask_width: f64,
        mask_height: f64,
        overshoot: f64,
    ) -> ShapeGeometry {
        let top = height - mask_height;
        match self {
            MaskShape::Triangle => ShapeGeometry::Polygon(vec![
                Point::new(-overshoot, top),
                Point::new(0.0, top),
                Point::new(mask_width, height),
                Point::new(mask_width, height * 2.0),
                Point::new(-overshoot, height * 2.0),
            ]),
            MaskShape::Square => ShapeGeometry::Rectangle {
                top_left: Point::new(-overshoot, top),
                bottom_right: Point::new(width - mask_width, height + overshoot),
            },
        }
    }
}
