//! Render request construction.
//!
//! Translates a [`PixelGeometry`] and [`MaskConfig`] into an ordered list of
//! drawing operations. Nothing here touches the filesystem; the request is
//! executed later by a [`Rasterizer`](super::Rasterizer).

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{MaskConfig, Overlay};
use crate::error::{BadgeError, Result};
use crate::geometry::{OverlayGeometry, PixelGeometry, Point, ShapeGeometry};

/// Anchor used when compositing an overlay image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    SouthWest,
}

impl fmt::Display for Gravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gravity::SouthWest => f.write_str("SouthWest"),
        }
    }
}

/// Outline settings for the mask shape.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeStyle {
    /// Explicitly disable the outline.
    None,
    Solid { width: f64, color: String },
}

/// A single drawing step, executed in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Stroke(StrokeStyle),
    Fill(String),
    Polygon(Vec<Point>),
    Rectangle {
        top_left: Point,
        bottom_right: Point,
    },
    Composite {
        file: PathBuf,
        width: f64,
        x: f64,
        y: f64,
        gravity: Gravity,
    },
    Text {
        text: String,
        font: String,
        color: String,
        point_size: f64,
        x: f64,
        y: f64,
    },
}

/// Everything the rasterizer needs to produce one badged image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// File name of `destination`, written back into the manifest.
    pub filename: String,
    pub ops: Vec<DrawOp>,
}

impl RenderRequest {
    /// Build the request for `source`, writing into `output_dir`.
    pub fn build(
        source: &Path,
        output_dir: &Path,
        geometry: &PixelGeometry,
        config: &MaskConfig,
    ) -> Result<Self> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BadgeError::Render {
                filename: source.display().to_string(),
                reason: "source path has no usable file name".to_string(),
            })?;
        let filename = suffixed_name(name, &config.suffix);

        let mut ops = Vec::with_capacity(4);

        ops.push(DrawOp::Stroke(match geometry.stroke_width {
            Some(width) => StrokeStyle::Solid {
                width,
                color: config.stroke_color.clone(),
            },
            None => StrokeStyle::None,
        }));
        ops.push(DrawOp::Fill(config.background_color.clone()));

        ops.push(match &geometry.shape {
            ShapeGeometry::Polygon(points) => DrawOp::Polygon(points.clone()),
            ShapeGeometry::Rectangle {
                top_left,
                bottom_right,
            } => DrawOp::Rectangle {
                top_left: *top_left,
                bottom_right: *bottom_right,
            },
        });

        match (&config.overlay, geometry.overlay) {
            (Overlay::File(file), OverlayGeometry::Image { width, x, y }) => {
                ops.push(DrawOp::Composite {
                    file: file.clone(),
                    width,
                    x,
                    y,
                    gravity: Gravity::SouthWest,
                });
            }
            (Overlay::Symbol { text, color, font }, OverlayGeometry::Text { point_size, x, y }) => {
                ops.push(DrawOp::Text {
                    text: text.clone(),
                    font: font.clone(),
                    color: color.clone(),
                    point_size,
                    x,
                    y,
                });
            }
            _ => {
                return Err(BadgeError::configuration(
                    "overlay geometry does not match the configured overlay",
                ));
            }
        }

        Ok(Self {
            source: source.to_path_buf(),
            destination: output_dir.join(&filename),
            filename,
            ops,
        })
    }
}

/// Insert `-<suffix>` before the extension: `icon.png` -> `icon-Beta.png`.
///
/// Names without an extension get the suffix appended.
pub fn suffixed_name(name: &str, suffix: &str) -> String {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, suffix, ext),
        None => format!("{}-{}", stem, suffix),
    }
}
