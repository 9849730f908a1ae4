//! ImageMagick rasterizer.
//!
//! Each render request becomes one `convert` invocation:
//!
//! ```text
//! convert icon.png -strokewidth 1.2 -stroke #FFFFFF -fill #F5A623 \
//!     -draw "polygon -2.2,55.2 0,55.2 64.8,120 64.8,240 -2.2,240" \
//!     -stroke none -fill #FFFFFF -font Helvetica -pointsize 48 -annotate +12+105.6 β \
//!     out/icon-Beta.png
//! ```

use std::ffi::OsString;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{BadgeError, Result};
use crate::geometry::Point;

use super::request::{DrawOp, RenderRequest, StrokeStyle};
use super::Rasterizer;

/// The ImageMagick 6 entry point. ImageMagick 7 installs `magick`.
pub const DEFAULT_PROGRAM: &str = "convert";

/// Rasterizer backed by the ImageMagick command line.
#[derive(Debug, Clone)]
pub struct MagickRasterizer {
    program: OsString,
}

impl MagickRasterizer {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that the program can be spawned at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// The full argument list for a request, excluding the program name.
    pub fn args(request: &RenderRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![request.source.clone().into()];

        for op in &request.ops {
            match op {
                DrawOp::Stroke(StrokeStyle::None) => {
                    push(&mut args, ["-stroke", "none"]);
                }
                DrawOp::Stroke(StrokeStyle::Solid { width, color }) => {
                    push(
                        &mut args,
                        ["-strokewidth", coord(*width).as_str(), "-stroke", color.as_str()],
                    );
                }
                DrawOp::Fill(color) => {
                    push(&mut args, ["-fill", color.as_str()]);
                }
                DrawOp::Polygon(points) => {
                    let points: Vec<String> = points.iter().map(point).collect();
                    let draw = format!("polygon {}", points.join(" "));
                    push(&mut args, ["-draw", draw.as_str()]);
                }
                DrawOp::Rectangle {
                    top_left,
                    bottom_right,
                } => {
                    let draw = format!("rectangle {} {}", point(top_left), point(bottom_right));
                    push(&mut args, ["-draw", draw.as_str()]);
                }
                DrawOp::Composite {
                    file,
                    width,
                    x,
                    y,
                    gravity,
                } => {
                    args.push("(".into());
                    args.push(file.clone().into());
                    let resize = format!("{}x", coord(*width));
                    push(&mut args, ["-resize", resize.as_str(), ")"]);
                    let gravity = gravity.to_string();
                    let geometry = offset(*x, *y);
                    push(
                        &mut args,
                        [
                            "-gravity",
                            gravity.as_str(),
                            "-geometry",
                            geometry.as_str(),
                            "-composite",
                        ],
                    );
                }
                DrawOp::Text {
                    text,
                    font,
                    color,
                    point_size,
                    x,
                    y,
                } => {
                    let point_size = coord(*point_size);
                    let anchor = offset(*x, *y);
                    push(
                        &mut args,
                        [
                            "-stroke",
                            "none",
                            "-fill",
                            color.as_str(),
                            "-font",
                            font.as_str(),
                            "-pointsize",
                            point_size.as_str(),
                            "-annotate",
                            anchor.as_str(),
                            text.as_str(),
                        ],
                    );
                }
            }
        }

        args.push(request.destination.clone().into());
        args
    }
}

impl Default for MagickRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Rasterizer for MagickRasterizer {
    fn rasterize(&self, request: &RenderRequest) -> Result<()> {
        let args = Self::args(request);
        debug!(program = ?self.program, ?args, "invoking rasterizer");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| BadgeError::Render {
                filename: request.filename.clone(),
                reason: format!(
                    "failed to spawn {} (is ImageMagick installed?): {}",
                    self.program.to_string_lossy(),
                    e
                ),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BadgeError::Render {
                filename: request.filename.clone(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.program.to_string_lossy(),
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(())
    }
}

fn push<'a>(args: &mut Vec<OsString>, items: impl IntoIterator<Item = &'a str>) {
    args.extend(items.into_iter().map(OsString::from));
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn coord(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        s => s.to_string(),
    }
}

fn point(p: &Point) -> String {
    format!("{},{}", coord(p.x), coord(p.y))
}

/// ImageMagick offset geometry, e.g. `+12+105.6`.
fn offset(x: f64, y: f64) -> String {
    let signed = |v: f64| {
        let c = coord(v);
        if c.starts_with('-') {
            c
        } else {
            format!("+{}", c)
        }
    };
    format!("{}{}", signed(x), signed(y))
}
