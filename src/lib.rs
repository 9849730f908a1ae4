//! iconbadge - App icon badge generator
//!
//! Takes an existing multi-resolution icon set (an `.appiconset` directory
//! with a `Contents.json` manifest), draws a mask shape plus a symbol or
//! overlay image onto every variant via ImageMagick, and writes a badged
//! copy of the set with an updated manifest.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod geometry;
pub mod manifest;
pub mod output;
pub mod render;
pub mod writer;

pub use batch::{Batch, Concurrency, Progress};
pub use config::{MaskConfig, MaskOverrides, MaskShape, Overlay};
pub use error::{BadgeError, RenderFailure, Result};
pub use generate::{generate, GenerateOptions};
pub use geometry::{OverlayGeometry, PixelGeometry, Point, ShapeGeometry};
pub use manifest::{IconSetManifest, ImageDescriptor, MANIFEST_FILENAME};
pub use render::{DrawOp, MagickRasterizer, Rasterizer, RenderRequest, StrokeStyle};
pub use writer::OutputWriter;
