//! Rendering module for iconbadge.
//!
//! Render requests are built from pure geometry and handed to a
//! [`Rasterizer`], the only place that touches pixels.

mod magick;
mod request;

pub use magick::{MagickRasterizer, DEFAULT_PROGRAM};
pub use request::{suffixed_name, DrawOp, Gravity, RenderRequest, StrokeStyle};

use crate::error::Result;

/// Executes one render request, producing `request.destination`.
///
/// Implementations are shared across worker threads.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, request: &RenderRequest) -> Result<()>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    fn rasterize(&self, request: &RenderRequest) -> Result<()> {
        (**self).rasterize(request)
    }
}
