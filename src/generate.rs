//! End-to-end generation of a badged icon set.

use std::path::PathBuf;

use crate::batch::{Batch, Concurrency, Progress};
use crate::config::MaskConfig;
use crate::error::Result;
use crate::manifest::IconSetManifest;
use crate::render::Rasterizer;
use crate::writer::{default_output_dir, OutputWriter};

/// Inputs for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// The source `.appiconset` directory.
    pub iconset: PathBuf,
    /// Output directory; defaults to a sibling named after the suffix.
    pub output: Option<PathBuf>,
    pub config: MaskConfig,
    pub concurrency: Concurrency,
}

impl GenerateOptions {
    pub fn new(iconset: impl Into<PathBuf>, config: MaskConfig) -> Self {
        Self {
            iconset: iconset.into(),
            output: None,
            config,
            concurrency: Concurrency::Auto,
        }
    }

    /// The directory this run will write to.
    pub fn output_dir(&self) -> Result<PathBuf> {
        match &self.output {
            Some(dir) => Ok(dir.clone()),
            None => default_output_dir(&self.iconset, &self.config.suffix),
        }
    }
}

/// Render every image of the icon set and write the updated manifest.
///
/// Returns the output directory. The manifest is only written when every
/// image rendered successfully.
pub fn generate<R, F>(options: &GenerateOptions, rasterizer: &R, on_progress: F) -> Result<PathBuf>
where
    R: Rasterizer + ?Sized,
    F: FnMut(Progress),
{
    let manifest = IconSetManifest::load(&options.iconset)?;
    let writer = OutputWriter::create(options.output_dir()?)?;

    let updated = Batch::new(&options.iconset, writer.dir(), &options.config)
        .with_concurrency(options.concurrency)
        .run(manifest, rasterizer, on_progress)?;

    writer.write_manifest(&updated)?;
    Ok(writer.dir().to_path_buf())
}

