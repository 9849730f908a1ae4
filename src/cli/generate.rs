//! Generate command implementation.
//!
//! Renders the badge onto every image of an icon set and writes the
//! badged copy next to it (or to `--output`).

use std::path::PathBuf;

use clap::Args;

use crate::batch::{Concurrency, Progress};
use crate::config::MaskConfig;
use crate::error::{BadgeError, Result};
use crate::generate::{generate, GenerateOptions};
use crate::output::{display_path, plural, Printer};
use crate::render::{MagickRasterizer, DEFAULT_PROGRAM};

use super::MaskArgs;

/// Generate a badged copy of an icon set
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// The .appiconset directory containing Contents.json
    #[arg(required = true)]
    pub iconset: PathBuf,

    /// Output directory (default: <name>-<suffix>.appiconset next to the input)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Parallel render jobs (default: number of CPUs, 0 = sequential)
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// ImageMagick program to invoke
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    pub magick: String,

    #[command(flatten)]
    pub mask: MaskArgs,
}

pub fn run(args: GenerateArgs, printer: &Printer) -> Result<()> {
    let config = MaskConfig::build(&args.mask.overrides()?)?;

    let rasterizer = MagickRasterizer::new(&args.magick);
    if !rasterizer.is_available() {
        return Err(BadgeError::Precondition {
            message: format!("'{}' could not be run", args.magick),
            help: Some("Install ImageMagick or point --magick at its binary".to_string()),
        });
    }

    let options = GenerateOptions {
        iconset: args.iconset,
        output: args.output,
        config,
        concurrency: Concurrency::from(args.jobs),
    };

    printer.status("Badging", &display_path(&options.iconset));

    let mut done = 0;
    let output = generate(&options, &rasterizer, |progress: Progress| {
        match progress.current {
            None => printer.info("Found", &plural(progress.total, "image", "images")),
            Some(index) => {
                done += 1;
                let message = progress_message(printer, index, done, progress.total);
                printer.status("Processed", &message);
            }
        }
    })?;

    printer.success(
        "Finished",
        &format!(
            "{} ({})",
            display_path(&output),
            plural(done, "image", "images")
        ),
    );
    println!("{}", output.display());

    Ok(())
}

/// Progress is reported when an image finishes, whether or not it rendered;
/// failures are listed once the batch returns.
fn progress_message(printer: &Printer, index: usize, done: usize, total: usize) -> String {
    format!("image #{} {}", index, printer.dim(&format!("[{}/{}]", done, total)))
}
