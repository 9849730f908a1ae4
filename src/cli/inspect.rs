//! Inspect command implementation.
//!
//! Dry run: prints each image's pixel size and mask geometry, and
//! optionally the rasterizer command lines, without rendering anything.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::MaskConfig;
use crate::error::Result;
use crate::geometry::PixelGeometry;
use crate::manifest::IconSetManifest;
use crate::output::{plural, Printer};
use crate::render::{MagickRasterizer, RenderRequest, DEFAULT_PROGRAM};
use crate::writer::default_output_dir;

use super::MaskArgs;

/// Show the computed geometry for each image without rendering
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// The .appiconset directory containing Contents.json
    #[arg(required = true)]
    pub iconset: PathBuf,

    /// Print the ImageMagick command for each image to stdout
    #[arg(long)]
    pub commands: bool,

    /// ImageMagick program shown in the printed commands
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    pub magick: String,

    #[command(flatten)]
    pub mask: MaskArgs,
}

pub fn run(args: InspectArgs, printer: &Printer) -> Result<()> {
    let config = MaskConfig::build(&args.mask.overrides()?)?;
    let manifest = IconSetManifest::load(&args.iconset)?;
    let output_dir = default_output_dir(&args.iconset, &config.suffix)?;

    let lines = describe(&manifest, &config, &args.iconset, &output_dir, &args.magick)?;
    for line in &lines {
        printer.info(&line.filename, &line.summary);
        if args.commands {
            println!("{}", line.command);
        }
    }

    printer.success(
        "Inspected",
        &format!("{} ({} shape)", plural(lines.len(), "image", "images"), config.shape),
    );
    Ok(())
}

struct Line {
    filename: String,
    summary: String,
    command: String,
}

fn describe(
    manifest: &IconSetManifest,
    config: &MaskConfig,
    source_dir: &Path,
    output_dir: &Path,
    program: &str,
) -> Result<Vec<Line>> {
    let mut lines = Vec::new();

    for (index, descriptor) in manifest.images.iter().enumerate() {
        let Some(filename) = descriptor.filename.as_deref() else {
            continue;
        };

        let (width, height) = descriptor.pixel_size(index)?;
        let geometry = PixelGeometry::compute(width, height, config);
        let request =
            RenderRequest::build(&source_dir.join(filename), output_dir, &geometry, config)?;

        let stroke = match geometry.stroke_width {
            Some(w) => format!("stroke {:.2}", w),
            None => "no stroke".to_string(),
        };
        let summary = format!(
            "{}x{} mask {:.1}x{:.1} {} -> {}",
            width, height, geometry.mask_width, geometry.mask_height, stroke, request.filename
        );

        let mut command = vec![shell_quote(program)];
        command.extend(
            MagickRasterizer::args(&request)
                .iter()
                .map(|a| shell_quote(&a.to_string_lossy())),
        );

        lines.push(Line {
            filename: filename.to_string(),
            summary,
            command: command.join(" "),
        });
    }

    Ok(lines)
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.,/+@".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_skips_unassigned_slots() {
        let manifest = IconSetManifest::parse(
            r#"{"images":[
                {"size":"60x60","scale":"2x","filename":"icon.png"},
                {"size":"1024x1024","scale":"1x"}
            ]}"#,
        )
        .unwrap();

        let lines = describe(
            &manifest,
            &MaskConfig::default(),
            Path::new("AppIcon.appiconset"),
            Path::new("AppIcon-Beta.appiconset"),
            DEFAULT_PROGRAM,
        )
        .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].filename, "icon.png");
        assert_eq!(
            lines[0].summary,
            "120x120 mask 64.8x64.8 stroke 1.20 -> icon-Beta.png"
        );
        assert!(lines[0].command.starts_with("convert AppIcon.appiconset/icon.png "));
        assert!(lines[0].command.ends_with(" AppIcon-Beta.appiconset/icon-Beta.png"));
        assert!(lines[0].command.contains("'#F5A623'"));
    }

    #[test]
    fn test_describe_rejects_malformed_descriptor() {
        let manifest =
            IconSetManifest::parse(r#"{"images":[{"size":"big","scale":"2x","filename":"a.png"}]}"#)
                .unwrap();
        let result = describe(
            &manifest,
            &MaskConfig::default(),
            Path::new("in"),
            Path::new("out"),
            DEFAULT_PROGRAM,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_commands_use_chosen_program() {
        let manifest =
            IconSetManifest::parse(r#"{"images":[{"size":"20x20","scale":"2x","filename":"a.png"}]}"#)
                .unwrap();

        let lines = describe(
            &manifest,
            &MaskConfig::default(),
            Path::new("in"),
            Path::new("out"),
            "magick",
        )
        .unwrap();

        assert!(lines[0].command.starts_with("magick in/a.png "));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("-fill"), "-fill");
        assert_eq!(shell_quote("polygon 0,1 2,3"), "'polygon 0,1 2,3'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
