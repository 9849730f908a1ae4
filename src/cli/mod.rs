pub mod completions;
pub mod generate;
pub mod init;
pub mod inspect;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{MaskOverrides, CONFIG_FILENAME};
use crate::error::Result;

/// iconbadge - Stamp a badge onto every image of an app icon set
#[derive(Parser, Debug)]
#[command(name = "iconbadge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a badged copy of an icon set
    Generate(generate::GenerateArgs),

    /// Show the computed geometry for each image without rendering
    Inspect(inspect::InspectArgs),

    /// Write a badge.yaml with the default mask settings
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Mask settings shared by `generate` and `inspect`.
///
/// Flags override values from the config file, which override the defaults.
#[derive(Args, Debug, Default)]
pub struct MaskArgs {
    /// Config file (default: ./badge.yaml when present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Suffix for file and folder names
    #[arg(long)]
    pub suffix: Option<String>,

    /// Mask shape: triangle or square
    #[arg(long)]
    pub shape: Option<String>,

    /// Fill colour of the mask
    #[arg(long)]
    pub background_color: Option<String>,

    /// Outline colour of the mask
    #[arg(long)]
    pub stroke_color: Option<String>,

    /// Outline width as a fraction of the shorter side (0 disables the outline)
    #[arg(long)]
    pub stroke_width_offset: Option<f64>,

    /// Overlay image composited instead of the symbol
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Symbol text drawn on the mask
    #[arg(long)]
    pub symbol: Option<String>,

    /// Colour of the symbol text
    #[arg(long)]
    pub symbol_color: Option<String>,

    /// Font used for the symbol
    #[arg(long)]
    pub font: Option<String>,

    /// Mask width as a fraction of image width
    #[arg(long)]
    pub x_size_ratio: Option<f64>,

    /// Mask height as a fraction of image height
    #[arg(long)]
    pub y_size_ratio: Option<f64>,

    /// Overlay size as a fraction of the image
    #[arg(long)]
    pub size_offset: Option<f64>,

    /// Horizontal overlay offset as a fraction of image width
    #[arg(long)]
    pub x_offset: Option<f64>,

    /// Vertical overlay offset as a fraction of image height
    #[arg(long)]
    pub y_offset: Option<f64>,
}

impl MaskArgs {
    /// Resolve config file and flags into a single set of overrides.
    pub fn overrides(&self) -> Result<MaskOverrides> {
        let from_file = match &self.config {
            Some(path) => MaskOverrides::load(path)?,
            None => {
                let default_path = PathBuf::from(CONFIG_FILENAME);
                if default_path.is_file() {
                    MaskOverrides::load(&default_path)?
                } else {
                    MaskOverrides::default()
                }
            }
        };

        Ok(from_file.merge(self.flag_overrides()))
    }

    fn flag_overrides(&self) -> MaskOverrides {
        MaskOverrides {
            background_color: self.background_color.clone(),
            stroke_color: self.stroke_color.clone(),
            stroke_width_offset: self.stroke_width_offset,
            suffix: self.suffix.clone(),
            file: self.file.clone(),
            symbol: self.symbol.clone(),
            symbol_color: self.symbol_color.clone(),
            font: self.font.clone(),
            x_size_ratio: self.x_size_ratio,
            y_size_ratio: self.y_size_ratio,
            size_offset: self.size_offset,
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            shape: self.shape.clone(),
        }
    }
}
