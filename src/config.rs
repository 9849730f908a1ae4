//! Mask configuration (badge.yaml) parsing and validation.
//!
//! Callers supply [`MaskOverrides`] (from a config file, CLI flags, or code);
//! [`MaskConfig::build`] merges them onto the documented defaults and
//! validates the result once. The resulting [`MaskConfig`] is immutable and
//! shared read-only by every worker in a batch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BadgeError, Result};

/// Default config file name looked up next to the working directory.
pub const CONFIG_FILENAME: &str = "badge.yaml";

const DEFAULT_SYMBOL: &str = "β";
const DEFAULT_SYMBOL_COLOR: &str = "#FFFFFF";
const DEFAULT_FONT: &str = "Helvetica";

/// Built-in mask shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskShape {
    /// Right triangle in the bottom-left corner.
    #[default]
    Triangle,
    /// Rectangle in the bottom-left corner.
    Square,
}

impl MaskShape {
    pub fn name(self) -> &'static str {
        match self {
            MaskShape::Triangle => "triangle",
            MaskShape::Square => "square",
        }
    }
}

impl fmt::Display for MaskShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MaskShape {
    type Err = BadgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triangle" => Ok(MaskShape::Triangle),
            "square" => Ok(MaskShape::Square),
            other => Err(BadgeError::Configuration {
                message: format!("unknown mask shape '{}'", other),
                help: Some("Supported shapes: triangle, square".to_string()),
            }),
        }
    }
}

/// What gets drawn on top of the mask shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// An external image composited at the bottom-left.
    File(PathBuf),
    /// A text glyph drawn with the given font.
    Symbol {
        text: String,
        color: String,
        font: String,
    },
}

/// Validated, immutable mask configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskConfig {
    /// Fill colour of the mask shape, passed to the rasterizer verbatim.
    pub background_color: String,
    pub stroke_color: String,
    /// Stroke width as a fraction of the shorter image side. Zero means no stroke.
    pub stroke_width_offset: f64,
    /// Inserted into file and folder names: `icon.png` -> `icon-<suffix>.png`.
    pub suffix: String,
    pub overlay: Overlay,
    /// Mask width as a fraction of image width.
    pub x_size_ratio: f64,
    /// Mask height as a fraction of image height.
    pub y_size_ratio: f64,
    /// Overlay size as a fraction of the image.
    pub size_offset: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub shape: MaskShape,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            background_color: "#F5A623".to_string(),
            stroke_color: "#FFFFFF".to_string(),
            stroke_width_offset: 0.01,
            suffix: "Beta".to_string(),
            overlay: Overlay::Symbol {
                text: DEFAULT_SYMBOL.to_string(),
                color: DEFAULT_SYMBOL_COLOR.to_string(),
                font: DEFAULT_FONT.to_string(),
            },
            x_size_ratio: 0.54,
            y_size_ratio: 0.54,
            size_offset: 0.2,
            x_offset: 0.1,
            y_offset: 0.12,
            shape: MaskShape::Triangle,
        }
    }
}

impl MaskConfig {
    /// Merge overrides onto the defaults and validate.
    pub fn build(overrides: &MaskOverrides) -> Result<Self> {
        let defaults = MaskConfig::default();

        let shape = match &overrides.shape {
            Some(shape) => shape.parse()?,
            None => defaults.shape,
        };

        let overlay = match &overrides.file {
            Some(file) => Overlay::File(file.clone()),
            None => Overlay::Symbol {
                text: overrides.symbol.clone().unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
                color: overrides
                    .symbol_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SYMBOL_COLOR.to_string()),
                font: overrides.font.clone().unwrap_or_else(|| DEFAULT_FONT.to_string()),
            },
        };

        let config = Self {
            background_color: overrides
                .background_color
                .clone()
                .unwrap_or(defaults.background_color),
            stroke_color: overrides.stroke_color.clone().unwrap_or(defaults.stroke_color),
            stroke_width_offset: overrides
                .stroke_width_offset
                .unwrap_or(defaults.stroke_width_offset),
            suffix: overrides.suffix.clone().unwrap_or(defaults.suffix),
            overlay,
            x_size_ratio: overrides.x_size_ratio.unwrap_or(defaults.x_size_ratio),
            y_size_ratio: overrides.y_size_ratio.unwrap_or(defaults.y_size_ratio),
            size_offset: overrides.size_offset.unwrap_or(defaults.size_offset),
            x_offset: overrides.x_offset.unwrap_or(defaults.x_offset),
            y_offset: overrides.y_offset.unwrap_or(defaults.y_offset),
            shape,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.stroke_width_offset) {
            return Err(BadgeError::Configuration {
                message: format!(
                    "stroke_width_offset must be between 0 and 1, got {}",
                    self.stroke_width_offset
                ),
                help: Some("Use 0 to draw the mask without an outline".to_string()),
            });
        }

        let ratios = [
            ("x_size_ratio", self.x_size_ratio),
            ("y_size_ratio", self.y_size_ratio),
            ("size_offset", self.size_offset),
            ("x_offset", self.x_offset),
            ("y_offset", self.y_offset),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value < 0.0 {
                return Err(BadgeError::configuration(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.suffix.is_empty() || self.suffix.contains(['/', '\\']) {
            return Err(BadgeError::Configuration {
                message: format!("invalid suffix {:?}", self.suffix),
                help: Some("The suffix becomes part of file names; use e.g. \"Beta\"".to_string()),
            });
        }

        for (name, value) in [
            ("background_color", &self.background_color),
            ("stroke_color", &self.stroke_color),
        ] {
            if value.trim().is_empty() {
                return Err(BadgeError::configuration(format!("{} must not be empty", name)));
            }
        }

        match &self.overlay {
            Overlay::File(path) if !path.is_file() => Err(BadgeError::Configuration {
                message: format!("overlay file {} does not exist", path.display()),
                help: None,
            }),
            Overlay::Symbol { text, .. } if text.is_empty() => Err(BadgeError::Configuration {
                message: "symbol must not be empty".to_string(),
                help: Some("Set a symbol or point `file` at an overlay image".to_string()),
            }),
            _ => Ok(()),
        }
    }

    /// Stroke width in pixels for an image, or `None` when the outline is disabled.
    pub fn stroke_width(&self, width: f64, height: f64) -> Option<f64> {
        if self.stroke_width_offset == 0.0 {
            None
        } else {
            Some(self.stroke_width_offset * width.min(height))
        }
    }
}

/// Caller-supplied settings; every field is optional and falls back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_size_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_size_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}

impl MaskOverrides {
    /// Load overrides from a config file. `.json` files are read as JSON,
    /// everything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BadgeError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        let mut overrides = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| BadgeError::Configuration {
                message: format!("Invalid config {}: {}", path.display(), e),
                help: None,
            })?
        } else {
            Self::parse(&content)?
        };

        // Overlay paths are relative to the config file, not the working directory.
        if let (Some(file), Some(dir)) = (&overrides.file, path.parent()) {
            if file.is_relative() {
                overrides.file = Some(dir.join(file));
            }
        }

        Ok(overrides)
    }

    /// Parse overrides from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| BadgeError::Configuration {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    ///
    /// The overlay is a single choice: symbol settings in `other` without
    /// a `file` replace a file inherited from `self`.
    pub fn merge(self, other: MaskOverrides) -> MaskOverrides {
        let picks_symbol = other.file.is_none()
            && (other.symbol.is_some() || other.symbol_color.is_some() || other.font.is_some());
        let inherited_file = if picks_symbol { None } else { self.file };

        MaskOverrides {
            background_color: other.background_color.or(self.background_color),
            stroke_color: other.stroke_color.or(self.stroke_color),
            stroke_width_offset: other.stroke_width_offset.or(self.stroke_width_offset),
            suffix: other.suffix.or(self.suffix),
            file: other.file.or(inherited_file),
            symbol: other.symbol.or(self.symbol),
            symbol_color: other.symbol_color.or(self.symbol_color),
            font: other.font.or(self.font),
            x_size_ratio: other.x_size_ratio.or(self.x_size_ratio),
            y_size_ratio: other.y_size_ratio.or(self.y_size_ratio),
            size_offset: other.size_offset.or(self.size_offset),
            x_offset: other.x_offset.or(self.x_offset),
            y_offset: other.y_offset.or(self.y_offset),
            shape: other.shape.or(self.shape),
        }
    }

    /// Render as YAML (used by `iconbadge init`).
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| BadgeError::configuration(e.to_string()))
    }
}

impl From<&MaskConfig> for MaskOverrides {
    fn from(config: &MaskConfig) -> Self {
        let (file, symbol, symbol_color, font) = match &config.overlay {
            Overlay::File(path) => (Some(path.clone()), None, None, None),
            Overlay::Symbol { text, color, font } => {
                (None, Some(text.clone()), Some(color.clone()), Some(font.clone()))
            }
        };

        Self {
            background_color: Some(config.background_color.clone()),
            stroke_color: Some(config.stroke_color.clone()),
            stroke_width_offset: Some(config.stroke_width_offset),
            suffix: Some(config.suffix.clone()),
            file,
            symbol,
            symbol_color,
            font,
            x_size_ratio: Some(config.x_size_ratio),
            y_size_ratio: Some(config.y_size_ratio),
            size_offset: Some(config.size_offset),
            x_offset: Some(config.x_offset),
            y_offset: Some(config.y_offset),
            shape: Some(config.shape.to_string()),
        }
    }
}
