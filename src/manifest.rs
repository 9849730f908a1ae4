//! Icon set manifest (`Contents.json`) model.
//!
//! An icon set is a directory holding one PNG per size/scale variant plus
//! a `Contents.json` describing them. Only the `images` list matters here;
//! every other key is carried through untouched so the rewritten manifest
//! stays loadable by the tools that produced it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BadgeError, Result};

/// The name of the manifest file inside an icon set.
pub const MANIFEST_FILENAME: &str = "Contents.json";

/// Ordered list of image variants belonging to one icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconSetManifest {
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,

    /// Keys other than `images` (usually `info`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One size/scale variant of the icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Nominal point size, e.g. `"60x60"` or `"83.5x83.5"`.
    #[serde(default)]
    pub size: String,

    /// Scale factor, e.g. `"2x"`.
    #[serde(default)]
    pub scale: String,

    /// Image file name relative to the icon set. Unassigned slots have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageDescriptor {
    pub fn new(size: &str, scale: &str, filename: &str) -> Self {
        Self {
            size: size.to_string(),
            scale: scale.to_string(),
            filename: Some(filename.to_string()),
            extra: Map::new(),
        }
    }

    /// Actual pixel dimensions: nominal size multiplied by scale.
    ///
    /// `index` is only used to name the descriptor in the error.
    pub fn pixel_size(&self, index: usize) -> Result<(f64, f64)> {
        let (w, h) = parse_size(&self.size).ok_or_else(|| self.parse_error(index, "size"))?;
        let scale = parse_scale(&self.scale).ok_or_else(|| self.parse_error(index, "scale"))?;
        Ok((w * scale, h * scale))
    }

    fn parse_error(&self, index: usize, field: &str) -> BadgeError {
        let value = match field {
            "size" => &self.size,
            _ => &self.scale,
        };
        BadgeError::ManifestParse {
            message: format!(
                "image #{} ({}) has malformed {} {:?}",
                index,
                self.filename.as_deref().unwrap_or("<no filename>"),
                field,
                value
            ),
            help: Some("Expected size like \"60x60\" and scale like \"2x\"".to_string()),
        }
    }
}

impl IconSetManifest {
    /// Load the manifest from an icon set directory.
    ///
    /// A missing `Contents.json` is a precondition failure.
    pub fn load(iconset: &Path) -> Result<Self> {
        let path = iconset.join(MANIFEST_FILENAME);
        if !path.is_file() {
            return Err(BadgeError::Precondition {
                message: format!("no {} found in {}", MANIFEST_FILENAME, iconset.display()),
                help: Some("Point iconbadge at an .appiconset directory".to_string()),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| BadgeError::Io {
            path: path.clone(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from a JSON string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| BadgeError::ManifestParse {
            message: format!("{} is not valid: {}", MANIFEST_FILENAME, e),
            help: Some("Check Contents.json syntax".to_string()),
        })
    }

    /// Serialize as pretty-printed JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self).map_err(|e| BadgeError::Io {
            path: MANIFEST_FILENAME.into(),
            message: format!("Failed to serialize manifest: {}", e),
        })?;
        json.push('\n');
        Ok(json)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Rewrite the filename of the descriptor at `index`.
    ///
    /// The descriptor list itself is never resized.
    pub fn set_filename(&mut self, index: usize, filename: String) {
        if let Some(descriptor) = self.images.get_mut(index) {
            descriptor.filename = Some(filename);
        }
    }
}

fn parse_size(size: &str) -> Option<(f64, f64)> {
    let (w, h) = size.split_once('x')?;
    Some((parse_number(w)?, parse_number(h)?))
}

fn parse_scale(scale: &str) -> Option<f64> {
    parse_number(scale.strip_suffix('x')?)
}

/// Unsigned decimal number: digits with at most one dot.
fn parse_number(s: &str) -> Option<f64> {
    let valid = !s.is_empty()
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().filter(|&c| c == '.').count() <= 1
        && s.chars().any(|c| c.is_ascii_digit());
    if !valid {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
  "images" : [
    { "size" : "20x20", "idiom" : "iphone", "filename" : "icon-20@2x.png", "scale" : "2x" },
    { "size" : "83.5x83.5", "idiom" : "ipad", "filename" : "icon-83.5@2x.png", "scale" : "2x" },
    { "size" : "1024x1024", "idiom" : "ios-marketing", "scale" : "1x" }
  ],
  "info" : { "version" : 1, "author" : "xcode" }
}"#;

    #[test]
    fn test_parse_sample_manifest() {
        let manifest = IconSetManifest::parse(SAMPLE).unwrap();

        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.images[0].size, "20x20");
        assert_eq!(manifest.images[0].filename.as_deref(), Some("icon-20@2x.png"));
        assert_eq!(manifest.images[2].filename, None);
        assert_eq!(manifest.images[1].extra["idiom"], "ipad");
        assert!(manifest.extra.contains_key("info"));
    }

    #[test]
    fn test_pixel_size() {
        let manifest = IconSetManifest::parse(SAMPLE).unwrap();

        assert_eq!(manifest.images[0].pixel_size(0).unwrap(), (40.0, 40.0));
        assert_eq!(manifest.images[1].pixel_size(1).unwrap(), (167.0, 167.0));
        assert_eq!(manifest.images[2].pixel_size(2).unwrap(), (1024.0, 1024.0));
    }

    #[test]
    fn test_pixel_size_rectangular() {
        let descriptor = ImageDescriptor::new("60x40", "3x", "wide.png");
        assert_eq!(descriptor.pixel_size(0).unwrap(), (180.0, 120.0));
    }

    #[test]
    fn test_malformed_size_names_descriptor() {
        let descriptor = ImageDescriptor::new("60by60", "2x", "icon.png");
        let err = descriptor.pixel_size(4).unwrap_err();

        assert!(matches!(err, BadgeError::ManifestParse { .. }));
        let message = err.to_string();
        assert!(message.contains("#4"));
        assert!(message.contains("icon.png"));
        assert!(message.contains("size"));
    }

    #[test]
    fn test_malformed_scale() {
        for scale in ["2", "x", "two x", "-2x", "1.5.1x", ""] {
            let descriptor = ImageDescriptor::new("60x60", scale, "icon.png");
            let err = descriptor.pixel_size(0).unwrap_err();
            assert!(err.to_string().contains("scale"), "scale {:?}", scale);
        }
    }

    #[test]
    fn test_missing_size_field_is_parse_error() {
        let manifest =
            IconSetManifest::parse(r#"{"images":[{"scale":"1x","filename":"a.png"}]}"#).unwrap();
        assert!(manifest.images[0].pixel_size(0).is_err());
    }

    #[test]
    fn test_invalid_json() {
        let err = IconSetManifest::parse("{ images: ").unwrap_err();
        assert!(matches!(err, BadgeError::ManifestParse { .. }));
    }

    #[test]
    fn test_load_missing_manifest_is_precondition() {
        let dir = tempdir().unwrap();
        let err = IconSetManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, BadgeError::Precondition { .. }));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILENAME), SAMPLE).unwrap();

        let manifest = IconSetManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.len(), 3);
    }

    #[test]
    fn test_set_filename_keeps_other_fields() {
        let mut manifest = IconSetManifest::parse(SAMPLE).unwrap();
        manifest.set_filename(0, "icon-20@2x-Beta.png".to_string());
        manifest.set_filename(99, "ignored.png".to_string());

        assert_eq!(manifest.len(), 3);
        assert_eq!(
            manifest.images[0].filename.as_deref(),
            Some("icon-20@2x-Beta.png")
        );
        assert_eq!(manifest.images[0].size, "20x20");
        assert_eq!(manifest.images[0].scale, "2x");
        assert_eq!(manifest.images[0].extra["idiom"], "iphone");
    }

    #[test]
    fn test_pretty_json_preserves_unknown_keys() {
        let manifest = IconSetManifest::parse(SAMPLE).unwrap();
        let json = manifest.to_pretty_json().unwrap();

        assert!(json.ends_with('\n'));
        let reparsed = IconSetManifest::parse(&json).unwrap();
        assert_eq!(reparsed, manifest);
        assert!(json.contains("\"author\": \"xcode\""));
    }
}
