//! Output icon set assembly.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{BadgeError, Result};
use crate::manifest::{IconSetManifest, MANIFEST_FILENAME};
use crate::render::suffixed_name;

/// Default output location: a sibling of the input with the suffix inserted,
/// e.g. `AppIcon.appiconset` -> `AppIcon-Beta.appiconset`.
pub fn default_output_dir(iconset: &Path, suffix: &str) -> Result<PathBuf> {
    let name = iconset
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| BadgeError::Precondition {
            message: format!("cannot derive an output name from {}", iconset.display()),
            help: Some("Pass --output explicitly".to_string()),
        })?;

    Ok(iconset.with_file_name(suffixed_name(name, suffix)))
}

/// Owns the output directory for one run.
#[derive(Debug)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// Create the output directory. An existing directory is reused.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| BadgeError::Io {
            path: dir.clone(),
            message: format!("Failed to create output directory: {}", e),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Atomically replace `<dir>/Contents.json` with the pretty-printed manifest.
    pub fn write_manifest(&self, manifest: &IconSetManifest) -> Result<PathBuf> {
        let path = self.dir.join(MANIFEST_FILENAME);
        let json = manifest.to_pretty_json()?;

        let io_err = |e: std::io::Error| BadgeError::Io {
            path: path.clone(),
            message: format!("Failed to write manifest: {}", e),
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;

        Ok(path)
    }
}
