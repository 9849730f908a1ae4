//! Init command implementation.
//!
//! Writes a `badge.yaml` holding the default mask settings so they can be
//! edited instead of passed as flags.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::config::{MaskConfig, MaskOverrides, CONFIG_FILENAME};
use crate::error::{BadgeError, Result};
use crate::output::{display_path, Printer};

/// Write a badge.yaml with the default mask settings
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write badge.yaml into (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing badge.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(BadgeError::Precondition {
            message: format!("{} already exists", CONFIG_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    let yaml = MaskOverrides::from(&MaskConfig::default()).to_yaml()?;
    fs::write(&config_path, yaml).map_err(|e| BadgeError::Io {
        path: config_path.clone(),
        message: format!("Failed to write config: {}", e),
    })?;

    printer.success("Created", &display_path(&config_path));
    Ok(())
}
