use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for iconbadge operations
#[derive(Error, Diagnostic, Debug)]
pub enum BadgeError {
    #[error("IO error: {0}")]
    #[diagnostic(code(iconbadge::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(iconbadge::io))]
    Io { path: PathBuf, message: String },

    #[error("Precondition failed: {message}")]
    #[diagnostic(code(iconbadge::precondition))]
    Precondition {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid manifest: {message}")]
    #[diagnostic(code(iconbadge::manifest))]
    ManifestParse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(iconbadge::config))]
    Configuration {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Render failed for {filename}: {reason}")]
    #[diagnostic(code(iconbadge::render))]
    Render { filename: String, reason: String },

    #[error("{} image(s) failed to render", failures.len())]
    #[diagnostic(
        code(iconbadge::batch),
        help("check that the rasterizer is installed and the listed source images exist")
    )]
    BatchFailed {
        #[related]
        failures: Vec<RenderFailure>,
    },
}

impl BadgeError {
    pub fn configuration(message: impl Into<String>) -> Self {
        BadgeError::Configuration {
            message: message.into(),
            help: None,
        }
    }

    /// Fatal errors stop the batch from dispatching any further work.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BadgeError::Precondition { .. }
                | BadgeError::ManifestParse { .. }
                | BadgeError::Configuration { .. }
        )
    }
}

/// A single image that failed to render, tagged with its manifest position.
#[derive(Debug, Error, Diagnostic)]
#[error("image #{index} ({filename}): {reason}")]
#[diagnostic(code(iconbadge::render))]
pub struct RenderFailure {
    pub index: usize,
    pub filename: String,
    pub reason: String,
}

pub type Result<T> = std::result::Result<T, BadgeError>;
