//! Error types for PlotBox.
//!
//! This module provides a unified error handling approach using `thiserror`.
//! Every variant formats as a single line suitable for the status bar.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for PlotBox operations.
pub type Result<T> = std::result::Result<T, PlotboxError>;

/// Errors that can occur in PlotBox.
#[derive(Debug, Error)]
pub enum PlotboxError {
    /// The renderer executable could not be found on `PATH`.
    #[error("{renderer} not found. Please install it")]
    RendererMissing { renderer: String },

    /// The renderer could not be spawned.
    #[error("Failed to run {renderer}. Is it installed?")]
    Launch {
        renderer: String,
        #[source]
        source: std::io::Error,
    },

    /// The renderer exited with a non-zero status.
    #[error("Gnuplot failed. Check your function syntax.")]
    RenderFailed { code: Option<i32>, stderr: String },

    /// The expected artifact is not on disk.
    #[error("Graph not generated: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    /// The destination picker failed to run.
    #[error("Error opening dialog: {0}")]
    Dialog(String),

    /// Copying the artifact to its destination failed.
    #[error("Error saving {}: {source}", path.display())]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to access clipboard.
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    /// The artifact could not be decoded as an image.
    #[error("Image error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlotboxError {
    /// Create a Launch error.
    pub fn launch(renderer: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            renderer: renderer.into(),
            source,
        }
    }

    /// Create an ArtifactMissing error.
    pub fn artifact_missing(path: impl Into<PathBuf>) -> Self {
        Self::ArtifactMissing { path: path.into() }
    }

    /// Create an ExportWrite error.
    pub fn export_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ExportWrite {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for PlotboxError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_fit_on_one_line() {
        let errors = [
            PlotboxError::RendererMissing {
                renderer: "gnuplot".into(),
            },
            PlotboxError::RenderFailed {
                code: Some(1),
                stderr: "line 7: undefined variable: foo\n".into(),
            },
            PlotboxError::artifact_missing("/tmp/out.png"),
            PlotboxError::Dialog("no display".into()),
        ];
        for err in errors {
            assert!(!err.to_string().contains('\n'), "{err}");
        }
    }

    #[test]
    fn render_failure_blames_the_expression() {
        let err = PlotboxError::RenderFailed {
            code: Some(1),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Gnuplot failed. Check your function syntax.");
    }
}
