//! Native save dialog, run as a helper process.

use crate::error::{PlotboxError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A zenity-compatible file-save dialog.
#[derive(Debug, Clone)]
pub struct SaveDialog {
    program: String,
}

impl SaveDialog {
    /// Dialog run as `program --file-selection --save ...`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to the helper.
    pub fn args(default_path: &Path) -> Vec<String> {
        vec![
            "--file-selection".to_string(),
            "--save".to_string(),
            "--confirm-overwrite".to_string(),
            format!("--filename={}", default_path.display()),
            "--file-filter=PNG Images | *.png".to_string(),
            "--file-filter=All Files | *".to_string(),
        ]
    }

    /// Ask the user for a destination. Blocks until the dialog closes.
    ///
    /// `Ok(None)` means the user cancelled.
    pub fn pick(&self, default_path: &Path) -> Result<Option<PathBuf>> {
        let output = Command::new(&self.program)
            .args(Self::args(default_path))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PlotboxError::Dialog(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            tracing::debug!("Save dialog closed with {}", output.status);
            return Ok(None);
        }
        Ok(parse_selection(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Turn the helper's stdout into a destination path.
fn parse_selection(stdout: &str) -> Option<PathBuf> {
    let selected = stdout.trim();
    if selected.is_empty() {
        return None;
    }
    Some(with_png_suffix(PathBuf::from(selected)))
}

/// Append `.png` unless the path already ends with it (any case).
pub fn with_png_suffix(path: PathBuf) -> PathBuf {
    let has_png = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if has_png {
        return path;
    }
    let mut raw = path.into_os_string();
    raw.push(".png");
    PathBuf::from(raw)
}
