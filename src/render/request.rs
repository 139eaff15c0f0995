//! Scratch space and per-render file paths.

use crate::error::Result;
use crate::script::Mode;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Private scratch directory holding scripts and rendered images.
///
/// The directory and everything in it is removed when the workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    next_id: u64,
}

impl Workspace {
    /// Create a fresh scratch directory under the system temp dir.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("plotbox-").tempdir()?;
        tracing::debug!("Scratch directory: {}", dir.path().display());
        Ok(Self { dir, next_id: 1 })
    }

    /// Create the scratch directory inside `parent`.
    pub fn new_in(parent: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("plotbox-")
            .tempdir_in(parent)?;
        Ok(Self { dir, next_id: 1 })
    }

    /// Scratch directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Allocate a request with paths no other request uses.
    pub fn request(&mut self, mode: Mode, script: String) -> RenderRequest {
        let id = self.next_id;
        self.next_id += 1;

        let stem = format!("{}-{:04}", mode.slug(), id);
        RenderRequest {
            id,
            mode,
            script,
            script_path: self.dir.path().join(format!("{}.gp", stem)),
            output_path: self.dir.path().join(format!("{}.png", stem)),
        }
    }

    /// Output path the next request for `mode` will use.
    ///
    /// The script has to name its output before the request exists.
    pub fn next_output_path(&self, mode: Mode) -> PathBuf {
        self.dir
            .path()
            .join(format!("{}-{:04}.png", mode.slug(), self.next_id))
    }
}

/// One render invocation: the script and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Monotonic request number within the workspace.
    pub id: u64,
    /// Tab the request belongs to.
    pub mode: Mode,
    /// Script text.
    pub script: String,
    /// Where the script is written.
    pub script_path: PathBuf,
    /// Where the renderer writes the image.
    pub output_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_never_share_paths() {
        let mut workspace = Workspace::new().unwrap();
        let a = workspace.request(Mode::TwoD, String::new());
        let b = workspace.request(Mode::TwoD, String::new());
        let c = workspace.request(Mode::ThreeD, String::new());

        assert_ne!(a.output_path, b.output_path);
        assert_ne!(a.script_path, b.script_path);
        assert_ne!(b.output_path, c.output_path);
        assert!(a.output_path.starts_with(workspace.path()));
        assert!(c.output_path.to_string_lossy().contains("3d-"));
    }

    #[test]
    fn next_output_path_matches_request() {
        let mut workspace = Workspace::new().unwrap();
        let predicted = workspace.next_output_path(Mode::ThreeD);
        let request = workspace.request(Mode::ThreeD, String::new());
        assert_eq!(predicted, request.output_path);
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let workspace = Workspace::new().unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.is_dir());
        drop(workspace);
        assert!(!path.exists());
    }
}
