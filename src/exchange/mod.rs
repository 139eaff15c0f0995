//! Getting rendered images in and out.
//!
//! Loading an artifact for display, exporting it to a user-chosen file, and
//! copying it to the clipboard. Every operation checks that the artifact
//! exists first and reports [`PlotboxError::ArtifactMissing`] otherwise.

mod clipboard;
mod dialog;

pub use clipboard::{copy_artifact_to_clipboard, ClipboardSink, SystemClipboard};
pub use dialog::{with_png_suffix, SaveDialog};

use crate::error::{PlotboxError, Result};
use crate::script::Mode;
use chrono::{DateTime, Local};
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the user data dir for exports.
pub const EXPORT_DIR_NAME: &str = "gnuplot-plotbox";

/// Decode an artifact, or `None` if it does not exist.
pub fn load_artifact(path: &Path) -> Result<Option<DynamicImage>> {
    if !path.is_file() {
        return Ok(None);
    }
    let image = image::open(path)?;
    Ok(Some(image))
}

/// Copy an artifact to `destination`, replacing any existing file.
///
/// Nothing is written when the artifact is missing.
pub fn export_artifact(artifact: &Path, destination: &Path) -> Result<()> {
    if !artifact.is_file() {
        return Err(PlotboxError::artifact_missing(artifact));
    }
    fs::copy(artifact, destination).map_err(|e| PlotboxError::export_write(destination, e))?;
    tracing::info!("Exported {} to {}", artifact.display(), destination.display());
    Ok(())
}

/// Default export directory: `<user data dir>/gnuplot-plotbox`.
pub fn default_export_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(EXPORT_DIR_NAME)
}

/// Create the export directory if needed, private to the user.
pub fn ensure_export_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)?;
    Ok(())
}

/// Suggested export file: `<tab>_<YYYYMMDD_HHMMSS>.png` inside `dir`.
pub fn default_export_path(dir: &Path, mode: Mode, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}_{}.png", mode.slug(), now.format("%Y%m%d_%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn export_of_missing_artifact_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.png");
        let result = export_artifact(&dir.path().join("missing.png"), &destination);
        assert!(matches!(result, Err(PlotboxError::ArtifactMissing { .. })));
        assert!(!destination.exists());
    }

    #[test]
    fn export_copies_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("plot.png");
        let destination = dir.path().join("saved.png");
        fs::write(&artifact, b"new").unwrap();
        fs::write(&destination, b"old contents").unwrap();

        export_artifact(&artifact, &destination).unwrap();
        assert_eq!(fs::read(&destination).unwrap(), b"new");
    }

    #[test]
    fn export_into_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("plot.png");
        fs::write(&artifact, b"png").unwrap();
        let result = export_artifact(&artifact, &dir.path().join("no/such/dir/out.png"));
        assert!(matches!(result, Err(PlotboxError::ExportWrite { .. })));
    }

    #[test]
    fn default_filename_is_timestamped_per_tab() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let dir = Path::new("/data/plots");
        assert_eq!(
            default_export_path(dir, Mode::TwoD, now),
            PathBuf::from("/data/plots/functions_20240309_140507.png")
        );
        assert_eq!(
            default_export_path(dir, Mode::ThreeD, now),
            PathBuf::from("/data/plots/3d_20240309_140507.png")
        );
    }

    #[test]
    fn export_dir_is_created_private() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a/b");
        ensure_export_dir(&dir).unwrap();
        ensure_export_dir(&dir).unwrap();
        assert!(dir.is_dir());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o077, 0);
        }
    }

    #[test]
    fn load_missing_artifact_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_artifact(&dir.path().join("nope.png")).unwrap().is_none());
    }

    #[test]
    fn load_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();
        let loaded = load_artifact(&path).unwrap().unwrap();
        assert_eq!((loaded.width(), loaded.height()), (3, 2));
    }

    #[test]
    fn load_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        fs::write(&path, b"not an image").unwrap();
        assert!(matches!(load_artifact(&path), Err(PlotboxError::ImageDecode(_))));
    }
}
