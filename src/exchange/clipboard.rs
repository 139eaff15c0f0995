//! Clipboard integration.

use crate::error::{PlotboxError, Result};
use arboard::{Clipboard, ImageData};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Something that can hold an image.
pub trait ClipboardSink {
    /// Replace the clipboard contents with an RGBA image.
    fn set_image(&mut self, width: usize, height: usize, rgba: Vec<u8>) -> Result<()>;
}

/// The system clipboard.
///
/// Kept alive for the whole session: on X11 the contents vanish once the
/// owning handle is dropped.
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard")
            .field("connected", &self.inner.is_some())
            .finish()
    }
}

impl SystemClipboard {
    /// Create a handle; the connection is opened on first use.
    pub fn new() -> Self {
        Self { inner: None }
    }

    fn connection(&mut self) -> Result<&mut Clipboard> {
        if self.inner.is_none() {
            self.inner = Some(Clipboard::new()?);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| PlotboxError::Clipboard(arboard::Error::ClipboardNotSupported))
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_image(&mut self, width: usize, height: usize, rgba: Vec<u8>) -> Result<()> {
        let clipboard = self.connection()?;
        clipboard.set_image(ImageData {
            width,
            height,
            bytes: Cow::Owned(rgba),
        })?;
        Ok(())
    }
}

/// Put the artifact at `path` on the clipboard as an image.
///
/// The PNG is read and decoded here; the clipboard backend re-encodes it as
/// `image/png` for other applications.
pub fn copy_artifact_to_clipboard(path: &Path, sink: &mut dyn ClipboardSink) -> Result<()> {
    if !path.is_file() {
        return Err(PlotboxError::artifact_missing(path));
    }
    let bytes = fs::read(path)?;
    let rgba = image::load_from_memory(&bytes)?.into_rgba8();
    let (width, height) = rgba.dimensions();
    sink.set_image(width as usize, height as usize, rgba.into_raw())?;
    tracing::info!("Copied {} to clipboard", path.display());
    Ok(())
}
