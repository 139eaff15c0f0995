//! User configuration (`~/.config/plotbox/config.toml`).

use crate::app::Theme;
use crate::error::{PlotboxError, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// PlotBox configuration. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Renderer executable.
    pub renderer: String,
    /// Save-dialog helper executable.
    pub dialog: String,
    /// Longest wait for the image after the renderer exits.
    pub settle_timeout_ms: u64,
    /// Where exports go by default.
    pub export_dir: Option<PathBuf>,
    /// Color theme.
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            renderer: "gnuplot".to_string(),
            dialog: "zenity".to_string(),
            settle_timeout_ms: 100,
            export_dir: None,
            theme: Theme::GruvboxDark,
        }
    }
}

impl Config {
    /// Settle timeout as a duration.
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    /// Parse a config file body.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Path to the default config file.
pub fn config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("plotbox").join("config.toml"))
}

/// Load configuration.
///
/// With an explicit path the file must exist. Without one, the default
/// location is used and a commented default file is written on first run.
/// A broken file falls back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path)
            .map_err(|e| PlotboxError::Config(format!("{}: {}", path.display(), e)))?;
        return Config::from_toml(&content);
    }

    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    Ok(load_or_create(&path))
}

/// Read the config at `path`, writing the default file only if none exists.
fn load_or_create(path: &Path) -> Config {
    match fs::read_to_string(path) {
        Ok(content) => Config::from_toml(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
            Config::default()
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Err(e) = write_default_config(path) {
                tracing::debug!("Could not write default config: {}", e);
            }
            Config::default()
        },
        Err(e) => {
            tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
            Config::default()
        },
    }
}

/// Write a default config file with comments.
fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG)?;
    Ok(())
}

const DEFAULT_CONFIG: &str = "# PlotBox configuration

# Renderer executable, invoked as `<renderer> <script>`
renderer = \"gnuplot\"

# Save dialog helper (zenity-compatible)
dialog = \"zenity\"

# Longest wait in milliseconds for the image after the renderer exits
settle_timeout_ms = 100

# Default export directory (defaults to ~/.local/share/gnuplot-plotbox)
# export_dir = \"/home/me/Pictures/plots\"

# Theme: \"dark\" or \"light\"
theme = \"dark\"
";
