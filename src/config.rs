// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard configuration.
//!
//! The config file is TOML. Every field is optional:
//!
//! ```toml
//! layouts_dir = "/usr/share/kioskboard/layouts"
//! language_code = "de-DE"
//! show_key_press_popup = true
//!
//! [popup]
//! width = 60.0
//! height = 70.0
//! gap = 8.0
//! margin = 5.0
//! dismiss_after_ms = 150
//!
//! [surface]
//! width = 800.0
//! height = 300.0
//! row_spacing = 6.0
//! key_spacing = 6.0
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::app_settings;
use crate::keyboard::{PopupConfig, SurfaceMetrics};

/// User configuration for the keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for `*.json` layout files
    pub layouts_dir: PathBuf,

    /// Language code of the layout to show
    pub language_code: String,

    /// Whether pressing a key shows the preview popup
    pub show_key_press_popup: bool,

    /// Popup size and timing
    pub popup: PopupConfig,

    /// Keyboard surface size and spacing
    pub surface: SurfaceMetrics,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layouts_dir: default_layouts_dir(),
            language_code: app_settings::DEFAULT_LANGUAGE.to_string(),
            show_key_press_popup: true,
            popup: PopupConfig::default(),
            surface: SurfaceMetrics::default(),
        }
    }
}

impl Config {
    /// Path of the config file that [`load`](Self::load) would read.
    ///
    /// Checked in order: `KIOSKBOARD_CONFIG`, the user config directory,
    /// then `/etc/kioskboard/config.toml`. Returns `None` when none exists.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(app_settings::CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join(app_settings::APP_NAME).join("config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        let system = Path::new(app_settings::SYSTEM_CONFIG_PATH);
        system.exists().then(|| system.to_path_buf())
    }

    /// Loads the configuration, falling back to built-in defaults.
    ///
    /// A config file that cannot be read or parsed is logged and ignored.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        tracing::info!("Using built-in default config");
        Self::default()
    }

    /// Loads the configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

/// `<data dir>/kioskboard/layouts`, or a relative `layouts` directory when
/// the platform has no data directory.
fn default_layouts_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(app_settings::APP_NAME).join("layouts"))
        .unwrap_or_else(|| PathBuf::from("layouts"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.language_code, "en-US");
        assert!(config.show_key_press_popup);
        assert_eq!(config.popup.dismiss_after_ms, 150);
        assert_eq!(config.popup.width, 60.0);
        assert!(config.layouts_dir.ends_with("layouts"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
language_code = "de-DE"
layouts_dir = "/opt/layouts"

[popup]
dismiss_after_ms = 300
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.language_code, "de-DE");
        assert_eq!(config.layouts_dir, PathBuf::from("/opt/layouts"));
        assert_eq!(config.popup.dismiss_after_ms, 300);
        assert_eq!(config.popup.margin, 5.0);
        assert!(config.show_key_press_popup);
        assert_eq!(config.surface, SurfaceMetrics::default());
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "language_code = [").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::load_from_file("/nonexistent/kioskboard.toml").is_err());
    }
}
