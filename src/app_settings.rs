// SPDX-License-Identifier: GPL-3.0-only

//! Centralized application settings and constants.

/// Application name, used for config and data directories.
pub const APP_NAME: &str = "kioskboard";

/// Environment variable that points at a config file.
pub const CONFIG_ENV_VAR: &str = "KIOSKBOARD_CONFIG";

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/kioskboard/config.toml";

/// Language requested when nothing else is configured.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Default keyboard surface width in pixels.
pub const DEFAULT_WIDTH: f32 = 800.0;

/// Default keyboard surface height in pixels.
pub const DEFAULT_HEIGHT: f32 = 300.0;

/// Default gap between keys and between rows in pixels.
pub const DEFAULT_KEY_SPACING: f32 = 6.0;

/// Key-press popup width in pixels.
pub const POPUP_WIDTH: f32 = 60.0;

/// Key-press popup height in pixels.
pub const POPUP_HEIGHT: f32 = 70.0;

/// Gap between the popup and the pressed key in pixels.
pub const POPUP_GAP: f32 = 8.0;

/// Minimum distance between the popup and the keyboard's side edges.
pub const POPUP_MARGIN: f32 = 5.0;

/// Time after a press at which the popup hides by itself.
pub const POPUP_DISMISS_MS: u64 = 150;
