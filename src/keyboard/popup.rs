// SPDX-License-Identifier: GPL-3.0-only

//! Key-press preview popup.
//!
//! When a key goes down, a small popup showing the key's glyph appears above
//! it. The popup is centered on the key and clamped horizontally so it never
//! leaves the keyboard's width. Vertically it always sits above the key, even
//! if that is above the keyboard itself; the overlay it is drawn on does not
//! clip.
//!
//! The popup hides on pointer release or once the dismiss timeout runs out,
//! whichever happens first. A new press restarts the timeout.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::app_settings;
use crate::keyboard::grid::{KeyPosition, Rectangle};
use crate::keyboard::timer::TimerSlot;
use crate::layout::{Key, KeyType};

// ============================================================================
// Configuration
// ============================================================================

/// Size, spacing and timing of the popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// Popup width in logical pixels
    pub width: f32,
    /// Popup height in logical pixels
    pub height: f32,
    /// Gap between the popup's bottom edge and the key's top edge
    pub gap: f32,
    /// Minimum distance from the keyboard's left and right edges
    pub margin: f32,
    /// Time after the press at which the popup hides by itself
    pub dismiss_after_ms: u64,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            width: app_settings::POPUP_WIDTH,
            height: app_settings::POPUP_HEIGHT,
            gap: app_settings::POPUP_GAP,
            margin: app_settings::POPUP_MARGIN,
            dismiss_after_ms: app_settings::POPUP_DISMISS_MS,
        }
    }
}

impl PopupConfig {
    /// Dismiss timeout as a `Duration`.
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_ms)
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Top-left corner of the popup in keyboard coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupPlacement {
    /// Left edge, always within the keyboard's horizontal bounds
    pub left: f32,
    /// Top edge; negative when the popup extends above the keyboard
    pub top: f32,
}

/// Computes where the popup goes for a key.
///
/// The popup is centered over the key and its left edge clamped into
/// `[margin, container_width - width - margin]`. If the container is too
/// narrow for that range, the left edge is `margin`.
pub fn calculate_popup_position(
    key_bounds: Rectangle,
    container_width: f32,
    config: &PopupConfig,
) -> PopupPlacement {
    let candidate = key_bounds.center_x() - config.width / 2.0;
    let max_left = container_width - config.width - config.margin;

    let left = candidate.min(max_left).max(config.margin);
    let top = key_bounds.y - config.height - config.gap;

    PopupPlacement { left, top }
}

/// Text shown in the popup for a key.
///
/// Modifier keys show fixed glyphs; other keys show their label for the
/// current shift state.
pub fn popup_text(key: &Key, shift_active: bool) -> String {
    match key.key_type {
        KeyType::Backspace => "⌫".to_string(),
        KeyType::Shift => "⇧".to_string(),
        KeyType::Space => "Space".to_string(),
        KeyType::Done => "✓".to_string(),
        _ => key.label(shift_active).to_string(),
    }
}

// ============================================================================
// Presenter
// ============================================================================

/// What the popup currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupPreview {
    /// Glyph or label to display
    pub text: String,
    /// Where to draw it
    pub placement: PopupPlacement,
    /// The key that was pressed
    pub key: KeyPosition,
}

/// Shows and hides the key-press popup.
#[derive(Debug, Clone, Default)]
pub struct PopupPresenter {
    config: PopupConfig,
    current: Option<PopupPreview>,
    dismiss_timer: TimerSlot,
}

impl PopupPresenter {
    /// Creates a presenter with the given configuration.
    pub fn new(config: PopupConfig) -> Self {
        Self {
            config,
            current: None,
            dismiss_timer: TimerSlot::new(),
        }
    }

    /// The popup configuration.
    pub fn config(&self) -> &PopupConfig {
        &self.config
    }

    /// Shows a preview for a pressed key and (re)starts the dismiss timer.
    pub fn show(
        &mut self,
        key: &Key,
        position: KeyPosition,
        key_bounds: Rectangle,
        container_width: f32,
        shift_active: bool,
        now: Instant,
    ) -> &PopupPreview {
        let placement = calculate_popup_position(key_bounds, container_width, &self.config);
        self.dismiss_timer.start(now, self.config.dismiss_after());

        self.current.insert(PopupPreview {
            text: popup_text(key, shift_active),
            placement,
            key: position,
        })
    }

    /// Hides the popup if the dismiss timeout has passed.
    ///
    /// Returns `true` if the popup was hidden by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.dismiss_timer.fire_if_due(now) {
            return self.current.take().is_some();
        }
        false
    }

    /// Hides the popup and cancels the timer. Returns `true` if it was visible.
    pub fn hide(&mut self) -> bool {
        self.dismiss_timer.cancel();
        self.current.take().is_some()
    }

    /// The preview being shown, if any.
    pub fn current(&self) -> Option<&PopupPreview> {
        self.current.as_ref()
    }

    /// When the popup will hide by itself, if it is shown.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.dismiss_timer.deadline()
    }
}

// ============================================================================
// Tests
// ============================================================================
