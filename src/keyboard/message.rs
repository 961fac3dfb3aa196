// SPDX-License-Identifier: GPL-3.0-only

//! Events published by the keyboard controller.
//!
//! The rendering layer subscribes to these instead of watching properties.
//! Each event is sent after the transition it describes has completed, so a
//! subscriber that queries the controller on receipt sees the new state.

use crate::keyboard::popup::PopupPreview;

/// Events emitted by the keyboard controller.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyboardEvent {
    /// The keyboard was shown (`true`) or hidden (`false`).
    VisibilityChanged(bool),

    /// Shift was activated (`true`) or released (`false`).
    ShiftChanged(bool),

    /// The bound field was edited.
    TextChanged {
        /// Text after the edit
        text: String,
        /// Caret after the edit
        caret: usize,
    },

    /// A key-press preview appeared.
    PopupShown(PopupPreview),

    /// The key-press preview went away.
    PopupHidden,

    /// A different layout was loaded and the grid rebuilt.
    LayoutChanged {
        /// Code of the loaded layout (may differ from the requested one)
        language_code: String,
        /// Name of the loaded layout
        name: String,
    },

    /// The Done key was pressed.
    DoneClicked,
}

impl KeyboardEvent {
    /// Returns `true` for events that change what is drawn on the keys.
    pub fn affects_keys(&self) -> bool {
        matches!(
            self,
            KeyboardEvent::ShiftChanged(_) | KeyboardEvent::LayoutChanged { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affects_keys() {
        assert!(KeyboardEvent::ShiftChanged(true).affects_keys());
        assert!(
            KeyboardEvent::LayoutChanged {
                language_code: "en-US".into(),
                name: "English".into(),
            }
            .affects_keys()
        );
        assert!(!KeyboardEvent::DoneClicked.affects_keys());
        assert!(!KeyboardEvent::PopupHidden.affects_keys());
    }
}
