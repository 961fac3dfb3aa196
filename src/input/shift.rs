// SPDX-License-Identifier: GPL-3.0-only

//! One-shot shift state.
//!
//! Shift is activated by tapping the shift key and releases automatically
//! after the next key that writes text. Tapping shift again before that
//! deactivates it. There is no caps-lock mode.

/// Tracks whether the one-shot shift modifier is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftState {
    active: bool,
}

impl ShiftState {
    /// Creates an inactive shift state.
    #[must_use]
    pub fn new() -> Self {
        Self { active: false }
    }

    /// Flips the modifier.
    ///
    /// Returns `true` if shift is now active.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    /// Returns `true` while shift is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Releases the one-shot modifier after a text-writing key.
    ///
    /// Returns `true` if shift was active (and is now released).
    pub fn consume(&mut self) -> bool {
        std::mem::take(&mut self.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut state = ShiftState::new();

        assert!(state.toggle());
        assert!(state.is_active());

        assert!(!state.toggle());
        assert!(!state.is_active());
    }

    #[test]
    fn test_consume_is_one_shot() {
        let mut state = ShiftState::new();
        state.toggle();

        assert!(state.consume());
        assert!(!state.is_active());
        assert!(!state.consume(), "second consume finds nothing to release");
    }
}
