// SPDX-License-Identifier: GPL-3.0-only

//! Deferred focus-loss handling.
//!
//! When the bound field loses focus the keyboard must not hide right away:
//! focus is usually just moving to one of the keyboard's own keys. Instead a
//! check is scheduled for the next event-loop turn, and the host runs it with
//! whatever holds focus at that point.

/// What holds keyboard focus when a deferred check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOwner {
    /// An editable text field
    TextField,
    /// One of the on-screen keyboard's keys
    KeyboardKey,
    /// Some other control
    Other,
    /// Nothing is focused
    Nothing,
}

impl FocusOwner {
    /// Returns `true` if the keyboard should stay up with this focus owner.
    pub fn keeps_keyboard(self) -> bool {
        matches!(self, FocusOwner::TextField | FocusOwner::KeyboardKey)
    }
}

/// A single pending focus check.
///
/// Scheduling twice keeps one pending check. Every schedule bumps a
/// generation so a host that captured a ticket can tell a stale check from
/// the current one.
#[derive(Debug, Clone, Default)]
pub struct DeferredFocusCheck {
    pending: Option<u64>,
    generation: u64,
}

impl DeferredFocusCheck {
    /// Creates a check slot with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a check, replacing any pending one. Returns its ticket.
    pub fn schedule(&mut self) -> u64 {
        self.generation += 1;
        self.pending = Some(self.generation);
        self.generation
    }

    /// Cancels the pending check. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Returns `true` while a check is waiting to run.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending check if `ticket` is still the current one.
    ///
    /// A check that was cancelled or rescheduled since the ticket was issued
    /// is stale and returns `false`.
    pub fn take(&mut self, ticket: u64) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_and_take() {
        let mut check = DeferredFocusCheck::new();
        assert!(!check.take(1));

        let ticket = check.schedule();
        assert!(check.is_pending());
        assert!(check.take(ticket));
        assert!(!check.is_pending());
        assert!(!check.take(ticket));
    }

    #[test]
    fn test_cancel_short_circuits() {
        let mut check = DeferredFocusCheck::new();
        let ticket = check.schedule();

        assert!(check.cancel());
        assert!(!check.take(ticket));
        assert!(!check.cancel());
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut check = DeferredFocusCheck::new();
        let old = check.schedule();
        let current = check.schedule();

        assert!(!check.take(old));
        assert!(check.is_pending());
        assert!(check.take(current));
    }

    #[test]
    fn test_focus_owner_keeps_keyboard() {
        assert!(FocusOwner::TextField.keeps_keyboard());
        assert!(FocusOwner::KeyboardKey.keeps_keyboard());
        assert!(!FocusOwner::Other.keeps_keyboard());
        assert!(!FocusOwner::Nothing.keeps_keyboard());
    }
}
