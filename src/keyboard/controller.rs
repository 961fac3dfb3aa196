// SPDX-License-Identifier: GPL-3.0-only

//! The keyboard's dispatch state machine.
//!
//! ```text
//!                  focus gained
//!   +--------+ ------------------> +------------------+
//!   | Hidden |                     | Visible-NoShift  | <-+
//!   +--------+ <------------------ +------------------+   |
//!        ^      done / outside tap     | shift    ^       | normal key
//!        |      / focus check          v          | shift | (one-shot)
//!        |                         +------------------+   |
//!        +------------------------ | Visible-Shift    | --+
//!                                  +------------------+
//! ```
//!
//! All transitions happen synchronously while handling one input event. The
//! only deferred work is the focus check after the bound field loses focus
//! and the popup dismiss timeout; the host drives both.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::Config;
use crate::input::{
    DeferredFocusCheck, FocusOwner, ShiftState, TargetHandle, delete_before_caret,
    insert_at_caret,
};
use crate::keyboard::grid::{KeyGrid, KeyPosition, Point, SurfaceMetrics};
use crate::keyboard::message::KeyboardEvent;
use crate::keyboard::popup::{PopupConfig, PopupPresenter, PopupPreview};
use crate::layout::{Key, KeyType, Layout, LayoutRepository, RepositoryError};

/// Observable state of the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardState {
    /// Not shown, no field bound
    Hidden,
    /// Shown, shift released
    VisibleNoShift,
    /// Shown, shift active for the next key
    VisibleShift,
}

/// Where a tap landed, as classified by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapTarget {
    /// The field the keyboard is bound to
    BoundField,
    /// One of the keyboard's keys
    KeyboardKey,
    /// Anywhere else
    Outside,
}

/// Snapshot of everything the rendering layer needs after a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardView {
    /// Current state
    pub state: KeyboardState,
    /// Code of the loaded layout
    pub language_code: String,
    /// Name of the loaded layout
    pub layout_name: String,
    /// Shift key to highlight while shift is active
    pub highlighted_shift_key: Option<KeyPosition>,
    /// Key-press preview, if shown
    pub popup: Option<PopupPreview>,
}

/// The on-screen keyboard controller.
pub struct KeyboardController {
    repository: Arc<LayoutRepository>,

    /// Language the host asked for; the loaded layout may differ
    requested_language: String,

    layout: Arc<Layout>,
    grid: KeyGrid,

    target: Option<TargetHandle>,
    shift: ShiftState,
    visible: bool,

    show_key_press_popup: bool,
    surface: SurfaceMetrics,
    popup: PopupPresenter,
    focus_check: DeferredFocusCheck,

    subscribers: Vec<UnboundedSender<KeyboardEvent>>,
}

impl fmt::Debug for KeyboardController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardController")
            .field("requested_language", &self.requested_language)
            .field("layout", &self.layout.language_code)
            .field("state", &self.state())
            .field("bound", &self.target.is_some())
            .field("popup", &self.popup.current())
            .finish_non_exhaustive()
    }
}

impl KeyboardController {
    /// Creates a hidden keyboard showing the layout for `language_code`.
    ///
    /// # Errors
    ///
    /// Fails only if the repository has no layout at all.
    pub fn new(
        repository: Arc<LayoutRepository>,
        language_code: impl Into<String>,
    ) -> Result<Self, RepositoryError> {
        let requested_language = language_code.into();
        let layout = repository.get_layout(&requested_language)?;
        let grid = KeyGrid::build(&layout);

        tracing::debug!(
            "Keyboard created with layout {} ({})",
            layout.name,
            layout.language_code
        );

        Ok(Self {
            repository,
            requested_language,
            layout,
            grid,
            target: None,
            shift: ShiftState::new(),
            visible: false,
            show_key_press_popup: true,
            surface: SurfaceMetrics::default(),
            popup: PopupPresenter::new(PopupConfig::default()),
            focus_check: DeferredFocusCheck::new(),
            subscribers: Vec::new(),
        })
    }

    /// Creates a keyboard using the language, popup and surface settings of `config`.
    pub fn from_config(
        repository: Arc<LayoutRepository>,
        config: &Config,
    ) -> Result<Self, RepositoryError> {
        let mut controller = Self::new(repository, config.language_code.clone())?;
        controller.show_key_press_popup = config.show_key_press_popup;
        controller.surface = config.surface;
        controller.popup = PopupPresenter::new(config.popup.clone());
        Ok(controller)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current state of the machine.
    pub fn state(&self) -> KeyboardState {
        match (self.visible, self.shift.is_active()) {
            (false, _) => KeyboardState::Hidden,
            (true, false) => KeyboardState::VisibleNoShift,
            (true, true) => KeyboardState::VisibleShift,
        }
    }

    /// Returns `true` while the keyboard is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` while shift is active.
    pub fn is_shift_active(&self) -> bool {
        self.shift.is_active()
    }

    /// Returns `true` while a field is bound.
    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    /// The loaded layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The key grid of the loaded layout.
    pub fn grid(&self) -> &KeyGrid {
        &self.grid
    }

    /// The language the host asked for.
    pub fn requested_language(&self) -> &str {
        &self.requested_language
    }

    /// The surface the keyboard is laid out on.
    pub fn surface(&self) -> &SurfaceMetrics {
        &self.surface
    }

    /// The key-press preview, if shown.
    pub fn popup(&self) -> Option<&PopupPreview> {
        self.popup.current()
    }

    /// When the popup will hide by itself, if it is shown.
    pub fn next_popup_deadline(&self) -> Option<Instant> {
        self.popup.next_deadline()
    }

    /// Returns `true` while a deferred focus check waits to run.
    pub fn has_pending_focus_check(&self) -> bool {
        self.focus_check.is_pending()
    }

    /// Key under a point on the keyboard surface.
    pub fn key_at(&self, point: Point) -> Option<KeyPosition> {
        self.grid.key_at(point, &self.surface)
    }

    /// Everything the renderer needs to draw the current state.
    pub fn snapshot(&self) -> KeyboardView {
        KeyboardView {
            state: self.state(),
            language_code: self.layout.language_code.clone(),
            layout_name: self.layout.name.clone(),
            highlighted_shift_key: self
                .grid
                .shift_key()
                .filter(|_| self.shift.is_active()),
            popup: self.popup.current().cloned(),
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Registers a subscriber for keyboard events.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> UnboundedReceiver<KeyboardEvent> {
        let (sender, receiver) = mpsc::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    fn publish(&mut self, event: KeyboardEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
    }

    fn publish_text(&mut self, target: &TargetHandle) {
        let (text, caret) = {
            let field = target.borrow();
            (field.text(), field.caret_index())
        };
        self.publish(KeyboardEvent::TextChanged { text, caret });
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Loads the layout for `language_code` and rebuilds the grid.
    ///
    /// Unknown codes load the repository's fallback layout. Shift is
    /// released and any popup hidden.
    pub fn set_language(&mut self, language_code: impl Into<String>) -> Result<(), RepositoryError> {
        let requested = language_code.into();
        let layout = self.repository.get_layout(&requested)?;

        self.requested_language = requested;
        self.grid = KeyGrid::build(&layout);
        self.layout = layout;

        tracing::info!(
            "Keyboard layout set to {} ({})",
            self.layout.name,
            self.layout.language_code
        );

        self.release_shift();
        self.hide_popup();
        self.publish(KeyboardEvent::LayoutChanged {
            language_code: self.layout.language_code.clone(),
            name: self.layout.name.clone(),
        });
        Ok(())
    }

    /// Enables or disables the key-press preview.
    pub fn set_show_key_press_popup(&mut self, enabled: bool) {
        self.show_key_press_popup = enabled;
        if !enabled {
            self.hide_popup();
        }
    }

    /// Sets the surface size used for popup placement and hit testing.
    pub fn set_surface(&mut self, surface: SurfaceMetrics) {
        self.surface = surface;
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Binds a field that just gained focus and shows the keyboard.
    ///
    /// Cancels a pending focus check and releases shift.
    pub fn on_field_focus_gained(&mut self, target: TargetHandle) {
        if self.focus_check.cancel() {
            tracing::debug!("Focus moved to a field, pending focus check cancelled");
        }

        self.target = Some(target);
        self.release_shift();

        if !self.visible {
            self.visible = true;
            tracing::debug!("Keyboard shown");
            self.publish(KeyboardEvent::VisibilityChanged(true));
        }
    }

    /// Schedules a focus check after the bound field lost focus.
    ///
    /// Returns the ticket to pass to
    /// [`run_deferred_focus_check`](Self::run_deferred_focus_check) on the
    /// next event-loop turn, or `None` if the keyboard is not bound.
    pub fn on_field_focus_lost(&mut self) -> Option<u64> {
        if self.target.is_none() {
            return None;
        }
        let ticket = self.focus_check.schedule();
        tracing::debug!("Field lost focus, focus check {} scheduled", ticket);
        Some(ticket)
    }

    /// Runs a scheduled focus check.
    ///
    /// Hides the keyboard unless `owner` is a text field or a keyboard key.
    /// Stale or cancelled tickets do nothing. Returns `true` if the keyboard
    /// was hidden.
    pub fn run_deferred_focus_check(&mut self, ticket: u64, owner: FocusOwner) -> bool {
        if !self.focus_check.take(ticket) {
            return false;
        }
        if owner.keeps_keyboard() {
            tracing::debug!("Focus check {}: focus still on {:?}", ticket, owner);
            return false;
        }
        self.hide_keyboard();
        true
    }

    // ========================================================================
    // Pointer and key input
    // ========================================================================

    /// Handles a tap. Taps outside the field and the keyboard dismiss it.
    pub fn on_tap(&mut self, target: TapTarget) {
        if target == TapTarget::Outside && self.visible {
            tracing::debug!("Tap outside keyboard");
            self.hide_keyboard();
        }
    }

    /// Pointer went down on a key: shows the preview.
    pub fn press_key(&mut self, position: KeyPosition, now: Instant) {
        if !self.visible || !self.show_key_press_popup {
            return;
        }
        let Some(grid_key) = self.grid.key(position) else {
            return;
        };
        let Some(bounds) = self.grid.key_bounds(position, &self.surface) else {
            return;
        };

        let preview = self
            .popup
            .show(
                &grid_key.key,
                position,
                bounds,
                self.surface.width,
                self.shift.is_active(),
                now,
            )
            .clone();
        self.publish(KeyboardEvent::PopupShown(preview));
    }

    /// Pointer was released: hides the preview.
    pub fn release_key(&mut self) {
        self.hide_popup();
    }

    /// A key was clicked: dispatches its action.
    ///
    /// Returns `false` if there is no key at `position`.
    pub fn activate_key(&mut self, position: KeyPosition) -> bool {
        match self.grid.key(position) {
            Some(grid_key) => {
                let key = grid_key.key.clone();
                self.handle_key(&key);
                true
            }
            None => false,
        }
    }

    /// Press, click and release in one step.
    pub fn tap_key(&mut self, position: KeyPosition, now: Instant) -> bool {
        self.press_key(position, now);
        let found = self.activate_key(position);
        self.release_key();
        found
    }

    /// Applies a key's action to the bound field.
    ///
    /// Without a bound field every key is ignored.
    pub fn handle_key(&mut self, key: &Key) {
        let Some(target) = self.target.clone() else {
            tracing::debug!("Key '{}' ignored, no field bound", key.display);
            return;
        };

        match &key.key_type {
            KeyType::Shift => {
                let active = self.shift.toggle();
                tracing::debug!("Shift {}", if active { "on" } else { "off" });
                self.publish(KeyboardEvent::ShiftChanged(active));
            }
            KeyType::Backspace => {
                let deleted = delete_before_caret(&mut *target.borrow_mut());
                if deleted {
                    self.publish_text(&target);
                }
            }
            KeyType::Space => {
                insert_at_caret(&mut *target.borrow_mut(), " ");
                self.publish_text(&target);
            }
            KeyType::Done => {
                self.hide_keyboard();
                self.publish(KeyboardEvent::DoneClicked);
            }
            KeyType::Empty => {}
            KeyType::Normal | KeyType::Other(_) => {
                let output = key.output(self.shift.is_active()).to_string();
                if !output.is_empty() {
                    insert_at_caret(&mut *target.borrow_mut(), &output);
                    self.publish_text(&target);
                }
                self.release_shift();
            }
        }
    }

    /// Advances timers. Call when [`next_popup_deadline`](Self::next_popup_deadline) passes.
    pub fn tick(&mut self, now: Instant) {
        if self.popup.tick(now) {
            self.publish(KeyboardEvent::PopupHidden);
        }
    }

    // ========================================================================
    // Internal transitions
    // ========================================================================

    fn release_shift(&mut self) {
        if self.shift.consume() {
            self.publish(KeyboardEvent::ShiftChanged(false));
        }
    }

    fn hide_popup(&mut self) {
        if self.popup.hide() {
            self.publish(KeyboardEvent::PopupHidden);
        }
    }

    /// Unbinds the field and hides the keyboard.
    fn hide_keyboard(&mut self) {
        self.focus_check.cancel();
        self.hide_popup();
        self.target = None;
        self.release_shift();

        if self.visible {
            self.visible = false;
            tracing::debug!("Keyboard hidden");
            self.publish(KeyboardEvent::VisibilityChanged(false));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
