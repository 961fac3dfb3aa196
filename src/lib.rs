// SPDX-License-Identifier: GPL-3.0-only

//! Kioskboard - an on-screen keyboard engine for touch kiosks
//!
//! This crate contains everything behind a touch keyboard on a kiosk login
//! screen except the drawing: layout loading, the key grid, the shift and
//! dispatch state machine, the key-press popup and focus handling. A
//! rendering host feeds it taps and focus changes and draws what it reports.
//!
//! # Architecture
//!
//! 1. **Layouts** (`layout`): JSON layout files, loaded once into a shared
//!    [`LayoutRepository`](layout::LayoutRepository) with an embedded fallback.
//!
//! 2. **Controller** (`keyboard`): one
//!    [`KeyboardController`](keyboard::KeyboardController) per keyboard
//!    instance, bound to at most one text field at a time. It publishes
//!    [`KeyboardEvent`](keyboard::KeyboardEvent)s to subscribers.
//!
//! 3. **Host** (`kioskboard` binary): a headless driver reading commands from
//!    stdin, useful for trying layouts without a display.
//!
//! # Modules
//!
//! - `app_settings`: Centralized application constants
//! - `config`: User configuration loaded from TOML
//! - `input`: Text target binding, shift state and deferred focus checks
//! - `keyboard`: Key grid, popup presenter and the keyboard controller
//! - `layout`: Layout types, parsing, validation and the repository

pub mod app_settings;
pub mod config;
pub mod input;
pub mod keyboard;
pub mod layout;

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod integration_tests {
    use crate::config::Config;
    use crate::input::{FocusOwner, TextField, TextTarget};
    use crate::keyboard::{KeyboardController, KeyboardEvent, KeyboardState, TapTarget};
    use crate::layout::{KeyType, LayoutRepository};
    use futures::StreamExt;
    use std::io::Write;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn embedded_keyboard() -> KeyboardController {
        let repository = Arc::new(LayoutRepository::embedded_only());
        KeyboardController::new(repository, "en-US").unwrap()
    }

    /// Integration Test 1: Typing with one-shot shift on the built-in layout
    #[test]
    fn test_shifted_typing_on_embedded_layout() {
        let mut keyboard = embedded_keyboard();
        let field = TextField::new("").into_handle();
        keyboard.on_field_focus_gained(field.clone());

        let grid = keyboard.grid().clone();
        let shift = grid.shift_key().unwrap();
        let q = grid.position_of("q").unwrap();
        let now = Instant::now();

        keyboard.tap_key(shift, now);
        keyboard.tap_key(q, now);
        assert_eq!(field.borrow().as_str(), "Q");
        assert_eq!(field.borrow().caret_index(), 1);
        assert_eq!(keyboard.state(), KeyboardState::VisibleNoShift);

        keyboard.tap_key(q, now);
        assert_eq!(field.borrow().as_str(), "Qq");
        assert_eq!(field.borrow().caret_index(), 2);
    }

    /// Integration Test 2: Backspace, space and done on the built-in layout
    #[test]
    fn test_editing_keys_on_embedded_layout() {
        let mut keyboard = embedded_keyboard();
        let field = TextField::new("hello").into_handle();
        keyboard.on_field_focus_gained(field.clone());

        let grid = keyboard.grid().clone();
        let backspace = grid.position_of_type(&KeyType::Backspace).unwrap();
        let space = grid.position_of_type(&KeyType::Space).unwrap();
        let done = grid.position_of_type(&KeyType::Done).unwrap();
        let now = Instant::now();

        keyboard.tap_key(backspace, now);
        keyboard.tap_key(backspace, now);
        assert_eq!(field.borrow().as_str(), "hel");
        assert_eq!(field.borrow().caret_index(), 3);

        keyboard.tap_key(space, now);
        assert_eq!(field.borrow().as_str(), "hel ");

        keyboard.tap_key(done, now);
        assert_eq!(keyboard.state(), KeyboardState::Hidden);
        assert!(!keyboard.is_bound());
    }

    /// Integration Test 3: Layouts from a directory end up in the controller
    #[test]
    fn test_directory_layouts_drive_controller() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join("de.json")).unwrap();
        write!(
            file,
            r#"{{
                "Name": "Deutsch",
                "LanguageCode": "de-DE",
                "Rows": [{{ "Keys": [
                    {{ "display": "z", "value": "z", "shiftValue": "Z" }},
                    {{ "display": "ü", "value": "ü", "shiftValue": "Ü" }},
                    {{ "display": "⇧", "type": "shift" }}
                ]}}]
            }}"#
        )
        .unwrap();

        let repository = Arc::new(LayoutRepository::new(dir.path()));
        repository.initialize().unwrap();

        let mut keyboard = KeyboardController::new(Arc::clone(&repository), "fr-FR").unwrap();
        assert_eq!(keyboard.layout().language_code, "de-DE");

        let field = TextField::new("").into_handle();
        keyboard.on_field_focus_gained(field.clone());
        let umlaut = keyboard.grid().position_of("ü").unwrap();
        let shift = keyboard.grid().shift_key().unwrap();

        keyboard.activate_key(shift);
        keyboard.activate_key(umlaut);
        assert_eq!(field.borrow().as_str(), "Ü");
    }

    /// Integration Test 4: Two keyboards share one repository
    #[test]
    fn test_two_keyboards_share_repository() {
        let repository = Arc::new(LayoutRepository::embedded_only());
        let mut first = KeyboardController::new(Arc::clone(&repository), "en-US").unwrap();
        let second = KeyboardController::new(Arc::clone(&repository), "en-US").unwrap();

        assert!(std::ptr::eq(first.layout(), second.layout()));
        assert_eq!(repository.len(), 1);

        let field = TextField::new("").into_handle();
        first.on_field_focus_gained(field);
        assert!(first.is_visible());
        assert!(!second.is_visible());
    }

    /// Integration Test 5: Focus moving through the keyboard and away
    #[test]
    fn test_focus_round_trip() {
        let mut keyboard = embedded_keyboard();
        let username = TextField::new("").into_handle();
        let password = TextField::new("").into_handle();

        keyboard.on_field_focus_gained(username.clone());
        let ticket = keyboard.on_field_focus_lost().unwrap();
        keyboard.run_deferred_focus_check(ticket, FocusOwner::KeyboardKey);
        let a = keyboard.grid().position_of("a").unwrap();
        keyboard.activate_key(a);
        assert_eq!(username.borrow().as_str(), "a");

        let ticket = keyboard.on_field_focus_lost().unwrap();
        keyboard.on_field_focus_gained(password.clone());
        keyboard.run_deferred_focus_check(ticket, FocusOwner::Nothing);
        keyboard.activate_key(a);
        assert_eq!(password.borrow().as_str(), "a");
        assert_eq!(username.borrow().as_str(), "a");

        keyboard.on_tap(TapTarget::Outside);
        assert_eq!(keyboard.state(), KeyboardState::Hidden);
    }

    /// Integration Test 6: Subscribers see a full press cycle in order
    #[tokio::test]
    async fn test_event_stream_for_press_cycle() {
        let mut keyboard = embedded_keyboard();
        let events = keyboard.subscribe();
        let field = TextField::new("").into_handle();
        keyboard.on_field_focus_gained(field);

        let x = keyboard.grid().position_of("x").unwrap();
        let now = Instant::now();
        keyboard.press_key(x, now);
        keyboard.activate_key(x);
        keyboard.tick(now + Duration::from_millis(150));
        drop(keyboard);

        let received: Vec<KeyboardEvent> = events.collect().await;
        assert_eq!(received.len(), 4);
        assert_eq!(received[0], KeyboardEvent::VisibilityChanged(true));
        assert!(matches!(&received[1], KeyboardEvent::PopupShown(p) if p.text == "x"));
        assert_eq!(
            received[2],
            KeyboardEvent::TextChanged {
                text: "x".into(),
                caret: 1
            }
        );
        assert_eq!(received[3], KeyboardEvent::PopupHidden);
    }

    /// Integration Test 7: Config settings reach the controller
    #[test]
    fn test_config_file_to_controller() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "layouts_dir = {:?}\nlanguage_code = \"en-US\"\n\n[popup]\ndismiss_after_ms = 40\n",
                dir.path().join("missing")
            ),
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        let repository = Arc::new(LayoutRepository::new(config.layouts_dir.clone()));
        let mut keyboard = KeyboardController::from_config(repository, &config).unwrap();

        // The layouts directory does not exist, so the embedded layout is used.
        assert_eq!(keyboard.layout().language_code, "en-US");

        let field = TextField::new("").into_handle();
        keyboard.on_field_focus_gained(field);
        let q = keyboard.grid().position_of("q").unwrap();
        let now = Instant::now();
        keyboard.press_key(q, now);
        keyboard.tick(now + Duration::from_millis(40));
        assert!(keyboard.popup().is_none());
    }
}
