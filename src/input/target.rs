// SPDX-License-Identifier: GPL-3.0-only

//! Binding to the editable text field the keyboard writes into.
//!
//! The keyboard does not own the field. The host hands it a [`TargetHandle`]
//! when a field gains focus and keeps its own handle to read the result.
//!
//! Caret positions count `char`s, not bytes, so multi-byte characters
//! (`ä`, `€`, `⇧`) move the caret by one.

use std::cell::RefCell;
use std::rc::Rc;

/// An editable text field with a caret.
pub trait TextTarget {
    /// Current text of the field.
    fn text(&self) -> String;

    /// Replaces the text of the field.
    fn set_text(&mut self, text: String);

    /// Caret position as a char index in `[0, text length]`.
    fn caret_index(&self) -> usize;

    /// Moves the caret.
    fn set_caret_index(&mut self, index: usize);
}

/// Shared handle to a bound field.
pub type TargetHandle = Rc<RefCell<dyn TextTarget>>;

/// Inserts `insertion` at the caret and moves the caret past it.
///
/// A caret beyond the end of the text is treated as being at the end.
pub fn insert_at_caret(target: &mut dyn TextTarget, insertion: &str) {
    let mut text = target.text();
    let caret = target.caret_index().min(char_len(&text));

    text.insert_str(byte_offset(&text, caret), insertion);
    let new_caret = caret + char_len(insertion);
    let len = char_len(&text);

    target.set_text(text);
    target.set_caret_index(new_caret.min(len));
}

/// Removes the character before the caret and moves the caret back by one.
///
/// Returns `false` without touching the field when the caret is at 0 or the
/// text is empty.
pub fn delete_before_caret(target: &mut dyn TextTarget) -> bool {
    let mut text = target.text();
    let caret = target.caret_index().min(char_len(&text));

    if caret == 0 {
        return false;
    }

    let start = byte_offset(&text, caret - 1);
    let end = byte_offset(&text, caret);
    text.replace_range(start..end, "");

    target.set_text(text);
    target.set_caret_index(caret - 1);
    true
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the char at `char_index`, or the text length past the end.
fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(offset, _)| offset)
}

// ============================================================================
// In-memory field
// ============================================================================

/// A plain in-memory text field.
///
/// Used by the headless host and in tests; GUI hosts implement
/// [`TextTarget`] for their own widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    caret: usize,
}

impl TextField {
    /// Creates a field holding `text` with the caret at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let caret = char_len(&text);
        Self { text, caret }
    }

    /// Places the caret, clamped into range.
    pub fn with_caret(mut self, caret: usize) -> Self {
        self.set_caret_index(caret);
        self
    }

    /// Wraps the field in a shared handle.
    pub fn into_handle(self) -> Rc<RefCell<TextField>> {
        Rc::new(RefCell::new(self))
    }

    /// Borrowed text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl TextTarget for TextField {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
        self.caret = self.caret.min(char_len(&self.text));
    }

    fn caret_index(&self) -> usize {
        self.caret
    }

    fn set_caret_index(&mut self, index: usize) {
        self.caret = index.min(char_len(&self.text));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_mid_string() {
        let mut field = TextField::new("helo").with_caret(3);
        insert_at_caret(&mut field, "l");
        assert_eq!(field.as_str(), "hello");
        assert_eq!(field.caret_index(), 4);
    }

    #[test]
    fn test_insert_multi_char_value() {
        let mut field = TextField::new("");
        insert_at_caret(&mut field, ".com");
        assert_eq!(field.as_str(), ".com");
        assert_eq!(field.caret_index(), 4);
    }

    #[test]
    fn test_backspace_removes_char_before_caret() {
        let mut field = TextField::new("hello");
        assert!(delete_before_caret(&mut field));
        assert!(delete_before_caret(&mut field));
        assert_eq!(field.as_str(), "hel");
        assert_eq!(field.caret_index(), 3);
    }

    #[test]
    fn test_backspace_every_position() {
        let text = "kiosk";
        for caret in 1..=text.len() {
            let mut field = TextField::new(text).with_caret(caret);
            assert!(delete_before_caret(&mut field));

            let mut expected = text.to_string();
            expected.remove(caret - 1);
            assert_eq!(field.as_str(), expected);
            assert_eq!(field.caret_index(), caret - 1);
        }
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut field = TextField::new("abc").with_caret(0);
        assert!(!delete_before_caret(&mut field));
        assert_eq!(field.as_str(), "abc");
        assert_eq!(field.caret_index(), 0);

        let mut empty = TextField::default();
        assert!(!delete_before_caret(&mut empty));
        assert_eq!(empty.as_str(), "");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut field = TextField::new("grüß");
        assert_eq!(field.caret_index(), 4);

        assert!(delete_before_caret(&mut field));
        assert_eq!(field.as_str(), "grü");

        field.set_caret_index(2);
        insert_at_caret(&mut field, "€");
        assert_eq!(field.as_str(), "gr€ü");
        assert_eq!(field.caret_index(), 3);
    }

    #[test]
    fn test_caret_is_clamped() {
        let field = TextField::new("ab").with_caret(10);
        assert_eq!(field.caret_index(), 2);

        /// A field that does not clamp by itself.
        struct Loose {
            text: String,
            caret: usize,
        }
        impl TextTarget for Loose {
            fn text(&self) -> String {
                self.text.clone()
            }
            fn set_text(&mut self, text: String) {
                self.text = text;
            }
            fn caret_index(&self) -> usize {
                self.caret
            }
            fn set_caret_index(&mut self, index: usize) {
                self.caret = index;
            }
        }

        let mut loose = Loose {
            text: "ab".into(),
            caret: 7,
        };
        insert_at_caret(&mut loose, "c");
        assert_eq!(loose.text, "abc");
        assert_eq!(loose.caret, 3);

        loose.caret = 9;
        assert!(delete_before_caret(&mut loose));
        assert_eq!(loose.text, "ab");
        assert_eq!(loose.caret, 2);
    }
}
