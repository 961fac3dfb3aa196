// SPDX-License-Identifier: GPL-3.0-only

//! Core data types for keyboard layout definitions.
//!
//! A layout is a named, language-tagged grid of keys. This module holds the
//! layout data model together with the error and warning types produced while
//! decoding layout files.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Error Handling Types
// ============================================================================

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The layout cannot be registered
    Error,
    /// The layout is usable but something was corrected or looks odd
    Warning,
}

/// A validation issue discovered while checking a decoded layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity level (Error or Warning)
    pub severity: Severity,
    /// Human-readable description of the issue
    pub message: String,
    /// Path to the offending field (e.g., "rows[1].keys[2].width")
    pub field_path: String,
    /// Optional suggestion for how to fix the issue
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            field_path: field_path.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to the validation issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity_str = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };

        write!(f, "[{}] {}: {}", severity_str, self.field_path, self.message)?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

/// Why a layout definition was rejected.
///
/// The repository logs these and skips the definition, so each variant
/// carries the file it came from once one is known.
#[derive(Debug)]
pub enum ParseError {
    /// The layout file could not be read
    IoError {
        /// The underlying I/O error
        source: std::io::Error,
        /// File that could not be read
        file_path: String,
    },

    /// The text is not valid JSON or does not match the layout shape
    JsonError {
        /// The underlying JSON error
        source: serde_json::Error,
        /// File being parsed, unset for in-memory layouts
        file_path: Option<String>,
        /// Line of a syntax error, when serde_json knows it
        line_number: Option<usize>,
    },

    /// The layout decoded but cannot be registered
    ValidationError {
        /// Issues found, at least one with `Severity::Error`
        issues: Vec<ValidationIssue>,
        /// File being validated, unset for in-memory layouts
        file_path: Option<String>,
    },
}

impl ParseError {
    /// A read failure for `file_path`.
    pub fn io_error(source: std::io::Error, file_path: impl Into<String>) -> Self {
        Self::IoError {
            source,
            file_path: file_path.into(),
        }
    }

    /// A JSON failure not yet tied to a file.
    ///
    /// serde_json reports line 0 for errors that are not tied to a position
    /// in the input (type mismatches after decoding); those get no line.
    pub fn json_error(source: serde_json::Error) -> Self {
        let line_number = Some(source.line()).filter(|line| *line > 0);
        Self::JsonError {
            source,
            file_path: None,
            line_number,
        }
    }

    /// A rejection by validation.
    pub fn validation_error(issues: Vec<ValidationIssue>) -> Self {
        Self::ValidationError {
            issues,
            file_path: None,
        }
    }

    /// File the error refers to, if known.
    pub fn file_path(&self) -> Option<&str> {
        match self {
            Self::IoError { file_path, .. } => Some(file_path.as_str()),
            Self::JsonError { file_path, .. } | Self::ValidationError { file_path, .. } => {
                file_path.as_deref()
            }
        }
    }

    /// Attaches a file path unless the error already names one.
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        if let Self::JsonError { file_path, .. } | Self::ValidationError { file_path, .. } =
            &mut self
        {
            file_path.get_or_insert_with(|| path.into());
        }
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::IoError { source, file_path } => {
                write!(f, "cannot read layout file '{}': {}", file_path, source)
            }
            ParseError::JsonError {
                source,
                file_path,
                line_number,
            } => {
                f.write_str("invalid layout JSON")?;
                if let Some(path) = file_path {
                    write!(f, " in '{}'", path)?;
                }
                if let Some(line) = line_number {
                    write!(f, " at line {}", line)?;
                }
                write!(f, ": {}", source)
            }
            ParseError::ValidationError { issues, file_path } => {
                f.write_str("layout")?;
                if let Some(path) = file_path {
                    write!(f, " '{}'", path)?;
                }
                f.write_str(" rejected")?;
                let mut separator = ": ";
                for issue in issues {
                    write!(f, "{}{} ({})", separator, issue.message, issue.field_path)?;
                    separator = "; ";
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::IoError { source, .. } => Some(source),
            ParseError::JsonError { source, .. } => Some(source),
            ParseError::ValidationError { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::json_error(err)
    }
}

// ============================================================================
// ParseResult Type
// ============================================================================

/// A successfully parsed layout with any non-fatal warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult<T> {
    /// The successfully parsed layout
    pub layout: T,
    /// Non-fatal validation warnings
    pub warnings: Vec<ValidationIssue>,
}

impl<T> ParseResult<T> {
    /// Creates a new parse result with no warnings.
    pub fn new(layout: T) -> Self {
        Self {
            layout,
            warnings: Vec::new(),
        }
    }

    /// Creates a new parse result with warnings.
    pub fn with_warnings(layout: T, warnings: Vec<ValidationIssue>) -> Self {
        Self { layout, warnings }
    }

    /// Returns true if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Consumes the result and returns the layout, discarding warnings.
    pub fn into_layout(self) -> T {
        self.layout
    }
}

// ============================================================================
// Layout Data Structures
// ============================================================================

/// The action class of a key.
///
/// Type names are matched case-insensitively. Anything that is not one of the
/// known names is kept as `Other` and dispatched like a normal key, which is
/// how the legacy `"special"` type behaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeyType {
    /// Inserts `value` (or `shift_value` while shift is active)
    #[default]
    Normal,
    /// Toggles the one-shot shift modifier
    Shift,
    /// Deletes the character before the caret
    Backspace,
    /// Inserts a single space
    Space,
    /// Dismisses the keyboard
    Done,
    /// Spacer; does nothing
    Empty,
    /// Unrecognized type name, lowercased
    Other(String),
}

impl KeyType {
    /// Returns `true` for keys that write their value into the target field.
    pub fn inserts_value(&self) -> bool {
        matches!(self, KeyType::Normal | KeyType::Other(_))
    }

    /// Returns the canonical lowercase name of the type.
    pub fn as_str(&self) -> &str {
        match self {
            KeyType::Normal => "normal",
            KeyType::Shift => "shift",
            KeyType::Backspace => "backspace",
            KeyType::Space => "space",
            KeyType::Done => "done",
            KeyType::Empty => "empty",
            KeyType::Other(name) => name,
        }
    }
}

impl From<String> for KeyType {
    fn from(name: String) -> Self {
        let lowered = name.trim().to_lowercase();
        match lowered.as_str() {
            "" | "normal" => KeyType::Normal,
            "shift" => KeyType::Shift,
            "backspace" => KeyType::Backspace,
            "space" => KeyType::Space,
            "done" => KeyType::Done,
            "empty" => KeyType::Empty,
            _ => KeyType::Other(lowered),
        }
    }
}

impl From<KeyType> for String {
    fn from(key_type: KeyType) -> Self {
        key_type.as_str().to_string()
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default value for the `width` field.
fn default_width() -> f32 {
    1.0
}

/// A keyboard key definition.
///
/// Field names on the wire are camelCase (`shiftDisplay`, `shiftValue`); the
/// parser lowercases every property name before decoding, which is why the
/// deserialize names here are all lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Label shown on the key
    #[serde(default)]
    pub display: String,

    /// Text inserted when the key is pressed
    #[serde(default)]
    pub value: String,

    /// Label shown while shift is active
    #[serde(
        default,
        rename(serialize = "shiftDisplay", deserialize = "shiftdisplay"),
        skip_serializing_if = "Option::is_none"
    )]
    pub shift_display: Option<String>,

    /// Text inserted while shift is active
    #[serde(
        default,
        rename(serialize = "shiftValue", deserialize = "shiftvalue"),
        skip_serializing_if = "Option::is_none"
    )]
    pub shift_value: Option<String>,

    /// Action class of the key
    #[serde(default, rename = "type")]
    pub key_type: KeyType,

    /// Relative width weight within its row
    #[serde(default = "default_width")]
    pub width: f32,
}

impl Key {
    /// Creates a normal key that inserts `value` and displays it.
    pub fn normal(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            display: value.clone(),
            value,
            ..Self::default()
        }
    }

    /// Creates a key of the given type with a display label.
    pub fn special(key_type: KeyType, display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            key_type,
            ..Self::default()
        }
    }

    /// Sets the shifted label and value.
    pub fn with_shift(mut self, shift_value: impl Into<String>) -> Self {
        let shift_value = shift_value.into();
        self.shift_display = Some(shift_value.clone());
        self.shift_value = Some(shift_value);
        self
    }

    /// Sets the relative width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Returns the text this key inserts for the given shift state.
    ///
    /// An absent or empty shifted value falls back to `value`.
    pub fn output(&self, shift_active: bool) -> &str {
        match &self.shift_value {
            Some(shifted) if shift_active && !shifted.is_empty() => shifted,
            _ => &self.value,
        }
    }

    /// Returns the label for the given shift state.
    pub fn label(&self, shift_active: bool) -> &str {
        match &self.shift_display {
            Some(shifted) if shift_active && !shifted.is_empty() => shifted,
            _ => &self.display,
        }
    }
}

impl Default for Key {
    fn default() -> Self {
        Self {
            display: String::new(),
            value: String::new(),
            shift_display: None,
            shift_value: None,
            key_type: KeyType::Normal,
            width: default_width(),
        }
    }
}

/// A row of keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Keys in this row, left to right
    #[serde(default)]
    pub keys: Vec<Key>,
}

impl Row {
    /// Creates a row from keys.
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }
}

/// A complete keyboard layout definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Human-readable layout name, shown in language pickers
    #[serde(default)]
    pub name: String,

    /// Language code used as the repository lookup key (e.g. "en-US")
    #[serde(
        default,
        rename(serialize = "languageCode", deserialize = "languagecode")
    )]
    pub language_code: String,

    /// Rows of keys, top to bottom
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Layout {
    /// Creates a layout.
    pub fn new(name: impl Into<String>, language_code: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            language_code: language_code.into(),
            rows,
        }
    }

    /// Iterates over every key in row order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.rows.iter().flat_map(|row| row.keys.iter())
    }
}

// ============================================================================
// Tests
// ============================================================================
