// SPDX-License-Identifier: GPL-3.0-only

//! Layout parsing logic for loading JSON layout definitions.
//!
//! Property names in layout files are matched case-insensitively, so
//! `"languageCode"`, `"LanguageCode"` and `"languagecode"` all decode to the
//! same field. Unknown properties are ignored.

use crate::layout::types::{Layout, ParseError, ParseResult};
use crate::layout::validation::validate_layout;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Parses a keyboard layout from a JSON file.
///
/// I/O failures, JSON failures and fatal validation issues are all returned
/// as a `ParseError` that names the file.
///
/// # Example
///
/// ```rust,ignore
/// use kioskboard::layout::parse_layout_file;
///
/// match parse_layout_file("layouts/de-DE.json") {
///     Ok(result) => println!("Loaded layout: {}", result.layout.name),
///     Err(e) => eprintln!("Failed to parse layout: {}", e),
/// }
/// ```
pub fn parse_layout_file(path: impl AsRef<Path>) -> Result<ParseResult<Layout>, ParseError> {
    let path = path.as_ref();
    let display_path = path.display().to_string();

    let json_str = fs::read_to_string(path)
        .map_err(|e| ParseError::io_error(e, display_path.as_str()))?;

    parse_layout_from_string(&json_str).map_err(|e| e.with_file_path(display_path))
}

/// Parses a keyboard layout from a JSON string.
///
/// Use this for layouts that are already in memory, such as the embedded
/// fallback layout.
pub fn parse_layout_from_string(json: &str) -> Result<ParseResult<Layout>, ParseError> {
    let raw: Value = serde_json::from_str(json)?;

    let layout: Layout =
        serde_json::from_value(lowercase_keys(raw)).map_err(ParseError::json_error)?;

    validate_layout(layout)
}

/// Recursively lowercases every object key.
///
/// When two keys collide after lowercasing, the one appearing later in the
/// document wins. This relies on serde_json's `preserve_order` feature, which
/// keeps object keys in document order.
fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), lowercase_keys(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================
