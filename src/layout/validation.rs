// SPDX-License-Identifier: GPL-3.0-only

//! Validation rules for keyboard layout definitions.
//!
//! Validation is permissive: problems that can be corrected are fixed in place
//! and reported as warnings. Only a missing language code is fatal, since a
//! layout without one cannot be looked up.

use crate::layout::types::{Key, KeyType, Layout, ParseError, ParseResult, Severity, ValidationIssue};

/// Relative widths above this value get a warning.
const MAX_REASONABLE_WIDTH: f32 = 10.0;

/// Validates a layout and returns it with warnings.
pub fn validate_layout(mut layout: Layout) -> Result<ParseResult<Layout>, ParseError> {
    let mut warnings = Vec::new();

    validate_required_fields(&layout, &mut warnings)?;
    validate_rows(&mut layout, &mut warnings);

    Ok(collect_warnings(layout, warnings))
}

/// Checks layout-level fields.
///
/// Returns an error when the language code is empty.
pub fn validate_required_fields(
    layout: &Layout,
    warnings: &mut Vec<ValidationIssue>,
) -> Result<(), ParseError> {
    if layout.language_code.trim().is_empty() {
        return Err(ParseError::validation_error(vec![
            ValidationIssue::new(Severity::Error, "Language code is empty", "languageCode")
                .with_suggestion("Set languageCode to a unique code such as 'en-US'"),
        ]));
    }

    if layout.name.is_empty() {
        warnings.push(
            ValidationIssue::new(Severity::Warning, "Layout name is empty", "name")
                .with_suggestion("Provide a name to show in the language picker"),
        );
    }

    if layout.rows.is_empty() {
        warnings.push(ValidationIssue::new(
            Severity::Warning,
            "Layout has no rows",
            "rows",
        ));
    }

    Ok(())
}

/// Validates every row and key, correcting widths in place.
fn validate_rows(layout: &mut Layout, warnings: &mut Vec<ValidationIssue>) {
    for (row_idx, row) in layout.rows.iter_mut().enumerate() {
        if row.keys.is_empty() {
            warnings.push(ValidationIssue::new(
                Severity::Warning,
                "Row has no keys",
                format!("rows[{}].keys", row_idx),
            ));
        }

        for (key_idx, key) in row.keys.iter_mut().enumerate() {
            let key_path = format!("rows[{}].keys[{}]", row_idx, key_idx);
            validate_key(key, &key_path, warnings);
        }
    }
}

/// Validates a single key.
fn validate_key(key: &mut Key, key_path: &str, warnings: &mut Vec<ValidationIssue>) {
    validate_width(key, key_path, warnings);

    match &key.key_type {
        KeyType::Normal => {
            if key.display.is_empty() {
                warnings.push(
                    ValidationIssue::new(
                        Severity::Warning,
                        "Key display is empty",
                        format!("{}.display", key_path),
                    )
                    .with_suggestion("Provide a label, or use type 'empty' for a spacer"),
                );
            }
            if key.value.is_empty() {
                warnings.push(ValidationIssue::new(
                    Severity::Warning,
                    "Key value is empty; pressing it inserts nothing",
                    format!("{}.value", key_path),
                ));
            }
        }
        // Legacy styling hint, dispatched as normal
        KeyType::Other(name) if name == "special" => {}
        KeyType::Other(name) => {
            warnings.push(
                ValidationIssue::new(
                    Severity::Warning,
                    format!("Unknown key type '{}', treated as normal", name),
                    format!("{}.type", key_path),
                )
                .with_suggestion("Use one of: normal, shift, backspace, space, done, empty"),
            );
        }
        _ => {}
    }
}

/// Replaces non-positive or non-finite widths with 1.0.
fn validate_width(key: &mut Key, key_path: &str, warnings: &mut Vec<ValidationIssue>) {
    let field_path = format!("{}.width", key_path);

    if !key.width.is_finite() || key.width <= 0.0 {
        warnings.push(
            ValidationIssue::new(
                Severity::Warning,
                format!("Key width {} is not positive, using 1.0", key.width),
                field_path,
            )
            .with_suggestion("Use a positive number (e.g., 1.0 for standard size)"),
        );
        key.width = 1.0;
    } else if key.width > MAX_REASONABLE_WIDTH {
        warnings.push(
            ValidationIssue::new(
                Severity::Warning,
                format!("Key width {} is unusually large", key.width),
                field_path,
            )
            .with_suggestion("Typical key widths are between 0.5 and 5.0"),
        );
    }
}

/// Sorts warnings by field path and wraps them with the layout.
pub fn collect_warnings(layout: Layout, mut warnings: Vec<ValidationIssue>) -> ParseResult<Layout> {
    warnings.sort_by(|a, b| match (a.severity, b.severity) {
        (Severity::Error, Severity::Warning) => std::cmp::Ordering::Less,
        (Severity::Warning, Severity::Error) => std::cmp::Ordering::Greater,
        _ => a.field_path.cmp(&b.field_path),
    });

    ParseResult::with_warnings(layout, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::Row;

    fn layout_with(keys: Vec<Key>) -> Layout {
        Layout::new("Test", "en-US", vec![Row::new(keys)])
    }

    #[test]
    fn test_valid_layout_has_no_warnings() {
        let result = validate_layout(layout_with(vec![
            Key::normal("a").with_shift("A"),
            Key::special(KeyType::Backspace, "⌫"),
        ]))
        .unwrap();

        assert!(!result.has_warnings(), "{:?}", result.warnings);
    }

    #[test]
    fn test_empty_language_code_is_fatal() {
        let layout = Layout::new("No code", "  ", vec![]);

        match validate_layout(layout).unwrap_err() {
            ParseError::ValidationError { issues, .. } => {
                assert_eq!(issues[0].severity, Severity::Error);
                assert_eq!(issues[0].field_path, "languageCode");
            }
            other => panic!("Expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_width_is_corrected() {
        let result = validate_layout(layout_with(vec![
            Key::normal("a").with_width(0.0),
            Key::normal("b").with_width(-2.0),
            Key::normal("c").with_width(f32::NAN),
        ]))
        .unwrap();

        assert_eq!(result.warning_count(), 3);
        assert!(result.layout.keys().all(|key| key.width == 1.0));
    }

    #[test]
    fn test_large_width_warns_but_is_kept() {
        let result = validate_layout(layout_with(vec![Key::normal("a").with_width(12.0)])).unwrap();

        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.layout.rows[0].keys[0].width, 12.0);
    }

    #[test]
    fn test_unknown_type_warns_but_special_does_not() {
        let mut special = Key::normal("@");
        special.key_type = KeyType::Other("special".into());
        let mut unknown = Key::normal("#");
        unknown.key_type = KeyType::Other("macro".into());

        let result = validate_layout(layout_with(vec![special, unknown])).unwrap();

        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.warnings[0].field_path, "rows[0].keys[1].type");
    }

    #[test]
    fn test_spacer_keys_need_no_label() {
        let result = validate_layout(layout_with(vec![
            Key::special(KeyType::Empty, "").with_width(0.5),
            Key::special(KeyType::Space, ""),
        ]))
        .unwrap();

        assert!(!result.has_warnings());
    }

    #[test]
    fn test_empty_rows_and_name_warn() {
        let layout = Layout::new("", "en-US", vec![Row::default()]);
        let result = validate_layout(layout).unwrap();

        let paths: Vec<&str> = result.warnings.iter().map(|w| w.field_path.as_str()).collect();
        assert_eq!(paths, vec!["name", "rows[0].keys"]);
    }
}
