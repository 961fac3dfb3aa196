// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard layout definitions and the layout repository.
//!
//! A layout file describes one language: a name, a language code used as the
//! lookup key, and rows of keys.
//!
//! ```json
//! {
//!     "name": "English (US)",
//!     "languageCode": "en-US",
//!     "rows": [
//!         { "keys": [
//!             { "display": "q", "value": "q", "shiftDisplay": "Q", "shiftValue": "Q" },
//!             { "display": "⌫", "value": "", "type": "backspace", "width": 1.5 }
//!         ] }
//!     ]
//! }
//! ```
//!
//! Property names are case-insensitive and unknown properties are ignored.
//! `type` defaults to `"normal"` and `width` to `1.0`.
//!
//! # Loading
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kioskboard::layout::LayoutRepository;
//!
//! let repository = Arc::new(LayoutRepository::new("/usr/share/kioskboard/layouts"));
//! repository.initialize()?;
//!
//! // Unknown codes fall back to the first registered layout.
//! let layout = repository.get_layout("de-DE")?;
//! println!("{} has {} rows", layout.name, layout.rows.len());
//! ```

// Sub-modules
pub mod parser;
pub mod repository;
pub mod types;
pub mod validation;

// Re-export public API - Error handling types
pub use types::{ParseError, ParseResult, Severity, ValidationIssue};

// Re-export public API - Parser functions
pub use parser::{parse_layout_file, parse_layout_from_string};

// Re-export public API - Repository
pub use repository::{EMBEDDED_DEFAULT_LAYOUT, LayoutRepository, RepositoryError};

// Re-export public API - Data structures
pub use types::{Key, KeyType, Layout, Row};

// ============================================================================
// Public API Integration Tests
// ============================================================================
