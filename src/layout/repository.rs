// SPDX-License-Identifier: GPL-3.0-only

//! Layout repository keyed by language code.
//!
//! The repository scans a directory of layout files once, on the first call to
//! [`LayoutRepository::initialize`]. Broken files are logged and skipped. If no
//! layout could be loaded, the QWERTY layout compiled into the binary is used,
//! so a successfully initialized repository is never empty.
//!
//! One repository is shared by every keyboard instance through an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_embed::RustEmbed;

use crate::layout::parser::{parse_layout_file, parse_layout_from_string};
use crate::layout::types::{Layout, ParseError, ParseResult};

/// Name of the embedded fallback layout.
pub const EMBEDDED_DEFAULT_LAYOUT: &str = "qwerty.json";

/// Layout files compiled into the binary.
#[derive(RustEmbed)]
#[folder = "resources/layouts/"]
struct EmbeddedLayouts;

// ============================================================================
// Errors
// ============================================================================

/// Errors that leave the keyboard without anything to render.
#[derive(Debug)]
pub enum RepositoryError {
    /// The repository holds no layouts
    NoLayouts,

    /// Nothing was loaded from disk and the embedded layout failed too
    EmbeddedFallback {
        /// Name of the embedded resource
        resource: String,
        /// Why it could not be used
        reason: String,
        /// Parse failure, if the resource existed but did not parse
        source: Option<ParseError>,
    },
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::NoLayouts => write!(f, "No keyboard layouts available"),
            RepositoryError::EmbeddedFallback {
                resource, reason, ..
            } => write!(
                f,
                "Embedded keyboard layout '{}' could not be loaded: {}",
                resource, reason
            ),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::EmbeddedFallback {
                source: Some(source),
                ..
            } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Layouts in registration order with a code index.
#[derive(Debug, Default)]
struct Registry {
    layouts: Vec<Arc<Layout>>,
    index: HashMap<String, usize>,
    initialized: bool,
    /// Reason the last initialization failed; stops implicit retries
    failure: Option<String>,
}

impl Registry {
    /// Adds a layout. A layout with an already-known code replaces the old
    /// one and keeps its position.
    fn insert(&mut self, layout: Layout) {
        let code = layout.language_code.clone();
        let layout = Arc::new(layout);

        match self.index.get(&code) {
            Some(&slot) => {
                tracing::debug!("Replacing keyboard layout for '{}'", code);
                self.layouts[slot] = layout;
            }
            None => {
                self.index.insert(code, self.layouts.len());
                self.layouts.push(layout);
            }
        }
    }

    fn get(&self, language_code: &str) -> Option<&Arc<Layout>> {
        self.index
            .get(language_code)
            .map(|&slot| &self.layouts[slot])
    }
}

// ============================================================================
// Repository
// ============================================================================

/// Shared cache of keyboard layouts.
#[derive(Debug)]
pub struct LayoutRepository {
    /// Directory scanned for `*.json` layout files
    source_dir: Option<PathBuf>,

    /// Embedded resource used when nothing loads from disk
    fallback_resource: String,

    registry: RwLock<Registry>,
}

impl LayoutRepository {
    /// Creates a repository that loads layouts from `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: Some(source_dir.into()),
            fallback_resource: EMBEDDED_DEFAULT_LAYOUT.to_string(),
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Creates a repository that only ever holds the embedded layout and
    /// whatever is registered by hand.
    pub fn embedded_only() -> Self {
        Self {
            source_dir: None,
            fallback_resource: EMBEDDED_DEFAULT_LAYOUT.to_string(),
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Overrides the embedded resource used as fallback.
    pub fn with_fallback_resource(mut self, resource: impl Into<String>) -> Self {
        self.fallback_resource = resource.into();
        self
    }

    /// Returns the configured source directory.
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    /// Loads all layouts. Only the first successful call does any work.
    ///
    /// Lookups initialize the repository on demand, but only once: after a
    /// failure they report the remembered error until `initialize` is called
    /// again explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::EmbeddedFallback`] when nothing could be
    /// loaded from the source directory and the embedded layout is missing or
    /// broken. The repository stays uninitialized in that case.
    pub fn initialize(&self) -> Result<(), RepositoryError> {
        let mut registry = self.write();
        if registry.initialized {
            return Ok(());
        }

        if let Some(dir) = &self.source_dir {
            for layout in load_directory(dir) {
                registry.insert(layout);
            }
        }

        if registry.layouts.is_empty() {
            let layout = match load_embedded(&self.fallback_resource) {
                Ok(layout) => layout,
                Err(e) => {
                    tracing::error!("{}", e);
                    registry.failure = Some(match &e {
                        RepositoryError::EmbeddedFallback { reason, .. } => reason.clone(),
                        other => other.to_string(),
                    });
                    return Err(e);
                }
            };
            tracing::info!(
                "Loaded embedded keyboard layout: {} ({})",
                layout.name,
                layout.language_code
            );
            registry.insert(layout);
        }

        registry.initialized = true;
        registry.failure = None;
        tracing::info!("Keyboard layouts ready: {}", registry.layouts.len());
        Ok(())
    }

    /// Returns `true` once [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    /// Registers an already-parsed layout, replacing any layout with the same code.
    pub fn register(&self, layout: Layout) {
        self.write().insert(layout);
    }

    /// Returns the layout for `language_code`, or the first registered layout
    /// when there is no exact match.
    ///
    /// Initializes the repository on first use.
    ///
    /// # Errors
    ///
    /// Fails only when the repository is empty, which a successful
    /// initialization rules out.
    pub fn get_layout(&self, language_code: &str) -> Result<Arc<Layout>, RepositoryError> {
        self.initialize_once()?;

        let registry = self.read();
        if let Some(layout) = registry.get(language_code) {
            return Ok(Arc::clone(layout));
        }

        let fallback = registry
            .layouts
            .first()
            .cloned()
            .ok_or(RepositoryError::NoLayouts)?;
        tracing::debug!(
            "No keyboard layout for '{}', using '{}'",
            language_code,
            fallback.language_code
        );
        Ok(fallback)
    }

    /// Language codes in registration order.
    pub fn available_languages(&self) -> Vec<String> {
        self.ensure_initialized();
        self.read()
            .layouts
            .iter()
            .map(|layout| layout.language_code.clone())
            .collect()
    }

    /// `(language code, layout name)` pairs in registration order.
    pub fn available_layouts_with_names(&self) -> Vec<(String, String)> {
        self.ensure_initialized();
        self.read()
            .layouts
            .iter()
            .map(|layout| (layout.language_code.clone(), layout.name.clone()))
            .collect()
    }

    /// Number of registered layouts.
    pub fn len(&self) -> usize {
        self.read().layouts.len()
    }

    /// Returns `true` when no layouts are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerations never fail; they list whatever is registered.
    fn ensure_initialized(&self) {
        if let Err(e) = self.initialize_once() {
            tracing::debug!("Listing layouts of an uninitialized repository: {}", e);
        }
    }

    /// Initializes unless already done or already failed.
    fn initialize_once(&self) -> Result<(), RepositoryError> {
        {
            let registry = self.read();
            if registry.initialized {
                return Ok(());
            }
            if let Some(reason) = &registry.failure {
                if !registry.layouts.is_empty() {
                    return Ok(());
                }
                return Err(RepositoryError::EmbeddedFallback {
                    resource: self.fallback_resource.clone(),
                    reason: reason.clone(),
                    source: None,
                });
            }
        }
        self.initialize()
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Parses every `*.json` file in `dir`, sorted by file name.
///
/// Files that fail to parse are logged and skipped.
fn load_directory(dir: &Path) -> Vec<Layout> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot read keyboard layout directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_json_file(path))
        .collect();
    files.sort();

    files
        .iter()
        .filter_map(|path| match parse_layout_file(path) {
            Ok(result) => Some(accept(result)),
            Err(e) => {
                tracing::warn!("Skipping keyboard layout: {}", e);
                None
            }
        })
        .collect()
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Logs the warnings of a parsed layout and returns it.
fn accept(result: ParseResult<Layout>) -> Layout {
    if result.has_warnings() {
        tracing::warn!(
            "Layout '{}' has {} warning(s)",
            result.layout.language_code,
            result.warning_count()
        );
        for warning in &result.warnings {
            tracing::warn!("  {}", warning);
        }
    }
    tracing::info!(
        "Loaded keyboard layout: {} ({})",
        result.layout.name,
        result.layout.language_code
    );
    result.into_layout()
}

/// Reads and parses an embedded layout resource.
fn load_embedded(resource: &str) -> Result<Layout, RepositoryError> {
    let fail = |reason: String, source: Option<ParseError>| RepositoryError::EmbeddedFallback {
        resource: resource.to_string(),
        reason,
        source,
    };

    let file = EmbeddedLayouts::get(resource)
        .ok_or_else(|| fail("resource not found".to_string(), None))?;

    let json = std::str::from_utf8(&file.data)
        .map_err(|e| fail(format!("not valid UTF-8: {}", e), None))?;

    parse_layout_from_string(json)
        .map(|result| result.into_layout())
        .map_err(|e| fail(e.to_string(), Some(e)))
}

// ============================================================================
// Tests
// ============================================================================
