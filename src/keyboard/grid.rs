// SPDX-License-Identifier: GPL-3.0-only

//! Key grid built from a layout.
//!
//! Keys in a row share the row's width in proportion to their `width` weight
//! (star sizing): a key of width 1.5 in a row whose weights sum to 10 gets
//! 15% of the space left after key spacing. Rows share the surface height
//! equally.
//!
//! The grid is built once per layout. Keys are addressed by [`KeyPosition`]
//! rather than looked up by name.

use serde::{Deserialize, Serialize};

use crate::app_settings;
use crate::layout::{Key, KeyType, Layout};

// ============================================================================
// Geometry Types
// ============================================================================

/// A point in keyboard coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal offset from the keyboard's left edge.
    pub x: f32,
    /// Vertical offset from the keyboard's top edge.
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A simple rectangle for bounds calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rectangle {
    /// Creates a new rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the center X coordinate.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Returns `true` if the point lies inside the rectangle (edges included).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Size and spacing of the surface the keyboard is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceMetrics {
    /// Surface width in logical pixels
    pub width: f32,
    /// Surface height in logical pixels
    pub height: f32,
    /// Vertical gap between rows
    pub row_spacing: f32,
    /// Horizontal gap between keys in a row
    pub key_spacing: f32,
}

impl Default for SurfaceMetrics {
    fn default() -> Self {
        Self {
            width: app_settings::DEFAULT_WIDTH,
            height: app_settings::DEFAULT_HEIGHT,
            row_spacing: app_settings::DEFAULT_KEY_SPACING,
            key_spacing: app_settings::DEFAULT_KEY_SPACING,
        }
    }
}

impl SurfaceMetrics {
    /// Creates metrics with the given size and no spacing.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            row_spacing: 0.0,
            key_spacing: 0.0,
        }
    }

    /// Sets both spacings.
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.row_spacing = spacing;
        self.key_spacing = spacing;
        self
    }
}

// ============================================================================
// Grid
// ============================================================================

/// Row and column of a key in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPosition {
    /// Zero-based row index, top to bottom.
    pub row: usize,
    /// Zero-based column index, left to right.
    pub column: usize,
}

impl KeyPosition {
    /// Creates a new key position.
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A key placed in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridKey {
    /// Where the key sits.
    pub position: KeyPosition,
    /// The key definition.
    pub key: Key,
    /// Sum of the weights of the keys left of this one.
    offset: f32,
}

/// Keys of one layout arranged into rows with relative geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyGrid {
    rows: Vec<Vec<GridKey>>,
    /// Sum of key weights per row.
    row_weights: Vec<f32>,
    shift_key: Option<KeyPosition>,
}

impl KeyGrid {
    /// Builds the grid for a layout.
    pub fn build(layout: &Layout) -> Self {
        let mut rows = Vec::with_capacity(layout.rows.len());
        let mut row_weights = Vec::with_capacity(layout.rows.len());
        let mut shift_key = None;

        for (row_idx, row) in layout.rows.iter().enumerate() {
            let mut offset = 0.0_f32;
            let mut grid_row = Vec::with_capacity(row.keys.len());

            for (column, key) in row.keys.iter().enumerate() {
                let position = KeyPosition::new(row_idx, column);
                if key.key_type == KeyType::Shift && shift_key.is_none() {
                    shift_key = Some(position);
                }

                grid_row.push(GridKey {
                    position,
                    key: key.clone(),
                    offset,
                });
                offset += key_weight(key);
            }

            rows.push(grid_row);
            row_weights.push(offset);
        }

        Self {
            rows,
            row_weights,
            shift_key,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Keys of one row, left to right.
    pub fn row(&self, row: usize) -> &[GridKey] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Looks up a key by position.
    pub fn key(&self, position: KeyPosition) -> Option<&GridKey> {
        self.rows.get(position.row)?.get(position.column)
    }

    /// Iterates over every key in row order.
    pub fn keys(&self) -> impl Iterator<Item = &GridKey> {
        self.rows.iter().flatten()
    }

    /// Position of the first shift key, used to highlight it while shift is active.
    pub fn shift_key(&self) -> Option<KeyPosition> {
        self.shift_key
    }

    /// Finds the first key whose value or display equals `text`.
    ///
    /// Keys that write text are preferred over modifier keys with the same label.
    pub fn position_of(&self, text: &str) -> Option<KeyPosition> {
        let matches = |grid_key: &&GridKey| {
            grid_key.key.value == text || grid_key.key.display == text
        };
        self.keys()
            .filter(matches)
            .find(|grid_key| grid_key.key.key_type.inserts_value())
            .or_else(|| self.keys().find(matches))
            .map(|grid_key| grid_key.position)
    }

    /// Position of the first key of the given type.
    pub fn position_of_type(&self, key_type: &KeyType) -> Option<KeyPosition> {
        self.keys()
            .find(|grid_key| &grid_key.key.key_type == key_type)
            .map(|grid_key| grid_key.position)
    }

    /// Bounds of a key on a surface.
    pub fn key_bounds(&self, position: KeyPosition, surface: &SurfaceMetrics) -> Option<Rectangle> {
        let grid_key = self.key(position)?;
        let row_keys = self.rows[position.row].len();
        let row_weight = self.row_weights[position.row];

        let (y, row_height) = self.row_span(position.row, surface);

        let gaps = surface.key_spacing * row_keys.saturating_sub(1) as f32;
        let available = (surface.width - gaps).max(0.0);
        let unit = if row_weight > 0.0 { available / row_weight } else { 0.0 };

        let x = grid_key.offset * unit + surface.key_spacing * position.column as f32;
        let width = key_weight(&grid_key.key) * unit;

        Some(Rectangle::new(x, y, width, row_height))
    }

    /// Finds the key under a point.
    pub fn key_at(&self, point: Point, surface: &SurfaceMetrics) -> Option<KeyPosition> {
        self.keys()
            .map(|grid_key| grid_key.position)
            .find(|&position| {
                self.key_bounds(position, surface)
                    .is_some_and(|bounds| bounds.contains(point))
            })
    }

    /// Top edge and height of a row.
    fn row_span(&self, row: usize, surface: &SurfaceMetrics) -> (f32, f32) {
        let rows = self.rows.len().max(1);
        let gaps = surface.row_spacing * (rows - 1) as f32;
        let row_height = ((surface.height - gaps) / rows as f32).max(0.0);
        let y = row as f32 * (row_height + surface.row_spacing);
        (y, row_height)
    }
}

/// Weight used for layout; non-positive widths never reach here after
/// validation, but hand-built layouts are guarded too.
fn key_weight(key: &Key) -> f32 {
    if key.width.is_finite() && key.width > 0.0 {
        key.width
    } else {
        1.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Row;

    fn sample_layout() -> Layout {
        Layout::new(
            "Sample",
            "xx",
            vec![
                Row::new(vec![Key::normal("q"), Key::normal("w"), Key::normal("e"), Key::normal("r")]),
                Row::new(vec![
                    Key::special(KeyType::Shift, "⇧").with_width(2.0),
                    Key::normal("z"),
                    Key::special(KeyType::Backspace, "⌫"),
                ]),
            ],
        )
    }

    #[test]
    fn test_build_positions_and_shift_key() {
        let grid = KeyGrid::build(&sample_layout());

        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.row(0).len(), 4);
        assert_eq!(grid.shift_key(), Some(KeyPosition::new(1, 0)));
        assert_eq!(grid.key(KeyPosition::new(1, 1)).unwrap().key.value, "z");
        assert!(grid.key(KeyPosition::new(5, 0)).is_none());
    }

    #[test]
    fn test_star_sizing_without_spacing() {
        let grid = KeyGrid::build(&sample_layout());
        let surface = SurfaceMetrics::new(400.0, 200.0);

        let w = grid.key_bounds(KeyPosition::new(0, 1), &surface).unwrap();
        assert_eq!(w, Rectangle::new(100.0, 0.0, 100.0, 100.0));

        let shift = grid.key_bounds(KeyPosition::new(1, 0), &surface).unwrap();
        assert_eq!(shift, Rectangle::new(0.0, 100.0, 200.0, 100.0));

        let backspace = grid.key_bounds(KeyPosition::new(1, 2), &surface).unwrap();
        assert_eq!(backspace, Rectangle::new(300.0, 100.0, 100.0, 100.0));
    }

    #[test]
    fn test_star_sizing_with_spacing() {
        let grid = KeyGrid::build(&sample_layout());
        let surface = SurfaceMetrics::new(430.0, 210.0).with_spacing(10.0);

        // Row 0: 4 keys, 3 gaps of 10 -> 400 / 4 = 100 per key
        let r = grid.key_bounds(KeyPosition::new(0, 3), &surface).unwrap();
        assert_eq!(r, Rectangle::new(330.0, 0.0, 100.0, 100.0));

        // Row 1 starts below the first row and the row gap
        let z = grid.key_bounds(KeyPosition::new(1, 1), &surface).unwrap();
        assert_eq!(z.y, 110.0);
    }

    #[test]
    fn test_key_at_hits_and_misses() {
        let grid = KeyGrid::build(&sample_layout());
        let surface = SurfaceMetrics::new(400.0, 200.0);

        assert_eq!(
            grid.key_at(Point::new(150.0, 150.0), &surface),
            Some(KeyPosition::new(1, 0))
        );
        assert_eq!(
            grid.key_at(Point::new(350.0, 50.0), &surface),
            Some(KeyPosition::new(0, 3))
        );
        assert_eq!(grid.key_at(Point::new(450.0, 50.0), &surface), None);
        assert_eq!(grid.key_at(Point::new(10.0, -5.0), &surface), None);
    }

    #[test]
    fn test_position_of_prefers_text_keys() {
        let layout = Layout::new(
            "Labels",
            "xx",
            vec![Row::new(vec![
                Key::special(KeyType::Done, "ok"),
                Key::normal("ok"),
            ])],
        );
        let grid = KeyGrid::build(&layout);

        assert_eq!(grid.position_of("ok"), Some(KeyPosition::new(0, 1)));
        assert_eq!(
            grid.position_of_type(&KeyType::Done),
            Some(KeyPosition::new(0, 0))
        );
        assert_eq!(grid.position_of("missing"), None);
    }

    #[test]
    fn test_empty_layout() {
        let grid = KeyGrid::build(&Layout::default());
        assert_eq!(grid.row_count(), 0);
        assert!(grid.row(0).is_empty());
        assert_eq!(grid.shift_key(), None);
        assert_eq!(grid.key_at(Point::new(1.0, 1.0), &SurfaceMetrics::default()), None);
    }
}
