// SPDX-License-Identifier: GPL-3.0-only

//! The on-screen keyboard: key grid, popup and the controller tying them to
//! the bound text field.

pub mod controller;
pub mod grid;
pub mod message;
pub mod popup;
pub mod timer;

pub use controller::{KeyboardController, KeyboardState, KeyboardView, TapTarget};
pub use grid::{GridKey, KeyGrid, KeyPosition, Point, Rectangle, SurfaceMetrics};
pub use message::KeyboardEvent;
pub use popup::{
    PopupConfig, PopupPlacement, PopupPresenter, PopupPreview, calculate_popup_position,
    popup_text,
};
pub use timer::TimerSlot;
