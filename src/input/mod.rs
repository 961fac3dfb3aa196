// SPDX-License-Identifier: GPL-3.0-only

//! Input-side collaborators of the keyboard controller.
//!
//! - **Target binding**: the [`TextTarget`] trait over the field being edited,
//!   with caret-based insert and delete helpers
//! - **Shift state**: the one-shot shift modifier
//! - **Focus coordination**: the deferred check run after the bound field
//!   loses focus
//!
//! # Example
//!
//! ```rust,ignore
//! use kioskboard::input::{insert_at_caret, TextField, TextTarget};
//!
//! let mut field = TextField::new("helo").with_caret(3);
//! insert_at_caret(&mut field, "l");
//! assert_eq!(field.text(), "hello");
//! ```

// Sub-modules
pub mod focus;
pub mod shift;
pub mod target;

// Re-export public API
pub use focus::{DeferredFocusCheck, FocusOwner};
pub use shift::ShiftState;
pub use target::{TargetHandle, TextField, TextTarget, delete_before_caret, insert_at_caret};

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    /// A concrete field can be shared as a trait-object handle while the
    /// host keeps typed access.
    #[test]
    fn test_handle_shares_field() {
        let field = TextField::new("").into_handle();
        let handle: TargetHandle = field.clone();

        insert_at_caret(&mut *handle.borrow_mut(), "ok");

        assert_eq!(field.borrow().as_str(), "ok");
        assert_eq!(field.borrow().caret_index(), 2);
        assert_eq!(Rc::strong_count(&field), 2);
    }
}
