//! Reusable input components
//!
//! - `TextArea` - multi-line editor used for mock bodies
//! - `edit_line` - append/backspace editing for single-line form fields

mod text_area;
mod text_input;

pub use text_area::{EditorAction, TextArea};
pub use text_input::{edit_line, LineEdit};

// Re-export ecosystem widgets for convenience
pub use tui_popup::Popup;
