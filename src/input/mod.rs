//! Key-hold tracking for computer-keyboard input.

/// Held-key set with repeat suppression and press/release callbacks.
pub mod keyboard;

pub use keyboard::{KeyEvent, KeyEventKind, KeyboardTracker};
