//! User interface module
//! 
//! Contains the TUI and its line-editing helpers

pub mod input;
pub mod tui;

// Re-export main types
pub use tui::{TuiApp, InputMode, Popup, PopupKind, setup_terminal, restore_terminal};
