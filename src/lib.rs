pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod text;
pub mod ui;

pub use crate::core::*;
pub use error::{LoadError, FilterParseError};
