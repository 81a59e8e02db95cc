//! # CLI UI Module
//!
//! Styling and formatting layer for tagforge CLI output.
//!
//! ## Design Principles
//!
//! 1. **Scannable**: every result line starts with a typed prefix (`[ok]`, `[err]`, ...)
//! 2. **Accessible**: works without colors (respects `NO_COLOR`)
//! 3. **Scriptable**: machine-parseable with the `--json` flag
//!
//! ## Module Structure
//!
//! - `color`: color mode detection and palette colour names
//! - `style`: message types, prefixes and tag colouring
//! - `format`: tag list and text formatters
//! - `table`: table rendering with comfy-table

pub mod color;
pub mod format;
pub mod style;
pub mod table;

// Re-export main types for convenient access
pub use color::ColorMode;
pub use style::{MessageType, Style};
