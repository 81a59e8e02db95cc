//! Message styling for CLI output.
//!
//! Provides consistent prefixes, colors, and formatting for all CLI messages.
//!
//! ## Message Types
//!
//! | Prefix | Meaning | Color |
//! |--------|---------|-------|
//! | `[ok]` | Success | Green |
//! | `[err]` | Error | Red |
//! | `[warn]` | Warning | Yellow |
//! | `[info]` | Information | Blue |
//! | `[hint]` | Suggestion | Cyan |
//! | `[skip]` | Skipped | Dim |

use std::collections::HashMap;

use owo_colors::{AnsiColors, OwoColorize};

use super::color::ColorMode;

/// Message severity/type for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Success - operation completed successfully
    Ok,
    /// Error - operation failed, cannot continue
    Err,
    /// Warning - operation succeeded with caveats
    Warn,
    /// Information - neutral status update
    Info,
    /// Hint - actionable next step or tip
    Hint,
    /// Skipped - nothing to do
    Skip,
}

impl MessageType {
    /// Returns the prefix text for this message type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ok => "[ok]",
            Self::Err => "[err]",
            Self::Warn => "[warn]",
            Self::Info => "[info]",
            Self::Hint => "[hint]",
            Self::Skip => "[skip]",
        }
    }
}

/// Main styling interface for CLI output.
///
/// Carries the color mode and the tag palette from configuration, so every
/// handler renders tags the same way.
#[derive(Debug, Clone, Default)]
pub struct Style {
    color_mode: ColorMode,
    palette: HashMap<String, AnsiColors>,
}

impl Style {
    /// Create a Style instance with an explicit color mode and no palette.
    pub fn new(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            palette: HashMap::new(),
        }
    }

    /// Attach per-tag colours.
    pub fn with_palette(mut self, palette: HashMap<String, AnsiColors>) -> Self {
        self.palette = palette;
        self
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(&self) -> bool {
        self.color_mode.is_enabled()
    }

    /// Palette colour for a tag, if one is configured.
    pub fn tag_color(&self, tag: &str) -> Option<AnsiColors> {
        self.palette.get(tag).copied()
    }

    /// Format a simple message with a type prefix.
    ///
    /// ```text
    /// [ok] Done
    /// ```
    pub fn message(&self, msg_type: MessageType, text: &str) -> String {
        let prefix = msg_type.prefix();
        if self.colors_enabled() {
            let colored_prefix = match msg_type {
                MessageType::Ok => prefix.green().to_string(),
                MessageType::Err => prefix.red().to_string(),
                MessageType::Warn => prefix.yellow().to_string(),
                MessageType::Info => prefix.blue().to_string(),
                MessageType::Hint => prefix.cyan().to_string(),
                MessageType::Skip => prefix.dimmed().to_string(),
            };
            format!("{} {}", colored_prefix, text)
        } else {
            format!("{} {}", prefix, text)
        }
    }

    /// Format a structured error with optional cause and hint.
    ///
    /// ```text
    /// [err] Failed to load configuration
    ///       Cause: invalid YAML
    ///       Hint: Run `tagforge config check`
    /// ```
    pub fn error_with_context(
        &self,
        msg: &str,
        cause: Option<&str>,
        hint: Option<&str>,
    ) -> String {
        let mut output = self.message(MessageType::Err, msg);

        if let Some(cause_text) = cause {
            output.push('\n');
            output.push_str(&format!("      Cause: {}", cause_text));
        }

        if let Some(hint_text) = hint {
            output.push('\n');
            output.push_str(&format!("      Hint: {}", hint_text));
        }

        output
    }

    /// Format a list item with a prefix marker.
    ///
    /// The prefix `+` is colored green, `-` is colored red.
    pub fn list_item(&self, prefix: &str, text: &str) -> String {
        let styled_prefix = if self.colors_enabled() {
            match prefix {
                "+" => prefix.green().to_string(),
                "-" => prefix.red().to_string(),
                _ => prefix.to_string(),
            }
        } else {
            prefix.to_string()
        };
        format!("  {} {}", styled_prefix, text)
    }

    /// Format a key-value pair with optional coloring.
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.colors_enabled() {
            format!("{}: {}", key.dimmed(), value)
        } else {
            format!("{}: {}", key, value)
        }
    }

    /// Format a file path (colored cyan).
    pub fn file_path(&self, path: &str) -> String {
        if self.colors_enabled() {
            path.cyan().to_string()
        } else {
            path.to_string()
        }
    }

    /// Format a tag in its palette colour.
    pub fn tag(&self, tag: &str) -> String {
        match self.tag_color(tag) {
            Some(color) if self.colors_enabled() => tag.color(color).to_string(),
            _ => tag.to_string(),
        }
    }

    /// Format a tag list as `a, b, c` with palette colours.
    pub fn tag_list<S: AsRef<str>>(&self, tags: &[S]) -> String {
        tags.iter()
            .map(|tag| self.tag(tag.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
