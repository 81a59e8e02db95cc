//! Configuration for the tagforge CLI.
//!
//! Loaded once at startup from `~/.tagforge/config.yaml` (or `--config`),
//! merged over the built-in defaults, then overridden by `TAGFORGE_*`
//! environment variables and finally by command-line flags.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::color::{palette_color, ColorMode, PALETTE_COLORS};

/// Environment variable overriding `dataset.imageExtensions` (comma-separated).
pub const IMAGE_EXTENSIONS_ENV: &str = "TAGFORGE_IMAGE_EXTENSIONS";
/// Environment variable overriding `dataset.sidecarExtension`.
pub const SIDECAR_EXTENSION_ENV: &str = "TAGFORGE_SIDECAR_EXTENSION";

// ============================================================================
// ConfigError
// ============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A value that cannot work. `hint` says how to fix it.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String, hint: String },
}

// ============================================================================
// AppConfig
// ============================================================================

/// User-level configuration.
///
/// # Example YAML
///
/// ```yaml
/// translate:
///   language: zh-CN
/// ui:
///   color: auto
///   palette:
///     1girl: magenta
///     outdoors: green
/// dataset:
///   imageExtensions: [png, jpg, webp]
///   sidecarExtension: txt
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub translate: TranslateConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,
}

impl AppConfig {
    /// Load from an explicit path. A missing file yields defaults.
    ///
    /// The result is not validated; [`AppConfig::load`] validates once the
    /// environment overrides are in.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("Config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the effective config: file (or defaults), then `TAGFORGE_*`
    /// overrides from `lookup`, then validation.
    ///
    /// Returns the config with its non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, or when the merged
    /// config is invalid.
    pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<(Self, Vec<String>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup);
        let warnings = config.validate()?;
        Ok((config, warnings))
    }

    fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file parses as YAML null.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Get the default config directory (`~/.tagforge`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".tagforge"))
    }

    /// Get the default config file path (`~/.tagforge/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        Self::default_dir().map(|d| d.join("config.yaml"))
    }

    /// Apply `TAGFORGE_*` overrides. `lookup` is usually `std::env::var`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(IMAGE_EXTENSIONS_ENV) {
            self.dataset.image_extensions = value
                .split(',')
                .map(str::trim)
                .filter(|ext| !ext.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = lookup(SIDECAR_EXTENSION_ENV) {
            self.dataset.sidecar_extension = value.trim().to_string();
        }
    }

    /// Validate the configuration, returning non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first fatal problem.
    pub fn validate(&self) -> Result<Vec<String>, ConfigError> {
        let mut warnings = self.dataset.validate()?;
        warnings.extend(self.ui.validate()?);
        if self.translate.language.trim().is_empty() {
            warnings.push("translate.language is empty".to_string());
        }
        Ok(warnings)
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Translation target, kept so existing config files stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateConfig {
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "zh-CN".to_string()
}

/// Terminal output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub color: ColorMode,

    /// Tag → colour name used when listing tags.
    #[serde(default)]
    pub palette: BTreeMap<String, String>,
}

impl UiConfig {
    fn validate(&self) -> Result<Vec<String>, ConfigError> {
        let mut warnings = Vec::new();
        for (tag, color) in &self.palette {
            if palette_color(color).is_none() {
                return Err(ConfigError::Invalid {
                    message: format!("ui.palette.{} has unknown colour '{}'", tag, color),
                    hint: format!("Use one of: {}", PALETTE_COLORS.join(", ")),
                });
            }
            if tag.trim().is_empty() {
                warnings.push("ui.palette has an entry for an empty tag".to_string());
            }
        }
        Ok(warnings)
    }

    /// Resolved palette. Entries with unknown colours are skipped.
    pub fn palette(&self) -> HashMap<String, AnsiColors> {
        self.palette
            .iter()
            .filter_map(|(tag, color)| palette_color(color).map(|c| (tag.clone(), c)))
            .collect()
    }
}

/// Dataset layout: which files are records and where their tags live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    #[serde(default = "default_sidecar_extension")]
    pub sidecar_extension: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            image_extensions: default_image_extensions(),
            sidecar_extension: default_sidecar_extension(),
        }
    }
}

fn default_image_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string()]
}

fn default_sidecar_extension() -> String {
    "txt".to_string()
}

fn bare_extension(ext: &str) -> &str {
    ext.trim().trim_start_matches('.')
}

impl DatasetConfig {
    fn validate(&self) -> Result<Vec<String>, ConfigError> {
        let mut warnings = Vec::new();

        if self.image_extensions.iter().all(|ext| bare_extension(ext).is_empty()) {
            return Err(ConfigError::Invalid {
                message: "dataset.imageExtensions is empty".to_string(),
                hint: "List at least one extension, e.g. [png, jpg]".to_string(),
            });
        }
        let sidecar = self.sidecar_extension();
        if sidecar.is_empty() {
            return Err(ConfigError::Invalid {
                message: "dataset.sidecarExtension is empty".to_string(),
                hint: "Set sidecarExtension to the tag file extension, e.g. txt".to_string(),
            });
        }
        if self.is_image_extension(sidecar) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "dataset.sidecarExtension '{}' is also an image extension",
                    sidecar
                ),
                hint: "Tag files must use an extension no image uses".to_string(),
            });
        }

        for ext in &self.image_extensions {
            if ext.trim().starts_with('.') {
                warnings.push(format!(
                    "dataset.imageExtensions entry '{}' has a leading dot; it is ignored",
                    ext
                ));
            }
        }
        Ok(warnings)
    }

    /// The sidecar extension without a leading dot.
    pub fn sidecar_extension(&self) -> &str {
        bare_extension(&self.sidecar_extension)
    }

    /// Check an extension (without dot) against `imageExtensions`, ignoring case.
    pub fn is_image_extension(&self, ext: &str) -> bool {
        self.image_extensions
            .iter()
            .map(|candidate| bare_extension(candidate))
            .any(|candidate| !candidate.is_empty() && candidate.eq_ignore_ascii_case(ext))
    }

    /// Check whether a path names an image record.
    pub fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.is_image_extension(ext))
    }

    /// Check whether a path names a sidecar file.
    pub fn is_sidecar(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.sidecar_extension()))
    }
}
