//! Handle configuration.
//!
//! All tunable behavior of a [`Phrasebook`](crate::Phrasebook) lives in one
//! [`PhrasebookConfig`] that can be built in code or loaded from JSON (and
//! TOML with the `config-file` feature):
//!
//! ```json
//! {
//!   "directory": "./locales",
//!   "locale": "es",
//!   "locale_fallback": "en",
//!   "update": true
//! }
//! ```
//!
//! # Defaults
//!
//! `directory` `./locales`, `locale` `en`, `locale_fallback` `en`,
//! `update` `true`. A partial config file keeps the defaults for any field
//! it omits.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a [`Phrasebook`](crate::Phrasebook) handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhrasebookConfig {
    /// Base folder containing one JSON file per locale.
    pub directory: PathBuf,

    /// Active locale used by every lookup.
    pub locale: String,

    /// Locale whose file is read when the active locale's file is absent.
    /// Empty string disables fallback.
    pub locale_fallback: String,

    /// When true, unseen keys are inserted into the dictionary and queued
    /// for persistence. When false the dictionary is read-only.
    pub update: bool,
}

impl Default for PhrasebookConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./locales"),
            locale: "en".to_owned(),
            locale_fallback: "en".to_owned(),
            update: true,
        }
    }
}

impl PhrasebookConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the locale directory.
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Set the active locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the fallback locale. Pass an empty string to disable fallback.
    #[must_use]
    pub fn with_locale_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.locale_fallback = fallback.into();
        self
    }

    /// Enable or disable dictionary updates.
    #[must_use]
    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid. An empty `locale_fallback` is valid (fallback disabled).
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.locale.is_empty() {
            errors.push("locale must not be empty".into());
        }
        if has_path_separator(&self.locale) {
            errors.push(format!(
                "locale must not contain path separators, got {:?}",
                self.locale
            ));
        }
        if has_path_separator(&self.locale_fallback) {
            errors.push(format!(
                "locale_fallback must not contain path separators, got {:?}",
                self.locale_fallback
            ));
        }
        if self.directory.as_os_str().is_empty() {
            errors.push("directory must not be empty".into());
        }

        errors
    }
}

/// Locale names become file names; keep them out of other directories.
fn has_path_separator(locale: &str) -> bool {
    locale.contains('/') || locale.contains('\\')
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
