//! Migration settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Timestamp used when a migrated resource has no recorded creation time
pub const DEFAULT_TIMESTAMP: &str = "2024-01-01T00:00:00Z";

/// Settings shared by every document in one migration run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Schema generation the documents are written for
    pub source_version: String,
    /// Schema generation to migrate to
    pub target_version: String,
    /// Fallback for `created_on` / `modified_on`
    pub default_timestamp: String,
    /// Rewrite `old_type.` references after renaming resource types
    pub rename_references: bool,
    /// Re-layout configuration output
    pub format_output: bool,
}

impl MigrateConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With version pair
    #[inline]
    #[must_use]
    pub fn with_versions(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_version = source.into();
        self.target_version = target.into();
        self
    }

    /// With default timestamp
    #[inline]
    #[must_use]
    pub fn with_default_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.default_timestamp = timestamp.into();
        self
    }

    /// With reference rename pass enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_rename_references(mut self, enabled: bool) -> Self {
        self.rename_references = enabled;
        self
    }

    /// With output formatting enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_format_output(mut self, enabled: bool) -> Self {
        self.format_output = enabled;
        self
    }

    /// Parse settings from TOML; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] for malformed TOML or mistyped keys.
    pub fn from_toml_str(src: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(src)?)
    }

    /// Load settings from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be read, or
    /// [`SettingsError::Parse`] if it is not valid settings TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&src)?;
        tracing::debug!(path = %path.display(), ?config, "loaded migration settings");
        Ok(config)
    }
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            source_version: "v4".to_string(),
            target_version: "v5".to_string(),
            default_timestamp: DEFAULT_TIMESTAMP.to_string(),
            rename_references: true,
            format_output: true,
        }
    }
}

/// Settings loading failure
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read
    #[error("failed to read settings {path}: {source}")]
    Io {
        /// Settings file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid settings TOML
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}
