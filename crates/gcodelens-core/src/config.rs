//! Analyzer configuration
//!
//! Controls where extracted thumbnails are written and how they are
//! referenced. Supports JSON and TOML files; every field has a default, so a
//! partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Default directory thumbnails are written to
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "/var/www/html/gcode_previews";

/// Default public prefix under which the output directory is served
pub const DEFAULT_PUBLIC_URL_PREFIX: &str = "/gcode_previews";

/// Default thumbnail file extension
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Configuration for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Directory the decoded thumbnail is written into (created if absent)
    pub output_directory: PathBuf,
    /// Prefix of the returned thumbnail reference, e.g. `/gcode_previews`
    pub public_url_prefix: String,
    /// Extension of the thumbnail file, without the dot
    pub image_extension: String,
    /// Run thumbnail extraction and volume analysis on separate threads
    pub parallel: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            public_url_prefix: DEFAULT_PUBLIC_URL_PREFIX.to_string(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            parallel: false,
        }
    }
}

impl AnalyzerConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory
    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    /// Set the public reference prefix
    pub fn with_public_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_url_prefix = prefix.into();
        self
    }

    /// Enable or disable threaded analysis
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded analyzer config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.output_directory.as_os_str().is_empty() {
            return Err(invalid("output_directory", "must not be empty"));
        }

        if !self.public_url_prefix.starts_with('/') {
            return Err(invalid("public_url_prefix", "must start with '/'"));
        }

        if self.image_extension.is_empty() {
            return Err(invalid("image_extension", "must not be empty"));
        }

        if !self
            .image_extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(invalid("image_extension", "must be alphanumeric"));
        }

        Ok(())
    }

    /// Public reference for a file name inside the output directory
    pub fn public_reference(&self, file_name: &str) -> String {
        public_reference(&self.public_url_prefix, file_name)
    }
}

/// Join a public prefix and a file name with exactly one `/`
pub fn public_reference(prefix: &str, file_name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), file_name)
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
