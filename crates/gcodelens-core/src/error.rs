//! Error types for GCodeLens
//!
//! Parsing-level anomalies (a missing thumbnail block, an undecodable payload,
//! a malformed move line) are recovered where they happen and never show up
//! here as fatal conditions. What remains are the failures a caller must act on:
//! - Analysis errors (storage, invalid job identifiers)
//! - Configuration errors (loading, validating, saving)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while analyzing a single document.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Reading the document or writing the thumbnail failed.
    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        /// The path that could not be read or written.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The job identifier cannot be turned into a file name.
    #[error("Invalid job id '{0}': must be non-empty and contain no path separators")]
    InvalidJobId(String),
}

impl AnalysisError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a storage error
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("Failed to access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("Invalid TOML config: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("Failed to serialize TOML config: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),

    /// A configuration value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
