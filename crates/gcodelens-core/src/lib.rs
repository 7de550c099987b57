//! # GCodeLens Core
//!
//! Core types, errors, and configuration for GCodeLens.
//! Provides the immutable document buffer, bounding-box accumulation,
//! the result records handed to output shells, and the analyzer config.

pub mod bounding_box;
pub mod config;
pub mod document;
pub mod error;
pub mod report;

pub use bounding_box::{BoundingBox, Point3};
pub use config::AnalyzerConfig;
pub use document::Document;
pub use error::{AnalysisError, ConfigError, ConfigResult, Result};
pub use report::{round_fraction, AnalysisResult, PartShare, VolumeReport, FRACTION_DECIMALS};
