//! # GCodeLens
//!
//! Looks inside sliced G-code jobs and reports:
//! - the slicer-embedded preview thumbnail, decoded and written to disk
//! - each printed object's share of the job's bounding-box volume
//!
//! ## Architecture
//!
//! GCodeLens is organized as a workspace with multiple crates:
//!
//! 1. **gcodelens-core** - Document buffer, bounding boxes, result records, config, errors
//! 2. **gcodelens-analyzer** - Thumbnail extractor, object volume analyzer, orchestrator
//! 3. **gcodelens** - Command-line shell that prints one JSON record per job

pub mod cli;

pub use cli::{render, render_error, Cli, LogFormat};

pub use gcodelens_analyzer::{
    analyze_per_part_volume, extract_thumbnail, run, AnalysisOrchestrator, ObjectVolumeAnalyzer,
    ThumbnailExtractor,
};

pub use gcodelens_core::{
    AnalysisError, AnalysisResult, AnalyzerConfig, BoundingBox, Document, PartShare, Point3,
    VolumeReport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, keeping stdout for the JSON result
/// - RUST_LOG environment variable support (defaults to `info`)
/// - Pretty, compact or JSON formatting
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .compact(),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(true)
                    .json(),
            )
            .try_init()?,
    }

    Ok(())
}
