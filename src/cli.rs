//! Command-line shell around the analysis pipeline
//!
//! Reads one G-code file, runs the orchestrator and renders the result as a
//! single JSON object. Failures render as `{"error": "..."}`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::json;

use gcodelens_analyzer::AnalysisOrchestrator;
use gcodelens_core::{AnalysisResult, AnalyzerConfig};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human friendly
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// Newline-delimited JSON
    Json,
}

/// Extract the embedded thumbnail and per-object volume shares from a G-code file
#[derive(Debug, Parser)]
#[command(name = "gcodelens", version, long_version = LONG_VERSION, about)]
pub struct Cli {
    /// G-code file to analyze
    #[arg(long)]
    pub file: PathBuf,

    /// Job identifier; names the thumbnail file
    #[arg(long = "jobid")]
    pub job_id: String,

    /// Directory the thumbnail is written to
    #[arg(long, env = "GCODELENS_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Public prefix of the returned thumbnail reference
    #[arg(long)]
    pub url_prefix: Option<String>,

    /// Analyzer config file (.json or .toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run thumbnail extraction and volume analysis on separate threads
    #[arg(long)]
    pub parallel: bool,

    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    /// Build the effective config: file values first, then flag overrides
    pub fn resolve_config(&self) -> anyhow::Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AnalyzerConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output_directory = dir.clone();
        }
        if let Some(prefix) = &self.url_prefix {
            config.public_url_prefix = prefix.clone();
        }
        if self.parallel {
            config.parallel = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Run the pipeline over `--file`
    pub fn execute(&self) -> anyhow::Result<AnalysisResult> {
        let config = self.resolve_config()?;
        tracing::debug!(?config, file = %self.file.display(), "Starting analysis");

        let result = AnalysisOrchestrator::new(&config).run_file(&self.file, &self.job_id)?;
        Ok(result)
    }
}

/// Serialize a result for stdout
pub fn render(result: &AnalysisResult, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
}

/// Serialize a fatal error for stdout
pub fn render_error(err: &anyhow::Error) -> String {
    json!({ "error": format!("{err:#}") }).to_string()
}
