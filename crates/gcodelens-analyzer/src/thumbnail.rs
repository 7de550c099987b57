//! Embedded thumbnail extraction
//!
//! Slicers embed a preview image as base64 inside comment lines:
//!
//! ```text
//! ; thumbnail begin 300x300 12496
//! ; iVBORw0KGgoAAAANSUhEUgAAASwAAAEsCAYAAAB5fY51AAAgAElEQVR4nO...
//! ; ...
//! ; thumbnail end
//! ```
//!
//! The first such block is located, stripped of its markers and comment
//! prefixes, decoded, and written to `<output_directory>/<job_id>.<ext>`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::Engine;
use image::ImageFormat;
use regex::Regex;

use gcodelens_core::config::public_reference;
use gcodelens_core::{AnalysisError, AnalyzerConfig, Document, Result};

use crate::error::{ThumbnailError, ThumbnailResult};

/// Standard alphabet with required padding; non-zero trailing bits in the
/// last symbol are tolerated, as some encoders emit them.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_allow_trailing_bits(true),
);

fn block_regex() -> &'static Regex {
    static BLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
    BLOCK_REGEX.get_or_init(|| {
        Regex::new(r"(?is)thumbnail\s+begin.*?thumbnail\s+end").expect("invalid regex pattern")
    })
}

fn header_regex() -> &'static Regex {
    static HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADER_REGEX.get_or_init(|| {
        Regex::new(r"(?is)^.*?thumbnail\s+begin[^\n\r;]*[;\n\r\s]+")
            .expect("invalid regex pattern")
    })
}

fn footer_regex() -> &'static Regex {
    static FOOTER_REGEX: OnceLock<Regex> = OnceLock::new();
    FOOTER_REGEX
        .get_or_init(|| Regex::new(r"(?is)thumbnail\s+end.*$").expect("invalid regex pattern"))
}

/// A decoded thumbnail payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedThumbnail {
    /// Raw image bytes, never empty
    pub bytes: Vec<u8>,
    /// Image format sniffed from the magic bytes, if recognised
    pub format: Option<ImageFormat>,
}

/// Find the first `thumbnail begin ... thumbnail end` block (case-insensitive)
pub fn find_thumbnail_block(text: &str) -> Option<&str> {
    block_regex().find(text).map(|m| m.as_str())
}

/// Strip the markers from a block and drop every non-base64 character
///
/// The header is removed through the end of the `begin` line (dimensions and
/// byte count included); everything from `thumbnail end` onward is removed.
/// What survives is filtered down to `A-Z a-z 0-9 + / =`, which discards the
/// per-line `; ` comment prefixes and line breaks.
pub fn clean_payload(block: &str) -> String {
    let without_header = header_regex().replace(block, "");
    let payload = footer_regex().replace(&without_header, "");

    payload
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect()
}

/// Locate and decode the embedded thumbnail
///
/// Returns `Ok(None)` when the document carries no thumbnail block.
///
/// # Errors
/// Returns [`ThumbnailError`] when a block exists but its payload is empty
/// or not valid padded base64.
pub fn decode_thumbnail(text: &str) -> ThumbnailResult<Option<DecodedThumbnail>> {
    let Some(block) = find_thumbnail_block(text) else {
        return Ok(None);
    };

    let cleaned = clean_payload(block);
    let bytes = PAYLOAD_ENGINE.decode(cleaned.as_bytes())?;
    if bytes.is_empty() {
        return Err(ThumbnailError::EmptyPayload);
    }

    let format = image::guess_format(&bytes).ok();
    Ok(Some(DecodedThumbnail { bytes, format }))
}

/// Check that a job id can be used verbatim as a file stem
pub fn validate_job_id(job_id: &str) -> Result<()> {
    let invalid = job_id.is_empty()
        || job_id == "."
        || job_id == ".."
        || job_id.contains(['/', '\\', '\0']);

    if invalid {
        Err(AnalysisError::InvalidJobId(job_id.to_string()))
    } else {
        Ok(())
    }
}

/// Extracts the embedded preview image and persists it under a job-derived name
#[derive(Debug, Clone)]
pub struct ThumbnailExtractor {
    output_directory: PathBuf,
    public_url_prefix: String,
    image_extension: String,
}

impl ThumbnailExtractor {
    /// Create an extractor writing into `output_directory` with default naming
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        let defaults = AnalyzerConfig::default();
        Self {
            output_directory: output_directory.into(),
            public_url_prefix: defaults.public_url_prefix,
            image_extension: defaults.image_extension,
        }
    }

    /// Create an extractor from the analyzer configuration
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            output_directory: config.output_directory.clone(),
            public_url_prefix: config.public_url_prefix.clone(),
            image_extension: config.image_extension.clone(),
        }
    }

    /// Directory thumbnails are written into
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// File name used for a job's thumbnail
    pub fn file_name(&self, job_id: &str) -> String {
        format!("{}.{}", job_id, self.image_extension)
    }

    /// Full path of a job's thumbnail file
    pub fn output_path(&self, job_id: &str) -> PathBuf {
        self.output_directory.join(self.file_name(job_id))
    }

    /// Extract, decode and persist the thumbnail of `document`
    ///
    /// Returns the public reference (e.g. `/gcode_previews/42.png`), or
    /// `None` if the document has no thumbnail or its payload is malformed.
    /// An existing file for the same job is overwritten.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidJobId`] if `job_id` is unusable as a
    /// file name, and [`AnalysisError::Storage`] if the directory or file
    /// cannot be written.
    pub fn extract(&self, document: &Document, job_id: &str) -> Result<Option<String>> {
        let thumbnail = match decode_thumbnail(document.text()) {
            Ok(Some(thumbnail)) => thumbnail,
            Ok(None) => {
                tracing::debug!("No thumbnail block found");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!("Thumbnail decode failed: {}", e);
                return Ok(None);
            }
        };

        validate_job_id(job_id)?;

        fs::create_dir_all(&self.output_directory)
            .map_err(|e| AnalysisError::storage(&self.output_directory, e))?;

        let path = self.output_path(job_id);
        fs::write(&path, &thumbnail.bytes).map_err(|e| AnalysisError::storage(&path, e))?;

        match thumbnail.format {
            Some(format) => tracing::debug!(
                "Thumbnail written to {} ({} bytes, {:?})",
                path.display(),
                thumbnail.bytes.len(),
                format
            ),
            None => tracing::debug!(
                "Thumbnail written to {} ({} bytes, unrecognised format)",
                path.display(),
                thumbnail.bytes.len()
            ),
        }

        Ok(Some(public_reference(
            &self.public_url_prefix,
            &self.file_name(job_id),
        )))
    }
}

/// Extract the thumbnail of `document` into `output_directory` with default naming
pub fn extract_thumbnail(
    document: &Document,
    output_directory: impl Into<PathBuf>,
    job_id: &str,
) -> Result<Option<String>> {
    ThumbnailExtractor::new(output_directory).extract(document, job_id)
}
