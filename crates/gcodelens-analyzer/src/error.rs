//! Error types for the analyzer crate.
//!
//! Thumbnail errors never abort a run: the extractor logs them and reports
//! "no thumbnail". Fatal conditions use [`gcodelens_core::AnalysisError`].

use thiserror::Error;

/// Errors that can occur while decoding an embedded thumbnail payload.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    /// The cleaned payload is not valid padded base64.
    #[error("Base64 decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The block contained no payload characters at all.
    #[error("Thumbnail payload is empty")]
    EmptyPayload,
}

/// Result type alias for thumbnail decoding.
pub type ThumbnailResult<T> = Result<T, ThumbnailError>;
