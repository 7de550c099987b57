//! In-memory G-code document
//!
//! A document is read once, decoded leniently and never mutated afterwards.
//! Every analysis borrows it immutably, so independent passes can share it
//! across threads.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{AnalysisError, Result};

/// Files above this size are still read whole, but we say so in the log.
const LARGE_DOCUMENT_BYTES: u64 = 500 * 1024 * 1024;

/// An immutable G-code document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    /// Wrap already-loaded text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a document from disk
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected;
    /// slicer output regularly carries stray Latin-1 in comments.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Storage`] with the offending path if the file
    /// does not exist, is not a regular file, or cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let metadata = fs::metadata(path).map_err(|e| AnalysisError::storage(path, e))?;
        if !metadata.is_file() {
            return Err(AnalysisError::storage(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "path is not a file"),
            ));
        }

        if metadata.len() > LARGE_DOCUMENT_BYTES {
            tracing::warn!(
                "Reading very large document ({}MB) into memory",
                metadata.len() / (1024 * 1024)
            );
        }

        let bytes = fs::read(path).map_err(|e| AnalysisError::storage(path, e))?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());

        Ok(Self::from_bytes(&bytes))
    }

    /// Decode raw bytes, replacing invalid UTF-8 sequences
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// The full document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines without their `\n` / `\r\n` terminators
    pub fn lines(&self) -> std::str::Lines<'_> {
        self.text.lines()
    }

    /// Size of the document text in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
