//! # GCodeLens Analyzer
//!
//! Read-only passes over a G-code document:
//! - Thumbnail extraction: decode the slicer-embedded base64 preview and persist it
//! - Object volume analysis: attribute bounding-box volume to each marked object
//! - Orchestration: run both independently and assemble one result record

pub mod error;
pub mod orchestrator;
pub mod thumbnail;
pub mod volume;

pub use error::{ThumbnailError, ThumbnailResult};
pub use orchestrator::{run, AnalysisOrchestrator};
pub use thumbnail::{
    clean_payload, decode_thumbnail, extract_thumbnail, find_thumbnail_block, validate_job_id,
    DecodedThumbnail, ThumbnailExtractor,
};
pub use volume::{
    analyze_per_part_volume, LineEvent, ObjectExtent, ObjectScan, ObjectVolumeAnalyzer, ScanState,
};
