//! Runs both analyses over one document and assembles the result record

use std::path::{Path, PathBuf};
use std::thread;

use gcodelens_core::{AnalysisResult, AnalyzerConfig, Document, Result, VolumeReport};

use crate::thumbnail::ThumbnailExtractor;
use crate::volume::ObjectVolumeAnalyzer;

/// Thumbnail extraction and volume analysis over a single document
///
/// The two passes share nothing but the immutable document, so a malformed
/// thumbnail never suppresses the volume report and vice versa. Only storage
/// and job-id errors from the thumbnail write propagate.
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    thumbnails: ThumbnailExtractor,
    volumes: ObjectVolumeAnalyzer,
    parallel: bool,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator from the analyzer configuration
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            thumbnails: ThumbnailExtractor::from_config(config),
            volumes: ObjectVolumeAnalyzer::new(),
            parallel: config.parallel,
        }
    }

    /// Whether the two passes run on separate threads
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Analyze `document` for job `job_id`
    ///
    /// # Errors
    /// Propagates [`gcodelens_core::AnalysisError`] from the thumbnail write.
    pub fn run(&self, document: &Document, job_id: &str) -> Result<AnalysisResult> {
        let (thumbnail, report) = if self.parallel {
            self.run_threaded(document, job_id)
        } else {
            (
                self.thumbnails.extract(document, job_id),
                self.volumes.analyze(document),
            )
        };

        let thumbnail_url = thumbnail?;

        tracing::info!(
            job_id,
            thumbnail = thumbnail_url.is_some(),
            parts = report.as_ref().map_or(0, |r| r.parts.len()),
            total_volume = report.as_ref().map_or(0.0, |r| r.total_bounding_box_volume),
            "Analysis complete"
        );

        Ok(AnalysisResult {
            thumbnail_url,
            per_part_analysis: report,
        })
    }

    /// Read the document at `path` and analyze it
    ///
    /// # Errors
    /// Returns [`gcodelens_core::AnalysisError::Storage`] if the file cannot
    /// be read, plus anything [`Self::run`] returns.
    pub fn run_file(&self, path: &Path, job_id: &str) -> Result<AnalysisResult> {
        let document = Document::from_path(path)?;
        self.run(&document, job_id)
    }

    fn run_threaded(
        &self,
        document: &Document,
        job_id: &str,
    ) -> (Result<Option<String>>, Option<VolumeReport>) {
        thread::scope(|scope| {
            let thumbnail = scope.spawn(|| self.thumbnails.extract(document, job_id));
            let report = self.volumes.analyze(document);

            match thumbnail.join() {
                Ok(thumbnail) => (thumbnail, report),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        })
    }
}

/// Analyze `document`, writing any thumbnail into `output_directory`
pub fn run(
    document: &Document,
    output_directory: impl Into<PathBuf>,
    job_id: &str,
) -> Result<AnalysisResult> {
    let config = AnalyzerConfig::new().with_output_directory(output_directory);
    AnalysisOrchestrator::new(&config).run(document, job_id)
}
