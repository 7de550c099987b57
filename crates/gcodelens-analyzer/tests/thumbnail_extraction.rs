//! Integration tests for embedded thumbnail extraction and persistence

use base64::{engine::general_purpose::STANDARD, Engine};
use gcodelens_analyzer::{decode_thumbnail, extract_thumbnail, ThumbnailError, ThumbnailExtractor};
use gcodelens_core::{AnalysisError, AnalyzerConfig, Document};
use proptest::prelude::*;
use tempfile::TempDir;

/// Wrap a payload the way PrusaSlicer does: 78-char lines behind `; `
fn slicer_thumbnail(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let mut out = format!("; thumbnail begin 16x16 {}\n", encoded.len());
    for chunk in encoded.as_bytes().chunks(78) {
        out.push_str("; ");
        out.push_str(std::str::from_utf8(chunk).expect("base64 is ascii"));
        out.push('\n');
    }
    out.push_str("; thumbnail end\n");
    out
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend((0u8..=255).cycle().take(300));
    bytes
}

#[test]
fn test_extract_writes_file_and_returns_reference() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out_dir = temp_dir.path().join("previews");
    let bytes = png_bytes();

    let document = Document::new(format!(
        "; generated by PrusaSlicer\n\n{}\n; external perimeters extrusion width = 0.45mm\nG28\n",
        slicer_thumbnail(&bytes)
    ));

    let reference = extract_thumbnail(&document, &out_dir, "job-42").expect("extract");

    assert_eq!(reference.as_deref(), Some("/gcode_previews/job-42.png"));
    let written = std::fs::read(out_dir.join("job-42.png")).expect("thumbnail file");
    assert_eq!(written, bytes);
}

#[test]
fn test_missing_block_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out_dir = temp_dir.path().join("previews");
    let document = Document::new("G28\nG1 X1 Y1 Z1\n; thumbnail stuff\n");

    let reference = extract_thumbnail(&document, &out_dir, "job-1").expect("extract");

    assert!(reference.is_none());
    assert!(!out_dir.exists());
}

#[test]
fn test_malformed_payload_is_not_fatal() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let document = Document::new("; thumbnail begin 1x1 5\n; QUJDR\n; thumbnail end\n");

    assert!(matches!(
        decode_thumbnail(document.text()),
        Err(ThumbnailError::Decode(_))
    ));

    let reference = extract_thumbnail(&document, temp_dir.path(), "job-2").expect("extract");
    assert!(reference.is_none());
    assert!(!temp_dir.path().join("job-2.png").exists());
}

#[test]
fn test_first_block_wins() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let document = Document::new(format!(
        "{}{}",
        slicer_thumbnail(b"small preview"),
        slicer_thumbnail(b"a much larger second preview")
    ));

    extract_thumbnail(&document, temp_dir.path(), "job-3").expect("extract");

    let written = std::fs::read(temp_dir.path().join("job-3.png")).expect("thumbnail file");
    assert_eq!(written, b"small preview");
}

#[test]
fn test_rerun_overwrites_same_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("job-4.png");

    let first = Document::new(slicer_thumbnail(b"first"));
    let second = Document::new(slicer_thumbnail(b"second"));
    extract_thumbnail(&first, temp_dir.path(), "job-4").expect("first run");
    extract_thumbnail(&second, temp_dir.path(), "job-4").expect("second run");

    assert_eq!(std::fs::read(&path).expect("thumbnail file"), b"second");
}

#[test]
fn test_custom_prefix_and_extension() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = AnalyzerConfig {
        output_directory: temp_dir.path().to_path_buf(),
        public_url_prefix: "/static/thumbs/".to_string(),
        image_extension: "qoi".to_string(),
        parallel: false,
    };
    let extractor = ThumbnailExtractor::from_config(&config);
    let document = Document::new(slicer_thumbnail(b"qoif-ish"));

    let reference = extractor.extract(&document, "77").expect("extract");

    assert_eq!(reference.as_deref(), Some("/static/thumbs/77.qoi"));
    assert!(temp_dir.path().join("77.qoi").exists());
}

#[test]
fn test_invalid_job_id_is_rejected_before_write() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out_dir = temp_dir.path().join("previews");
    let document = Document::new(slicer_thumbnail(b"payload"));

    let err = extract_thumbnail(&document, &out_dir, "../escape").unwrap_err();

    assert!(matches!(err, AnalysisError::InvalidJobId(ref id) if id == "../escape"));
    assert!(!out_dir.exists());
    assert!(!temp_dir.path().join("escape.png").exists());
}

#[test]
fn test_unwritable_output_is_storage_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    // A regular file where the output directory should be
    let blocker = temp_dir.path().join("previews");
    std::fs::write(&blocker, "not a directory").expect("write blocker");
    let document = Document::new(slicer_thumbnail(b"payload"));

    let err = extract_thumbnail(&document, &blocker, "job-5").unwrap_err();

    assert!(err.is_storage_error());
    assert!(err.to_string().contains("previews"));
}

const NOISE: &[char] = &[
    ';', ' ', '\t', '\n', '\r', '#', '*', '-', '_', '!', '@', '%', '^', '&', '(', ')', '[', ']',
    '{', '}', '<', '>', '~', '|', ':', '.', ',', '?', '"', '\'',
];

proptest! {
    #[test]
    fn prop_noise_tolerant_round_trip(
        bytes in prop::collection::vec(any::<u8>(), 1..512),
        noise in prop::collection::vec((any::<usize>(), prop::sample::select(NOISE)), 0..64),
    ) {
        let mut payload: Vec<char> = STANDARD.encode(&bytes).chars().collect();
        for (position, c) in noise {
            let at = position % (payload.len() + 1);
            payload.insert(at, c);
        }
        let payload: String = payload.into_iter().collect();
        let text = format!("; thumbnail begin 8x8 {}\n{}\n; thumbnail end\n", bytes.len(), payload);

        let decoded = decode_thumbnail(&text)
            .expect("noisy payload decodes")
            .expect("block present");
        prop_assert_eq!(decoded.bytes, bytes);
    }
}
