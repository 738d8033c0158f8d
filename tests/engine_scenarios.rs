//! Engine and catalog scenarios
//!
//! Drives the public crates end to end against the recording transcoder.

use std::path::Path;
use std::sync::Arc;

use assert_matches::assert_matches;
use rf_av::fake::{video_metadata, RecordingTranscoder};
use rf_catalog::{AssetCatalog, CatalogLayout, NormalizeTarget};
use rf_core::{Error, MediaKind};
use rf_engine::{EngineContext, OperationEngine};
use rf_rules::RuleDocument;
use tempfile::tempdir;

fn touch(path: &Path, contents: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn dry_run_concat_issues_no_calls() {
    let dir = tempdir().unwrap();
    let fake = Arc::new(RecordingTranscoder::new());
    let doc = RuleDocument::from_json(
        r#"{"operations": [{"type": "concat", "inputs": ["a.mp4", "b.mp4", "c.mp4"]}]}"#,
    )
    .unwrap();

    let ctx = EngineContext::new(fake.clone(), dir.path().join("out")).with_dry_run(true);
    let summary = OperationEngine::new(ctx).run(&doc).unwrap();

    assert_eq!(summary.executed, 1);
    assert_eq!(fake.call_count(), 0);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn unknown_operation_between_valid_ones_is_skipped() {
    let dir = tempdir().unwrap();
    let fake = Arc::new(RecordingTranscoder::new());
    let doc = RuleDocument::from_json(
        r#"{"operations": [
            {"type": "pitch", "input": "a.mp4", "semitones": 3},
            {"type": "nonexistent_type"},
            {"type": "overlay", "input": "a.mp4", "overlay": "logo.png", "position": "bottomright"}
        ]}"#,
    )
    .unwrap();

    let summary = OperationEngine::new(EngineContext::new(fake.clone(), dir.path()))
        .run(&doc)
        .unwrap();

    assert_eq!((summary.executed, summary.skipped), (2, 1));
    assert_eq!(fake.kinds(), vec!["pitch-shift", "overlay-compose"]);
}

#[test]
fn transcoder_status_becomes_run_status() {
    let dir = tempdir().unwrap();
    let fake = Arc::new(RecordingTranscoder::new().failing("concat-from-list", 187));
    let doc = RuleDocument::from_json(
        r#"{"operations": [
            {"type": "stutter", "input": "a.mp4", "repeats": 2},
            {"type": "pitch", "input": "a.mp4"}
        ]}"#,
    )
    .unwrap();

    let err = OperationEngine::new(EngineContext::new(fake.clone(), dir.path()))
        .run(&doc)
        .unwrap_err();

    assert_matches!(err, Error::Transform { status: 187, .. });
    assert_eq!(fake.kinds(), vec!["extract-fragment", "concat-from-list"]);
}

#[test]
fn scan_reports_probed_video() {
    let dir = tempdir().unwrap();
    let clip = dir.path().join("assets/clip.mp4");
    touch(&clip, b"five seconds");
    let fake = Arc::new(
        RecordingTranscoder::new().with_metadata(&clip, video_metadata(5.0, 1920, 1080, 30.0)),
    );

    let catalog = AssetCatalog::open(fake, CatalogLayout::new(dir.path().join("out")));
    assert_eq!(catalog.scan(&dir.path().join("assets")), 1);

    let entry = &catalog.entries()[0];
    assert_eq!(entry.kind, MediaKind::Video);
    assert!((entry.duration - 5.0).abs() < 1e-6);
    assert_eq!((entry.width, entry.height), (1920, 1080));
    assert!((entry.fps - 30.0).abs() < 1e-6);
}

#[test]
fn normalization_is_recovered_on_the_next_run() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    let clip = assets.join("clip.mp4");
    touch(&clip, b"source");
    let workdir = dir.path().join("out");
    let meta = video_metadata(5.0, 1920, 1080, 30.0);

    let first = Arc::new(RecordingTranscoder::new().with_metadata(&clip, meta.clone()));
    let catalog = Arc::new(AssetCatalog::open(first.clone(), CatalogLayout::new(&workdir)));
    catalog.scan(&assets);
    let report = catalog.normalize_all(2, NormalizeTarget::default());
    assert_eq!(report.succeeded, 1);
    assert_eq!(first.kinds(), vec!["normalize"]);

    let second = Arc::new(RecordingTranscoder::new().with_metadata(&clip, meta));
    let catalog = Arc::new(AssetCatalog::open(second.clone(), CatalogLayout::new(&workdir)));
    catalog.scan(&assets);
    assert!(catalog.normalized_for(&clip).is_some());
    let report = catalog.normalize_all(2, NormalizeTarget::default());
    assert_eq!((report.scheduled, report.skipped), (0, 1));
    assert_eq!(second.transform_count(), 0);
}

#[test]
fn prefer_normalized_redirects_inputs() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    let clip = assets.join("clip.mp4");
    touch(&clip, b"source");
    let workdir = dir.path().join("out");

    let fake = Arc::new(
        RecordingTranscoder::new().with_metadata(&clip, video_metadata(5.0, 1920, 1080, 30.0)),
    );
    let catalog = Arc::new(AssetCatalog::open(fake.clone(), CatalogLayout::new(&workdir)));
    catalog.scan(&assets);
    catalog.normalize_all(1, NormalizeTarget::default());
    let normalized = catalog.normalized_for(&clip).unwrap();

    let json = format!(
        r#"{{"global": {{"prefer_normalized": true}},
            "operations": [{{"type": "pitch", "input": {:?}}}]}}"#,
        clip.to_string_lossy()
    );
    let doc = RuleDocument::from_json(&json).unwrap();
    let ctx = EngineContext::new(fake.clone(), &workdir).with_catalog(catalog);
    OperationEngine::new(ctx).run(&doc).unwrap();

    let requests = fake.requests();
    assert_matches!(
        requests.last(),
        Some(rf_av::TransformRequest::PitchShift { input, .. }) if *input == normalized
    );
}
