//! Asset catalog: scan, probe, normalize, persist.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rf_av::{Transcoder, TransformRequest};
use rf_core::config::PathsConfig;
use rf_core::MediaKind;
use serde::Serialize;
use walkdir::WalkDir;

use crate::entry::MediaAssetEntry;
use crate::fingerprint::{fingerprint, path_tag};
use crate::index::IndexFile;
use crate::pool::WorkerPool;

/// Where the catalog keeps its index and normalized renditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLayout {
    pub workdir: PathBuf,
    pub index_path: PathBuf,
    pub normalized_dir: PathBuf,
}

impl CatalogLayout {
    /// `<workdir>/media_index.json` and `<workdir>/normalized/`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self::from_config(workdir, &PathsConfig::default())
    }

    /// Use the file and directory names from `paths` under `workdir`.
    pub fn from_config(workdir: impl Into<PathBuf>, paths: &PathsConfig) -> Self {
        let workdir = workdir.into();
        Self {
            index_path: workdir.join(&paths.index_file),
            normalized_dir: workdir.join(&paths.normalized_dir),
            workdir,
        }
    }

    /// Deterministic output path for normalizing `input`:
    /// `<stem>_<path tag>_norm.mp4`, unique per source path.
    pub fn normalized_output(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "asset".into());
        self.normalized_dir
            .join(format!("{stem}_{}_norm.mp4", path_tag(input)))
    }
}

/// Normalization targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeTarget {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl Default for NormalizeTarget {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30.0,
        }
    }
}

/// Outcome of [`AssetCatalog::normalize_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Jobs handed to the pool.
    pub scheduled: usize,
    /// Eligible entries that already had a valid rendition.
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct CatalogState {
    entries: Vec<MediaAssetEntry>,
    /// Last index read from or written to disk.
    persisted: IndexFile,
}

/// The scanned asset catalog.
///
/// Entry mutation and index writes share one lock, so normalization jobs on
/// several workers never interleave their updates. Transcoder calls happen
/// outside the lock.
pub struct AssetCatalog {
    transcoder: Arc<dyn Transcoder>,
    layout: CatalogLayout,
    state: Mutex<CatalogState>,
    rng: Mutex<StdRng>,
}

impl AssetCatalog {
    /// Open a catalog, loading any previously persisted index.
    pub fn open(transcoder: Arc<dyn Transcoder>, layout: CatalogLayout) -> Self {
        let persisted = IndexFile::load(&layout.index_path);
        tracing::debug!(
            index = %layout.index_path.display(),
            entries = persisted.entries.len(),
            "Opened asset catalog"
        );
        Self {
            transcoder,
            layout,
            state: Mutex::new(CatalogState {
                entries: Vec::new(),
                persisted,
            }),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Use a fixed seed for [`Self::pick_random`].
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn layout(&self) -> &CatalogLayout {
        &self.layout
    }

    /// Rebuild the catalog from every regular file under `assets_dir`.
    ///
    /// Previously normalized outputs are recovered from the persisted index
    /// when path and fingerprint both match. Returns the entry count.
    pub fn scan(&self, assets_dir: &Path) -> usize {
        self.state.lock().entries.clear();

        if !assets_dir.is_dir() {
            tracing::warn!(dir = %assets_dir.display(), "Assets directory not found");
            return 0;
        }

        let persisted = self.state.lock().persisted.clone();
        let mut entries = Vec::new();

        for item in WalkDir::new(assets_dir).sort_by_file_name() {
            let item = match item {
                Ok(i) => i,
                Err(e) => {
                    tracing::warn!("Skipping unreadable path during scan: {e}");
                    continue;
                }
            };
            if !item.file_type().is_file() {
                continue;
            }

            let path = item.path();
            let probe = match self.transcoder.probe(path) {
                Ok(meta) => Some(meta),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Probe failed: {e}");
                    None
                }
            };

            let mut entry = MediaAssetEntry::from_probe(path, probe, fingerprint(path));
            entry.normalized_path = persisted
                .recover(&entry.path, &entry.fingerprint)
                .map(Path::to_path_buf);

            tracing::debug!(
                path = %path.display(),
                kind = %entry.kind,
                recovered = entry.normalized_path.is_some(),
                "Scanned asset"
            );
            entries.push(entry);
        }

        let count = entries.len();
        let mut state = self.state.lock();
        state.entries = entries;
        self.persist(&mut state);
        tracing::info!(dir = %assets_dir.display(), count, "Scan complete");
        count
    }

    /// Normalize one asset, skipping the transcoder when a valid rendition
    /// already exists. Returns `None` on failure.
    pub fn normalize(&self, path: &Path, target: NormalizeTarget) -> Option<PathBuf> {
        let current = fingerprint(path);

        {
            let state = self.state.lock();
            let cached = state
                .entries
                .iter()
                .find(|e| e.path == path && e.fingerprint == current)
                .and_then(|e| e.valid_normalized());
            if let Some(out) = cached {
                tracing::debug!(path = %path.display(), "Normalized output up to date");
                return Some(out.to_path_buf());
            }
        }

        let output = self.layout.normalized_output(path);
        if let Err(e) = std::fs::create_dir_all(&self.layout.normalized_dir) {
            tracing::warn!(dir = %self.layout.normalized_dir.display(), "Cannot create directory: {e}");
            return None;
        }

        let request = TransformRequest::Normalize {
            input: path.to_path_buf(),
            width: target.width,
            height: target.height,
            fps: target.fps,
            output: output.clone(),
        };
        match self.transcoder.transform(&request) {
            Ok(res) if res.is_success() => {}
            Ok(res) => {
                tracing::warn!(path = %path.display(), status = res.exit_status, "Normalization failed");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Normalization failed: {e}");
                return None;
            }
        }

        let mut state = self.state.lock();
        if let Some(entry) = state.entries.iter_mut().find(|e| e.path == path) {
            entry.normalized_path = Some(output.clone());
            entry.fingerprint = current;
        }
        self.persist(&mut state);
        tracing::info!(input = %path.display(), output = %output.display(), "Normalized");
        Some(output)
    }

    /// Normalize every video and GIF without a valid rendition on a pool of
    /// `workers` threads, then persist the index.
    ///
    /// Individual failures are logged and counted; they never stop the batch.
    pub fn normalize_all(
        self: &Arc<Self>,
        workers: usize,
        target: NormalizeTarget,
    ) -> NormalizeReport {
        let mut report = NormalizeReport::default();
        let pending: Vec<PathBuf> = {
            let state = self.state.lock();
            state
                .entries
                .iter()
                .filter(|e| e.kind.is_normalizable())
                .filter_map(|e| {
                    if e.valid_normalized().is_some() {
                        report.skipped += 1;
                        None
                    } else {
                        Some(e.path.clone())
                    }
                })
                .collect()
        };
        report.scheduled = pending.len();

        if !pending.is_empty() {
            let succeeded = Arc::new(AtomicUsize::new(0));
            let failed = Arc::new(AtomicUsize::new(0));
            let pool = WorkerPool::new(workers);
            tracing::info!(jobs = pending.len(), workers = pool.size(), "Normalizing assets");

            for path in pending {
                let catalog = Arc::clone(self);
                let succeeded = Arc::clone(&succeeded);
                let failed = Arc::clone(&failed);
                pool.enqueue(move || {
                    if catalog.normalize(&path, target).is_some() {
                        succeeded.fetch_add(1, Ordering::Relaxed);
                    } else {
                        tracing::error!(path = %path.display(), "Normalization job failed");
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
            pool.wait_all();

            report.succeeded = succeeded.load(Ordering::Relaxed);
            report.failed = failed.load(Ordering::Relaxed);
        }

        let mut state = self.state.lock();
        self.persist(&mut state);
        report
    }

    /// Up to `count` distinct entries of `kind` (any kind when `None`), drawn
    /// uniformly without replacement.
    pub fn pick_random(&self, kind: Option<MediaKind>, count: usize) -> Vec<MediaAssetEntry> {
        let state = self.state.lock();
        let matching: Vec<&MediaAssetEntry> = state
            .entries
            .iter()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .collect();
        let mut rng = self.rng.lock();
        matching
            .choose_multiple(&mut *rng, count)
            .map(|e| (*e).clone())
            .collect()
    }

    /// Snapshot of all entries in scan order.
    pub fn entries(&self) -> Vec<MediaAssetEntry> {
        self.state.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The valid normalized rendition of `path`, if the catalog has one.
    pub fn normalized_for(&self, path: &Path) -> Option<PathBuf> {
        let state = self.state.lock();
        state
            .entries
            .iter()
            .find(|e| e.path == path)
            .and_then(|e| e.valid_normalized())
            .map(Path::to_path_buf)
    }

    /// Write the index and remember it as the persisted snapshot. Failures
    /// are reported but not fatal.
    fn persist(&self, state: &mut CatalogState) {
        let index = IndexFile {
            entries: state.entries.clone(),
        };
        match index.save(&self.layout.index_path) {
            Ok(()) => state.persisted = index,
            Err(e) => tracing::warn!(
                path = %self.layout.index_path.display(),
                "Failed to persist index: {e}"
            ),
        }
    }
}

impl std::fmt::Debug for AssetCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCatalog")
            .field("layout", &self.layout)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_av::fake::{audio_metadata, video_metadata, RecordingTranscoder};

    struct Fixture {
        _dir: tempfile::TempDir,
        assets: PathBuf,
        work: PathBuf,
        fake: Arc<RecordingTranscoder>,
    }

    fn fixture(files: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("assets");
        let work = dir.path().join("work");
        std::fs::create_dir_all(&assets).unwrap();
        let fake = RecordingTranscoder::new();
        for name in files {
            let p = assets.join(name);
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&p, name.as_bytes()).unwrap();
            let meta = match MediaKind::from_extension(&p) {
                Some(MediaKind::Audio) => audio_metadata(4.0),
                _ => video_metadata(5.0, 1920, 1080, 30.0),
            };
            fake.set_metadata(p, meta);
        }
        Fixture {
            _dir: dir,
            assets,
            work,
            fake: Arc::new(fake),
        }
    }

    fn open(fx: &Fixture) -> Arc<AssetCatalog> {
        Arc::new(
            AssetCatalog::open(fx.fake.clone(), CatalogLayout::new(&fx.work)).with_seed(7),
        )
    }

    #[test]
    fn scan_single_video() {
        let fx = fixture(&["clip.mp4"]);
        let catalog = open(&fx);
        assert_eq!(catalog.scan(&fx.assets), 1);

        let e = &catalog.entries()[0];
        assert_eq!(e.kind, MediaKind::Video);
        assert!((e.duration - 5.0).abs() < 1e-6);
        assert_eq!((e.width, e.height), (1920, 1080));
        assert!((e.fps - 30.0).abs() < 1e-6);
        assert!(fx.work.join("media_index.json").exists());
    }

    #[test]
    fn scan_missing_dir_is_empty() {
        let fx = fixture(&[]);
        let catalog = open(&fx);
        assert_eq!(catalog.scan(&fx.assets.join("nope")), 0);
        assert!(catalog.is_empty());
    }

    #[test]
    fn scan_recurses_and_keeps_unprobeable_files() {
        let fx = fixture(&["a.mp4", "sub/b.mp3"]);
        std::fs::write(fx.assets.join("readme.txt"), b"hi").unwrap();
        let catalog = open(&fx);
        assert_eq!(catalog.scan(&fx.assets), 3);
        let kinds: Vec<MediaKind> = catalog.entries().iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&MediaKind::Audio));
        assert!(kinds.contains(&MediaKind::Unknown));
    }

    #[test]
    fn normalize_all_skips_audio_and_is_idempotent() {
        let fx = fixture(&["a.mp4", "b.gif", "c.mp3"]);
        let catalog = open(&fx);
        catalog.scan(&fx.assets);

        let report = catalog.normalize_all(2, NormalizeTarget::default());
        assert_eq!(report.scheduled, 2);
        assert_eq!(report.succeeded, 2);
        assert_eq!(fx.fake.transform_count(), 2);
        for name in ["a.mp4", "b.gif"] {
            let out = catalog.normalized_for(&fx.assets.join(name)).unwrap();
            assert!(out.exists(), "{}", out.display());
        }

        let again = catalog.normalize_all(2, NormalizeTarget::default());
        assert_eq!(again.scheduled, 0);
        assert_eq!(again.skipped, 2);
        assert_eq!(fx.fake.transform_count(), 2);
    }

    #[test]
    fn normalization_is_recovered_across_catalogs() {
        let fx = fixture(&["a.mp4"]);
        {
            let catalog = open(&fx);
            catalog.scan(&fx.assets);
            catalog.normalize_all(1, NormalizeTarget::default());
        }
        assert_eq!(fx.fake.transform_count(), 1);

        let catalog = open(&fx);
        catalog.scan(&fx.assets);
        let src = fx.assets.join("a.mp4");
        let expected = CatalogLayout::new(&fx.work).normalized_output(&src);
        assert_eq!(catalog.normalized_for(&src), Some(expected.clone()));
        assert_eq!(
            catalog.normalize(&src, NormalizeTarget::default()),
            Some(expected)
        );
        catalog.normalize_all(1, NormalizeTarget::default());
        assert_eq!(fx.fake.transform_count(), 1);
    }

    #[test]
    fn changed_source_is_renormalized() {
        let fx = fixture(&["a.mp4"]);
        let catalog = open(&fx);
        catalog.scan(&fx.assets);
        catalog.normalize_all(1, NormalizeTarget::default());

        std::fs::write(fx.assets.join("a.mp4"), b"a much longer replacement payload").unwrap();
        let catalog = open(&fx);
        catalog.scan(&fx.assets);
        assert_eq!(catalog.normalized_for(&fx.assets.join("a.mp4")), None);
        catalog.normalize_all(1, NormalizeTarget::default());
        assert_eq!(fx.fake.transform_count(), 2);
    }

    #[test]
    fn failed_normalization_leaves_entry_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("assets");
        std::fs::create_dir_all(&assets).unwrap();
        let clip = assets.join("a.mp4");
        std::fs::write(&clip, b"x").unwrap();
        let fake = Arc::new(
            RecordingTranscoder::new()
                .with_metadata(&clip, video_metadata(2.0, 640, 360, 25.0))
                .failing("normalize", 1),
        );
        let catalog = Arc::new(AssetCatalog::open(
            fake.clone(),
            CatalogLayout::new(dir.path().join("work")),
        ));
        catalog.scan(&assets);

        assert_eq!(catalog.normalize(&clip, NormalizeTarget::default()), None);
        let report = catalog.normalize_all(3, NormalizeTarget::default());
        assert_eq!(report.failed, 1);
        assert_eq!(catalog.entries()[0].normalized_path, None);
    }

    #[test]
    fn pick_random_is_distinct_and_filtered() {
        let fx = fixture(&["a.mp4", "b.mp4", "c.mp4", "d.mp3", "e.mp3"]);
        let catalog = open(&fx);
        catalog.scan(&fx.assets);

        let picked = catalog.pick_random(Some(MediaKind::Video), 2);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|e| e.kind == MediaKind::Video));
        assert_ne!(picked[0].path, picked[1].path);

        assert_eq!(catalog.pick_random(Some(MediaKind::Audio), 10).len(), 2);
        assert_eq!(catalog.pick_random(None, 10).len(), 5);
        assert!(catalog.pick_random(Some(MediaKind::Image), 3).is_empty());
    }

    #[test]
    fn layout_output_naming() {
        let layout = CatalogLayout::new("/w");
        assert_eq!(layout.index_path, PathBuf::from("/w/media_index.json"));
        let src = Path::new("/assets/My Clip.mov");
        assert_eq!(
            layout.normalized_output(src),
            PathBuf::from(format!("/w/normalized/My Clip_{}_norm.mp4", path_tag(src)))
        );
    }

    #[test]
    fn same_stem_in_different_dirs_gets_distinct_renditions() {
        let fx = fixture(&["a/clip.mp4", "b/clip.mp4"]);
        let catalog = open(&fx);
        assert_eq!(catalog.scan(&fx.assets), 2);

        let report = catalog.normalize_all(2, NormalizeTarget::default());
        assert_eq!(report.succeeded, 2);

        let a = catalog.normalized_for(&fx.assets.join("a/clip.mp4")).unwrap();
        let b = catalog.normalized_for(&fx.assets.join("b/clip.mp4")).unwrap();
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());

        let outputs: Vec<PathBuf> = fx
            .fake
            .requests()
            .into_iter()
            .filter_map(|r| match r {
                TransformRequest::Normalize { output, .. } => Some(output),
                _ => None,
            })
            .collect();
        assert_eq!(outputs.len(), 2);
        assert_ne!(outputs[0], outputs[1]);
    }
}
