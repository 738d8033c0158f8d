//! Execution context shared by every handler in a run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rf_av::{Transcoder, TransformRequest};
use rf_catalog::AssetCatalog;
use rf_core::Result;
use rf_rules::RuleDocument;

use crate::concat_list;
use crate::stop::{NeverStop, StopSignal};

/// Context passed to every handler during execution.
///
/// Cloning is cheap and clones share the transcoder, the random source and
/// the catalog.
#[derive(Clone)]
pub struct EngineContext {
    /// Performs probes, transforms and preview playback.
    pub transcoder: Arc<dyn Transcoder>,
    /// Directory for outputs and temporary artifacts.
    pub workdir: PathBuf,
    /// When `true`, handlers log what they would do and touch nothing.
    pub dry_run: bool,
    /// Catalog consulted for normalized inputs.
    pub catalog: Option<Arc<AssetCatalog>>,
    /// Swap inputs for their normalized renditions when available.
    pub prefer_normalized: bool,
    /// Early stop for preview playback.
    pub stop: Arc<dyn StopSignal>,
    rng: Arc<Mutex<StdRng>>,
}

impl EngineContext {
    /// Create a context with the minimum required fields.
    pub fn new(transcoder: Arc<dyn Transcoder>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            transcoder,
            workdir: workdir.into(),
            dry_run: false,
            catalog: None,
            prefer_normalized: false,
            stop: Arc::new(NeverStop),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Builder: set dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Builder: seed the random source used by random chops.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// Builder: attach a scanned catalog.
    pub fn with_catalog(mut self, catalog: Arc<AssetCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Builder: prefer normalized renditions for inputs.
    pub fn with_prefer_normalized(mut self, prefer: bool) -> Self {
        self.prefer_normalized = prefer;
        self
    }

    /// Builder: attach a stop signal for previews.
    pub fn with_stop(mut self, stop: Arc<dyn StopSignal>) -> Self {
        self.stop = stop;
        self
    }

    /// The context for running `doc`: its `global` section overrides the
    /// work directory and can switch on `prefer_normalized`.
    pub fn scoped(&self, doc: &RuleDocument) -> Self {
        let mut ctx = self.clone();
        ctx.workdir = doc.workdir_or(&self.workdir);
        ctx.prefer_normalized |= doc.global.prefer_normalized;
        ctx
    }

    /// A file inside the work directory.
    pub fn work_file(&self, name: &str) -> PathBuf {
        self.workdir.join(name)
    }

    /// The path a handler should read for `path`.
    pub fn input(&self, path: &Path) -> PathBuf {
        if self.prefer_normalized {
            if let Some(norm) = self.catalog.as_ref().and_then(|c| c.normalized_for(path)) {
                tracing::debug!(
                    input = %path.display(),
                    normalized = %norm.display(),
                    "Using normalized rendition"
                );
                return norm;
            }
        }
        path.to_path_buf()
    }

    /// Run `f` with exclusive access to the shared random source.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        f(&mut self.rng.lock())
    }

    /// Hand `request` to the transcoder and turn a non-zero exit into
    /// [`rf_core::Error::Transform`]. In dry-run mode only logs.
    pub fn transform(&self, request: TransformRequest) -> Result<()> {
        let kind = request.kind();
        let output = request.output();
        if self.dry_run {
            tracing::info!(kind, output = %output.display(), "[DRY RUN] Would run transform");
            return Ok(());
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!(kind, output = %output.display(), "Running transform");
        self.transcoder.transform(&request)?.check(kind)?;
        Ok(())
    }

    /// Write a concat list named `name` in the work directory. In dry-run mode
    /// only logs. Returns the list path.
    pub fn write_list(&self, name: &str, files: &[PathBuf]) -> Result<PathBuf> {
        let list = self.work_file(name);
        if self.dry_run {
            tracing::info!(list = %list.display(), entries = files.len(), "[DRY RUN] Would write concat list");
        } else {
            concat_list::write(&list, files)?;
        }
        Ok(list)
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("workdir", &self.workdir)
            .field("dry_run", &self.dry_run)
            .field("catalog", &self.catalog.is_some())
            .field("prefer_normalized", &self.prefer_normalized)
            .finish_non_exhaustive()
    }
}
