//! Rules document parsing.
//!
//! A rules document is a JSON object:
//!
//! ```json
//! {
//!   "global": {"assets_dir": "assets", "workdir": "output"},
//!   "preprocessing": {"target_width": 1280, "target_height": 720, "normalize_workers": 0},
//!   "operations": [
//!     {"type": "stutter", "input": "assets/clip.mp4", "repeats": 4},
//!     {"type": "preview", "file": "output/stutter_out.mp4"}
//!   ]
//! }
//! ```
//!
//! Parsing is all-or-nothing: a malformed document or a known operation with
//! missing fields fails before anything runs. Parameter values are checked
//! per operation by [`Operation::check`], either all at once through
//! [`RuleDocument::validate`] or by the engine as it reaches each one.
//! Operations with an unknown `type` are kept as [`OperationSlot::Unknown`]
//! so the engine can skip them.

use std::path::{Path, PathBuf};

use rf_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::operation::{Operation, OperationSlot};

/// The `global` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub assets_dir: Option<PathBuf>,
    pub workdir: Option<PathBuf>,
    /// Redirect operation inputs to their normalized renditions when the
    /// catalog has a valid one.
    pub prefer_normalized: bool,
}

/// The optional `preprocessing` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preprocessing {
    pub target_width: u32,
    pub target_height: u32,
    pub target_fps: f64,
    pub normalize_all: bool,
    /// `0` selects half the available CPUs.
    pub normalize_workers: usize,
}

impl Default for Preprocessing {
    fn default() -> Self {
        Self {
            target_width: 1280,
            target_height: 720,
            target_fps: 30.0,
            normalize_all: true,
            normalize_workers: 0,
        }
    }
}

impl Preprocessing {
    /// Defaults taken from the application config.
    pub fn from_config(defaults: &rf_core::config::PreprocessingDefaults) -> Self {
        Self {
            target_width: defaults.target_width,
            target_height: defaults.target_height,
            target_fps: defaults.target_fps,
            normalize_all: true,
            normalize_workers: defaults.workers,
        }
    }

    /// Worker count to use on a machine with `cpus` logical CPUs.
    pub fn effective_workers(&self, cpus: usize) -> usize {
        match self.normalize_workers {
            0 => (cpus / 2).max(1),
            n => n,
        }
    }
}

/// A parsed rules document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDocument {
    pub global: GlobalSettings,
    pub preprocessing: Option<Preprocessing>,
    /// Every element of the operations array, in document order.
    pub operations: Vec<OperationSlot>,
}

impl RuleDocument {
    /// Read and parse a rules file.
    ///
    /// # Errors
    ///
    /// [`Error::RulesUnreadable`] if the file cannot be read, otherwise as
    /// [`RuleDocument::from_json`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::RulesUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Self::from_json(&text)?;
        tracing::debug!(
            path = %path.display(),
            operations = doc.operations.len(),
            "Loaded rules document"
        );
        Ok(doc)
    }

    /// Parse a rules document from JSON text.
    ///
    /// # Errors
    ///
    /// - [`Error::RulesParse`] for invalid JSON or malformed `global` /
    ///   `preprocessing` sections.
    /// - [`Error::MissingOperations`] if there is no `operations` array.
    /// - [`Error::InvalidOperation`] if a known operation lacks a required
    ///   field or has a field of the wrong type.
    pub fn from_json(text: &str) -> Result<Self> {
        let root: serde_json::Value =
            serde_json::from_str(text).map_err(|e| Error::RulesParse(e.to_string()))?;

        let global = match root.get("global") {
            Some(v) if !v.is_null() => serde_json::from_value(v.clone())
                .map_err(|e| Error::RulesParse(format!("global: {e}")))?,
            _ => GlobalSettings::default(),
        };

        let preprocessing = match root.get("preprocessing") {
            Some(v) if v.is_object() => Some(
                serde_json::from_value(v.clone())
                    .map_err(|e| Error::RulesParse(format!("preprocessing: {e}")))?,
            ),
            _ => None,
        };

        let items = root
            .get("operations")
            .and_then(|v| v.as_array())
            .ok_or(Error::MissingOperations)?;

        let operations = items
            .iter()
            .enumerate()
            .map(|(i, v)| OperationSlot::parse(i, v))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            global,
            preprocessing,
            operations,
        })
    }

    /// Recognized operations with their document index.
    pub fn known(&self) -> impl Iterator<Item = (usize, &Operation)> {
        self.operations.iter().filter_map(|slot| match slot {
            OperationSlot::Known { index, op } => Some((*index, op)),
            OperationSlot::Unknown { .. } => None,
        })
    }

    /// Run [`Operation::check`] on every recognized operation.
    pub fn validate(&self) -> Result<()> {
        self.known().try_for_each(|(i, op)| op.check(i))
    }

    /// `global.workdir` if set, else `default`.
    pub fn workdir_or(&self, default: &Path) -> PathBuf {
        self.global
            .workdir
            .clone()
            .unwrap_or_else(|| default.to_path_buf())
    }

    /// `global.assets_dir` if set, else `default`.
    pub fn assets_dir_or(&self, default: &Path) -> PathBuf {
        self.global
            .assets_dir
            .clone()
            .unwrap_or_else(|| default.to_path_buf())
    }
}
