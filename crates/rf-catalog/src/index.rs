//! The persisted catalog index.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entry::MediaAssetEntry;

/// On-disk form of the catalog: `{"entries": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexFile {
    #[serde(default)]
    pub entries: Vec<MediaAssetEntry>,
}

impl IndexFile {
    /// Read an index, treating a missing or unreadable file as empty.
    ///
    /// Entries that fail to decode are dropped individually.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No persisted index");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read index: {e}");
                return Self::default();
            }
        };

        let doc: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Ignoring unparseable index: {e}");
                return Self::default();
            }
        };

        let entries = doc
            .get("entries")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match serde_json::from_value(item.clone()) {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            tracing::warn!("Skipping malformed index entry: {e}");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { entries }
    }

    /// Write the index atomically (temp file in the same directory, then
    /// rename), creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> rf_core::Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| rf_core::Error::Internal(format!("index serialization: {e}")))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(path).map_err(|e| rf_core::Error::from(e.error))?;

        tracing::debug!(path = %path.display(), entries = self.entries.len(), "Saved index");
        Ok(())
    }

    /// Normalized output previously recorded for `path` at `fingerprint`.
    pub fn recover(&self, path: &Path, fingerprint: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.path == path && e.fingerprint == fingerprint)
            .and_then(|e| e.normalized_path.as_deref())
    }
}
