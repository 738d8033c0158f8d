//! External tool detection and management.
//!
//! The [`ToolRegistry`] resolves the locations of ffmpeg, ffprobe and ffplay
//! once at startup and hands them out to the probe, transform and preview
//! paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rf_core::config::ToolsConfig;

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";
pub const FFPLAY: &str = "ffplay";

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &[FFMPEG, FFPROBE, FFPLAY];

/// Where a resolved tool path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSource {
    /// Explicit path from the config file or command line.
    Configured,
    /// Found in the same directory as the resolved ffmpeg binary.
    Sibling,
    /// Found by searching `PATH`.
    Path,
}

/// A single resolved tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Tool name (e.g. "ffplay").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
    pub source: ToolSource,
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of `-version` output, if the tool ran.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool locations.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Discover tools from config overrides, the ffmpeg directory and `PATH`.
    ///
    /// ffmpeg is resolved first: a configured path that exists wins, otherwise
    /// `PATH` is searched. ffprobe and ffplay then use their own configured
    /// path if it exists, else a binary sitting next to ffmpeg, else `PATH`.
    /// Tools that cannot be found are omitted.
    pub fn discover(tools_config: &ToolsConfig) -> Self {
        let mut tools = HashMap::new();

        let ffmpeg = resolve(FFMPEG, tools_config.ffmpeg_path.as_deref(), None);
        let ffmpeg_dir = ffmpeg
            .as_ref()
            .and_then(|t| t.path.parent().map(Path::to_path_buf));
        if let Some(t) = ffmpeg {
            tools.insert(FFMPEG.to_string(), t);
        }

        for (name, custom) in [
            (FFPROBE, tools_config.ffprobe_path.as_deref()),
            (FFPLAY, tools_config.ffplay_path.as_deref()),
        ] {
            if let Some(t) = resolve(name, custom, ffmpeg_dir.as_deref()) {
                tools.insert(name.to_string(), t);
            }
        }

        for t in tools.values() {
            tracing::debug!(tool = %t.name, path = %t.path.display(), source = ?t.source, "Resolved tool");
        }

        Self { tools }
    }

    /// Return the [`ToolConfig`] for the given tool, or an
    /// [`rf_core::Error::Tool`] if it was not found during discovery.
    pub fn require(&self, name: &str) -> rf_core::Result<&ToolConfig> {
        self.tools.get(name).ok_or_else(|| {
            rf_core::Error::tool(name, format!("{name} not found; is it installed and in PATH?"))
        })
    }

    /// Whether the named tool was found.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        KNOWN_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(cfg) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(&cfg.path),
                    path: Some(cfg.path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

fn resolve(name: &str, custom: Option<&Path>, sibling_dir: Option<&Path>) -> Option<ToolConfig> {
    let found = |path: PathBuf, source| ToolConfig {
        name: name.to_string(),
        path,
        source,
    };

    if let Some(p) = custom {
        if p.exists() {
            return Some(found(p.to_path_buf(), ToolSource::Configured));
        }
        tracing::warn!(tool = name, path = %p.display(), "Configured tool path does not exist");
    }

    if let Some(dir) = sibling_dir {
        let candidate = dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX));
        if candidate.is_file() {
            return Some(found(candidate, ToolSource::Sibling));
        }
    }

    which::which(name)
        .ok()
        .map(|p| found(p, ToolSource::Path))
}

/// Run `<tool> -version` and return the first line of stdout.
fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path)
        .arg("-version")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}
