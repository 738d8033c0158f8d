//! Concat demuxer list files.
//!
//! Each line is `file '<absolute path>'`. Single quotes inside a path are
//! written as `'\''` (close, escaped quote, reopen).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rf_core::Result;

/// One list line for `path`, made absolute against the current directory.
pub fn list_entry(path: &Path) -> Result<String> {
    let abs = std::path::absolute(path)?;
    let escaped = abs.to_string_lossy().replace('\'', r"'\''");
    Ok(format!("file '{escaped}'"))
}

/// Render a complete list, one entry per file, in order.
pub fn render(files: &[PathBuf]) -> Result<String> {
    let mut out = String::new();
    for f in files {
        let _ = writeln!(out, "{}", list_entry(f)?);
    }
    Ok(out)
}

/// Write the list for `files` to `list`.
pub fn write(list: &Path, files: &[PathBuf]) -> Result<()> {
    let body = render(files)?;
    std::fs::write(list, body)?;
    tracing::debug!(list = %list.display(), entries = files.len(), "Wrote concat list");
    Ok(())
}
