//! Cheap content-version identifiers for files on disk.

use std::path::Path;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};

/// `"<size>-<mtime seconds>"` for `path`, or an empty string if the file
/// cannot be stat'ed.
///
/// Two calls on an unchanged file always agree; a rewrite that changes the
/// size or the modification second yields a different value.
pub fn fingerprint(path: &Path) -> String {
    let Ok(meta) = std::fs::metadata(path) else {
        return String::new();
    };
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}-{}", meta.len(), mtime)
}

/// Short hex digest of the path itself, not its contents.
///
/// Distinguishes same-named files in different directories.
pub fn path_tag(path: &Path) -> String {
    let digest = Sha256::digest(path.as_os_str().as_encoded_bytes());
    hex::encode(&digest[..4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_for_unchanged_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("clip.mp4");
        std::fs::write(&p, b"0123456789").unwrap();
        let a = fingerprint(&p);
        let b = fingerprint(&p);
        assert_eq!(a, b);
        assert!(a.starts_with("10-"), "{a}");
    }

    #[test]
    fn size_change_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("clip.mp4");
        std::fs::write(&p, b"abc").unwrap();
        let before = fingerprint(&p);
        std::fs::write(&p, b"abcdef").unwrap();
        assert_ne!(before, fingerprint(&p));
    }

    #[test]
    fn missing_file_is_empty() {
        assert_eq!(fingerprint(Path::new("/nonexistent/clip.mp4")), "");
    }

    #[test]
    fn path_tag_depends_on_directory() {
        let a = path_tag(Path::new("/assets/a/clip.mp4"));
        let b = path_tag(Path::new("/assets/b/clip.mp4"));
        assert_eq!(a.len(), 8);
        assert_ne!(a, b);
        assert_eq!(a, path_tag(Path::new("/assets/a/clip.mp4")));
    }
}
