//! Small file helpers shared by the config store and the result cache.
//!
//! Both stores follow the same rules: a file's freshness is its modification
//! time, and writes replace the whole file through a sibling temp file so a
//! reader never observes a half-written document.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

use tempfile::NamedTempFile;

/// Modification time of `path`, or `None` if it does not exist or cannot be stat'ed.
#[must_use]
pub fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Whether a file stamp observed now should trigger a reload.
///
/// A file that appeared or disappeared since the last load counts as changed.
/// Otherwise only a strictly newer mtime does.
#[must_use]
pub fn is_newer(current: Option<SystemTime>, seen: Option<SystemTime>) -> bool {
    match (current, seen) {
        (Some(now), Some(then)) => now > then,
        (Some(_), None) | (None, Some(_)) => true,
        (None, None) => false,
    }
}

/// Replace `path` with `contents` in one rename.
///
/// Parent directories are created as needed. On failure the previous file
/// (if any) is left untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
