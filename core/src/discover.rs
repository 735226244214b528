//! Media file discovery.
//!
//! Walks an input path and yields the files eligible for transcription.
//! A single file input must match the supported extension set; directory
//! inputs are filtered silently.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File extensions accepted as transcription input.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // Audio
    "aac", "flac", "m4a", "mp3", "ogg", "opus", "wav", "wma",
    // Video containers, the audio track is extracted
    "avi", "mkv", "mov", "mp4", "webm",
];

/// One discovered input file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Lowercased extension without the dot.
    pub extension: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

impl MediaItem {
    /// File name for display, lossy for non-UTF-8 names.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn supported_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Check whether a path has a supported media extension.
pub fn is_supported(path: &Path) -> bool {
    supported_extension(path).is_some()
}

/// Discover transcribable media under `root`.
///
/// A file yields exactly one item (or `UnsupportedFormat`). A directory
/// yields every supported file directly inside it, plus nested matches when
/// `recursive` is set. Order is filesystem enumeration order; sort the
/// result if determinism matters. Fails with `PathNotFound` when `root`
/// does not exist.
pub fn discover(root: &Path, recursive: bool) -> Result<Vec<MediaItem>> {
    let root = std::fs::canonicalize(root).map_err(|_| Error::PathNotFound(root.to_path_buf()))?;

    if root.is_file() {
        let Some(extension) = supported_extension(&root) else {
            return Err(Error::UnsupportedFormat(format!(
                "{} (supported: {})",
                root.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        };
        let size_bytes = std::fs::metadata(&root)?.len();
        return Ok(vec![MediaItem {
            path: root,
            extension,
            size_bytes,
        }]);
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut items = Vec::new();

    for entry in WalkDir::new(&root).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(error = %error, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(extension) = supported_extension(entry.path()) else {
            continue;
        };
        let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
        items.push(MediaItem {
            path: entry.into_path(),
            extension,
            size_bytes,
        });
    }

    debug!(
        count = items.len(),
        root = %root.display(),
        recursive,
        "media discovery complete"
    );

    Ok(items)
}

#[cfg(test)]
#[path = "discover_test.rs"]
mod tests;
