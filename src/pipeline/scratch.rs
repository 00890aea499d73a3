//! Per-run scratch arena for ephemeral page images.
//!
//! ## Why a directory per run?
//!
//! Every intermediate artifact (raster PNGs, enhanced variants) lives inside
//! one uniquely named temp subdirectory owned by the run. Concurrent runs
//! never share files because `tempfile` guarantees a unique directory name,
//! and the no-leak invariant collapses to "one directory is removed" — the
//! `Drop` impl runs on every exit path, success, fatal error, or panic, so
//! cleanup is a property of ownership rather than of bookkeeping discipline.
//!
//! Removal failures are logged at `warn` and swallowed: cleanup must never
//! mask or replace the run's primary result.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// A run-scoped scratch directory; removed recursively when dropped.
pub struct ScratchArena {
    dir: Option<TempDir>,
}

impl ScratchArena {
    /// Create a fresh arena under `root` (or the system temp dir).
    pub fn create(root: Option<&Path>) -> io::Result<Self> {
        let builder_root = match root {
            Some(r) => r.to_path_buf(),
            None => std::env::temp_dir(),
        };
        let dir = tempfile::Builder::new()
            .prefix("scantext-")
            .tempdir_in(builder_root)?;
        debug!("Scratch arena created at {}", dir.path().display());
        Ok(Self { dir: Some(dir) })
    }

    /// The arena's directory path.
    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .expect("arena accessed after release")
            .path()
    }

    /// Path for one page's raster image.
    pub fn raster_path(&self, index: usize) -> PathBuf {
        self.path().join(format!("page-{index:04}.png"))
    }

    /// Path for one page's enhanced image.
    pub fn enhanced_path(&self, index: usize) -> PathBuf {
        self.path().join(format!("page-{index:04}.enhanced.png"))
    }
}

impl Drop for ScratchArena {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!("Failed to remove scratch arena {}: {}", path.display(), e);
            } else {
                debug!("Scratch arena removed: {}", path.display());
            }
        }
    }
}
