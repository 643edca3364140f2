//! Filesystem mutations shared by the fixing components.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use log::{info, warn};
use tokio::fs;

use crate::error::Result;

/// Prefix marking log lines that describe an action which was not performed.
pub const DRY_RUN_PREFIX: &str = "[DRY RUN] ";

/// Outputs claimed by earlier steps of the same run.
///
/// A dry run writes nothing, so a later step cannot see the outputs of earlier
/// ones on disk. Every step checks and records its target here instead, which
/// makes a dry run plan exactly what a live run does.
#[derive(Debug, Default)]
pub struct PlannedOutputs {
    claimed: HashSet<PathBuf>,
}

impl PlannedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` exists on disk or was claimed earlier in this run.
    pub fn is_taken(&self, path: &Path) -> bool {
        self.claimed.contains(path) || path.exists()
    }

    pub fn claim(&mut self, path: PathBuf) {
        self.claimed.insert(path);
    }
}

/// Logs an action, prefixed with [`DRY_RUN_PREFIX`] when it was only planned.
pub fn log_operation(message: &str, dry_run: bool) {
    if dry_run {
        info!("{}{}", DRY_RUN_PREFIX, message);
    } else {
        info!("{}", message);
    }
}

/// Copies `src` to `dst` with its permissions and access/modification times.
pub async fn copy_with_times(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).await?;

    let metadata = fs::metadata(src).await?;
    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dst, atime, mtime)?;
    Ok(())
}

/// Removes a half-written output after a failed write. Missing files are fine.
pub async fn remove_partial(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => warn!("Removed incomplete output '{}'", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Could not remove incomplete output '{}': {}",
            path.display(),
            e
        ),
    }
}
