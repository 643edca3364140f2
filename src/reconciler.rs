//! Extension reconciliation.
//!
//! A `.cbz` file that is really a RAR archive (or the other way round) is copied
//! next to itself under the extension matching its content. The original file is
//! never touched.

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::detector::detect_format;
use crate::error::Result;
use crate::fs_ops::{PlannedOutputs, copy_with_times, log_operation, remove_partial};
use crate::path_utils::with_archive_extension;
use crate::types::ExpectedFormat;

/// Copies `path` to the extension matching its real container format.
///
/// # Arguments
///
/// * `path` - A file, usually ending in `.cbr` or `.cbz`
/// * `dry_run` - Report the fix without copying anything
///
/// # Returns
///
/// * `Some(PathBuf)` - The corrected path that was (or would be) written
/// * `None` - No fix needed, not possible, or the copy failed (logged)
pub async fn reconcile_extension(path: &Path, dry_run: bool) -> Option<PathBuf> {
    reconcile_extension_with(path, dry_run, &mut PlannedOutputs::new()).await
}

/// Like [`reconcile_extension`], but also treats outputs claimed in `planned` as
/// existing, and claims the corrected path.
pub async fn reconcile_extension_with(
    path: &Path,
    dry_run: bool,
    planned: &mut PlannedOutputs,
) -> Option<PathBuf> {
    match try_reconcile_extension(path, dry_run, planned).await {
        Ok(fixed) => fixed,
        Err(e) => {
            error!("Error fixing extension for '{}': {}", path.display(), e);
            None
        }
    }
}

/// Fallible core of [`reconcile_extension_with`].
pub async fn try_reconcile_extension(
    path: &Path,
    dry_run: bool,
    planned: &mut PlannedOutputs,
) -> Result<Option<PathBuf>> {
    let expected = ExpectedFormat::from_path(path);
    if expected == ExpectedFormat::Untracked {
        return Ok(None);
    }

    let actual = detect_format(path);
    let Some(extension) = actual.comic_extension() else {
        warn!("Could not determine file type for '{}'", path.display());
        return Ok(None);
    };

    if expected.matches(actual) {
        return Ok(None);
    }

    let new_path = with_archive_extension(path, extension);
    if planned.is_taken(&new_path) {
        info!(
            "Extension already fixed: '{}' exists for '{}' (actual type: {})",
            new_path.display(),
            path.display(),
            actual
        );
        return Ok(None);
    }

    if dry_run {
        log_operation(
            &format!(
                "Would fix extension: {} -> {} (actual type: {})",
                path.display(),
                new_path.display(),
                actual
            ),
            true,
        );
        planned.claim(new_path.clone());
        return Ok(Some(new_path));
    }

    if let Err(e) = copy_with_times(path, &new_path).await {
        remove_partial(&new_path).await;
        return Err(e);
    }

    log_operation(
        &format!(
            "Fixed extension: {} -> {} (actual type: {})",
            path.display(),
            new_path.display(),
            actual
        ),
        false,
    );
    planned.claim(new_path.clone());
    Ok(Some(new_path))
}
