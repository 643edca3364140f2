//! Packaging of numbered image directories into comic archives.

use std::path::{Path, PathBuf};

use log::{error, warn};

use crate::archive::ArchiveWriter;
use crate::error::{Error, Result};
use crate::fs_ops::{PlannedOutputs, copy_with_times, log_operation, remove_partial};
use crate::path_utils::{get_file_name_lossy, unique_archive_path};
use crate::sequence::detect_sequence;

/// Minimum width of the position prefix given to staged images.
const MIN_POSITION_WIDTH: usize = 3;

/// Turns an image sequence directory into a single archive next to it.
pub struct Packager<'a> {
    writer: &'a dyn ArchiveWriter,
}

impl<'a> Packager<'a> {
    pub fn new(writer: &'a dyn ArchiveWriter) -> Self {
        Self { writer }
    }

    /// Packages the numbered images of `directory`, in page order.
    ///
    /// # Arguments
    ///
    /// * `directory` - A directory holding an image sequence
    /// * `dry_run` - Report the archive that would be created without creating it
    ///
    /// # Returns
    ///
    /// * `Some(PathBuf)` - Path of the archive that was (or would be) created
    /// * `None` - The directory is not a sequence or packaging failed (logged)
    pub async fn package(&self, directory: &Path, dry_run: bool) -> Option<PathBuf> {
        self.package_with(directory, dry_run, &mut PlannedOutputs::new()).await
    }

    /// Like [`Packager::package`], but also avoids archive names claimed in
    /// `planned`, and claims the chosen one.
    pub async fn package_with(
        &self,
        directory: &Path,
        dry_run: bool,
        planned: &mut PlannedOutputs,
    ) -> Option<PathBuf> {
        match self.try_package(directory, dry_run, planned).await {
            Ok(packaged) => packaged,
            Err(e @ Error::MissingDependency { .. }) => {
                error!("Cannot package '{}': {}", directory.display(), e);
                None
            }
            Err(Error::ToolFailed {
                tool,
                status,
                stderr,
            }) => {
                error!(
                    "Error running '{}' for '{}' ({})",
                    tool,
                    directory.display(),
                    status
                );
                error!("{} output: {}", tool, stderr);
                None
            }
            Err(e) => {
                error!("Error packaging '{}': {}", directory.display(), e);
                None
            }
        }
    }

    /// Fallible core of [`Packager::package_with`].
    pub async fn try_package(
        &self,
        directory: &Path,
        dry_run: bool,
        planned: &mut PlannedOutputs,
    ) -> Result<Option<PathBuf>> {
        let Some(images) = detect_sequence(directory) else {
            warn!(
                "Directory '{}' does not contain a valid image sequence",
                directory.display()
            );
            return Ok(None);
        };

        let target = unique_archive_path(directory, self.writer.extension(), planned)?;

        if dry_run {
            log_operation(
                &format!(
                    "Would package image sequence from {} -> {}",
                    directory.display(),
                    target.display()
                ),
                true,
            );
            log_operation(&format!("  Would include {} images", images.len()), true);
            planned.claim(target.clone());
            return Ok(Some(target));
        }

        // Dropped on every exit path, which removes the staged copies.
        let staging_dir = tempfile::tempdir()?;
        let staged = stage_images(&images, staging_dir.path()).await?;

        if let Err(e) = self.writer.write_archive(&target, &staged).await {
            remove_partial(&target).await;
            return Err(e);
        }

        log_operation(
            &format!(
                "Packaged image sequence: {} -> {} ({} images)",
                directory.display(),
                target.display(),
                images.len()
            ),
            false,
        );
        planned.claim(target.clone());
        Ok(Some(target))
    }
}

/// Copies `images` into `staging` under position-prefixed names, so that name
/// order equals sequence order, and returns the staged paths in that order.
pub async fn stage_images(images: &[PathBuf], staging: &Path) -> Result<Vec<PathBuf>> {
    let width = images.len().to_string().len().max(MIN_POSITION_WIDTH);
    let mut staged = Vec::with_capacity(images.len());

    for (position, image) in images.iter().enumerate() {
        let name = format!(
            "{:0width$}_{}",
            position + 1,
            get_file_name_lossy(image),
            width = width
        );
        let destination = staging.join(name);
        copy_with_times(image, &destination).await?;
        staged.push(destination);
    }

    Ok(staged)
}
