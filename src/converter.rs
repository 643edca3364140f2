//! RAR to ZIP (CBR to CBZ) conversion.

use std::path::{Path, PathBuf};

use log::{error, info, warn};
use tokio::task::spawn_blocking;
use walkdir::WalkDir;

use crate::archive::RarExtractor;
use crate::archive::zip::write_zip;
use crate::detector::detect_format;
use crate::error::{Error, Result};
use crate::fs_ops::{PlannedOutputs, log_operation, remove_partial};
use crate::path_utils::{member_name, with_archive_extension};
use crate::types::{CBZ_EXTENSION, ContainerFormat};

/// Re-packs RAR archives as deflate-compressed ZIP archives.
///
/// The source archive is left in place; the ZIP is written next to it with the
/// same stem and a `.cbz` extension.
pub struct RarToZipConverter<'a> {
    extractor: &'a dyn RarExtractor,
}

impl<'a> RarToZipConverter<'a> {
    pub fn new(extractor: &'a dyn RarExtractor) -> Self {
        Self { extractor }
    }

    /// Converts `path` to a `.cbz` archive.
    ///
    /// # Arguments
    ///
    /// * `path` - A file whose content is a RAR archive
    /// * `dry_run` - Report the conversion without extracting or writing anything
    ///
    /// # Returns
    ///
    /// * `Some(PathBuf)` - Path of the ZIP archive that was (or would be) written
    /// * `None` - The file is not a RAR archive, was already converted, or conversion failed (logged)
    pub async fn convert(&self, path: &Path, dry_run: bool) -> Option<PathBuf> {
        self.convert_with(path, dry_run, &mut PlannedOutputs::new()).await
    }

    /// Like [`RarToZipConverter::convert`], but also treats outputs claimed in
    /// `planned` as existing, and claims the written archive.
    pub async fn convert_with(
        &self,
        path: &Path,
        dry_run: bool,
        planned: &mut PlannedOutputs,
    ) -> Option<PathBuf> {
        match self.try_convert(path, dry_run, planned).await {
            Ok(converted) => converted,
            Err(e) => {
                error!("Error converting '{}' to CBZ: {}", path.display(), e);
                None
            }
        }
    }

    /// Fallible core of [`RarToZipConverter::convert_with`].
    pub async fn try_convert(
        &self,
        path: &Path,
        dry_run: bool,
        planned: &mut PlannedOutputs,
    ) -> Result<Option<PathBuf>> {
        if !path.exists() {
            warn!("CBR file not found: '{}'", path.display());
            return Ok(None);
        }

        let actual = detect_format(path);
        if actual != ContainerFormat::Rar {
            warn!(
                "File '{}' is not a valid CBR (RAR) file, actual type: {}",
                path.display(),
                actual
            );
            return Ok(None);
        }

        let target = with_archive_extension(path, CBZ_EXTENSION);
        if planned.is_taken(&target) {
            info!(
                "Already converted: '{}' exists for '{}'",
                target.display(),
                path.display()
            );
            return Ok(None);
        }

        if dry_run {
            log_operation(
                &format!(
                    "Would convert CBR to CBZ: {} -> {}",
                    path.display(),
                    target.display()
                ),
                true,
            );
            planned.claim(target.clone());
            return Ok(Some(target));
        }

        // Dropped on every exit path, which removes the extracted tree.
        let extraction_dir = tempfile::tempdir()?;
        self.extractor
            .extract_all(path, extraction_dir.path())
            .await?;

        let root = extraction_dir.path().to_path_buf();
        let entries = spawn_blocking(move || collect_entries(&root)).await??;

        let target_clone = target.clone();
        let written = spawn_blocking(move || write_zip(&target_clone, &entries)).await?;
        if let Err(e) = written {
            remove_partial(&target).await;
            return Err(e);
        }

        log_operation(
            &format!(
                "Converted CBR to CBZ: {} -> {}",
                path.display(),
                target.display()
            ),
            false,
        );
        planned.claim(target.clone());
        Ok(Some(target))
    }
}

/// Lists every regular file below `root` as `(member name, path)`, sorted by the
/// path relative to `root`.
pub fn collect_entries(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::Other(e.to_string()))?
            .to_path_buf();
        files.push((relative, entry.into_path()));
    }

    files.sort_by(|(a, _), (b, _)| a.cmp(b));

    files
        .into_iter()
        .map(|(relative, path)| Ok((member_name(&relative)?, path)))
        .collect()
}
