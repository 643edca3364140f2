//! In-process ZIP (CBZ) writing.

use async_trait::async_trait;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::ArchiveWriter;
use crate::error::{Error, Result};
use crate::path_utils::get_file_name_lossy;
use crate::types::CBZ_EXTENSION;

/// Writes a deflate-compressed ZIP archive at `target`.
///
/// Each entry is `(member name, source file)`; members are written in the given
/// order. This is blocking and should run on a blocking thread.
pub fn write_zip(target: &Path, entries: &[(String, PathBuf)]) -> Result<()> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let file = File::create(target)?;
    let mut zip = ZipWriter::new(file);

    for (member, source) in entries {
        let mut input = File::open(source).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("Failed to open '{}': {}", source.display(), e),
            ))
        })?;
        zip.start_file(member.as_str(), options)?;
        io::copy(&mut input, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

/// Packages files into a CBZ archive without any external tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter;

#[async_trait]
impl ArchiveWriter for ZipArchiveWriter {
    fn extension(&self) -> &'static str {
        CBZ_EXTENSION
    }

    async fn write_archive(&self, target: &Path, files: &[PathBuf]) -> Result<()> {
        let entries: Vec<(String, PathBuf)> = files
            .iter()
            .map(|path| (get_file_name_lossy(path), path.clone()))
            .collect();
        let target = target.to_path_buf();

        spawn_blocking(move || write_zip(&target, &entries)).await?
    }
}
