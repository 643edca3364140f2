//! Archive capabilities used by the converter and the packager.
//!
//! Creating and extracting archives is kept behind two small traits so that the
//! orchestration logic never talks to an external tool directly. The default
//! implementations shell out to `rar`/`unrar` or use the `rar` crate ([`rar`]),
//! and write ZIP archives in process ([`zip`]); tests substitute their own.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub mod rar;
pub mod zip;

pub use self::rar::{NativeRarExtractor, RarCli, UnrarCli};
pub use self::zip::ZipArchiveWriter;

/// Produces an archive from an ordered list of files.
///
/// Implementations must store the files in the order given and must not
/// overwrite anything but `target`.
#[async_trait]
pub trait ArchiveWriter: Send + Sync {
    /// Extension of the archives this writer produces, without the dot (e.g. `cbr`).
    fn extension(&self) -> &'static str;

    /// Writes `files`, in order and without their directory components, to `target`.
    ///
    /// # Returns
    /// * `Err(Error::MissingDependency)` - The backing tool is not installed
    /// * `Err(Error::ToolFailed)` - The backing tool reported a failure
    async fn write_archive(&self, target: &Path, files: &[PathBuf]) -> Result<()>;
}

/// Unpacks every entry of a RAR archive into a directory.
#[async_trait]
pub trait RarExtractor: Send + Sync {
    /// Extracts all entries of `archive` below `destination`, keeping their
    /// relative paths.
    ///
    /// # Returns
    /// * `Err(Error::MissingDependency)` - The extraction helper is not installed
    /// * `Err(Error::ToolFailed)` - Extraction itself failed
    async fn extract_all(&self, archive: &Path, destination: &Path) -> Result<()>;
}
