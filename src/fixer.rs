use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use crate::archive::rar::{DEFAULT_RAR_BINARY, DEFAULT_UNRAR_BINARY};
use crate::archive::{
    ArchiveWriter, NativeRarExtractor, RarCli, RarExtractor, UnrarCli, ZipArchiveWriter,
};
use crate::converter::RarToZipConverter;
use crate::error::{Error, Result};
use crate::packager::Packager;
use crate::fs_ops::PlannedOutputs;
use crate::reconciler::reconcile_extension_with;
use crate::scanner::scan_directory;
use crate::types::{PackageFormat, RarBackend, RunSummary, ScanResult};

const BANNER: &str = "============================================================";

/// Configuration of a fixing run, built declaratively using the builder pattern.
///
/// A run scans [`root_path`](FixerConfig::root_path), then:
/// 1. copies every mislabeled `.cbr`/`.cbz` file to its correct extension,
/// 2. converts every real RAR `.cbr` file to a `.cbz` file next to it,
/// 3. packages every numbered image directory into an archive next to it.
///
/// Nothing is ever deleted or overwritten; every output is a new file.
///
/// ## Builder Pattern
///
/// ```rust,no_run
/// # use comic_fixer::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> comic_fixer::error::Result<()> {
/// let config = FixerConfig::builder()
///     .root_path(PathBuf::from("./comics"))
///     .dry_run(true)
///     .package_format(PackageFormat::Cbz)
///     .build()?;
///
/// let summary = config.run().await?;
/// println!("{} conversions planned", summary.conversions);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
pub struct FixerConfig {
    /// Directory to scan. Must exist and be a directory when the run starts.
    pub root_path: PathBuf,

    /// Report every action without modifying the filesystem.
    #[builder(default = "false")]
    pub dry_run: bool,

    /// Scan the whole tree below `root_path` instead of only its immediate children.
    #[builder(default = "true")]
    pub recursive: bool,

    /// Archive format produced for image sequence directories.
    ///
    /// - [`PackageFormat::Cbr`]: RAR archive through the external `rar` tool
    /// - [`PackageFormat::Cbz`]: ZIP archive written in process
    ///
    /// Ignored when [`archive_writer`](FixerConfig::archive_writer) is set.
    #[builder(default)]
    pub package_format: PackageFormat,

    /// Name or path of the `rar` executable used for CBR packaging.
    #[builder(default = "PathBuf::from(DEFAULT_RAR_BINARY)")]
    pub rar_binary: PathBuf,

    /// Name or path of the `unrar` executable used for CBR extraction.
    #[builder(default = "PathBuf::from(DEFAULT_UNRAR_BINARY)")]
    pub unrar_binary: PathBuf,

    /// How CBR files are unpacked for conversion.
    ///
    /// Ignored when [`rar_extractor`](FixerConfig::rar_extractor) is set.
    #[builder(default)]
    pub rar_backend: RarBackend,

    /// Custom archive writer for packaging, replacing the one selected by `package_format`.
    #[builder(default)]
    pub archive_writer: Option<Arc<dyn ArchiveWriter>>,

    /// Custom RAR extractor for conversion, replacing `unrar`.
    #[builder(default)]
    pub rar_extractor: Option<Arc<dyn RarExtractor>>,
}

impl std::fmt::Debug for FixerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixerConfig")
            .field("root_path", &self.root_path)
            .field("dry_run", &self.dry_run)
            .field("recursive", &self.recursive)
            .field("package_format", &self.package_format)
            .field("rar_binary", &self.rar_binary)
            .field("unrar_binary", &self.unrar_binary)
            .field("rar_backend", &self.rar_backend)
            .field(
                "archive_writer",
                if self.archive_writer.is_some() {
                    &"Some(ArchiveWriter)"
                } else {
                    &"None"
                },
            )
            .field(
                "rar_extractor",
                if self.rar_extractor.is_some() {
                    &"Some(RarExtractor)"
                } else {
                    &"None"
                },
            )
            .finish()
    }
}

impl FixerConfig {
    /// Creates a new builder for configuring `FixerConfig`.
    pub fn builder() -> FixerConfigBuilder {
        FixerConfigBuilder::default()
    }

    /// Verifies that the root path exists and is a directory.
    ///
    /// [`run`](FixerConfig::run) calls this itself; calling it early lets a caller
    /// reject a bad root before doing anything else.
    pub fn preflight_check(&self) -> Result<&Self> {
        if !self.root_path.exists() {
            return Err(Error::NotFound(format!(
                "Directory does not exist: {:?}",
                self.root_path
            )));
        }
        if !self.root_path.is_dir() {
            return Err(Error::InvalidPath(
                self.root_path.clone(),
                "Path is not a directory.".to_string(),
            ));
        }
        Ok(self)
    }

    /// Scans the root path without processing anything.
    pub async fn scan(&self) -> Result<ScanResult> {
        let root = self.root_path.clone();
        let recursive = self.recursive;
        Ok(spawn_blocking(move || scan_directory(&root, recursive)).await?)
    }

    /// The archive writer used for packaging.
    pub fn effective_archive_writer(&self) -> Arc<dyn ArchiveWriter> {
        if let Some(writer) = &self.archive_writer {
            return Arc::clone(writer);
        }
        match self.package_format {
            PackageFormat::Cbr => Arc::new(RarCli::new(&self.rar_binary)),
            PackageFormat::Cbz => Arc::new(ZipArchiveWriter),
        }
    }

    /// The RAR extractor used for conversion.
    pub fn effective_rar_extractor(&self) -> Arc<dyn RarExtractor> {
        if let Some(extractor) = &self.rar_extractor {
            return Arc::clone(extractor);
        }
        match self.rar_backend {
            RarBackend::Unrar => Arc::new(UnrarCli::new(&self.unrar_binary)),
            RarBackend::Native => Arc::new(NativeRarExtractor),
        }
    }

    /// Runs the full pipeline: scan, fix extensions, convert, package.
    ///
    /// Items are processed one at a time. A failure on one item is logged and the
    /// run moves on; only a failed [`preflight_check`](FixerConfig::preflight_check)
    /// or a failed scan ends the run with an error.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Counts of what was found and what was done (or would be done)
    /// * `Err(Error)` - The root path is unusable or the scan could not complete
    pub async fn run(&self) -> Result<RunSummary> {
        self.preflight_check()?;

        if self.dry_run {
            info!("{}", BANNER);
            info!("DRY RUN MODE - No files will be modified");
            info!("{}", BANNER);
        }

        info!("Scanning directory: {}", self.root_path.display());
        info!(
            "Recursive mode: {}",
            if self.recursive { "enabled" } else { "disabled" }
        );

        let scan = self.scan().await?;

        info!("Found:");
        info!("  - {} CBR files", scan.cbr_files.len());
        info!("  - {} CBZ files", scan.cbz_files.len());
        info!(
            "  - {} image sequence directories",
            scan.image_sequence_dirs.len()
        );

        let mut summary = RunSummary {
            cbr_files_found: scan.cbr_files.len(),
            cbz_files_found: scan.cbz_files.len(),
            sequence_dirs_found: scan.image_sequence_dirs.len(),
            dry_run: self.dry_run,
            ..Default::default()
        };

        if scan.is_empty() {
            info!("No files to process.");
            return Ok(summary);
        }

        info!("{}", BANNER);
        info!("Processing files...");
        info!("{}", BANNER);

        self.process(&scan, &mut summary).await;
        Self::log_summary(&summary);

        Ok(summary)
    }

    /// Applies every fix to the items of `scan`, in order, counting successes.
    async fn process(&self, scan: &ScanResult, summary: &mut RunSummary) {
        let extractor = self.effective_rar_extractor();
        let writer = self.effective_archive_writer();
        let converter = RarToZipConverter::new(extractor.as_ref());
        let packager = Packager::new(writer.as_ref());
        let mut planned = PlannedOutputs::new();

        for cbr_file in &scan.cbr_files {
            info!("Processing CBR file: {}", cbr_file.display());

            // A fixed extension means the content was not RAR: nothing to convert.
            if reconcile_extension_with(cbr_file, self.dry_run, &mut planned)
                .await
                .is_some()
            {
                summary.extension_fixes += 1;
                continue;
            }

            if converter
                .convert_with(cbr_file, self.dry_run, &mut planned)
                .await
                .is_some()
            {
                summary.conversions += 1;
            }
        }

        for cbz_file in &scan.cbz_files {
            info!("Processing CBZ file: {}", cbz_file.display());

            if reconcile_extension_with(cbz_file, self.dry_run, &mut planned)
                .await
                .is_some()
            {
                summary.extension_fixes += 1;
            }
        }

        for sequence_dir in &scan.image_sequence_dirs {
            info!(
                "Processing image sequence directory: {}",
                sequence_dir.display()
            );

            if packager
                .package_with(sequence_dir, self.dry_run, &mut planned)
                .await
                .is_some()
            {
                summary.packaged_sequences += 1;
            }
        }
    }

    fn log_summary(summary: &RunSummary) {
        info!("{}", BANNER);
        info!("Summary:");
        info!("{}", BANNER);
        info!("  - Extension fixes: {}", summary.extension_fixes);
        info!("  - CBR to CBZ conversions: {}", summary.conversions);
        info!(
            "  - Image sequences packaged: {}",
            summary.packaged_sequences
        );

        if summary.dry_run {
            info!("{}", BANNER);
            info!("DRY RUN COMPLETE - No files were modified");
            info!("Run without --dry-run to apply changes");
            info!("{}", BANNER);
        }
    }
}

impl FixerConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(root) = &self.root_path {
            if root.as_os_str().is_empty() {
                return Err("root_path must not be empty".to_string());
            }
        }
        if let Some(binary) = &self.rar_binary {
            if binary.as_os_str().is_empty() {
                return Err("rar_binary must not be empty".to_string());
            }
        }
        if let Some(binary) = &self.unrar_binary {
            if binary.as_os_str().is_empty() {
                return Err("unrar_binary must not be empty".to_string());
            }
        }
        Ok(())
    }
}
