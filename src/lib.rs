//! comic-fixer - Comic Archive Repair Library
//!
//! This crate repairs comic book archives in a directory tree:
//!
//! - `.cbr`/`.cbz` files whose extension lies about their content (a ZIP named
//!   `.cbr`, a RAR named `.cbz`) are copied to the correct extension,
//! - real RAR `.cbr` files are converted to ZIP `.cbz` files,
//! - directories of numbered images (`001.jpg`, `002.jpg`, ...) are packaged into
//!   an archive.
//!
//! Every change is additive: originals are never removed or overwritten.
//!
//! # Getting Started
//!
//! ```rust,no_run
//! use comic_fixer::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> comic_fixer::error::Result<()> {
//!     let config = FixerConfig::builder()
//!         .root_path(PathBuf::from("./comics"))
//!         .recursive(true)
//!         .dry_run(true)
//!         .build()?;
//!
//!     let summary = config.run().await?;
//!     println!(
//!         "{} fixes, {} conversions, {} packaged",
//!         summary.extension_fixes, summary.conversions, summary.packaged_sequences
//!     );
//!     Ok(())
//! }
//! ```
//!
//! The individual steps are usable on their own: see [`detector`], [`sequence`],
//! [`reconciler`], [`converter`], [`packager`] and [`scanner`].

pub mod archive;
pub mod converter;
pub mod detector;
pub mod error;
pub mod fixer;
pub mod fs_ops;
pub mod packager;
pub mod path_utils;
pub mod reconciler;
pub mod scanner;
pub mod sequence;
pub mod types;

pub use fixer::FixerConfig;
pub use fixer::FixerConfigBuilder;

pub use types::{
    ContainerFormat, ExpectedFormat, PackageFormat, RarBackend, RunSummary, ScanResult,
};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and traits, allowing you to
/// import everything you need with a single `use comic_fixer::prelude::*;` statement.
pub mod prelude {
    pub use super::{
        ContainerFormat, ExpectedFormat, FixerConfig, FixerConfigBuilder, PackageFormat,
        RarBackend, RunSummary, ScanResult, error, types,
    };
    pub use crate::archive::{ArchiveWriter, RarExtractor};
    pub use crate::converter::RarToZipConverter;
    pub use crate::detector::detect_format;
    pub use crate::packager::Packager;
    pub use crate::fs_ops::PlannedOutputs;
    pub use crate::reconciler::{reconcile_extension, reconcile_extension_with};
    pub use crate::scanner::scan_directory;
    pub use crate::sequence::detect_sequence;
    pub use std::path::{Path, PathBuf};
    pub use std::sync::Arc;
}
