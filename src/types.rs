//! Core data types, enums, and reports for the comic-fixer library.
//!
//! This module defines the fundamental data structures used throughout the crate:
//! - Format classification (`ContainerFormat`, `ExpectedFormat`)
//! - Packaging output selection (`PackageFormat`) and RAR extraction (`RarBackend`)
//! - Reporting types (`ScanResult`, `RunSummary`)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Extension used for RAR-based comic archives.
pub const CBR_EXTENSION: &str = "cbr";
/// Extension used for ZIP-based comic archives.
pub const CBZ_EXTENSION: &str = "cbz";

/// The true container format of a file, derived from its magic bytes only.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContainerFormat {
    Rar,
    Zip,
    Unknown,
}

impl ContainerFormat {
    /// The comic archive extension matching this container, if any.
    pub fn comic_extension(&self) -> Option<&'static str> {
        match self {
            ContainerFormat::Rar => Some(CBR_EXTENSION),
            ContainerFormat::Zip => Some(CBZ_EXTENSION),
            ContainerFormat::Unknown => None,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerFormat::Rar => write!(f, "RAR"),
            ContainerFormat::Zip => write!(f, "ZIP"),
            ContainerFormat::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// The container format a file claims to be, derived from its extension only.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpectedFormat {
    Rar,
    Zip,
    /// Not a `.cbr` or `.cbz` file.
    Untracked,
}

impl ExpectedFormat {
    /// Maps `.cbr` to [`ExpectedFormat::Rar`] and `.cbz` to [`ExpectedFormat::Zip`],
    /// ignoring case. Everything else is [`ExpectedFormat::Untracked`].
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(CBR_EXTENSION) => ExpectedFormat::Rar,
            Some(ext) if ext.eq_ignore_ascii_case(CBZ_EXTENSION) => ExpectedFormat::Zip,
            _ => ExpectedFormat::Untracked,
        }
    }

    /// Whether the detected container agrees with the declared extension.
    pub fn matches(&self, actual: ContainerFormat) -> bool {
        matches!(
            (self, actual),
            (ExpectedFormat::Rar, ContainerFormat::Rar) | (ExpectedFormat::Zip, ContainerFormat::Zip)
        )
    }
}

/// Archive format produced when packaging an image sequence directory.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackageFormat {
    /// RAR archive built with the external `rar` tool.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "CBR"))]
    Cbr,
    /// ZIP archive built in process.
    #[cfg_attr(feature = "serde", serde(rename = "CBZ"))]
    Cbz,
}

impl PackageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PackageFormat::Cbr => CBR_EXTENSION,
            PackageFormat::Cbz => CBZ_EXTENSION,
        }
    }
}

impl FromStr for PackageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case(CBR_EXTENSION) {
            Ok(PackageFormat::Cbr)
        } else if s.eq_ignore_ascii_case(CBZ_EXTENSION) {
            Ok(PackageFormat::Cbz)
        } else {
            Err(Error::Unsupported(format!(
                "Package format '{}' (expected 'cbr' or 'cbz')",
                s
            )))
        }
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How RAR archives are unpacked for conversion.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RarBackend {
    /// The external `unrar` tool.
    #[default]
    Unrar,
    /// The `rar` crate, in process.
    Native,
}

impl FromStr for RarBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "unrar" => Ok(RarBackend::Unrar),
            "native" => Ok(RarBackend::Native),
            _ => Err(Error::Unsupported(format!(
                "RAR backend '{}' (expected 'unrar' or 'native')",
                s
            ))),
        }
    }
}

impl fmt::Display for RarBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RarBackend::Unrar => write!(f, "unrar"),
            RarBackend::Native => write!(f, "native"),
        }
    }
}

/// Outcome of a directory scan. The three lists are disjoint.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanResult {
    pub cbr_files: Vec<PathBuf>,
    pub cbz_files: Vec<PathBuf>,
    pub image_sequence_dirs: Vec<PathBuf>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.cbr_files.is_empty() && self.cbz_files.is_empty() && self.image_sequence_dirs.is_empty()
    }
}

/// Report of a complete run, aggregated by the orchestrator.
/// In dry-run mode the counts describe what a live run would do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub cbr_files_found: usize,
    pub cbz_files_found: usize,
    pub sequence_dirs_found: usize,
    pub extension_fixes: usize,
    pub conversions: usize,
    pub packaged_sequences: usize,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_format_ignores_case() {
        assert_eq!(ExpectedFormat::from_path(Path::new("a/Book.CBR")), ExpectedFormat::Rar);
        assert_eq!(ExpectedFormat::from_path(Path::new("book.cbz")), ExpectedFormat::Zip);
        assert_eq!(ExpectedFormat::from_path(Path::new("book.zip")), ExpectedFormat::Untracked);
        assert_eq!(ExpectedFormat::from_path(Path::new("cbz")), ExpectedFormat::Untracked);
    }

    #[test]
    fn expected_format_never_matches_unknown() {
        assert!(ExpectedFormat::Rar.matches(ContainerFormat::Rar));
        assert!(!ExpectedFormat::Rar.matches(ContainerFormat::Zip));
        assert!(!ExpectedFormat::Zip.matches(ContainerFormat::Unknown));
        assert!(!ExpectedFormat::Untracked.matches(ContainerFormat::Unknown));
    }

    #[test]
    fn package_format_parses() {
        assert_eq!("CBZ".parse::<PackageFormat>().unwrap(), PackageFormat::Cbz);
        assert_eq!("cbr".parse::<PackageFormat>().unwrap(), PackageFormat::Cbr);
        assert_eq!("Native".parse::<RarBackend>().unwrap(), RarBackend::Native);
        assert!("7z".parse::<RarBackend>().is_err());
        assert!("7z".parse::<PackageFormat>().is_err());
    }
}
