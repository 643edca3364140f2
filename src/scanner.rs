//! Directory scanning and candidate discovery.
//!
//! The scan only looks at names: archives are bucketed by extension and their
//! content is verified later, when each one is processed.

use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::sequence::detect_sequence;
use crate::types::{ExpectedFormat, ScanResult};

/// Scans `root` for `.cbr` files, `.cbz` files and image sequence directories.
///
/// # Arguments
///
/// * `root` - Directory to scan; a missing or non-directory root yields an empty result
/// * `recursive` - Visit every descendant instead of only the immediate children
///
/// Every visited directory is tested on its own immediate children, so a
/// sequence directory nested inside another one is found as well.
/// Entries are visited in file-name order.
pub fn scan_directory(root: &Path, recursive: bool) -> ScanResult {
    let mut result = ScanResult::default();

    if !root.is_dir() {
        return result;
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry below '{}': {}", root.display(), e);
                continue;
            }
        };
        let path = entry.path();

        if path.is_file() {
            match ExpectedFormat::from_path(path) {
                ExpectedFormat::Rar => result.cbr_files.push(path.to_path_buf()),
                ExpectedFormat::Zip => result.cbz_files.push(path.to_path_buf()),
                ExpectedFormat::Untracked => {}
            }
        } else if path.is_dir() && detect_sequence(path).is_some() {
            result.image_sequence_dirs.push(path.to_path_buf());
        }
    }

    result
}
