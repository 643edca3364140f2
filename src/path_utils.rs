//! Path utilities for naming archives and archive members.
//!
//! This module provides the small, pure path computations shared by the
//! reconciler, converter and packager: swapping archive extensions, finding a
//! collision-free archive name, and turning relative paths into ZIP member names.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs_ops::PlannedOutputs;

/// Gets the file name from a path with fallback to lossy conversion.
///
/// # Arguments
///
/// * `path` - The path to extract the file name from
///
/// # Returns
///
/// * `String` - The file name, using lossy conversion if necessary
pub fn get_file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Replaces the final extension of `path` with `extension`.
///
/// `book.cbz` becomes `book.cbr`; `my.book.cbz` becomes `my.book.cbr`.
pub fn with_archive_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// Computes the archive path for packaging `directory`.
///
/// The archive lands next to the directory as `<name>.<extension>`. When that
/// path is taken, `<name>_1.<extension>`, `<name>_2.<extension>`, ... are tried
/// until a free one is found. Existing files and paths claimed in `planned` are
/// never selected.
///
/// # Returns
///
/// * `Err(Error::InvalidPath)` - The directory has no name or no parent (e.g. `/`)
pub fn unique_archive_path(
    directory: &Path,
    extension: &str,
    planned: &PlannedOutputs,
) -> Result<PathBuf> {
    let name = directory.file_name().ok_or_else(|| {
        Error::InvalidPath(
            directory.to_path_buf(),
            "Directory has no name to derive an archive name from".to_string(),
        )
    })?;
    let parent = directory.parent().ok_or_else(|| {
        Error::InvalidPath(
            directory.to_path_buf(),
            "Directory has no parent to place the archive in".to_string(),
        )
    })?;
    let name = name.to_string_lossy();

    let candidate = parent.join(format!("{}.{}", name, extension));
    if !planned.is_taken(&candidate) {
        return Ok(candidate);
    }

    let mut counter: usize = 1;
    loop {
        let candidate = parent.join(format!("{}_{}.{}", name, counter, extension));
        if !planned.is_taken(&candidate) {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Builds a ZIP member name from a path relative to an extraction root,
/// joining the components with `/` regardless of platform.
///
/// # Returns
///
/// * `Err(Error::InvalidPath)` - The path is absolute, climbs out of the root, or is empty
pub fn member_name(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::CurDir => continue,
            _ => {
                return Err(Error::InvalidPath(
                    relative.to_path_buf(),
                    "Archive member must be a plain relative path".to_string(),
                ));
            }
        }
    }

    if parts.is_empty() {
        return Err(Error::InvalidPath(
            relative.to_path_buf(),
            "Archive member name is empty".to_string(),
        ));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_name_lossy() {
        let path = Path::new("test/file.txt");
        assert_eq!(get_file_name_lossy(path), "file.txt");
        assert_eq!(get_file_name_lossy(Path::new("/")), "unknown");
    }

    #[test]
    fn test_with_archive_extension() {
        assert_eq!(
            with_archive_extension(Path::new("dir/book.cbz"), "cbr"),
            PathBuf::from("dir/book.cbr")
        );
        assert_eq!(
            with_archive_extension(Path::new("my.book.CBR"), "cbz"),
            PathBuf::from("my.book.cbz")
        );
    }

    #[test]
    fn test_member_name() {
        assert_eq!(member_name(Path::new("a.jpg")).unwrap(), "a.jpg");
        assert_eq!(
            member_name(&Path::new("sub").join("b.jpg")).unwrap(),
            "sub/b.jpg"
        );
        assert!(member_name(Path::new("../escape.jpg")).is_err());
        assert!(member_name(Path::new("")).is_err());
    }

    #[test]
    fn test_unique_archive_path_without_parent() {
        assert!(unique_archive_path(Path::new("/"), "cbr", &PlannedOutputs::new()).is_err());
    }

    #[test]
    fn test_unique_archive_path_skips_claimed_names() {
        let mut planned = PlannedOutputs::new();
        let directory = Path::new("no-such-parent/vol1");
        assert_eq!(
            unique_archive_path(directory, "cbr", &planned).unwrap(),
            PathBuf::from("no-such-parent/vol1.cbr")
        );

        planned.claim(PathBuf::from("no-such-parent/vol1.cbr"));
        planned.claim(PathBuf::from("no-such-parent/vol1_1.cbr"));
        assert_eq!(
            unique_archive_path(directory, "cbr", &planned).unwrap(),
            PathBuf::from("no-such-parent/vol1_2.cbr")
        );
    }
}
