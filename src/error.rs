//! Custom error types and result handling for comic-fixer operations.
//!
//! Every fallible operation in the crate returns a [`Result<T>`], a type alias for
//! `std::result::Result<T, Error>`. The public component entry points (reconciling,
//! converting, packaging) log these errors and turn them into `None`, so a single
//! broken file never aborts a run.
//!
use std::path::PathBuf;

/// Type alias for Results with comic-fixer errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all comic-fixer operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// ZIP file operation errors
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// Directory traversal errors
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    /// Blocking task join errors
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    FixerBuilder(#[from] crate::fixer::FixerConfigBuilderError),
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// An external helper binary could not be found on the execution path
    #[error("'{tool}' command not found. {hint}")]
    MissingDependency { tool: String, hint: String },
    /// An external helper binary ran but reported a failure
    #[error("'{tool}' exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },
    /// Error for unsupported operations or formats
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// Error for resources that couldn't be found (e.g., the root directory)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
