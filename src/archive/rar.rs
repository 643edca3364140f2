//! RAR support.
//!
//! RAR archives can only be created by the proprietary `rar` tool. Extraction
//! goes through `unrar` by default, or through the `rar` crate in process with
//! [`NativeRarExtractor`]. Binaries are looked up on the execution path unless an
//! explicit one is configured.

use async_trait::async_trait;
use log::debug;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::task::spawn_blocking;

use crate::archive::{ArchiveWriter, RarExtractor};
use crate::error::{Error, Result};
use crate::types::CBR_EXTENSION;

/// Default name of the RAR creation tool.
pub const DEFAULT_RAR_BINARY: &str = "rar";
/// Default name of the RAR extraction tool.
pub const DEFAULT_UNRAR_BINARY: &str = "unrar";

/// Creates CBR archives with `rar a -ep1 <target> <file>...`.
#[derive(Debug, Clone)]
pub struct RarCli {
    binary: PathBuf,
}

impl RarCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for RarCli {
    fn default() -> Self {
        Self::new(DEFAULT_RAR_BINARY)
    }
}

#[async_trait]
impl ArchiveWriter for RarCli {
    fn extension(&self) -> &'static str {
        CBR_EXTENSION
    }

    async fn write_archive(&self, target: &Path, files: &[PathBuf]) -> Result<()> {
        let mut command = Command::new(&self.binary);
        // -ep1 strips the staging directory from the stored names.
        command.arg("a").arg("-ep1").arg(target).args(files);
        run_tool(command, &self.binary, DEFAULT_RAR_BINARY).await
    }
}

/// Extracts RAR archives with `unrar x -o+ -y -p- <archive> <destination>/`.
#[derive(Debug, Clone)]
pub struct UnrarCli {
    binary: PathBuf,
}

impl UnrarCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for UnrarCli {
    fn default() -> Self {
        Self::new(DEFAULT_UNRAR_BINARY)
    }
}

#[async_trait]
impl RarExtractor for UnrarCli {
    async fn extract_all(&self, archive: &Path, destination: &Path) -> Result<()> {
        // unrar only treats the last argument as a directory with a trailing separator.
        let mut destination_arg = OsString::from(destination.as_os_str());
        destination_arg.push(MAIN_SEPARATOR_STR);

        let mut command = Command::new(&self.binary);
        // -p- never prompts for a password, so encrypted archives fail instead of hanging.
        command
            .arg("x")
            .arg("-o+")
            .arg("-y")
            .arg("-p-")
            .arg(archive)
            .arg(destination_arg);
        run_tool(command, &self.binary, DEFAULT_UNRAR_BINARY).await
    }
}

/// Extracts RAR archives in process with the `rar` crate. No external tool needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRarExtractor;

#[async_trait]
impl RarExtractor for NativeRarExtractor {
    async fn extract_all(&self, archive: &Path, destination: &Path) -> Result<()> {
        let archive = archive
            .to_str()
            .ok_or("RAR path contains invalid UTF-8")?
            .to_string();
        let destination = destination
            .to_str()
            .ok_or("Destination path contains invalid UTF-8")?
            .to_string();

        spawn_blocking(move || {
            ::rar::Archive::extract_all(&archive, &destination, "")
                .map(|_| ())
                .map_err(|e| Error::from(format!("Failed to extract RAR '{}': {:?}", archive, e)))
        })
        .await?
    }
}

/// Platform-specific installation advice for a missing tool.
pub fn install_hint(tool: &str) -> String {
    if cfg!(target_os = "macos") {
        format!("Install it with: brew install {}", DEFAULT_RAR_BINARY)
    } else if cfg!(target_os = "windows") {
        format!(
            "Install WinRAR and add its folder (containing {}.exe) to PATH",
            tool
        )
    } else {
        format!(
            "Install it with: apt-get install {} or yum install {}",
            tool, tool
        )
    }
}

/// Runs an external tool to completion, mapping a missing binary and a failed
/// exit status to distinct errors.
async fn run_tool(mut command: Command, binary: &Path, tool: &str) -> Result<()> {
    debug!("Running {:?}", command.as_std());

    // A cancelled run must not leave the tool writing in the background.
    let output = command
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::MissingDependency {
                tool: binary.display().to_string(),
                hint: install_hint(tool),
            },
            _ => Error::Io(e),
        })?;

    if output.status.success() {
        return Ok(());
    }

    // rar reports most problems on stdout, unrar on stderr.
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let diagnostic = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };

    Err(Error::ToolFailed {
        tool: binary.display().to_string(),
        status: output.status.to_string(),
        stderr: diagnostic,
    })
}
