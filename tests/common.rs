//! Common test utilities and constants for the comic-fixer crate.
//!
//! Provides functions for setting up test directories, writing fake archives and
//! images, inspecting ZIP output, and stub archive tools standing in for
//! `rar`/`unrar`.

use async_trait::async_trait;
use comic_fixer::archive::{ArchiveWriter, RarExtractor};
use comic_fixer::error::{Error, Result};
use rand::{Rng, distributions::Alphanumeric};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";

/// RAR 1.5-4.x signature followed by some filler.
#[allow(dead_code)]
pub const RAR4_BYTES: &[u8] = b"Rar!\x1a\x07\x00\xcf\x90\x73\x00\x00\x0d\x00";
/// RAR 5 signature followed by some filler.
#[allow(dead_code)]
pub const RAR5_BYTES: &[u8] = b"Rar!\x1a\x07\x01\x00\x33\x92\xb5\xe5\x0a\x01";
/// Start of a JPEG file; enough for the tool, which never decodes images.
#[allow(dead_code)]
pub const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00\x01";

#[allow(dead_code)]
pub struct TestDirs {
    pub test_dir: PathBuf,
    pub root_dir: PathBuf,
}

/// Creates a fresh, uniquely named test directory with an empty `root` inside.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let _ = env_logger::builder().is_test(true).try_init();

    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let test_dir = PathBuf::from(TEST_TMP_DIR).join(format!("{}-{}", sub_path, rand_string));
    if test_dir.exists() {
        fs::remove_dir_all(&test_dir).await.unwrap();
    }
    let root_dir = test_dir.join("root");
    fs::create_dir_all(&root_dir).await.unwrap();

    TestDirs { test_dir, root_dir }
}

/// Writes `bytes` to `path`, creating parent directories.
#[allow(dead_code)]
pub async fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.unwrap();
    }
    fs::write(path, bytes).await.unwrap();
}

/// Writes an executable script, standing in for an external tool.
#[cfg(unix)]
#[allow(dead_code)]
pub async fn write_executable(path: &Path, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    write_file(path, script.as_bytes()).await;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .unwrap();
}

/// Writes a file that carries a RAR signature.
#[allow(dead_code)]
pub async fn create_fake_rar(path: &Path) {
    write_file(path, RAR4_BYTES).await;
}

/// Writes a fake JPEG page whose content identifies it.
#[allow(dead_code)]
pub async fn create_page(path: &Path) {
    let mut bytes = JPEG_BYTES.to_vec();
    bytes.extend_from_slice(path.to_string_lossy().as_bytes());
    write_file(path, &bytes).await;
}

/// Writes a real ZIP archive with the given `(member, content)` entries.
#[allow(dead_code)]
pub async fn create_zip(path: &Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
}

/// Lists the member names of a ZIP archive, in archive order.
#[allow(dead_code)]
pub fn zip_member_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Reads one member of a ZIP archive.
#[allow(dead_code)]
pub fn zip_member_bytes(path: &Path, member: &str) -> Vec<u8> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(member).unwrap();
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    content
}

/// Every file below `root` with its content, for before/after comparisons.
#[allow(dead_code)]
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() || e.file_type().is_dir())
        .map(|e| {
            let content = if e.file_type().is_file() {
                std::fs::read(e.path()).unwrap()
            } else {
                Vec::new()
            };
            (e.path().to_path_buf(), content)
        })
        .collect()
}

/// Extractor that "extracts" a fixed set of entries and records every call.
#[allow(dead_code)]
pub struct StubExtractor {
    pub entries: Vec<(String, Vec<u8>)>,
    pub calls: Mutex<Vec<PathBuf>>,
}

#[allow(dead_code)]
impl StubExtractor {
    pub fn new(entries: &[(&str, &[u8])]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, bytes)| (name.to_string(), bytes.to_vec()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RarExtractor for StubExtractor {
    async fn extract_all(&self, archive: &Path, destination: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(archive.to_path_buf());
        for (name, bytes) in &self.entries {
            let path = destination.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&path, bytes).await?;
        }
        Ok(())
    }
}

/// Extractor behaving like a machine without `unrar`.
#[allow(dead_code)]
pub struct MissingExtractor;

#[async_trait]
impl RarExtractor for MissingExtractor {
    async fn extract_all(&self, _archive: &Path, _destination: &Path) -> Result<()> {
        Err(Error::MissingDependency {
            tool: "unrar".to_string(),
            hint: "Install it".to_string(),
        })
    }
}

/// Writer that stores the staged file names, one per line, and records every call.
#[allow(dead_code)]
pub struct RecordingWriter {
    pub extension: &'static str,
    pub failure: Option<String>,
    pub written: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

#[allow(dead_code)]
impl RecordingWriter {
    pub fn new(extension: &'static str) -> Self {
        Self {
            extension,
            failure: None,
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(extension: &'static str, message: &str) -> Self {
        Self {
            extension,
            failure: Some(message.to_string()),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn written(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveWriter for RecordingWriter {
    fn extension(&self) -> &'static str {
        self.extension
    }

    async fn write_archive(&self, target: &Path, files: &[PathBuf]) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(Error::ToolFailed {
                tool: "rar".to_string(),
                status: "exit status: 1".to_string(),
                stderr: message.clone(),
            });
        }

        assert!(files.iter().all(|f| f.is_file()), "staged files must exist");
        let names: Vec<String> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        fs::write(target, names.join("\n")).await?;
        self.written
            .lock()
            .unwrap()
            .push((target.to_path_buf(), names));
        Ok(())
    }
}
