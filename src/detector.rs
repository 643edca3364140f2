//! Container format detection by magic bytes.
//!
//! A file's extension is never consulted here: only the leading bytes decide
//! whether something is a RAR archive, a ZIP archive, or neither.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::types::ContainerFormat;

/// Number of leading bytes inspected.
const HEADER_LEN: u64 = 8;

const RAR_MAGIC: &[u8; 4] = b"Rar!";
/// RAR 1.5 - 4.x marker tail.
const RAR4_TAIL: &[u8; 3] = &[0x1A, 0x07, 0x00];
/// RAR 5.0+ marker tail.
const RAR5_TAIL: &[u8; 4] = &[0x1A, 0x07, 0x01, 0x00];

const ZIP_MAGIC: &[u8; 2] = b"PK";
/// Local file header.
const ZIP_LOCAL_HEADER: &[u8; 2] = &[0x03, 0x04];
/// End of central directory of an empty archive.
const ZIP_EMPTY_ARCHIVE: &[u8; 2] = &[0x05, 0x06];

/// Classifies a file header. Only the first 8 bytes of `header` are considered.
pub fn classify_header(header: &[u8]) -> ContainerFormat {
    let header = &header[..header.len().min(HEADER_LEN as usize)];
    if header.len() < 4 {
        return ContainerFormat::Unknown;
    }

    if header.starts_with(RAR_MAGIC) {
        let tail = &header[4..];
        if tail.starts_with(RAR4_TAIL) || tail.starts_with(RAR5_TAIL) {
            return ContainerFormat::Rar;
        }
    }

    if header.starts_with(ZIP_MAGIC) {
        let marker = &header[2..4];
        if marker == ZIP_LOCAL_HEADER || marker == ZIP_EMPTY_ARCHIVE {
            return ContainerFormat::Zip;
        }
    }

    ContainerFormat::Unknown
}

/// Reads the leading bytes of `path` and classifies them.
///
/// Missing files, directories and unreadable files are all reported as
/// [`ContainerFormat::Unknown`]; this function never fails.
pub fn detect_format(path: &Path) -> ContainerFormat {
    match read_header(path) {
        Ok(header) => classify_header(&header),
        Err(e) => {
            debug!("Could not read header of '{}': {}", path.display(), e);
            ContainerFormat::Unknown
        }
    }
}

fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    // Opening a FIFO or device blocks, so the type is checked first.
    if !std::fs::metadata(path)?.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    file.take(HEADER_LEN).read_to_end(&mut header)?;
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rar4_signature() {
        assert_eq!(classify_header(b"Rar!\x1a\x07\x00"), ContainerFormat::Rar);
        assert_eq!(classify_header(b"Rar!\x1a\x07\x00\xcf"), ContainerFormat::Rar);
    }

    #[test]
    fn test_rar5_signature_needs_eight_bytes() {
        assert_eq!(classify_header(b"Rar!\x1a\x07\x01\x00"), ContainerFormat::Rar);
        assert_eq!(classify_header(b"Rar!\x1a\x07\x01"), ContainerFormat::Unknown);
    }

    #[test]
    fn test_zip_signatures() {
        assert_eq!(classify_header(b"PK\x03\x04\x14\x00"), ContainerFormat::Zip);
        assert_eq!(classify_header(b"PK\x05\x06"), ContainerFormat::Zip);
        assert_eq!(classify_header(b"PK\x07\x08"), ContainerFormat::Unknown);
    }

    #[test]
    fn test_short_or_foreign_headers() {
        assert_eq!(classify_header(b""), ContainerFormat::Unknown);
        assert_eq!(classify_header(b"PK\x03"), ContainerFormat::Unknown);
        assert_eq!(classify_header(b"Rar!"), ContainerFormat::Unknown);
        assert_eq!(classify_header(b"\xff\xd8\xff\xe0JFIF"), ContainerFormat::Unknown);
    }

    #[test]
    fn test_only_first_eight_bytes_count() {
        // A RAR marker shifted past byte 8 is not a RAR header.
        assert_eq!(classify_header(b"xxxxxxxxRar!\x1a\x07\x00"), ContainerFormat::Unknown);
    }

    #[test]
    fn test_missing_file_is_unknown() {
        assert_eq!(
            detect_format(Path::new("definitely/not/here.cbr")),
            ContainerFormat::Unknown
        );
    }
}
