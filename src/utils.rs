//! Utility functions for newsvault
//!
//! Small file-system helpers shared across the archive: streaming MD5
//! digests for change detection, atomic writes for persisted documents,
//! and a recursive directory copy for image bundles.
//!
//! The digest is MD5 rather than a modern hash on purpose. The manifest's
//! `md5` field is an external contract with the downstream file server,
//! and it is only used for change detection, never for security.

use crate::error::{ArchiveError, Result};
use md5::{Digest, Md5};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::trace;
use walkdir::WalkDir;

/// Hash a file's content using MD5
///
/// Reads the file in fixed 8 KiB chunks so that large documents are never
/// loaded into memory whole.
///
/// # Errors
///
/// - [`ArchiveError::Io`] if the file cannot be opened or read
pub fn compute_md5(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; 8192]; // 8KB buffer

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hash arbitrary in-memory data using MD5
pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Atomic file write (write to a temp file in the same directory, then rename)
///
/// Either the entire file is written or the previous content survives; a
/// crash mid-write never leaves a truncated document behind. The manifest
/// and merged record documents are both saved through this path.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.persist(path).map_err(|e| ArchiveError::Io(e.error))?;
    Ok(())
}

/// Serialize a value as pretty JSON with four-space indentation
///
/// All published documents (`version.json` and the merged record files) use
/// this layout; the downstream file server's copies are diffable against
/// what earlier versions of the pipeline wrote.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Recursively copy a directory tree, merging into an existing destination
///
/// Files already present under `dst` are overwritten; files only present
/// under `dst` are left alone. Returns the number of files copied.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<usize> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;

    for entry in WalkDir::new(src) {
        let entry = entry?;
        // strip_prefix only yields Err for the root itself, which maps to ""
        let rel = entry
            .path()
            .strip_prefix(src)
            .unwrap_or_else(|_| Path::new(""));
        let dest = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
            copied += 1;
        }
    }

    trace!("Copied {} files from {:?} to {:?}", copied, src, dst);
    Ok(copied)
}
