//! Release archive builder.
//!
//! An archive is a zip of page images, one entry per page, in the order the
//! pages were requested. Entries are stored uncompressed: JPEG and PNG data is
//! already compressed and a stored zip keeps the bundle size predictable.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::CoreError;
use crate::hashing::sha256_hex;

/// One page to be written into an archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry<'a> {
    pub name: &'a str,
    pub bytes: &'a [u8],
}

/// A finished archive bundle.
#[derive(Debug, Clone)]
pub struct BuiltArchive {
    pub bytes: Vec<u8>,
    /// Sum of the page payload sizes (excludes zip framing).
    pub content_size: i64,
    /// SHA-256 of `bytes`.
    pub checksum: String,
}

impl BuiltArchive {
    /// Byte length of the zip bundle itself.
    pub fn bundle_size(&self) -> i64 {
        self.bytes.len() as i64
    }
}

/// Write `entries` into a stored zip, preserving their order.
///
/// Fails with [`CoreError::Validation`] when two entries share a name and with
/// [`CoreError::Internal`] if the zip writer itself fails.
pub fn build_archive(entries: &[ArchiveEntry<'_>]) -> Result<BuiltArchive, CoreError> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.name) {
            return Err(CoreError::Validation(format!(
                "Duplicate archive entry name '{}'",
                entry.name
            )));
        }
    }

    // Fixed timestamp so identical pages always produce an identical bundle.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(zip::DateTime::default());
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut content_size: i64 = 0;

    for entry in entries {
        writer
            .start_file(entry.name, options)
            .map_err(|e| CoreError::Internal(format!("Failed to start archive entry: {e}")))?;
        writer
            .write_all(entry.bytes)
            .map_err(|e| CoreError::Internal(format!("Failed to write archive entry: {e}")))?;
        content_size += entry.bytes.len() as i64;
    }

    let bytes = writer
        .finish()
        .map_err(|e| CoreError::Internal(format!("Failed to finalize archive: {e}")))?
        .into_inner();
    let checksum = sha256_hex(&bytes);

    Ok(BuiltArchive {
        bytes,
        content_size,
        checksum,
    })
}

/// List entry names of an archive bundle in stored order.
pub fn archive_entry_names(bytes: &[u8]) -> Result<Vec<String>, CoreError> {
    let invalid = |e: zip::result::ZipError| CoreError::Validation(format!("Not a valid archive: {e}"));
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(invalid)?;
    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let file = archive.by_index(index).map_err(invalid)?;
        names.push(file.name().to_string());
    }
    Ok(names)
}
