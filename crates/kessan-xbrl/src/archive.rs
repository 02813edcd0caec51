//! Locating the primary XBRL instance inside a filing archive.

use crate::error::{ExtractError, Result};
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

const XBRL_EXTENSION: &str = ".xbrl";
const PUBLIC_DOC_DIR: &str = "PublicDoc";
const MAX_PREALLOCATION: usize = 64 << 20;

/// Returns the bytes of the main XBRL document in a ZIP archive.
///
/// An entry ending in `.xbrl` whose immediate parent directory is
/// `PublicDoc` is preferred. Otherwise the first `.xbrl` entry in archive
/// order is used. Names are compared case-sensitively.
///
/// # Errors
///
/// Returns [`ExtractError::ArchiveFormat`] if `bytes` is not a readable ZIP
/// archive or contains no `.xbrl` entry.
pub fn locate_xbrl(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut fallback = None;
    let mut preferred = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_dir() || !entry.name().ends_with(XBRL_EXTENSION) {
            continue;
        }
        if in_public_doc(entry.name()) {
            preferred = Some(i);
            break;
        }
        fallback.get_or_insert(i);
    }

    let index = preferred.or(fallback).ok_or_else(|| {
        ExtractError::ArchiveFormat("no XBRL document in archive".to_string())
    })?;

    let mut entry = archive.by_index(index)?;
    debug!(entry = entry.name(), size = entry.size(), "located XBRL document");

    // The declared size is untrusted; cap the preallocation.
    let size_hint = usize::try_from(entry.size()).map_or(0, |size| size.min(MAX_PREALLOCATION));
    let mut xml = Vec::with_capacity(size_hint);
    entry.read_to_end(&mut xml)?;
    Ok(xml)
}

fn in_public_doc(name: &str) -> bool {
    Path::new(name)
        .parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == PUBLIC_DOC_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_prefers_public_doc() {
        let bytes = archive(&[
            ("XBRL/AuditDoc/audit.xbrl", "audit"),
            ("XBRL/PublicDoc/", ""),
            ("XBRL/PublicDoc/main.xbrl", "main"),
        ]);
        assert_eq!(locate_xbrl(&bytes).unwrap(), b"main");
    }

    #[test]
    fn test_falls_back_to_first_xbrl_entry() {
        let bytes = archive(&[
            ("manifest.xml", "manifest"),
            ("Other/first.xbrl", "first"),
            ("Other/second.xbrl", "second"),
        ]);
        assert_eq!(locate_xbrl(&bytes).unwrap(), b"first");
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let bytes = archive(&[
            ("publicdoc/lower.xbrl", "lower"),
            ("PublicDoc/upper.XBRL", "upper"),
        ]);
        assert_eq!(locate_xbrl(&bytes).unwrap(), b"lower");
    }

    #[test]
    fn test_public_doc_must_be_immediate_parent() {
        let bytes = archive(&[
            ("PublicDoc/nested/deep.xbrl", "deep"),
            ("root.xbrl", "root"),
            ("PublicDoc/direct.xbrl", "direct"),
        ]);
        assert_eq!(locate_xbrl(&bytes).unwrap(), b"direct");
    }

    #[test]
    fn test_no_xbrl_entry() {
        let bytes = archive(&[("PublicDoc/report.htm", "<html/>")]);
        let err = locate_xbrl(&bytes).unwrap_err();
        assert!(matches!(err, ExtractError::ArchiveFormat(_)));
        assert!(err.is_no_data());
    }

    fn read_u16(bytes: &[u8], at: usize) -> usize {
        usize::from(u16::from_le_bytes([bytes[at], bytes[at + 1]]))
    }

    // Rewrites the uncompressed size recorded for the first entry in the
    // central directory, in the zip64 extra field when present.
    fn declare_uncompressed_size(bytes: &mut [u8], size: u64) {
        let start = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .unwrap();
        let name_len = read_u16(bytes, start + 28);
        let extra_len = read_u16(bytes, start + 30);

        if bytes[start + 24..start + 28] == [0xFF; 4] {
            let mut at = start + 46 + name_len;
            let end = at + extra_len;
            while at + 4 <= end {
                let id = read_u16(bytes, at);
                let len = read_u16(bytes, at + 2);
                if id == 0x0001 {
                    bytes[at + 4..at + 12].copy_from_slice(&size.to_le_bytes());
                    return;
                }
                at += 4 + len;
            }
        }
        let size32 = u32::try_from(size).unwrap_or(u32::MAX - 1);
        bytes[start + 24..start + 28].copy_from_slice(&size32.to_le_bytes());
    }

    #[test]
    fn test_huge_declared_size_does_not_panic() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .large_file(true);
        writer.start_file("XBRL/PublicDoc/a.xbrl", options).unwrap();
        writer.write_all(b"<xbrl/>").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        declare_uncompressed_size(&mut bytes, u64::MAX / 2 + 10);

        let outcome = std::panic::catch_unwind(|| locate_xbrl(&bytes));
        match outcome.expect("locating must not panic") {
            Ok(xml) => assert_eq!(xml, b"<xbrl/>"),
            Err(err) => assert!(matches!(err, ExtractError::ArchiveFormat(_))),
        }
    }

    #[test]
    fn test_not_an_archive() {
        let err = locate_xbrl(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, ExtractError::ArchiveFormat(_)));
    }
}
