//! Container detection from leading bytes

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// OLE2 compound document header (legacy .xls, .doc, ...)
pub const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Local file header of a ZIP archive (.xlsx, .xlsm, .xlsb, ...)
pub const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Container type implied by a file's first bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    CompoundDocument,
    Zip,
    Unknown,
}

/// Classify a header buffer
pub fn signature_of(head: &[u8]) -> Signature {
    if head.starts_with(&OLE_SIGNATURE) {
        Signature::CompoundDocument
    } else if head.starts_with(&ZIP_SIGNATURE) {
        Signature::Zip
    } else {
        Signature::Unknown
    }
}

/// Peek at most the first 8 bytes of `path`.
/// Unreadable files classify as [`Signature::Unknown`].
pub fn sniff_signature(path: &Path) -> Signature {
    let mut head = Vec::with_capacity(OLE_SIGNATURE.len());
    let read = File::open(path).and_then(|file| {
        file.take(OLE_SIGNATURE.len() as u64)
            .read_to_end(&mut head)
    });
    match read {
        Ok(_) => signature_of(&head),
        Err(_) => Signature::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_signature_of() {
        assert_eq!(signature_of(&OLE_SIGNATURE), Signature::CompoundDocument);
        assert_eq!(signature_of(b"PK\x03\x04\x14\x00\x06\x00"), Signature::Zip);
        assert_eq!(signature_of(b"id,name\n"), Signature::Unknown);
        assert_eq!(signature_of(b"PK"), Signature::Unknown);
        assert_eq!(signature_of(&[]), Signature::Unknown);
    }

    #[test]
    fn test_sniff_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(&OLE_SIGNATURE).unwrap();
        file.write_all(b"rest of the compound document").unwrap();
        drop(file);

        assert_eq!(sniff_signature(&path), Signature::CompoundDocument);
    }

    #[test]
    fn test_missing_file_is_unknown() {
        assert_eq!(
            sniff_signature(Path::new("/definitely/not/here.xls")),
            Signature::Unknown
        );
    }
}
