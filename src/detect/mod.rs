//! File type detection: signatures, extensions and delimiter sniffing

mod delimiter;
mod encoding;
mod signature;

use std::path::Path;

use crate::model::FormatKind;

pub use delimiter::{guess_delimiter, guess_from_sample, looks_tab_delimited, SAMPLE_SIZE};
pub use encoding::TextEncoding;
pub use signature::{signature_of, sniff_signature, Signature, OLE_SIGNATURE, ZIP_SIGNATURE};

/// Lower-cased extension of `path`, without the dot
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Decide how a file should be read.
///
/// Leading bytes win over the extension, so a ZIP workbook saved as `.xls`
/// is still read as a modern workbook. Never fails: anything unrecognised is
/// treated as delimited text.
pub fn classify(path: &Path) -> FormatKind {
    match sniff_signature(path) {
        Signature::CompoundDocument => return FormatKind::CompoundDocument,
        Signature::Zip => return FormatKind::ZipSpreadsheet,
        Signature::Unknown => {}
    }

    match extension_of(path).as_str() {
        "xls" => FormatKind::CompoundDocument,
        "xlsx" | "xlsm" | "xlsb" => FormatKind::ZipSpreadsheet,
        "htm" | "html" => FormatKind::HtmlTable,
        "json" => FormatKind::JsonRecords,
        "xml" => FormatKind::XmlRecords,
        "tab" | "tsv" => FormatKind::StrictTab,
        "txt" if looks_tab_delimited(path) => FormatKind::StrictTab,
        _ => FormatKind::DelimitedText,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_extension_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("a.HTML", "<table></table>", FormatKind::HtmlTable),
            ("a.json", "[]", FormatKind::JsonRecords),
            ("a.xml", "<data/>", FormatKind::XmlRecords),
            ("a.tsv", "a\tb", FormatKind::StrictTab),
            ("a.tab", "a,b", FormatKind::StrictTab),
            ("tabbed.txt", "a\tb\n1\t2", FormatKind::StrictTab),
            ("commas.txt", "a,b\n1,2", FormatKind::DelimitedText),
            ("a.csv", "a\tb", FormatKind::DelimitedText),
            ("noext", "a;b", FormatKind::DelimitedText),
            ("fake.xls", "a,b", FormatKind::CompoundDocument),
            ("fake.xlsx", "a,b", FormatKind::ZipSpreadsheet),
        ];
        for (name, content, expected) in cases {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            assert_eq!(classify(&path), expected, "{}", name);
        }
    }

    #[test]
    fn test_signature_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();

        let zipped = dir.path().join("book.xls");
        fs::write(&zipped, b"PK\x03\x04rest").unwrap();
        assert_eq!(classify(&zipped), FormatKind::ZipSpreadsheet);

        let ole = dir.path().join("book.xlsx");
        fs::write(&ole, OLE_SIGNATURE).unwrap();
        assert_eq!(classify(&ole), FormatKind::CompoundDocument);

        let ole_text = dir.path().join("export.txt");
        fs::write(&ole_text, OLE_SIGNATURE).unwrap();
        assert_eq!(classify(&ole_text), FormatKind::CompoundDocument);
    }
}
