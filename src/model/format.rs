//! Classification of a file's true structure

use std::fmt;

/// What a file actually contains, independent of how it is named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// OLE2 compound document holding a legacy (BIFF) workbook
    CompoundDocument,
    /// ZIP container holding a modern workbook (xlsx, xlsm, xlsb)
    ZipSpreadsheet,
    /// Text with a guessed delimiter
    DelimitedText,
    /// Tab-separated text read with the strict value-preserving rules
    StrictTab,
    /// First `<table>` of an HTML document
    HtmlTable,
    /// JSON list of records
    JsonRecords,
    /// XML document whose root children are records
    XmlRecords,
}

impl FormatKind {
    /// Human-readable name used in messages
    pub fn label(self) -> &'static str {
        match self {
            FormatKind::CompoundDocument => "legacy Excel workbook",
            FormatKind::ZipSpreadsheet => "modern Excel workbook",
            FormatKind::DelimitedText => "delimited text",
            FormatKind::StrictTab => "tab-delimited text",
            FormatKind::HtmlTable => "HTML table",
            FormatKind::JsonRecords => "JSON",
            FormatKind::XmlRecords => "XML",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
