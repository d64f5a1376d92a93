//! Generic delimited-text parser

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::detect::{guess_delimiter, TextEncoding};
use crate::error::{ConvertError, Result};
use crate::model::{FormatKind, Table};
use crate::strategy::first_success;

use super::Parser;

/// How a block of text is split into fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Dialect {
    pub delimiter: u8,
    /// Honour `"` quoting; when off every byte between separators is literal
    pub quoting: bool,
}

impl Dialect {
    pub const STRICT_TAB: Dialect = Dialect {
        delimiter: b'\t',
        quoting: false,
    };

    pub fn guessed(delimiter: u8) -> Self {
        Self {
            delimiter,
            quoting: true,
        }
    }
}

/// Parser for comma, semicolon, pipe or otherwise delimited text.
///
/// Every field is kept as a literal string; header names and cells are trimmed.
pub struct DelimitedParser;

impl Parser for DelimitedParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let bytes = fs::read(path)?;
        let delimiter = guess_delimiter(path).unwrap_or(b',');
        debug!(path = %path.display(), delimiter = %char::from(delimiter).escape_default(), "parsing delimited text");

        let dialect = Dialect::guessed(delimiter);
        first_success(TextEncoding::FILE_ORDER, |encoding| {
            let text = encoding
                .decode(&bytes)
                .ok_or_else(|| format!("not valid {}", encoding.name()))?;
            parse_text(&text, dialect)
        })
        .map_err(|attempts| {
            ConvertError::unreadable(path, self.kind().label(), attempts.last_message())
        })
    }

    fn kind(&self) -> FormatKind {
        FormatKind::DelimitedText
    }
}

/// Split decoded text into a table.
///
/// The first non-blank record is the header. Empty lines are skipped, but a
/// line of bare separators is a row of empty cells. A row with non-empty
/// fields beyond the header width is an error.
pub(crate) fn parse_text(text: &str, dialect: Dialect) -> std::result::Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .quoting(dialect.quoting)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = loop {
        match records.next() {
            None => return Ok(Table::empty()),
            Some(record) => {
                let record = record.map_err(|e| e.to_string())?;
                if !is_blank(&record) {
                    break record;
                }
            }
        }
    };

    let width = header.len();
    let mut table = Table::new(header.iter().map(|name| name.trim().to_string()));

    for record in records {
        let record = record.map_err(|e| e.to_string())?;
        if is_empty_line(&record) {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        if record.len() > width
            && record.iter().skip(width).any(|field| !field.trim().is_empty())
        {
            return Err(format!(
                "expected {} fields in line {}, saw {}",
                width,
                line,
                record.len()
            ));
        }

        let cells = record.iter().map(|field| field.trim().to_string()).collect();
        table.add_row(cells, line);
    }

    Ok(table)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn is_empty_line(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && is_blank(record)
}
