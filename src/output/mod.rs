//! Writers for converted tables

mod delimited;
mod json;
mod xlsx;
mod xml;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::OutputFormat;
use crate::error::{ConvertError, Result};
use crate::model::Table;

pub use delimited::DelimitedOutput;
pub use json::JsonOutput;
pub use xlsx::XlsxOutput;
pub use xml::{is_valid_element_name, XmlOutput};

/// Failure while rendering a table
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0}")]
    Invalid(String),
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a table to a writer
    fn render(&self, table: &Table, writer: &mut dyn Write) -> std::result::Result<(), RenderError>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter for a format; `None` when no write engine exists
    pub fn create(format: OutputFormat) -> Option<Box<dyn OutputFormatter>> {
        if format.is_tab_delimited() {
            return Some(Box::new(DelimitedOutput::tab()));
        }
        match format {
            OutputFormat::Xlsx => Some(Box::new(XlsxOutput)),
            OutputFormat::Csv => Some(Box::new(DelimitedOutput::csv())),
            OutputFormat::Json => Some(Box::new(JsonOutput)),
            OutputFormat::Xml => Some(Box::new(XmlOutput)),
            OutputFormat::Xls | OutputFormat::Tsv | OutputFormat::Tab | OutputFormat::Txt => None,
        }
    }
}

/// What a call to [`write_table`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The table was empty and no file was created
    Skipped,
}

/// Write a table to `path` in the given format.
///
/// An empty table is a no-op. The table is rendered in memory first, so a
/// rendering failure leaves no partial file behind.
pub fn write_table(table: &Table, path: &Path, format: OutputFormat) -> Result<WriteOutcome> {
    if table.is_empty() {
        debug!(path = %path.display(), "empty table, nothing written");
        return Ok(WriteOutcome::Skipped);
    }

    let formatter = OutputFactory::create(format).ok_or(ConvertError::DependencyMissing {
        what: "A legacy .xls write engine",
        remedy: "Choose xlsx as the output format instead.",
    })?;

    let mut buffer = Vec::new();
    formatter
        .render(table, &mut buffer)
        .map_err(|e| ConvertError::write(path, format.extension(), e))?;
    fs::write(path, buffer)?;

    info!(path = %path.display(), rows = table.row_count(), format = %format, "wrote table");
    Ok(WriteOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample() -> Table {
        let mut table = Table::new(["isrc", "units"]);
        table.add_row(vec!["00012".into(), "3".into()], 2);
        table
    }

    #[test]
    fn test_empty_table_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        for format in OutputFormat::ALL {
            let path = dir.path().join(format!("empty.{}", format.extension()));
            let outcome = write_table(&Table::empty(), &path, format).unwrap();
            assert_eq!(outcome, WriteOutcome::Skipped);
            assert!(!path.exists());

            let header_only = Table::new(["a", "b"]);
            let outcome = write_table(&header_only, &path, format).unwrap();
            assert_eq!(outcome, WriteOutcome::Skipped);
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_tab_formats_share_unquoted_output() {
        let mut table = sample();
        table.add_row(vec!["\"x\"".into(), "4".into()], 3);
        for format in OutputFormat::ALL {
            let Some(formatter) = OutputFactory::create(format) else {
                assert_eq!(format, OutputFormat::Xls);
                continue;
            };
            if format.is_tab_delimited() {
                let mut buffer = Vec::new();
                formatter.render(&table, &mut buffer).unwrap();
                assert_eq!(String::from_utf8(buffer).unwrap(), "isrc\tunits\n00012\t3\n\"x\"\t4\n");
            }
        }
    }

    #[test]
    fn test_xls_output_reports_missing_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xls");
        let err = write_table(&sample(), &path, OutputFormat::Xls).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyMissing);
        assert!(err.to_string().contains("xlsx"));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_render_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xml");
        let mut table = Table::new(["Amount Received"]);
        table.add_row(vec!["1".into()], 2);

        let err = write_table(&table, &path, OutputFormat::Xml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteFailed);
        assert!(!path.exists());
    }

    #[test]
    fn test_writes_every_supported_format() {
        let dir = tempfile::tempdir().unwrap();
        for format in OutputFormat::ALL {
            if format == OutputFormat::Xls {
                continue;
            }
            let path = dir.path().join(format!("out.{}", format.extension()));
            let outcome = write_table(&sample(), &path, format).unwrap();
            assert_eq!(outcome, WriteOutcome::Written);
            assert!(fs::metadata(&path).unwrap().len() > 0);
        }
    }
}
