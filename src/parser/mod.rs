//! Parser layer: one reader per input format plus the unified dispatcher

mod delimited;
mod html;
mod json;
mod legacy;
mod markup;
mod modern;
mod tab;
mod workbook;
mod xml;

use std::path::Path;

use tracing::{debug, warn};

use crate::automation::{LegacyConverter, NoAutomation, OfficeAutomation};
use crate::config::Config;
use crate::detect::classify;
use crate::error::Result;
use crate::model::{FormatKind, Table};

pub use self::delimited::DelimitedParser;
pub use self::html::{first_table, HtmlParser};
pub use self::json::{value_to_table, JsonParser};
pub use self::legacy::{LegacyReader, LegacyStrategy};
pub use self::modern::ModernEngine;
pub use self::tab::{is_numeric_column, normalize_plus_padded, read_strict_tab, StrictTabParser};
pub use self::xml::{records_to_table, XmlParser};

/// Trait for parsing single-table text formats
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path) -> Result<Table>;

    /// The format this parser handles
    fn kind(&self) -> FormatKind;
}

/// A table read through the unified reader
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub table: Table,
    /// Set when a text format could not be read and an empty table stands in
    pub warning: Option<String>,
}

impl Loaded {
    fn read(table: Table) -> Self {
        Self {
            table,
            warning: None,
        }
    }

    fn degraded(warning: String) -> Self {
        Self {
            table: Table::empty(),
            warning: Some(warning),
        }
    }
}

/// Unified reader: picks a parser from the sniffed format of each file.
///
/// Workbook formats propagate hard failures. Text formats never fail; a parse
/// error degrades to an empty table with a warning.
pub struct TableReader {
    parsers: Vec<Box<dyn Parser>>,
    automation: Box<dyn LegacyConverter>,
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new(Box::new(OfficeAutomation::default()))
    }
}

impl TableReader {
    /// Create a reader with all text parsers and the given automation bridge
    pub fn new(automation: Box<dyn LegacyConverter>) -> Self {
        Self {
            parsers: vec![
                Box::new(HtmlParser),
                Box::new(JsonParser),
                Box::new(XmlParser),
                Box::new(StrictTabParser),
                Box::new(DelimitedParser),
            ],
            automation,
        }
    }

    /// Reader configured from the automation settings in `config`
    pub fn from_config(config: &Config) -> Self {
        let automation: Box<dyn LegacyConverter> = if config.automation_enabled {
            Box::new(OfficeAutomation::new(
                config.office_command.clone(),
                config.office_timeout,
            ))
        } else {
            Box::new(NoAutomation)
        };
        Self::new(automation)
    }

    fn legacy(&self) -> LegacyReader<'_> {
        LegacyReader::new(self.automation.as_ref())
    }

    /// Get the parser for a text format
    fn parser_for(&self, kind: FormatKind) -> Option<&dyn Parser> {
        self.parsers
            .iter()
            .find(|parser| parser.kind() == kind)
            .map(|parser| parser.as_ref())
    }

    /// Read a whole file as one table; workbook sheets are merged with a
    /// `SheetName` column
    pub fn read(&self, path: &Path) -> Result<Loaded> {
        let kind = classify(path);
        debug!(path = %path.display(), kind = %kind, "reading");

        match kind {
            FormatKind::CompoundDocument => self.legacy().read_merged(path).map(Loaded::read),
            FormatKind::ZipSpreadsheet => modern::read_merged(path).map(Loaded::read),
            _ => Ok(self.read_text(path, kind)),
        }
    }

    /// Shorthand for [`TableReader::read`] that drops the warning
    pub fn read_table(&self, path: &Path) -> Result<Table> {
        self.read(path).map(|loaded| loaded.table)
    }

    fn read_text(&self, path: &Path, kind: FormatKind) -> Loaded {
        let Some(parser) = self.parser_for(kind) else {
            return Loaded::degraded(format!("{}: no parser for {}", path.display(), kind));
        };
        match parser.parse(path) {
            Ok(table) => {
                if kind == FormatKind::HtmlTable && table.column_count() == 0 {
                    let message = format!("{}: no HTML table found", path.display());
                    return Loaded {
                        table,
                        warning: Some(message),
                    };
                }
                Loaded::read(table)
            }
            Err(e) => {
                warn!(path = %path.display(), kind = %kind, error = %e, "falling back to an empty table");
                Loaded::degraded(e.to_string())
            }
        }
    }

    /// Sheet names of a workbook; other formats have none
    pub fn detect_sheets(&self, path: &Path) -> Result<Vec<String>> {
        match classify(path) {
            FormatKind::CompoundDocument => self.legacy().sheet_names(path),
            FormatKind::ZipSpreadsheet => modern::sheet_names(path),
            _ => Ok(Vec::new()),
        }
    }

    /// Read the chosen sheets of a workbook, each as its own table.
    ///
    /// Missing and empty sheets are left out. A non-workbook input yields its
    /// single table under an empty sheet name.
    pub fn read_sheets(&self, path: &Path, selection: &[String]) -> Result<Vec<(String, Table)>> {
        match classify(path) {
            FormatKind::CompoundDocument => self.legacy().read_selected(path, selection),
            FormatKind::ZipSpreadsheet => modern::read_selected(path, selection),
            kind => {
                let loaded = self.read_text(path, kind);
                Ok(vec![(String::new(), loaded.table)])
            }
        }
    }
}
