//! Legacy Excel 97-2003 (.xls) reader with automation fallback

use std::path::Path;

use calamine::{open_workbook, Reader, Sheets, Xls};
use tracing::warn;

use crate::automation::LegacyConverter;
use crate::error::{ConvertError, Result};
use crate::model::Table;
use crate::strategy::{first_success, Attempts};

use super::modern;
use super::workbook::{merge_sheets, read_sheets};

/// Ways of getting at a legacy workbook, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyStrategy {
    /// Built-in BIFF parser
    Direct,
    /// Office automation re-saves the file as xlsx first
    Automation,
}

impl LegacyStrategy {
    pub const ORDER: [LegacyStrategy; 2] = [LegacyStrategy::Direct, LegacyStrategy::Automation];
}

/// Reader for compound-document workbooks
pub struct LegacyReader<'a> {
    automation: &'a dyn LegacyConverter,
}

impl<'a> LegacyReader<'a> {
    pub fn new(automation: &'a dyn LegacyConverter) -> Self {
        Self { automation }
    }

    /// Read every non-empty sheet and merge them into one table
    pub fn read_merged(&self, path: &Path) -> Result<Table> {
        self.read_sheets(path, None).map(merge_sheets)
    }

    /// Read the chosen sheets, each as its own table
    pub fn read_selected(&self, path: &Path, names: &[String]) -> Result<Vec<(String, Table)>> {
        self.read_sheets(path, Some(names))
    }

    /// List sheet names without reading cell data
    pub fn sheet_names(&self, path: &Path) -> Result<Vec<String>> {
        first_success(LegacyStrategy::ORDER, |strategy| match strategy {
            LegacyStrategy::Direct => open_workbook::<Xls<_>, _>(path)
                .map(|workbook| workbook.sheet_names())
                .map_err(|e| e.to_string()),
            LegacyStrategy::Automation => {
                let converted = self
                    .automation
                    .convert_to_modern(path)
                    .map_err(|e| e.to_string())?;
                modern::sheet_names(converted.path()).map_err(|e| e.to_string())
            }
        })
        .map_err(|attempts| unreadable(path, attempts))
    }

    fn read_sheets(&self, path: &Path, selection: Option<&[String]>) -> Result<Vec<(String, Table)>> {
        first_success(LegacyStrategy::ORDER, |strategy| match strategy {
            LegacyStrategy::Direct => {
                let workbook = open_workbook::<Xls<_>, _>(path).map_err(|e| e.to_string())?;
                Ok(read_sheets(&mut Sheets::Xls(workbook), selection))
            }
            LegacyStrategy::Automation => {
                warn!(path = %path.display(), "built-in .xls parser failed, trying office automation");
                // the temporary workbook is removed when `converted` drops
                let converted = self
                    .automation
                    .convert_to_modern(path)
                    .map_err(|e| e.to_string())?;
                let sheets = match selection {
                    Some(names) => modern::read_selected(converted.path(), names),
                    None => modern::read_all(converted.path()),
                };
                sheets.map_err(|e| e.to_string())
            }
        })
        .map_err(|attempts| unreadable(path, attempts))
    }
}

fn unreadable(path: &Path, attempts: Attempts<LegacyStrategy, String>) -> ConvertError {
    ConvertError::LegacyUnreadable {
        path: path.to_path_buf(),
        primary: attempts
            .message_for(&LegacyStrategy::Direct)
            .unwrap_or_default(),
        fallback: attempts
            .message_for(&LegacyStrategy::Automation)
            .unwrap_or_default(),
    }
}
