//! Modern (ZIP-based) Excel reader: xlsx, xlsm, xlsb

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, open_workbook_auto, Reader, Sheets, Xlsb, Xlsx};
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::model::Table;
use crate::strategy::first_success;

use super::workbook::{merge_sheets, read_sheets};

/// Candidate engines, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModernEngine {
    /// SpreadsheetML (xlsx, xlsm)
    Xlsx,
    /// Binary workbook (xlsb)
    Xlsb,
    /// Engine chosen from the file extension
    Auto,
}

impl ModernEngine {
    pub const ORDER: [ModernEngine; 3] = [ModernEngine::Xlsx, ModernEngine::Xlsb, ModernEngine::Auto];

    fn open(self, path: &Path) -> std::result::Result<Sheets<BufReader<File>>, calamine::Error> {
        match self {
            ModernEngine::Xlsx => open_workbook::<Xlsx<_>, _>(path)
                .map(Sheets::Xlsx)
                .map_err(calamine::Error::from),
            ModernEngine::Xlsb => open_workbook::<Xlsb<_>, _>(path)
                .map(Sheets::Xlsb)
                .map_err(calamine::Error::from),
            ModernEngine::Auto => open_workbook_auto(path),
        }
    }
}

/// Read every non-empty sheet and merge them into one table
pub fn read_merged(path: &Path) -> Result<Table> {
    read_all(path).map(merge_sheets)
}

/// Read every non-empty sheet, each as its own table
pub fn read_all(path: &Path) -> Result<Vec<(String, Table)>> {
    read_with_engines(path, None)
}

/// Read the chosen sheets, each as its own table.
///
/// Sheets that are missing or empty are left out, so the result may be empty.
pub fn read_selected(path: &Path, names: &[String]) -> Result<Vec<(String, Table)>> {
    read_with_engines(path, Some(names))
}

/// Sheet names from the first engine that opens the workbook
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    first_success(ModernEngine::ORDER, |engine| {
        engine.open(path).map(|workbook| workbook.sheet_names())
    })
    .map_err(|attempts| ConvertError::ModernUnreadable {
        path: path.to_path_buf(),
        attempts: attempts.to_string(),
    })
}

/// The first engine that opens the workbook and yields a non-empty sheet wins
fn read_with_engines(path: &Path, selection: Option<&[String]>) -> Result<Vec<(String, Table)>> {
    let mut opened = false;
    let outcome = first_success(ModernEngine::ORDER, |engine| {
        let mut workbook = engine.open(path).map_err(|e| e.to_string())?;
        opened = true;
        let sheets = read_sheets(&mut workbook, selection);
        if sheets.is_empty() {
            Err("no sheet with data".to_string())
        } else {
            Ok(sheets)
        }
    });

    match outcome {
        Ok(sheets) => Ok(sheets),
        // a selection of only empty sheets is not a failure
        Err(_) if opened && selection.is_some() => {
            debug!(path = %path.display(), "selected sheets hold no data");
            Ok(Vec::new())
        }
        Err(attempts) => Err(ConvertError::ModernUnreadable {
            path: path.to_path_buf(),
            attempts: attempts.to_string(),
        }),
    }
}
