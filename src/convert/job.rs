//! One input file's conversion request

use std::path::{Path, PathBuf};

use crate::config::OutputFormat;

/// Built per input by the batch driver and consumed once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output_folder: PathBuf,
    pub format: OutputFormat,
    /// Chosen sheets; `None` merges every sheet into one table
    pub sheet_selection: Option<Vec<String>>,
}

impl ConversionJob {
    pub fn new(input: PathBuf, output_folder: PathBuf, format: OutputFormat) -> Self {
        Self {
            input,
            output_folder,
            format,
            sheet_selection: None,
        }
    }

    pub fn with_sheet_selection(mut self, sheets: Vec<String>) -> Self {
        self.sheet_selection = Some(sheets);
        self
    }

    /// `<base>.<ext>` for a whole file, `<base>_<sheet>.<ext>` for one sheet
    pub fn output_path(&self, sheet: Option<&str>) -> PathBuf {
        let base = base_name(&self.input);
        let name = match sheet {
            Some(sheet) if !sheet.is_empty() => {
                format!("{}_{}.{}", base, file_safe(sheet), self.format.extension())
            }
            _ => format!("{}.{}", base, self.format.extension()),
        };
        self.output_folder.join(name)
    }
}

fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Replace path separators so a sheet name cannot escape the output folder
fn file_safe(sheet: &str) -> String {
    sheet
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}
