//! Configuration handling for tabconv

use std::path::PathBuf;
use std::time::Duration;

use crate::automation::{DEFAULT_OFFICE_COMMAND, DEFAULT_OFFICE_TIMEOUT};
use crate::error::ConvertError;

/// Output encoding for converted tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Xls,
    Csv,
    Tsv,
    Tab,
    Txt,
    Json,
    Xml,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 8] = [
        OutputFormat::Xlsx,
        OutputFormat::Xls,
        OutputFormat::Csv,
        OutputFormat::Tsv,
        OutputFormat::Tab,
        OutputFormat::Txt,
        OutputFormat::Json,
        OutputFormat::Xml,
    ];

    /// File extension written for this format, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Xls => "xls",
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Tab => "tab",
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        }
    }

    /// Formats written as tab-separated text
    pub fn is_tab_delimited(self) -> bool {
        matches!(self, OutputFormat::Tsv | OutputFormat::Tab | OutputFormat::Txt)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        let tag = tag.strip_prefix('.').unwrap_or(tag).to_lowercase();
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.extension() == tag)
            .ok_or_else(|| ConvertError::UnsupportedWriteTarget(s.to_string()))
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// How workbook sheets are selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetMode {
    /// No selection step: every sheet is merged into one table
    #[default]
    Merged,
    /// Every sheet is selected and written on its own
    All,
    /// Only the named sheets that exist are selected
    Named(Vec<String>),
}

/// Configuration for a conversion run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving converted files
    pub output_folder: PathBuf,
    /// Output format
    pub output_format: OutputFormat,
    /// Sheet selection for workbook inputs
    pub sheet_mode: SheetMode,
    /// Office automation command used for unreadable legacy workbooks
    pub office_command: String,
    /// Limit for one automation conversion
    pub office_timeout: Duration,
    /// Whether the automation fallback may run at all
    pub automation_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from("."),
            output_format: OutputFormat::default(),
            sheet_mode: SheetMode::default(),
            office_command: DEFAULT_OFFICE_COMMAND.to_string(),
            office_timeout: DEFAULT_OFFICE_TIMEOUT,
            automation_enabled: true,
        }
    }
}

impl Config {
    /// Create a new Config writing into `output_folder`
    pub fn new(output_folder: PathBuf) -> Self {
        Self {
            output_folder,
            ..Default::default()
        }
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set output directory
    pub fn with_output_folder(mut self, folder: PathBuf) -> Self {
        self.output_folder = folder;
        self
    }

    /// Set the office automation command
    pub fn with_office_command(mut self, command: impl Into<String>) -> Self {
        self.office_command = command.into();
        self
    }

    /// Set the automation timeout
    pub fn with_office_timeout(mut self, timeout: Duration) -> Self {
        self.office_timeout = timeout;
        self
    }

    /// Enable or disable the automation fallback
    pub fn with_automation(mut self, enabled: bool) -> Self {
        self.automation_enabled = enabled;
        self
    }

    /// Set sheet selection mode
    pub fn with_sheet_mode(mut self, mode: SheetMode) -> Self {
        self.sheet_mode = mode;
        self
    }
}
