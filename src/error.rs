//! Error types shared by readers, writers and the batch driver

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a conversion failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input was recognized but no strategy could parse it
    UnreadableInput,
    /// The requested output format has no write engine
    UnsupportedWriteTarget,
    /// A required parsing or writing engine is absent
    DependencyMissing,
    /// The write engine rejected the table
    WriteFailed,
    /// The sheet selection step was cancelled
    Cancelled,
    /// Filesystem failure
    Io,
}

/// Errors produced while reading, writing or driving a conversion
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}: could not read as {format}: {reason}", .path.display())]
    Unreadable {
        path: PathBuf,
        format: &'static str,
        reason: String,
    },

    #[error(
        "{}: unable to read legacy Excel 97-2003 workbook (.xls).\n\
         To read it, either:\n  \
         - re-save it with a BIFF8-compatible writer so the built-in .xls parser can open it, or\n  \
         - run where the office automation service is available (install LibreOffice so `soffice` \
         is on PATH, or pass --office-command).\n\
         Built-in parser error: {primary}\n\
         Automation fallback error: {fallback}",
        .path.display()
    )]
    LegacyUnreadable {
        path: PathBuf,
        primary: String,
        fallback: String,
    },

    #[error("{}: could not read the modern Excel workbook ({attempts})", .path.display())]
    ModernUnreadable { path: PathBuf, attempts: String },

    #[error("{what} is not available. {remedy}")]
    DependencyMissing { what: &'static str, remedy: &'static str },

    #[error("Unsupported output format: {0}")]
    UnsupportedWriteTarget(String),

    #[error("{}: error writing {format}: {reason}", .path.display())]
    Write {
        path: PathBuf,
        format: &'static str,
        reason: String,
    },

    #[error("Sheet selection cancelled")]
    Cancelled,
}

impl ConvertError {
    /// Taxonomy bucket for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Io(_) => ErrorKind::Io,
            ConvertError::Unreadable { .. } | ConvertError::ModernUnreadable { .. } => {
                ErrorKind::UnreadableInput
            }
            ConvertError::LegacyUnreadable { .. } | ConvertError::DependencyMissing { .. } => {
                ErrorKind::DependencyMissing
            }
            ConvertError::UnsupportedWriteTarget(_) => ErrorKind::UnsupportedWriteTarget,
            ConvertError::Write { .. } => ErrorKind::WriteFailed,
            ConvertError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn unreadable(
        path: impl Into<PathBuf>,
        format: &'static str,
        reason: impl ToString,
    ) -> Self {
        ConvertError::Unreadable {
            path: path.into(),
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, format: &'static str, reason: impl ToString) -> Self {
        ConvertError::Write {
            path: path.into(),
            format,
            reason: reason.to_string(),
        }
    }
}

/// Result alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
