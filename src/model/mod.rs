//! Data model for tabular data representation

mod format;
mod table;

pub use format::FormatKind;
pub use table::{Row, Table, SHEET_NAME_COLUMN};
