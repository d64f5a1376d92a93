//! tabconv - Fidelity-preserving conversion of tabular files
//!
//! Reads legacy and modern Excel workbooks, delimited text, HTML tables, JSON
//! and XML, and writes them back out as xlsx, CSV, tab-delimited text, JSON or
//! XML without coercing values: leading zeros, sign padding and mixed-width
//! numbers survive the trip.

pub mod automation;
pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod strategy;

pub use config::{Config, OutputFormat, SheetMode};
pub use convert::{BatchReport, Converter, SheetSelector};
pub use error::{ConvertError, ErrorKind, Result};
pub use model::{FormatKind, Table};
pub use output::write_table;
pub use parser::TableReader;
