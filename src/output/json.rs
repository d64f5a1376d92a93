//! JSON output format: an array of records

use std::io::Write;

use serde_json::{Map, Value};

use crate::model::Table;

use super::{OutputFormatter, RenderError};

/// JSON writer; column order is kept and non-ASCII text is written as-is
pub struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<(), RenderError> {
        let columns: Vec<&str> = table.columns().collect();
        let records: Vec<Value> = table
            .rows
            .iter()
            .map(|row| {
                let record: Map<String, Value> = columns
                    .iter()
                    .zip(&row.cells)
                    .map(|(name, cell)| (name.to_string(), Value::String(cell.clone())))
                    .collect();
                Value::Object(record)
            })
            .collect();

        serde_json::to_writer(&mut *writer, &records)?;
        Ok(())
    }
}
