//! JSON records parser

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::error::{ConvertError, Result};
use crate::model::{FormatKind, Table};

use super::Parser;

/// Column used for array items that are not objects
const VALUE_COLUMN: &str = "value";

/// Parser for JSON files.
///
/// Accepted shapes: an array of records, a single record, or a
/// column-oriented object (`{"col": [...]}` or `{"col": {"0": ...}}`).
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let file = File::open(path)?;
        let value: Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ConvertError::unreadable(path, self.kind().label(), e))?;
        value_to_table(value)
            .map_err(|reason| ConvertError::unreadable(path, self.kind().label(), reason))
    }

    fn kind(&self) -> FormatKind {
        FormatKind::JsonRecords
    }
}

/// Convert a parsed JSON document into a table
pub fn value_to_table(value: Value) -> std::result::Result<Table, String> {
    match value {
        Value::Array(items) => Ok(records_to_table(&items)),
        Value::Object(object) if is_column_oriented(&object) => Ok(columns_to_table(&object)),
        Value::Object(object) => Ok(records_to_table(&[Value::Object(object)])),
        other => Err(format!(
            "expected an array or object at the top level, found {}",
            type_name(&other)
        )),
    }
}

fn records_to_table(items: &[Value]) -> Table {
    // Collect all unique keys across all objects to build column list
    let mut column_names: IndexSet<String> = IndexSet::new();
    for item in items {
        match item {
            Value::Object(obj) => column_names.extend(obj.keys().cloned()),
            _ => {
                column_names.insert(VALUE_COLUMN.to_string());
            }
        }
    }

    let mut table = Table::new(column_names.iter().cloned());
    for (index, item) in items.iter().enumerate() {
        let cells = match item {
            Value::Object(obj) => column_names
                .iter()
                .map(|key| value_to_cell(obj.get(key)))
                .collect(),
            _ => column_names
                .iter()
                .map(|key| {
                    if key == VALUE_COLUMN {
                        value_to_cell(Some(item))
                    } else {
                        String::new()
                    }
                })
                .collect(),
        };
        table.add_row(cells, index + 1);
    }
    table
}

/// Every member is an array, or every member is an object
fn is_column_oriented(object: &Map<String, Value>) -> bool {
    !object.is_empty()
        && (object.values().all(Value::is_array) || object.values().all(Value::is_object))
}

fn columns_to_table(object: &Map<String, Value>) -> Table {
    let mut table = Table::new(object.keys().cloned());

    if object.values().all(Value::is_array) {
        let height = object
            .values()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        for index in 0..height {
            let cells = object
                .values()
                .map(|column| value_to_cell(column.get(index)))
                .collect();
            table.add_row(cells, index + 1);
        }
    } else {
        // {"col": {"<row label>": value}}; row labels keep first-seen order
        let mut labels: IndexSet<&str> = IndexSet::new();
        for column in object.values().filter_map(Value::as_object) {
            labels.extend(column.keys().map(String::as_str));
        }
        for (index, label) in labels.iter().enumerate() {
            let cells = object
                .values()
                .map(|column| value_to_cell(column.get(*label)))
                .collect();
            table.add_row(cells, index + 1);
        }
    }
    table
}

fn value_to_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        // Nested values are kept as compact JSON text
        Some(nested) => serde_json::to_string(nested).unwrap_or_default(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
