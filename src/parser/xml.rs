//! XML records parser: each child of the root element is one row

use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use quick_xml::events::{BytesStart, Event};

use crate::detect::TextEncoding;
use crate::error::{ConvertError, Result};
use crate::model::{FormatKind, Table};

use super::markup::{lenient_reader, TextSink};
use super::Parser;

/// Parser for `.xml` files
pub struct XmlParser;

impl Parser for XmlParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let bytes = fs::read(path)?;
        let text = TextEncoding::FILE_ORDER
            .iter()
            .find_map(|encoding| encoding.decode(&bytes))
            .unwrap_or_default();
        records_to_table(&text)
            .map_err(|reason| ConvertError::unreadable(path, self.kind().label(), reason))
    }

    fn kind(&self) -> FormatKind {
        FormatKind::XmlRecords
    }
}

type Record = IndexMap<String, String>;

/// Read the children of the root element as records.
///
/// Attributes of a record and the text of its child elements become columns.
/// A record holding only text becomes a column named after its tag.
pub fn records_to_table(xml: &str) -> std::result::Result<Table, String> {
    let mut reader = lenient_reader(xml);
    let mut depth = 0usize;
    let mut records: Vec<Record> = Vec::new();
    // (record, tag name, own text)
    let mut current: Option<(Record, String, String)> = None;
    // (field name, text) of the element directly under the record
    let mut field: Option<(String, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            format!("malformed XML at byte {}: {}", reader.buffer_position(), e)
        })?;
        match event {
            Event::Start(element) => {
                depth += 1;
                match depth {
                    2 => current = Some(open_record(&element)?),
                    3 => field = Some((element_name(&element), String::new())),
                    _ => {}
                }
            }
            Event::Empty(element) => match depth + 1 {
                2 => {
                    let (record, _, _) = open_record(&element)?;
                    records.push(record);
                }
                3 => {
                    if let Some((record, _, _)) = current.as_mut() {
                        record.entry(element_name(&element)).or_default();
                    }
                }
                _ => {}
            },
            Event::End(_) => {
                match depth {
                    2 => {
                        if let Some((mut record, tag, text)) = current.take() {
                            let text = text.trim();
                            if record.is_empty() && !text.is_empty() {
                                record.insert(tag, text.to_string());
                            }
                            records.push(record);
                        }
                    }
                    3 => {
                        if let (Some((name, text)), Some((record, _, _))) = (field.take(), current.as_mut()) {
                            record.insert(name, text.trim().to_string());
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) => {
                if let Some(target) = text_target(depth, &mut current, &mut field) {
                    target.push_text(&text)?;
                }
            }
            Event::CData(data) => {
                if let Some(target) = text_target(depth, &mut current, &mut field) {
                    target.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(target) = text_target(depth, &mut current, &mut field) {
                    target.push_reference(&reference)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut columns: IndexSet<String> = IndexSet::new();
    for record in &records {
        columns.extend(record.keys().cloned());
    }

    let mut table = Table::new(columns.iter().cloned());
    for (index, record) in records.iter().enumerate() {
        let cells = columns
            .iter()
            .map(|name| record.get(name).cloned().unwrap_or_default())
            .collect();
        table.add_row(cells, index + 1);
    }
    Ok(table)
}

/// Text directly in a record goes to the record; text deeper down goes to its field
fn text_target<'a>(
    depth: usize,
    current: &'a mut Option<(Record, String, String)>,
    field: &'a mut Option<(String, String)>,
) -> Option<&'a mut String> {
    match depth {
        2 => current.as_mut().map(|(_, _, text)| text),
        d if d >= 3 => field.as_mut().map(|(_, text)| text),
        _ => None,
    }
}

fn element_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn open_record(element: &BytesStart) -> std::result::Result<(Record, String, String), String> {
    let mut record = Record::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        record.insert(key, value.into_owned());
    }
    Ok((record, element_name(element), String::new()))
}
