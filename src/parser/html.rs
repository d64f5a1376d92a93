//! HTML table reader: the first `<table>` of a document becomes the result

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use crate::detect::TextEncoding;
use crate::error::{ConvertError, Result};
use crate::model::{FormatKind, Table};

use super::markup::{collapse_whitespace, lenient_reader, tag_name, TextSink};
use super::Parser;

/// Parser for `.htm` / `.html` files
pub struct HtmlParser;

impl Parser for HtmlParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let bytes = fs::read(path)?;
        let text = TextEncoding::FILE_ORDER
            .iter()
            .find_map(|encoding| encoding.decode(&bytes))
            .unwrap_or_default();

        let table = first_table(&text)
            .map_err(|reason| ConvertError::unreadable(path, self.kind().label(), reason))?;
        match table {
            Some(table) => Ok(table),
            None => {
                warn!(path = %path.display(), "no <table> found");
                Ok(Table::empty())
            }
        }
    }

    fn kind(&self) -> FormatKind {
        FormatKind::HtmlTable
    }
}

/// Extract the first top-level table.
///
/// The first row is the header. Cells spanning several columns repeat their
/// text. Nested tables contribute their text to the enclosing cell.
pub fn first_table(html: &str) -> std::result::Result<Option<Table>, String> {
    let mut reader = lenient_reader(html);
    let mut depth = 0usize;
    let mut found = false;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<(String, usize)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            format!("malformed markup at byte {}: {}", reader.buffer_position(), e)
        })?;
        match event {
            Event::Start(element) => match tag_name(&element).as_str() {
                "table" => {
                    depth += 1;
                    found = true;
                }
                "tr" if depth == 1 => {
                    finish_row(&mut rows, &mut row, &mut cell);
                    row = Some(Vec::new());
                }
                "td" | "th" if depth == 1 => {
                    finish_cell(&mut row, &mut cell);
                    cell = Some((String::new(), column_span(&element)));
                }
                "br" | "p" | "div" => push_space(&mut cell),
                _ => {}
            },
            Event::Empty(element) => {
                if matches!(tag_name(&element).as_str(), "br" | "p" | "div") {
                    push_space(&mut cell);
                }
            }
            Event::End(element) => {
                let name = String::from_utf8_lossy(element.local_name().as_ref()).to_ascii_lowercase();
                match name.as_str() {
                    "table" if depth > 0 => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    "tr" if depth == 1 => finish_row(&mut rows, &mut row, &mut cell),
                    "td" | "th" if depth == 1 => finish_cell(&mut row, &mut cell),
                    "p" | "div" => push_space(&mut cell),
                    _ => {}
                }
            }
            Event::Text(text) => {
                if let Some((content, _)) = cell.as_mut() {
                    content.push_text(&text)?;
                }
            }
            Event::CData(data) => {
                if let Some((content, _)) = cell.as_mut() {
                    content.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some((content, _)) = cell.as_mut() {
                    content.push_reference(&reference)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    finish_row(&mut rows, &mut row, &mut cell);

    if !found {
        return Ok(None);
    }

    let mut rows = rows.into_iter().filter(|r| !r.is_empty());
    let Some(header) = rows.next() else {
        return Ok(Some(Table::empty()));
    };
    let mut table = Table::new(header);
    for (index, cells) in rows.enumerate() {
        table.add_row(cells, index + 2);
    }
    Ok(Some(table))
}

fn column_span(element: &BytesStart) -> usize {
    element
        .html_attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref().eq_ignore_ascii_case(b"colspan"))
        .and_then(|attr| attr.unescape_value().ok()?.trim().parse::<usize>().ok())
        .filter(|&span| span > 0)
        .unwrap_or(1)
}

fn push_space(cell: &mut Option<(String, usize)>) {
    if let Some((content, _)) = cell.as_mut() {
        content.push(' ');
    }
}

fn finish_cell(row: &mut Option<Vec<String>>, cell: &mut Option<(String, usize)>) {
    let Some((content, span)) = cell.take() else {
        return;
    };
    let text = collapse_whitespace(&content);
    // a cell outside any <tr> opens an implicit row
    let row = row.get_or_insert_with(Vec::new);
    for _ in 0..span {
        row.push(text.clone());
    }
}

fn finish_row(
    rows: &mut Vec<Vec<String>>,
    row: &mut Option<Vec<String>>,
    cell: &mut Option<(String, usize)>,
) {
    finish_cell(row, cell);
    if let Some(cells) = row.take() {
        rows.push(cells);
    }
}
