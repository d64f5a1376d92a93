//! Shared sheet handling for legacy and modern workbooks

use std::io::{Read, Seek};

use calamine::{Data, DataType, Range, Reader, Sheets};
use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

use crate::model::{Table, SHEET_NAME_COLUMN};

/// Read the named sheets (or every sheet) of an open workbook.
///
/// Sheets that fail to parse or hold no data rows are skipped.
pub(crate) fn read_sheets<RS>(workbook: &mut Sheets<RS>, selection: Option<&[String]>) -> Vec<(String, Table)>
where
    RS: Read + Seek,
{
    let names = match selection {
        Some(names) => names.to_vec(),
        None => workbook.sheet_names(),
    };

    let mut sheets = Vec::new();
    for name in names {
        let range = match workbook.worksheet_range(&name) {
            Ok(range) => range,
            Err(e) => {
                debug!(sheet = %name, error = %e, "skipping unreadable sheet");
                continue;
            }
        };
        let table = range_to_table(&range);
        if table.is_empty() {
            debug!(sheet = %name, "skipping empty sheet");
            continue;
        }
        sheets.push((name, table));
    }
    sheets
}

/// Concatenate sheets into one table tagged with a `SheetName` column
pub(crate) fn merge_sheets(sheets: Vec<(String, Table)>) -> Table {
    let tables = sheets
        .into_iter()
        .map(|(name, mut table)| {
            table.set_constant_column(SHEET_NAME_COLUMN, &name);
            table
        })
        .collect();
    Table::concat(tables)
}

/// Convert a sheet range into a table; the first non-blank row is the header
pub(crate) fn range_to_table(range: &Range<Data>) -> Table {
    let (start_row, _) = range.start().unwrap_or((0, 0));
    let mut rows = range
        .rows()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !is_blank(cell)));

    let Some((_, header)) = rows.next() else {
        return Table::empty();
    };
    let mut table = Table::new(header.iter().map(cell_to_string));

    for (offset, row) in rows {
        let cells = row.iter().map(cell_to_string).collect();
        table.add_row(cells, start_row as usize + offset + 1); // 1-indexed sheet row
    }
    table
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Render a cell as text without losing what the sheet showed
pub(crate) fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_float(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => cell
            .as_datetime()
            .map(format_datetime)
            .unwrap_or_else(|| dt.to_string()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn format_float(f: f64) -> String {
    // Integral values print without a trailing ".0"
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn format_datetime(dt: NaiveDateTime) -> String {
    if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 && dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("007".into())), "007");
        assert_eq!(cell_to_string(&Data::Float(42.0)), "42");
        assert_eq!(cell_to_string(&Data::Float(-3.25)), "-3.25");
        assert_eq!(cell_to_string(&Data::Int(12)), "12");
        assert_eq!(cell_to_string(&Data::Bool(true)), "TRUE");
    }

    #[test]
    fn test_range_to_table_uses_first_row_as_header() {
        let range = range(vec![
            vec![Data::String("ISRC".into()), Data::String("Units".into())],
            vec![Data::String("00012".into()), Data::Float(3.0)],
            vec![Data::Empty, Data::Empty],
            vec![Data::String("00013".into()), Data::Float(4.5)],
        ]);
        let table = range_to_table(&range);
        assert_eq!(table.columns().collect::<Vec<_>>(), vec!["ISRC", "Units"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, "ISRC"), Some("00012"));
        assert_eq!(table.cell(1, "Units"), Some("4.5"));
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let range = range(vec![vec![Data::String("id".into())]]);
        assert!(range_to_table(&range).is_empty());
    }

    #[test]
    fn test_merge_sheets_tags_rows() {
        let mut jan = Table::new(["id"]);
        jan.add_row(vec!["1".into()], 2);
        let mut feb = Table::new(["id"]);
        feb.add_row(vec!["2".into()], 2);

        let merged = merge_sheets(vec![("Jan".into(), jan), ("Feb".into(), feb)]);
        assert_eq!(merged.columns().collect::<Vec<_>>(), vec!["id", "SheetName"]);
        assert_eq!(merged.cell(1, SHEET_NAME_COLUMN), Some("Feb"));
    }
}
