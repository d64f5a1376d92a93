//! Modern Excel output: one worksheet holding the whole table

use std::io::Write;

use rust_xlsxwriter::Workbook;

use crate::model::Table;

use super::{OutputFormatter, RenderError};

/// Single-sheet xlsx writer.
///
/// Every cell is written as a string so values like `007` keep their text.
pub struct XlsxOutput;

impl OutputFormatter for XlsxOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<(), RenderError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, name) in table.columns().enumerate() {
            worksheet.write_string(0, column_number(col)?, name)?;
        }
        for (index, row) in table.rows.iter().enumerate() {
            let row_number = u32::try_from(index + 1)
                .map_err(|_| RenderError::Invalid(format!("row {} is out of range", index + 1)))?;
            for (col, cell) in row.cells.iter().enumerate() {
                if !cell.is_empty() {
                    worksheet.write_string(row_number, column_number(col)?, cell)?;
                }
            }
        }

        let buffer = workbook.save_to_buffer()?;
        writer.write_all(&buffer)?;
        Ok(())
    }
}

fn column_number(col: usize) -> Result<u16, RenderError> {
    u16::try_from(col).map_err(|_| RenderError::Invalid(format!("column {} is out of range", col)))
}
