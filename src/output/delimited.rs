//! Comma- and tab-separated output

use std::io::Write;

use csv::QuoteStyle;

use crate::model::Table;

use super::{OutputFormatter, RenderError};

/// Delimited text writer; the header row comes first
pub struct DelimitedOutput {
    delimiter: u8,
    quote_style: QuoteStyle,
}

impl DelimitedOutput {
    /// RFC 4180 style CSV, quoting only where needed
    pub fn csv() -> Self {
        Self {
            delimiter: b',',
            quote_style: QuoteStyle::Necessary,
        }
    }

    /// Tab-separated text with every field written literally.
    ///
    /// Cells containing tabs or line breaks cannot be represented.
    pub fn tab() -> Self {
        Self {
            delimiter: b'\t',
            quote_style: QuoteStyle::Never,
        }
    }
}

impl OutputFormatter for DelimitedOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<(), RenderError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(self.quote_style)
            .from_writer(writer);

        csv_writer.write_record(table.columns())?;
        for row in &table.rows {
            csv_writer.write_record(&row.cells)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
