//! Table and Row data structures

use indexmap::IndexSet;

/// Name of the synthetic column that tags rows with their source sheet
pub const SHEET_NAME_COLUMN: &str = "SheetName";

/// A row of string cells, one per table column
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<String>,
    /// Original line/row number in source file (1-indexed, 0 when synthetic)
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<String>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

// Rows compare by content; where they came from does not matter
impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Row {}

/// A table of string cells.
///
/// Column names are unique and keep first-seen order. Every row holds exactly
/// one cell per column; a missing value is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: IndexSet<String>,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table from header names.
    ///
    /// Blank names become `Unnamed: <index>` and repeated names get a `.N`
    /// suffix so the column set stays unique.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns = IndexSet::new();
        for (i, name) in names.into_iter().enumerate() {
            let name = name.into();
            let name = if name.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name
            };
            let unique = unique_name(&columns, name);
            columns.insert(unique);
        }
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// A table with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a row, padding short rows with empty cells and dropping extra cells
    pub fn add_row(&mut self, mut cells: Vec<String>, source_line: usize) {
        cells.resize(self.columns.len(), String::new());
        self.rows.push(Row::new(cells, source_line));
    }

    /// Column names in order
    pub fn columns(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.columns.iter().map(String::as_str)
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// Look up a single cell
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// A table without rows carries no data and is never written
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Apply `f` to every cell of the named column
    pub fn map_column<F>(&mut self, column: &str, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        if let Some(idx) = self.column_index(column) {
            for row in &mut self.rows {
                let mapped = f(&row.cells[idx]);
                row.cells[idx] = mapped;
            }
        }
    }

    /// Drop every column whose cells are all empty
    pub fn drop_empty_columns(&mut self) {
        let keep: Vec<bool> = (0..self.columns.len())
            .map(|idx| self.rows.iter().any(|r| !r.cells[idx].is_empty()))
            .collect();
        if keep.iter().all(|&k| k) {
            return;
        }

        self.columns = self
            .columns
            .iter()
            .zip(&keep)
            .filter(|(_, keep)| **keep)
            .map(|(name, _)| name.clone())
            .collect();
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.cells.retain(|_| *flags.next().unwrap_or(&false));
        }
    }

    /// Append a column holding the same value in every row.
    /// An existing column of that name is overwritten.
    pub fn set_constant_column(&mut self, name: &str, value: &str) {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row.cells[idx] = value.to_string();
                }
            }
            None => {
                self.columns.insert(name.to_string());
                for row in &mut self.rows {
                    row.cells.push(value.to_string());
                }
            }
        }
    }

    /// Stack tables vertically.
    ///
    /// The result has the union of all column sets in first-seen order; cells
    /// for columns a source table lacks are left empty.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut columns: IndexSet<String> = IndexSet::new();
        for table in &tables {
            for name in &table.columns {
                columns.insert(name.clone());
            }
        }

        let mut result = Table {
            columns,
            rows: Vec::new(),
        };
        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .filter_map(|name| result.columns.get_index_of(name))
                .collect();
            for row in table.rows {
                let mut cells = vec![String::new(); result.columns.len()];
                for (cell, &target) in row.cells.into_iter().zip(&mapping) {
                    cells[target] = cell;
                }
                result.rows.push(Row::new(cells, row.source_line));
            }
        }
        result
    }
}

fn unique_name(existing: &IndexSet<String>, name: String) -> String {
    if !existing.contains(&name) {
        return name;
    }
    (1..)
        .map(|n| format!("{}.{}", name, n))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or(name)
}
