//! Cell data structures for the spreadsheet grid.
//!
//! - [`CellValue`] - The content of a stored cell (number or text; formulas are text)
//! - [`Grid`] - Column-keyed sparse storage plus the table's row count

use std::collections::HashMap;

use super::cell_ref::{CellRef, compare_columns};

/// The content stored in a cell.
///
/// A formula is plain text whose first character is `=`; see [`CellValue::is_formula`].
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// True iff this is text starting with `=`.
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.starts_with('='))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Number(_) => None,
        }
    }

    /// Get a string for the cell content (for editing).
    pub fn to_input_string(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

/// Classifier: true iff the value is text and its first character is `=`.
pub fn is_formula(value: &CellValue) -> bool {
    value.is_formula()
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Sparse grid storage: column id -> (1-based row -> value).
///
/// A missing row entry is an empty cell. Rows are valid in `1..=row_count`
/// for every column that exists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    columns: HashMap<String, HashMap<usize, CellValue>>,
    row_count: usize,
}

impl Grid {
    pub fn new(row_count: usize) -> Grid {
        Grid {
            columns: HashMap::new(),
            row_count,
        }
    }

    /// Builder used by tests and callers assembling a snapshot in one go.
    pub fn with_columns<I, S>(row_count: usize, ids: I) -> Grid
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut grid = Grid::new(row_count);
        for id in ids {
            grid.add_column(id);
        }
        grid
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Column ids in A, B, ..., Z, AA order.
    pub fn column_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.columns.keys().map(String::as_str).collect();
        ids.sort_by(|a, b| compare_columns(a, b));
        ids
    }

    pub fn get(&self, column: &str, row: usize) -> Option<&CellValue> {
        self.columns.get(column)?.get(&row)
    }

    pub fn get_ref(&self, cell: &CellRef) -> Option<&CellValue> {
        self.get(&cell.column, cell.row)
    }

    /// Iterate every stored cell. Order is unspecified.
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &CellValue)> + '_ {
        self.columns.iter().flat_map(|(column, rows)| {
            rows.iter()
                .map(move |(row, value)| (CellRef::new(column.clone(), *row), value))
        })
    }

    /// Add an empty column. Returns false if it already existed.
    pub fn add_column(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.columns.contains_key(&id) {
            return false;
        }
        self.columns.insert(id, HashMap::new());
        true
    }

    /// Remove a column and all of its data. Returns false if it did not exist.
    pub fn remove_column(&mut self, id: &str) -> bool {
        self.columns.remove(id).is_some()
    }

    /// Store a value. Returns false if the column does not exist.
    pub fn set(&mut self, cell: &CellRef, value: CellValue) -> bool {
        match self.columns.get_mut(&cell.column) {
            Some(rows) => {
                rows.insert(cell.row, value);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, cell: &CellRef) -> Option<CellValue> {
        self.columns.get_mut(&cell.column)?.remove(&cell.row)
    }

    /// Change the row count, dropping any data beyond the new last row.
    pub fn set_row_count(&mut self, row_count: usize) {
        self.row_count = row_count;
        for rows in self.columns.values_mut() {
            rows.retain(|row, _| *row <= row_count);
        }
    }

    /// Open an empty row at `at`, moving rows `at..` down by one.
    pub fn insert_row(&mut self, at: usize) {
        for rows in self.columns.values_mut() {
            let moved: HashMap<usize, CellValue> = rows
                .drain()
                .map(|(row, value)| if row >= at { (row + 1, value) } else { (row, value) })
                .collect();
            *rows = moved;
        }
        self.row_count += 1;
    }

    /// Delete row `at`, moving rows after it up by one.
    pub fn remove_row(&mut self, at: usize) {
        for rows in self.columns.values_mut() {
            rows.remove(&at);
            let moved: HashMap<usize, CellValue> = rows
                .drain()
                .map(|(row, value)| if row > at { (row - 1, value) } else { (row, value) })
                .collect();
            *rows = moved;
        }
        self.row_count = self.row_count.saturating_sub(1);
    }

    /// Apply `f` to every formula cell, replacing its value with the returned one.
    pub fn rewrite_formulas<F>(&mut self, mut f: F)
    where
        F: FnMut(&CellRef, &str) -> Option<CellValue>,
    {
        for (column, rows) in self.columns.iter_mut() {
            for (row, value) in rows.iter_mut() {
                let CellValue::Text(text) = value else {
                    continue;
                };
                if !text.starts_with('=') {
                    continue;
                }
                let cell = CellRef::new(column.clone(), *row);
                if let Some(new_value) = f(&cell, text) {
                    *value = new_value;
                }
            }
        }
    }
}
