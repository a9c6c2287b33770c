use gridcalc_engine::engine::{CellRef, CellValue, Grid, col_to_letters};

use crate::config::Limits;
use crate::error::{GridcalcError, Result};

/// Advisory column type. Number columns only accept numbers (or formulas) from
/// the editor; the formula engine itself ignores the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
}

/// Display configuration for one column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnConfig {
    pub id: String,
    pub label: String,
    pub kind: ColumnKind,
}

impl ColumnConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: ColumnKind) -> Self {
        ColumnConfig {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }
}

/// UI-agnostic table document: the grid data, its column configuration and
/// the limits every structural edit is checked against.
pub struct Document {
    /// Cell data and row count
    pub grid: Grid,
    /// Columns in display order
    pub columns: Vec<ColumnConfig>,
    pub limits: Limits,
    /// Whether the table has been modified
    pub modified: bool,
}

impl Document {
    /// Create the smallest table the limits allow, with columns A, B, ... of text type.
    pub fn new(limits: Limits) -> Self {
        let columns = limits.min_columns;
        let rows = limits.min_rows;
        Self::build(limits, columns, rows)
    }

    /// Create an empty table of the given size.
    pub fn with_size(limits: Limits, columns: usize, rows: usize) -> Result<Self> {
        if columns > limits.max_columns {
            return Err(GridcalcError::MaxColumns(limits.max_columns));
        }
        if columns < limits.min_columns {
            return Err(GridcalcError::MinColumns(limits.min_columns));
        }
        if rows > limits.max_rows {
            return Err(GridcalcError::MaxRows(limits.max_rows));
        }
        if rows < limits.min_rows {
            return Err(GridcalcError::MinRows(limits.min_rows));
        }
        Ok(Self::build(limits, columns, rows))
    }

    fn build(limits: Limits, columns: usize, rows: usize) -> Self {
        let mut grid = Grid::new(rows);
        let mut configs = Vec::with_capacity(columns);
        for index in 0..columns {
            let id = col_to_letters(index);
            grid.add_column(id.clone());
            configs.push(ColumnConfig::new(
                id.clone(),
                format!("Column {}", id),
                ColumnKind::Text,
            ));
        }

        Document {
            grid,
            columns: configs,
            limits,
            modified: false,
        }
    }

    /// The starter table: names, ages, addresses and salaries for three people.
    pub fn sample(limits: Limits) -> Result<Self> {
        let mut doc = Self::with_size(limits, 4, 3)?;
        let kinds = [
            ("Name", ColumnKind::Text),
            ("Age", ColumnKind::Number),
            ("Address", ColumnKind::Text),
            ("Salary", ColumnKind::Number),
        ];
        for (config, (label, kind)) in doc.columns.iter_mut().zip(kinds) {
            config.label = label.to_string();
            config.kind = kind;
        }

        let rows: [(&str, f64, &str, f64); 3] = [
            ("John Brown", 32.0, "New York No. 1 Lake Park", 55000.0),
            ("Jim Green", 42.0, "London No. 1 Lake Park", 60000.0),
            ("Joe Black", 32.0, "Sydney No. 1 Lake Park", 58000.0),
        ];
        for (i, (name, age, address, salary)) in rows.into_iter().enumerate() {
            let row = i + 1;
            doc.grid.set(&CellRef::new("A", row), name.into());
            doc.grid.set(&CellRef::new("B", row), age.into());
            doc.grid.set(&CellRef::new("C", row), address.into());
            doc.grid.set(&CellRef::new("D", row), salary.into());
        }
        Ok(doc)
    }

    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, id: &str) -> Option<&ColumnConfig> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn cell(&self, cell: &CellRef) -> Option<&CellValue> {
        self.grid.get_ref(cell)
    }

    /// Fail unless `cell` names an existing column and a row in `1..=row_count`.
    pub(crate) fn check_cell(&self, cell: &CellRef) -> Result<&ColumnConfig> {
        let column = self
            .column(&cell.column)
            .ok_or_else(|| GridcalcError::UnknownColumn(cell.column.clone()))?;
        self.check_row(cell.row)?;
        Ok(column)
    }

    pub(crate) fn check_row(&self, row: usize) -> Result<()> {
        let row_count = self.row_count();
        if row < 1 || row > row_count {
            return Err(GridcalcError::InvalidRow { row, row_count });
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_minimum_size() {
        let doc = Document::default();
        assert_eq!(doc.column_count(), 1);
        assert_eq!(doc.row_count(), 1);
        assert_eq!(doc.columns[0].id, "A");
        assert_eq!(doc.columns[0].label, "Column A");
        assert!(!doc.modified);
    }

    #[test]
    fn test_with_size_respects_limits() {
        assert!(Document::with_size(Limits::default(), 4, 3).is_ok());
        assert!(matches!(
            Document::with_size(Limits::default(), 11, 3),
            Err(GridcalcError::MaxColumns(10))
        ));
        assert!(matches!(
            Document::with_size(Limits::default(), 4, 0),
            Err(GridcalcError::MinRows(1))
        ));
    }

    #[test]
    fn test_sample_table() {
        let doc = Document::sample(Limits::default()).unwrap();
        assert_eq!(doc.column("B").map(|c| c.kind), Some(ColumnKind::Number));
        assert_eq!(
            doc.cell(&CellRef::new("D", 2)),
            Some(&CellValue::Number(60000.0))
        );
    }
}
