use log::{debug, warn};

use super::{ColumnConfig, ColumnKind, Document};
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::{
    CellRef, CellValue, RewriteOutcome, ShiftOperation, col_to_letters,
    deleted_reference_sentinel, rewrite_formula,
};

/// Dimension for row/column limit checks
#[derive(Copy, Clone)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    /// (min, max) allowed count for this dimension
    fn bounds(&self, doc: &Document) -> (usize, usize) {
        match self {
            Dimension::Row => (doc.limits.min_rows, doc.limits.max_rows),
            Dimension::Column => (doc.limits.min_columns, doc.limits.max_columns),
        }
    }

    fn count(&self, doc: &Document) -> usize {
        match self {
            Dimension::Row => doc.row_count(),
            Dimension::Column => doc.column_count(),
        }
    }

    fn too_many(&self, max: usize) -> GridcalcError {
        match self {
            Dimension::Row => GridcalcError::MaxRows(max),
            Dimension::Column => GridcalcError::MaxColumns(max),
        }
    }

    fn too_few(&self, min: usize) -> GridcalcError {
        match self {
            Dimension::Row => GridcalcError::MinRows(min),
            Dimension::Column => GridcalcError::MinColumns(min),
        }
    }
}

impl Document {
    fn check_can_add(&self, dim: Dimension) -> Result<()> {
        let (_, max) = dim.bounds(self);
        if dim.count(self) >= max {
            let err = dim.too_many(max);
            warn!("{}", err);
            return Err(err);
        }
        Ok(())
    }

    fn check_can_remove(&self, dim: Dimension) -> Result<()> {
        let (min, _) = dim.bounds(self);
        if dim.count(self) <= min {
            let err = dim.too_few(min);
            warn!("{}", err);
            return Err(err);
        }
        Ok(())
    }

    pub fn can_add_row(&self) -> bool {
        self.row_count() < self.limits.max_rows
    }

    pub fn can_remove_row(&self) -> bool {
        self.row_count() > self.limits.min_rows
    }

    pub fn can_add_column(&self) -> bool {
        self.column_count() < self.limits.max_columns
    }

    pub fn can_remove_column(&self) -> bool {
        self.column_count() > self.limits.min_columns
    }

    /// Rewrite every stored formula for a structural edit. Formulas that refer
    /// to a deleted row or column are replaced with an error sentinel text.
    fn apply_shift(&mut self, op: &ShiftOperation) {
        let sentinel = deleted_reference_sentinel(op);
        self.grid.rewrite_formulas(|cell, formula| match rewrite_formula(formula, op) {
            RewriteOutcome::Unchanged => None,
            RewriteOutcome::Rewritten(text) => {
                debug!("{}: {} -> {}", cell, formula, text);
                Some(CellValue::Text(text))
            }
            RewriteOutcome::Deleted => {
                debug!("{}: {} refers to deleted data", cell, formula);
                sentinel.clone().map(CellValue::Text)
            }
        });
    }

    /// Append an empty row. Returns the new row number.
    pub fn add_row(&mut self) -> Result<usize> {
        self.check_can_add(Dimension::Row)?;
        let row = self.row_count() + 1;
        self.grid.set_row_count(row);
        self.modified = true;
        Ok(row)
    }

    /// Insert an empty row at `at` (1-based; `row_count + 1` appends), moving
    /// later rows and the formulas that refer to them down by one.
    pub fn insert_row(&mut self, at: usize) -> Result<()> {
        self.check_can_add(Dimension::Row)?;
        let row_count = self.row_count();
        if at < 1 || at > row_count + 1 {
            return Err(GridcalcError::InvalidRow {
                row: at,
                row_count: row_count + 1,
            });
        }
        self.grid.insert_row(at);
        self.apply_shift(&ShiftOperation::InsertRow(at));
        self.modified = true;
        Ok(())
    }

    /// Remove the last row.
    pub fn remove_row(&mut self) -> Result<()> {
        self.check_can_remove(Dimension::Row)?;
        let last = self.row_count();
        self.delete_row(last);
        Ok(())
    }

    /// Remove row `row`, moving later rows up by one.
    pub fn remove_specific_row(&mut self, row: usize) -> Result<()> {
        self.check_can_remove(Dimension::Row)?;
        self.check_row(row)?;
        self.delete_row(row);
        Ok(())
    }

    fn delete_row(&mut self, row: usize) {
        self.grid.remove_row(row);
        self.apply_shift(&ShiftOperation::DeleteRow(row));
        self.modified = true;
    }

    /// First unused column id among the first `max_columns` candidates A, B, ..., Z, AA, ...
    pub fn next_column_id(&self) -> Option<String> {
        (0..self.limits.max_columns)
            .map(col_to_letters)
            .find(|id| self.column(id).is_none())
    }

    fn normalize_label(&self, id: &str, label: &str) -> Result<String> {
        let label = label.trim();
        let len = label.chars().count();
        if len > self.limits.max_label_len {
            return Err(GridcalcError::LabelTooLong {
                len,
                max: self.limits.max_label_len,
            });
        }
        if label.is_empty() {
            Ok(format!("Column {}", id))
        } else {
            Ok(label.to_string())
        }
    }

    /// Append a column with the next free id. Returns that id.
    pub fn add_column(&mut self, label: &str, kind: ColumnKind) -> Result<String> {
        self.check_can_add(Dimension::Column)?;
        let id = self
            .next_column_id()
            .ok_or(GridcalcError::NoColumnIdAvailable)?;
        let label = self.normalize_label(&id, label)?;

        self.grid.add_column(id.clone());
        self.columns.push(ColumnConfig::new(id.clone(), label, kind));
        self.modified = true;
        Ok(id)
    }

    /// Remove the last column in display order. Returns its id.
    pub fn remove_column(&mut self) -> Result<String> {
        self.check_can_remove(Dimension::Column)?;
        let Some(last) = self.columns.last() else {
            return Err(GridcalcError::MinColumns(self.limits.min_columns));
        };
        let id = last.id.clone();
        self.delete_column(&id);
        Ok(id)
    }

    /// Remove column `id` and its data.
    pub fn remove_specific_column(&mut self, id: &str) -> Result<()> {
        if self.column(id).is_none() {
            return Err(GridcalcError::UnknownColumn(id.to_string()));
        }
        self.check_can_remove(Dimension::Column)?;
        self.delete_column(id);
        Ok(())
    }

    fn delete_column(&mut self, id: &str) {
        self.columns.retain(|c| c.id != id);
        self.grid.remove_column(id);
        self.apply_shift(&ShiftOperation::DeleteColumn(id.to_string()));
        self.modified = true;
    }

    /// Change a column's label and/or type. Existing cell data is kept as is.
    pub fn update_column(
        &mut self,
        id: &str,
        label: Option<&str>,
        kind: Option<ColumnKind>,
    ) -> Result<()> {
        let label = match label {
            Some(label) => Some(self.normalize_label(id, label)?),
            None => None,
        };
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GridcalcError::UnknownColumn(id.to_string()))?;

        if let Some(label) = label {
            column.label = label;
        }
        if let Some(kind) = kind {
            column.kind = kind;
        }
        self.modified = true;
        Ok(())
    }

    /// Set cell contents from editor input.
    ///
    /// Input is trimmed. Empty input clears the cell, `=` input is stored as a
    /// formula in any column, number columns require a number and text
    /// columns store the text.
    pub fn set_cell_from_input(&mut self, cell: &CellRef, input: &str) -> Result<()> {
        let kind = self.check_cell(cell)?.kind;
        let input = input.trim();

        if input.is_empty() {
            return self.clear_cell(cell);
        }
        let value = if input.starts_with('=') {
            CellValue::Text(input.to_string())
        } else {
            match kind {
                ColumnKind::Text => CellValue::Text(input.to_string()),
                ColumnKind::Number => match input.parse::<f64>() {
                    Ok(n) if n.is_finite() => CellValue::Number(n),
                    _ => {
                        return Err(GridcalcError::InvalidNumber {
                            column: cell.column.clone(),
                            input: input.to_string(),
                        });
                    }
                },
            }
        };
        self.set_cell(cell, value)
    }

    /// Store a value as is.
    pub fn set_cell(&mut self, cell: &CellRef, value: CellValue) -> Result<()> {
        self.check_cell(cell)?;
        self.grid.set(cell, value);
        self.modified = true;
        Ok(())
    }

    pub fn clear_cell(&mut self, cell: &CellRef) -> Result<()> {
        self.check_cell(cell)?;
        if self.grid.clear(cell).is_some() {
            self.modified = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;

    fn doc() -> Document {
        Document::with_size(Limits::default(), 3, 3).unwrap()
    }

    fn text(doc: &Document, cell: &str) -> Option<String> {
        doc.cell(&CellRef::parse(cell).unwrap())
            .map(CellValue::to_input_string)
    }

    #[test]
    fn test_row_limits() {
        let limits = Limits {
            max_rows: 2,
            ..Limits::default()
        };
        let mut doc = Document::new(limits);
        assert!(doc.can_add_row());
        assert_eq!(doc.add_row().unwrap(), 2);
        assert!(!doc.can_add_row());
        assert!(matches!(doc.add_row(), Err(GridcalcError::MaxRows(2))));

        doc.remove_row().unwrap();
        assert!(!doc.can_remove_row());
        assert!(matches!(doc.remove_row(), Err(GridcalcError::MinRows(1))));
    }

    #[test]
    fn test_column_limits() {
        let limits = Limits {
            max_columns: 2,
            ..Limits::default()
        };
        let mut doc = Document::new(limits);
        assert_eq!(doc.add_column("Price", ColumnKind::Number).unwrap(), "B");
        assert!(!doc.can_add_column());
        assert!(matches!(
            doc.add_column("More", ColumnKind::Text),
            Err(GridcalcError::MaxColumns(2))
        ));
        assert_eq!(doc.remove_column().unwrap(), "B");
        assert!(matches!(
            doc.remove_column(),
            Err(GridcalcError::MinColumns(1))
        ));
    }

    #[test]
    fn test_next_column_id_reuses_gaps() {
        let mut doc = doc();
        doc.remove_specific_column("B").unwrap();
        assert_eq!(doc.next_column_id().as_deref(), Some("B"));
        assert_eq!(doc.add_column("", ColumnKind::Text).unwrap(), "B");
        assert_eq!(doc.column("B").unwrap().label, "Column B");
        assert_eq!(
            doc.columns.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            vec!["A", "C", "B"]
        );
    }

    #[test]
    fn test_labels_are_trimmed_and_bounded() {
        let mut doc = doc();
        let id = doc.add_column("  Total  ", ColumnKind::Number).unwrap();
        assert_eq!(doc.column(&id).unwrap().label, "Total");

        let long = "x".repeat(51);
        assert!(matches!(
            doc.add_column(&long, ColumnKind::Text),
            Err(GridcalcError::LabelTooLong { len: 51, max: 50 })
        ));
    }

    #[test]
    fn test_update_column() {
        let mut doc = doc();
        doc.update_column("B", Some("Age"), Some(ColumnKind::Number))
            .unwrap();
        let column = doc.column("B").unwrap();
        assert_eq!(column.label, "Age");
        assert_eq!(column.kind, ColumnKind::Number);
        assert!(matches!(
            doc.update_column("Z", None, None),
            Err(GridcalcError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_set_cell_from_input_by_column_kind() {
        let mut doc = doc();
        doc.update_column("B", None, Some(ColumnKind::Number))
            .unwrap();
        let a1 = CellRef::new("A", 1);
        let b1 = CellRef::new("B", 1);

        doc.set_cell_from_input(&a1, "  hello ").unwrap();
        assert_eq!(doc.cell(&a1), Some(&CellValue::Text("hello".into())));

        doc.set_cell_from_input(&b1, "42.5").unwrap();
        assert_eq!(doc.cell(&b1), Some(&CellValue::Number(42.5)));

        doc.set_cell_from_input(&b1, "=A2*2").unwrap();
        assert_eq!(doc.cell(&b1), Some(&CellValue::Text("=A2*2".into())));

        assert!(matches!(
            doc.set_cell_from_input(&b1, "abc"),
            Err(GridcalcError::InvalidNumber { .. })
        ));

        doc.set_cell_from_input(&b1, "   ").unwrap();
        assert_eq!(doc.cell(&b1), None);
        assert!(doc.modified);
    }

    #[test]
    fn test_set_cell_checks_coordinates() {
        let mut doc = doc();
        assert!(matches!(
            doc.set_cell_from_input(&CellRef::new("D", 1), "1"),
            Err(GridcalcError::UnknownColumn(_))
        ));
        assert!(matches!(
            doc.set_cell_from_input(&CellRef::new("A", 4), "1"),
            Err(GridcalcError::InvalidRow { row: 4, row_count: 3 })
        ));
    }

    #[test]
    fn test_remove_row_shifts_data_and_formulas() {
        let mut doc = doc();
        doc.set_cell_from_input(&CellRef::new("A", 1), "=B3+1").unwrap();
        doc.set_cell_from_input(&CellRef::new("A", 3), "=B2").unwrap();
        doc.set_cell_from_input(&CellRef::new("B", 3), "7").unwrap();

        doc.remove_specific_row(2).unwrap();

        assert_eq!(doc.row_count(), 2);
        assert_eq!(text(&doc, "A1").as_deref(), Some("=B2+1"));
        assert_eq!(
            text(&doc, "A2").as_deref(),
            Some("#ERROR: Reference to deleted row 2")
        );
        assert_eq!(text(&doc, "B2").as_deref(), Some("7"));
        assert_eq!(text(&doc, "B3"), None);
    }

    #[test]
    fn test_insert_row_shifts_data_and_formulas() {
        let mut doc = doc();
        doc.set_cell_from_input(&CellRef::new("A", 1), "=B2*2").unwrap();
        doc.set_cell_from_input(&CellRef::new("B", 2), "5").unwrap();

        doc.insert_row(2).unwrap();

        assert_eq!(doc.row_count(), 4);
        assert_eq!(text(&doc, "A1").as_deref(), Some("=B3*2"));
        assert_eq!(text(&doc, "B3").as_deref(), Some("5"));
        assert!(matches!(
            doc.insert_row(9),
            Err(GridcalcError::InvalidRow { .. })
        ));
    }

    #[test]
    fn test_remove_column_replaces_referencing_formulas() {
        let mut doc = doc();
        doc.set_cell_from_input(&CellRef::new("A", 1), "=B1+C1").unwrap();
        doc.set_cell_from_input(&CellRef::new("A", 2), "=C1*2").unwrap();
        doc.set_cell_from_input(&CellRef::new("B", 1), "3").unwrap();

        doc.remove_specific_column("B").unwrap();

        assert!(doc.column("B").is_none());
        assert!(!doc.grid.has_column("B"));
        assert_eq!(
            text(&doc, "A1").as_deref(),
            Some("#ERROR: Reference to deleted column B")
        );
        assert_eq!(text(&doc, "A2").as_deref(), Some("=C1*2"));
    }
}
