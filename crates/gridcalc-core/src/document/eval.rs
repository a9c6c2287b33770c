use super::Document;
use gridcalc_engine::engine::{CellRef, DisplayValue, FormulaEngine, FormulaResult};

impl Document {
    /// A formula engine over the current grid, bounded by the configured depth.
    pub fn engine(&self) -> FormulaEngine<'_> {
        FormulaEngine::new(&self.grid).with_max_depth(self.limits.max_depth)
    }

    /// What the table shows for `cell`. Empty cells show as empty text.
    pub fn display_value(&self, cell: &CellRef) -> DisplayValue {
        match self.grid.get_ref(cell) {
            Some(value) => self.engine().resolve_cell_value(value, &cell.to_string()),
            None => DisplayValue::Text(String::new()),
        }
    }

    /// Evaluate formula text as if it were stored in `cell`. A missing leading
    /// `=` is accepted.
    pub fn evaluate(&self, formula: &str, cell: &CellRef) -> FormulaResult {
        self.engine().evaluate(formula, &cell.to_string())
    }

    /// Formula cells that reference `cell` directly.
    pub fn dependents_of(&self, cell: &CellRef) -> Vec<String> {
        self.engine().get_dependent_cells(&cell.to_string())
    }

    /// Display values for every row, columns in display order.
    pub fn render_rows(&self) -> Vec<Vec<DisplayValue>> {
        let engine = self.engine();
        (1..=self.row_count())
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| {
                        let cell = CellRef::new(column.id.clone(), row);
                        match self.grid.get_ref(&cell) {
                            Some(value) => engine.resolve_cell_value(value, &cell.to_string()),
                            None => DisplayValue::Text(String::new()),
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
