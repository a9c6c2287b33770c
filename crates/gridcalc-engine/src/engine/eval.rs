//! Formula evaluation entry points.
//!
//! [`FormulaEngine`] borrows an immutable [`Grid`] snapshot and evaluates
//! formulas against it. Nothing is cached between calls. Within one call, each
//! referenced formula cell that evaluates successfully is remembered, so a
//! cell shared by several branches of the chain is computed once.

use log::debug;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::cell::RefCell;
use std::collections::HashMap;

use super::arith::evaluate_arithmetic;
use super::cell::{CellValue, Grid};
use super::cell_ref::CellRef;
use super::cycle::EvalPath;
use super::deps::{extract_dependencies, parse_row};
use super::error::{FormulaError, Result};
use super::format::DisplayValue;

/// Default (and largest) cap on how many formula cells one evaluation may pass through.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Successful values of referenced formula cells, keyed by cell id, for one
/// top-level evaluation. Errors are never stored: a circular reference depends
/// on the path it was reached by.
pub(crate) type Memo = RefCell<HashMap<String, f64>>;

/// Outcome of evaluating one formula.
///
/// `value` is `None` exactly when `error` is set. `dependencies` lists the
/// distinct cell ids the formula mentions and is absent when evaluation failed
/// before its references were validated.
#[derive(Clone, Debug, PartialEq)]
pub struct FormulaResult {
    pub value: Option<f64>,
    pub error: Option<FormulaError>,
    pub dependencies: Option<Vec<String>>,
}

impl FormulaResult {
    fn success(value: f64, dependencies: Vec<String>) -> FormulaResult {
        FormulaResult {
            value: Some(value),
            error: None,
            dependencies: Some(dependencies),
        }
    }

    fn failure(error: FormulaError, dependencies: Option<Vec<String>>) -> FormulaResult {
        FormulaResult {
            value: None,
            error: Some(error),
            dependencies,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    pub fn into_result(self) -> Result<f64> {
        match (self.value, self.error) {
            (_, Some(e)) => Err(e),
            (Some(v), None) => Ok(v),
            (None, None) => Err(FormulaError::InvalidExpression),
        }
    }
}

impl Serialize for FormulaResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FormulaResult", 4)?;
        // Errors carry an empty value rather than null.
        match self.value {
            Some(value) => state.serialize_field("value", &value)?,
            None => state.serialize_field("value", "")?,
        }
        state.serialize_field("isError", &self.is_error())?;
        match self.error_message() {
            Some(message) => state.serialize_field("error", &message)?,
            None => state.skip_field("error")?,
        }
        match &self.dependencies {
            Some(deps) => state.serialize_field("dependencies", deps)?,
            None => state.skip_field("dependencies")?,
        }
        state.end()
    }
}

/// Evaluates formulas against a borrowed grid snapshot.
pub struct FormulaEngine<'g> {
    pub(crate) grid: &'g Grid,
    max_depth: usize,
}

impl<'g> FormulaEngine<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        FormulaEngine {
            grid,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how many formula cells a single reference chain may pass through,
    /// within `1..=DEFAULT_MAX_DEPTH`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.clamp(1, DEFAULT_MAX_DEPTH);
        self
    }

    /// Evaluate a raw cell value as a formula. Numbers fail with `NotAString`.
    pub fn evaluate_formula(&self, formula: &CellValue, cell_id: &str) -> FormulaResult {
        match formula {
            CellValue::Text(text) => self.evaluate(text, cell_id),
            CellValue::Number(_) => FormulaResult::failure(FormulaError::NotAString, None),
        }
    }

    /// Evaluate formula text (with or without the leading `=`) as if it were
    /// stored in `cell_id`.
    pub fn evaluate(&self, formula: &str, cell_id: &str) -> FormulaResult {
        let memo = Memo::default();
        self.evaluate_in(formula, cell_id, &EvalPath::new(), &memo)
    }

    pub(crate) fn evaluate_in(
        &self,
        formula: &str,
        cell_id: &str,
        path: &EvalPath,
        memo: &Memo,
    ) -> FormulaResult {
        let mut dependencies = None;
        match self.try_evaluate(formula, cell_id, path, memo, &mut dependencies) {
            Ok(value) => FormulaResult::success(value, dependencies.unwrap_or_default()),
            Err(e) => {
                debug!("evaluating {} failed: {}", cell_id, e);
                FormulaResult::failure(e, dependencies)
            }
        }
    }

    fn try_evaluate(
        &self,
        formula: &str,
        cell_id: &str,
        path: &EvalPath,
        memo: &Memo,
        dependencies_out: &mut Option<Vec<String>>,
    ) -> Result<f64> {
        let body = formula.strip_prefix('=').unwrap_or(formula);
        if body.trim().is_empty() {
            return Err(FormulaError::EmptyFormula);
        }

        if path.contains(cell_id) {
            return Err(FormulaError::CircularReference(cell_id.to_string()));
        }
        if path.len() >= self.max_depth {
            return Err(FormulaError::DepthExceeded(self.max_depth));
        }
        let path = path.extended(cell_id);

        // Report malformed references before doing any substitution work.
        let dependencies = extract_dependencies(body);
        for dep in &dependencies {
            if let Some((column, row)) = split_cell_id(dep) {
                self.check_reference(column, row)?;
            }
        }
        *dependencies_out = Some(dependencies);

        let expression = self.resolve_references(body, &path, memo)?;
        evaluate_arithmetic(&expression)
    }

    /// Fail unless `column` exists and `row` lies in `1..=row_count`.
    pub(crate) fn check_reference(&self, column: &str, row: usize) -> Result<()> {
        if !self.grid.has_column(column) {
            return Err(FormulaError::UnknownColumn(column.to_string()));
        }
        let row_count = self.grid.row_count();
        if row < 1 || row > row_count {
            return Err(FormulaError::InvalidRow { row, row_count });
        }
        Ok(())
    }

    /// Display value for a cell: non-formulas pass through unchanged, formulas
    /// become their number or `#ERROR: <message>`.
    pub fn resolve_cell_value(&self, value: &CellValue, cell_id: &str) -> DisplayValue {
        if !value.is_formula() {
            return DisplayValue::from(value.clone());
        }

        let result = self.evaluate_formula(value, cell_id);
        match (result.value, result.error) {
            (_, Some(e)) => DisplayValue::Text(format!("#ERROR: {}", e)),
            (Some(v), None) => DisplayValue::Number(v),
            (None, None) => DisplayValue::Text(String::new()),
        }
    }

    /// Formula cells whose text references `target`, ordered by column then row.
    pub fn get_dependent_cells(&self, target: &str) -> Vec<String> {
        let mut dependents: Vec<CellRef> = self
            .grid
            .cells()
            .filter(|(_, value)| value.is_formula())
            .filter(|(_, value)| {
                value
                    .as_text()
                    .map(|text| extract_dependencies(text).iter().any(|dep| dep == target))
                    .unwrap_or(false)
            })
            .map(|(cell, _)| cell)
            .collect();
        dependents.sort();
        dependents.into_iter().map(|cell| cell.to_string()).collect()
    }
}

/// Split a reference token like "AB12" into ("AB", 12).
fn split_cell_id(cell_id: &str) -> Option<(&str, usize)> {
    let split = cell_id.find(|c: char| c.is_ascii_digit())?;
    let (column, digits) = cell_id.split_at(split);
    if column.is_empty() {
        return None;
    }
    Some((column, parse_row(digits)))
}
