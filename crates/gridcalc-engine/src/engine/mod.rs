//! Spreadsheet formula engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`CellValue`], [`Grid`] - Data structures for cell storage
//! - [`CellRef`] - Cell identifier parsing (A1 notation ↔ column/row)
//! - [`is_formula`] - Formula classification
//! - [`extract_dependencies`] - Parse formula dependencies
//! - [`FormulaEngine`] - Reference resolution, evaluation, reverse dependency lookup
//! - [`evaluate_arithmetic`] - Validate and evaluate a numeric-only expression
//! - [`EvalPath`] - Circular reference detection
//! - [`rewrite_formula`] - Adjust references when rows/columns are inserted or deleted
//! - [`DisplayValue`], [`format_number`] - Format values for display

mod arith;
mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod error;
mod eval;
mod format;
mod resolve;
mod rewrite;

pub use arith::{DECIMAL_PLACES, evaluate_arithmetic, round_to_places};
pub use cell::{CellValue, Grid, is_formula};
pub use cell_ref::{CellRef, col_to_letters, compare_columns, letters_to_col};
pub use cycle::EvalPath;
pub use deps::extract_dependencies;
pub use error::{FormulaError, Result};
pub use eval::{DEFAULT_MAX_DEPTH, FormulaEngine, FormulaResult};
pub use format::{DisplayValue, format_number};
pub use rewrite::{RewriteOutcome, ShiftOperation, deleted_reference_sentinel, rewrite_formula};
