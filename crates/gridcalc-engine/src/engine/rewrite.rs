//! Reference rewriting for structural edits.
//!
//! When rows are inserted or removed, or a column is deleted, stored formulas
//! must be rewritten once so their references still point at the same cells.
//! References to a row or column that no longer exists can't be fixed up; the
//! caller replaces such formulas with an error sentinel.

use super::deps::{cell_ref_re, parse_row};

/// Operation for shifting cell references in formulas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShiftOperation {
    InsertRow(usize),
    DeleteRow(usize),
    DeleteColumn(String),
}

/// Result of rewriting one formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// No reference needed to change.
    Unchanged,
    /// References were shifted; holds the new formula text.
    Rewritten(String),
    /// The formula refers to the deleted row or column.
    Deleted,
}

/// Shift cell references in a formula when rows are inserted/deleted or a
/// column is deleted.
///
/// Rules:
/// - Insert row at R: refs to row >= R become row + 1
/// - Delete row at R: refs to row > R become row - 1; a ref to row R deletes the formula
/// - Delete column C: any ref to column C deletes the formula; nothing shifts
///   because column ids are names, not positions
pub fn rewrite_formula(formula: &str, op: &ShiftOperation) -> RewriteOutcome {
    let mut out = String::with_capacity(formula.len());
    let mut last = 0;
    let mut changed = false;

    for caps in cell_ref_re().captures_iter(formula) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        let column = &caps[1];
        let row = parse_row(&caps[2]);

        let new_row = match op {
            ShiftOperation::InsertRow(at) if row >= *at => Some(row.saturating_add(1)),
            ShiftOperation::DeleteRow(at) if row == *at => return RewriteOutcome::Deleted,
            ShiftOperation::DeleteRow(at) if row > *at => Some(row - 1),
            ShiftOperation::DeleteColumn(id) if column == id.as_str() => return RewriteOutcome::Deleted,
            _ => None,
        };

        if let Some(new_row) = new_row {
            out.push_str(&formula[last..token.start()]);
            out.push_str(column);
            out.push_str(&new_row.to_string());
            last = token.end();
            changed = true;
        }
    }

    if !changed {
        return RewriteOutcome::Unchanged;
    }
    out.push_str(&formula[last..]);
    RewriteOutcome::Rewritten(out)
}

/// Sentinel text stored in place of a formula that referenced a deleted row or column.
pub fn deleted_reference_sentinel(op: &ShiftOperation) -> Option<String> {
    match op {
        ShiftOperation::InsertRow(_) => None,
        ShiftOperation::DeleteRow(row) => Some(format!("#ERROR: Reference to deleted row {}", row)),
        ShiftOperation::DeleteColumn(id) => {
            Some(format!("#ERROR: Reference to deleted column {}", id))
        }
    }
}
