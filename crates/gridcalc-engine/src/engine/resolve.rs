//! Reference resolution: replacing cell references with numbers.
//!
//! The formula body is scanned once, token by token, and copied into a new
//! string with every reference swapped for its value. Substituted text is never
//! rescanned, so a number can't be mistaken for a reference.
//!
//! Referenced formula cells are evaluated recursively. A successful value is
//! kept in the call's memo and reused the next time the same cell is referenced.

use log::trace;

use super::cell::CellValue;
use super::cycle::EvalPath;
use super::deps::{cell_ref_re, parse_row};
use super::error::{FormulaError, Result};
use super::eval::{FormulaEngine, Memo};

impl FormulaEngine<'_> {
    /// Substitute every reference in `body`, recursing into referenced formulas
    /// with `path` as their ancestor chain.
    pub(crate) fn resolve_references(
        &self,
        body: &str,
        path: &EvalPath,
        memo: &Memo,
    ) -> Result<String> {
        let mut out = String::with_capacity(body.len());
        let mut last = 0;

        for caps in cell_ref_re().captures_iter(body) {
            let Some(token) = caps.get(0) else {
                continue;
            };
            out.push_str(&body[last..token.start()]);
            let substituted = self.resolve_reference(&caps[1], parse_row(&caps[2]), path, memo)?;
            out.push_str(&substituted);
            last = token.end();
        }
        out.push_str(&body[last..]);

        Ok(out)
    }

    fn resolve_reference(
        &self,
        column: &str,
        row: usize,
        path: &EvalPath,
        memo: &Memo,
    ) -> Result<String> {
        let cell_id = format!("{}{}", column, row);

        if path.contains(&cell_id) {
            return Err(FormulaError::CircularReference(cell_id));
        }
        self.check_reference(column, row)?;

        let substituted = match self.grid.get(column, row) {
            None => "0".to_string(),
            Some(CellValue::Number(n)) => number_operand(&cell_id, *n)?,
            Some(CellValue::Text(text)) if text.starts_with('=') => {
                let cached = memo.borrow().get(&cell_id).copied();
                let value = match cached {
                    Some(value) => value,
                    None => {
                        let value = self
                            .evaluate_in(text, &cell_id, path, memo)
                            .into_result()
                            .map_err(|e| FormulaError::ReferencedCellError {
                                cell: cell_id.clone(),
                                source: Box::new(e),
                            })?;
                        memo.borrow_mut().insert(cell_id.clone(), value);
                        value
                    }
                };
                number_operand(&cell_id, value)?
            }
            Some(CellValue::Text(text)) if text.is_empty() => "0".to_string(),
            Some(CellValue::Text(text)) => match text.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => number_operand(&cell_id, n)?,
                _ => {
                    return Err(FormulaError::NonNumericReference {
                        cell: cell_id,
                        text: text.clone(),
                    });
                }
            },
        };

        trace!("{} -> {}", cell_id, substituted);
        Ok(substituted)
    }
}

/// Render a referenced number as expression text. Negative values are
/// parenthesised so `5-B1` with B1 = -3 reads `5-(-3)`.
fn number_operand(cell_id: &str, n: f64) -> Result<String> {
    if !n.is_finite() {
        return Err(FormulaError::NonNumericReference {
            cell: cell_id.to_string(),
            text: n.to_string(),
        });
    }
    if n < 0.0 {
        Ok(format!("({})", n))
    } else {
        Ok(n.to_string())
    }
}
