//! Display values for rendered cells.

use serde::Serialize;
use std::fmt;

use super::cell::CellValue;

/// What the grid shows for a cell: a number, or text (plain text cells and
/// `#ERROR: ...` messages alike).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Number(f64),
    Text(String),
}

impl DisplayValue {
    pub fn is_error(&self) -> bool {
        matches!(self, DisplayValue::Text(s) if s.starts_with("#ERROR: "))
    }
}

impl From<CellValue> for DisplayValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Number(n) => DisplayValue::Number(n),
            CellValue::Text(s) => DisplayValue::Text(s),
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(n) => f.write_str(&format_number(*n)),
            DisplayValue::Text(s) => f.write_str(s),
        }
    }
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}
