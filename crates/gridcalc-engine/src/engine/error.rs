//! Error kinds produced while evaluating a formula.

use thiserror::Error;

/// Why a formula could not be evaluated.
///
/// Every stage of evaluation returns this type; the public entry points fold it
/// into a [`FormulaResult`](super::FormulaResult) instead of returning `Err`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Formula must be a string")]
    NotAString,

    #[error("Empty formula")]
    EmptyFormula,

    #[error("Circular reference detected involving {0}")]
    CircularReference(String),

    #[error("Column '{0}' does not exist")]
    UnknownColumn(String),

    #[error("Invalid row number: {row}. Must be between 1 and {row_count}")]
    InvalidRow { row: usize, row_count: usize },

    #[error("Cell {cell} contains non-numeric value: \"{text}\"")]
    NonNumericReference { cell: String, text: String },

    #[error("Error in cell {cell}: {source}")]
    ReferencedCellError {
        cell: String,
        #[source]
        source: Box<FormulaError>,
    },

    #[error("Invalid characters in expression. Use only numbers and operators (+, -, *, /)")]
    InvalidCharacters,

    #[error("Invalid operator sequence")]
    InvalidOperatorSequence,

    #[error("Unmatched parentheses")]
    UnmatchedParentheses,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Unexpected token {0}")]
    UnexpectedToken(String),

    #[error("Invalid mathematical expression")]
    InvalidExpression,

    #[error("Result is not finite (infinity or -infinity)")]
    NotFinite,

    #[error("Reference chain deeper than {0} cells")]
    DepthExceeded(usize),
}

impl FormulaError {
    /// The innermost error, following `ReferencedCellError` wrappers.
    pub fn root_cause(&self) -> &FormulaError {
        match self {
            FormulaError::ReferencedCellError { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, FormulaError>;
