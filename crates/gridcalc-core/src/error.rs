//! Error types for Gridcalc core.

use thiserror::Error;

/// Errors that can occur while editing a table or loading configuration.
#[derive(Error, Debug)]
pub enum GridcalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error in {path}: {message}")]
    Config { path: String, message: String },

    #[error("Cannot add row: maximum of {0} rows allowed")]
    MaxRows(usize),

    #[error("Cannot remove row: minimum of {0} rows required")]
    MinRows(usize),

    #[error("Cannot add column: maximum of {0} columns allowed")]
    MaxColumns(usize),

    #[error("Cannot remove column: minimum of {0} columns required")]
    MinColumns(usize),

    #[error("Maximum number of columns reached")]
    NoColumnIdAvailable,

    #[error("Column '{0}' does not exist")]
    UnknownColumn(String),

    #[error("Invalid row number: {row}. Must be between 1 and {row_count}")]
    InvalidRow { row: usize, row_count: usize },

    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("Column label is {len} characters long (max {max})")]
    LabelTooLong { len: usize, max: usize },

    #[error("Column {column} holds numbers; '{input}' is not a number")]
    InvalidNumber { column: String, input: String },
}

pub type Result<T> = std::result::Result<T, GridcalcError>;
