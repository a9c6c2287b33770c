//! gridcalc-core - UI-agnostic table document and configuration.

pub mod config;
pub mod document;
pub mod error;

pub use config::Limits;
pub use document::{ColumnConfig, ColumnKind, Document};
pub use error::{GridcalcError, Result};

pub use gridcalc_engine::engine::{CellRef, CellValue, DisplayValue};
