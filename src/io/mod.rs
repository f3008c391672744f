//! Input/output helpers.
//!
//! - CSV / workbook ingest + schema validation (`ingest`, `workbook`)
//! - figure exports (JSON / CSV) (`export`)

pub mod export;
pub mod ingest;
pub mod workbook;

pub use export::*;
pub use ingest::*;

use chrono::NaiveDate;

/// A single cell as delivered by a table reader, before schema coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    /// A cell the reader already knows is a date (spreadsheet date formats).
    Date(NaiveDate),
    /// A spreadsheet error value such as `#N/A`.
    Error(String),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Header row plus data rows, in source order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}
