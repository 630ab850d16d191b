use std::path::PathBuf;

use polars::error::PolarsError;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

pub type SummaryResult<T> = Result<T, SummaryError>;

#[derive(Debug, Error)]
pub enum SummaryError {
    /// Required columns absent from the header row, in required order.
    #[error("Missing columns: {missing:?}")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("File {} not found.", .0.display())]
    InputNotFound(PathBuf),

    #[error("Sheet '{sheet}' not found (available: {available:?})")]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    #[error("Invalid PNL value '{value}' in row {row}")]
    InvalidPnl { row: usize, value: String },

    #[error("Invalid summary sheet: {0}")]
    InvalidSummary(String),

    #[error("Unknown variant: {0}")]
    InvalidVariant(String),

    #[error("Error reading Excel file: {0}")]
    Read(#[from] calamine::Error),

    #[error("Error saving to Excel: {0}")]
    Export(#[from] XlsxError),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
