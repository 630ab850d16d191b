/// Display and formatting utilities for console output
use chrono::Local;
use polars::prelude::DataFrame;

use crate::error::SummaryError;

/// Polars truncates wide/long frames unless these are lifted
pub const FMT_MAX_ROWS_ENV: &str = "POLARS_FMT_MAX_ROWS";
pub const FMT_MAX_COLS_ENV: &str = "POLARS_FMT_MAX_COLS";

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Format the full summary table for printing
pub fn format_summary_table(df: &DataFrame) -> String {
    format!("Summary Data:\n{}", df)
}

/// Format message for a loaded sheet
pub fn format_sheet_loaded(sheet: &str, rows: usize) -> String {
    format!("[{}] Loaded sheet '{}' with {} rows", timestamp(), sheet, rows)
}

/// Format message for a saved artifact
pub fn format_saved(what: &str, path: &std::path::Path) -> String {
    format!("[{}] {} saved to {}", timestamp(), what, path.display())
}

/// Format message for an artifact that could not be written but did not stop the run
pub fn format_skipped(what: &str, error: &SummaryError) -> String {
    format!("Error saving {}: {}", what, error)
}

/// Format error message for a failed run, listing available columns when
/// required ones are missing
pub fn format_error(error: &SummaryError) -> String {
    match error {
        SummaryError::MissingColumns { available, .. } => {
            format!("Error: {}\nAvailable columns: {:?}", error, available)
        }
        _ => format!("Error: {}", error),
    }
}
