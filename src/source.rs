//! Spreadsheet source: reads the PNL sheet of a workbook into an
//! [`InputTable`].

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use log::{debug, info, warn};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::config::SummaryConfig;
use crate::error::{SummaryError, SummaryResult};
use crate::table::{Cell, InputTable};

/// The table read from a workbook and which sheet it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub sheet: String,
    pub table: InputTable,
    /// Set when the configured sheet was missing and the first sheet was used
    pub fallback_warning: Option<String>,
}

/// Choose the sheet to read. Returns the sheet name and, on fallback, the
/// warning to show the user.
pub fn select_sheet(
    sheet_names: &[String],
    wanted: &str,
    allow_fallback: bool,
) -> SummaryResult<(String, Option<String>)> {
    if sheet_names.iter().any(|s| s == wanted) {
        return Ok((wanted.to_string(), None));
    }

    let first = sheet_names.first().ok_or(SummaryError::EmptyWorkbook)?;
    if !allow_fallback {
        return Err(SummaryError::SheetNotFound {
            sheet: wanted.to_string(),
            available: sheet_names.to_vec(),
        });
    }

    let warning = format!("Sheet '{}' not found. Using first sheet: {}", wanted, first);
    Ok((first.clone(), Some(warning)))
}

/// Load the configured sheet from a workbook file.
pub fn load_table(path: &Path, config: &SummaryConfig) -> SummaryResult<LoadedTable> {
    if !path.exists() {
        return Err(SummaryError::InputNotFound(path.to_path_buf()));
    }
    info!("Reading workbook: {}", path.display());
    let workbook = open_workbook_auto(path)?;
    read_workbook(workbook, config)
}

/// Load the configured sheet from workbook bytes, e.g. an uploaded file.
pub fn load_table_from_bytes(bytes: Vec<u8>, config: &SummaryConfig) -> SummaryResult<LoadedTable> {
    debug!("Reading workbook from {} bytes", bytes.len());
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    read_workbook(workbook, config)
}

fn read_workbook<RS: Read + Seek>(
    mut workbook: Sheets<RS>,
    config: &SummaryConfig,
) -> SummaryResult<LoadedTable> {
    let sheet_names = workbook.sheet_names();
    let (sheet, fallback_warning) =
        select_sheet(&sheet_names, &config.sheet_name, config.sheet_fallback)?;
    if let Some(w) = &fallback_warning {
        warn!("{}", w);
    }

    let range = workbook.worksheet_range(&sheet)?;
    let table = range_to_table(&range);
    info!(
        "Loaded sheet '{}': {} columns, {} rows",
        sheet,
        table.columns().len(),
        table.len()
    );

    Ok(LoadedTable {
        sheet,
        table,
        fallback_warning,
    })
}

pub(crate) fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // dates, durations and error values keep their printed form
        other => Cell::Text(other.to_string()),
    }
}

/// First row is the header; the rest are data rows. Fully blank rows are
/// dropped.
pub(crate) fn range_to_table(range: &Range<Data>) -> InputTable {
    let mut rows = range.rows();
    let columns = match rows.next() {
        Some(header) => header
            .iter()
            .map(|c| to_cell(c).as_text().unwrap_or_default())
            .collect(),
        None => return InputTable::default(),
    };

    let data = rows
        .map(|r| r.iter().map(to_cell).collect::<Vec<_>>())
        .filter(|r| !r.iter().all(Cell::is_empty))
        .collect();

    InputTable::new(columns, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_named_sheet() {
        let (sheet, warning) =
            select_sheet(&names(&["Other", "Portfolios"]), "Portfolios", true).unwrap();
        assert_eq!(sheet, "Portfolios");
        assert!(warning.is_none());
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let (sheet, warning) =
            select_sheet(&names(&["Data", "Other"]), "Portfolios", true).unwrap();
        assert_eq!(sheet, "Data");
        assert_eq!(
            warning.as_deref(),
            Some("Sheet 'Portfolios' not found. Using first sheet: Data")
        );
    }

    #[test]
    fn test_select_without_fallback() {
        let err = select_sheet(&names(&["Data"]), "Portfolios", false).unwrap_err();
        assert!(matches!(err, SummaryError::SheetNotFound { .. }));
    }

    #[test]
    fn test_select_empty_workbook() {
        let err = select_sheet(&[], "Portfolios", true).unwrap_err();
        assert!(matches!(err, SummaryError::EmptyWorkbook));
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(to_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(to_cell(&Data::String("x".into())), Cell::Text("x".into()));
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
    }
}
