//! Report sink: writes a summary to xlsx, CSV or JSON, and reads an exported
//! xlsx back.

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use log::info;
use polars::prelude::{CsvWriter, SerWriter};
use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek};
use std::path::Path;

use crate::error::{SummaryError, SummaryResult};
use crate::record::UserId;
use crate::source::to_cell;
use crate::summary::{DisplayTable, Summary, SummaryRow, GROUP_COLUMN};
use crate::table::{Cell, STRATEGY_TAG};

const KEY_COLUMN_WIDTH: f64 = 16.0;

fn col_index(idx: usize) -> SummaryResult<u16> {
    u16::try_from(idx)
        .map_err(|_| SummaryError::InvalidSummary(format!("column {} out of range", idx)))
}

fn row_index(idx: usize) -> SummaryResult<u32> {
    u32::try_from(idx)
        .map_err(|_| SummaryError::InvalidSummary(format!("row {} out of range", idx)))
}

/// Lay the summary out on a single sheet. Absent cells are not written at
/// all, so they stay empty when the file is reopened.
fn build_workbook(summary: &Summary, sheet_name: &str) -> SummaryResult<Workbook> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);

    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    sheet.write_string_with_format(0, 0, GROUP_COLUMN, &header)?;
    sheet.write_string_with_format(0, 1, STRATEGY_TAG, &header)?;
    sheet.set_column_width(0, KEY_COLUMN_WIDTH)?;
    sheet.set_column_width(1, KEY_COLUMN_WIDTH)?;

    for (idx, user) in summary.users().iter().enumerate() {
        let col = col_index(idx + 2)?;
        match user {
            UserId::Int(id) => sheet.write_number_with_format(0, col, *id as f64, &header)?,
            UserId::Text(id) => sheet.write_string_with_format(0, col, id, &header)?,
        };
    }

    for (idx, row) in summary.rows().iter().enumerate() {
        let r = row_index(idx + 1)?;
        sheet.write_string(r, 0, &row.group)?;
        sheet.write_string(r, 1, &row.strategy_tag)?;
        for (vidx, value) in row.values.iter().enumerate() {
            if let Some(v) = value {
                sheet.write_number(r, col_index(vidx + 2)?, *v)?;
            }
        }
    }

    Ok(workbook)
}

pub fn write_summary_xlsx(summary: &Summary, path: &Path, sheet_name: &str) -> SummaryResult<()> {
    let mut workbook = build_workbook(summary, sheet_name)?;
    workbook.save(path)?;
    info!("Summary saved to {}", path.display());
    Ok(())
}

/// Workbook bytes for a download response.
pub fn summary_to_xlsx_bytes(summary: &Summary, sheet_name: &str) -> SummaryResult<Vec<u8>> {
    let mut workbook = build_workbook(summary, sheet_name)?;
    Ok(workbook.save_to_buffer()?)
}

/// CSV with nulls written as empty fields.
pub fn write_summary_csv(summary: &Summary, path: &Path) -> SummaryResult<()> {
    let mut df = summary.to_dataframe()?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    info!("Summary CSV saved to {}", path.display());
    Ok(())
}

pub fn write_display_json(display: &DisplayTable, path: &Path) -> SummaryResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, display)?;
    info!("Summary JSON saved to {}", path.display());
    Ok(())
}

/// Read back a summary written by [`write_summary_xlsx`]. Uses the named
/// sheet, or the first one when `sheet_name` is `None`.
pub fn load_summary(path: &Path, sheet_name: Option<&str>) -> SummaryResult<Summary> {
    if !path.exists() {
        return Err(SummaryError::InputNotFound(path.to_path_buf()));
    }
    read_summary(open_workbook_auto(path)?, sheet_name)
}

pub fn load_summary_from_bytes(bytes: Vec<u8>, sheet_name: Option<&str>) -> SummaryResult<Summary> {
    read_summary(open_workbook_auto_from_rs(Cursor::new(bytes))?, sheet_name)
}

fn read_summary<RS: Read + Seek>(
    mut workbook: Sheets<RS>,
    sheet_name: Option<&str>,
) -> SummaryResult<Summary> {
    let names = workbook.sheet_names();
    let sheet = match sheet_name {
        Some(name) if names.iter().any(|n| n == name) => name.to_string(),
        Some(name) => {
            return Err(SummaryError::SheetNotFound {
                sheet: name.to_string(),
                available: names,
            })
        }
        None => names.first().cloned().ok_or(SummaryError::EmptyWorkbook)?,
    };
    let range = workbook.worksheet_range(&sheet)?;
    parse_summary(&range)
}

fn parse_summary(range: &Range<Data>) -> SummaryResult<Summary> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| SummaryError::InvalidSummary("sheet is empty".to_string()))?;

    let key_columns: Vec<String> = header
        .iter()
        .take(2)
        .map(|c| to_cell(c).as_text().unwrap_or_default())
        .collect();
    if key_columns != [GROUP_COLUMN, STRATEGY_TAG] {
        return Err(SummaryError::InvalidSummary(format!(
            "expected '{}' and '{}' as first columns, found {:?}",
            GROUP_COLUMN, STRATEGY_TAG, key_columns
        )));
    }

    let users = header[2..]
        .iter()
        .map(|c| match to_cell(c) {
            Cell::Number(n) => Ok(UserId::from_number(n)),
            other => other
                .as_text()
                .map(UserId::Text)
                .ok_or_else(|| SummaryError::InvalidSummary("blank user column".to_string())),
        })
        .collect::<SummaryResult<Vec<_>>>()?;

    let rows = rows
        .map(|r| {
            let values = r[2..]
                .iter()
                .map(|c| match to_cell(c) {
                    Cell::Number(n) => Ok(Some(n)),
                    cell if cell.is_empty() => Ok(None),
                    cell => Err(SummaryError::InvalidSummary(format!(
                        "non-numeric value {:?}",
                        cell
                    ))),
                })
                .collect::<SummaryResult<Vec<_>>>()?;
            Ok(SummaryRow {
                group: to_cell(&r[0]).as_text().unwrap_or_default(),
                strategy_tag: to_cell(&r[1]).as_text().unwrap_or_default(),
                values,
            })
        })
        .collect::<SummaryResult<Vec<_>>>()?;

    Summary::new(users, rows)
}
