//! Column-addressed raw table as read from a sheet, and the header
//! validation that turns it into typed records.

use log::{debug, warn};

use crate::error::{SummaryError, SummaryResult};
use crate::record::{PnlRecord, UserId};

pub const USER_ID: &str = "User ID";
pub const PORTFOLIO_NAME: &str = "Portfolio Name";
pub const STRATEGY_TAG: &str = "Strategy Tag";

/// A single spreadsheet value, detached from the reader that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text form of the cell, `None` if blank. Integral numbers drop the
    /// fractional part.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Header row plus data rows. Rows may be shorter than the header; missing
/// trailing cells read as blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl InputTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Positions of the required columns within a validated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub user_id: usize,
    pub portfolio_name: usize,
    pub pnl: usize,
    pub strategy_tag: usize,
}

/// Required column names in reporting order.
pub fn required_columns(pnl_column: &str) -> [&str; 4] {
    [USER_ID, PORTFOLIO_NAME, pnl_column, STRATEGY_TAG]
}

/// Check that every required column is present. Reports all missing names at
/// once rather than the first one found.
pub fn validate(table: &InputTable, pnl_column: &str) -> SummaryResult<ColumnIndex> {
    let required = required_columns(pnl_column);
    let missing: Vec<String> = required
        .iter()
        .filter(|name| table.position(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(SummaryError::MissingColumns {
            missing,
            available: table.columns.clone(),
        });
    }

    let find = |name: &str| table.position(name).unwrap_or_default();
    Ok(ColumnIndex {
        user_id: find(USER_ID),
        portfolio_name: find(PORTFOLIO_NAME),
        pnl: find(pnl_column),
        strategy_tag: find(STRATEGY_TAG),
    })
}

/// Records pulled from a table, plus how many rows could not be keyed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub records: Vec<PnlRecord>,
    pub skipped: usize,
}

/// Convert validated rows to records in their original order.
///
/// Rows with a blank User ID or Strategy Tag have no pivot cell to land in
/// and are skipped. A blank Portfolio Name reads as "" and so groups under "".
pub fn extract_records(table: &InputTable, index: &ColumnIndex) -> SummaryResult<Extracted> {
    let mut extracted = Extracted::default();

    for row in 0..table.len() {
        let user_id = match table.cell(row, index.user_id) {
            Cell::Number(n) => Some(UserId::from_number(*n)),
            other => other.as_text().map(UserId::Text),
        };
        let strategy_tag = table.cell(row, index.strategy_tag).as_text();

        let (user_id, strategy_tag) = match (user_id, strategy_tag) {
            (Some(u), Some(t)) => (u, t),
            _ => {
                debug!("Skipping row {}: blank User ID or Strategy Tag", sheet_row(row));
                extracted.skipped += 1;
                continue;
            }
        };

        let portfolio_name = table
            .cell(row, index.portfolio_name)
            .as_text()
            .unwrap_or_default();
        let pnl = parse_pnl(table.cell(row, index.pnl), row)?;

        extracted.records.push(PnlRecord {
            user_id,
            portfolio_name,
            pnl,
            strategy_tag,
        });
    }

    if extracted.skipped > 0 {
        warn!(
            "Skipped {} rows with blank User ID or Strategy Tag",
            extracted.skipped
        );
    }
    Ok(extracted)
}

fn parse_pnl(cell: &Cell, row: usize) -> SummaryResult<Option<f64>> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::Number(n) if n.is_finite() => Ok(Some(*n)),
        Cell::Number(n) => Err(SummaryError::InvalidPnl {
            row: sheet_row(row),
            value: n.to_string(),
        }),
        Cell::Text(s) if s.trim().is_empty() => Ok(None),
        Cell::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(SummaryError::InvalidPnl {
                row: sheet_row(row),
                value: s.clone(),
            }),
        },
        Cell::Bool(b) => Err(SummaryError::InvalidPnl {
            row: sheet_row(row),
            value: b.to_string(),
        }),
    }
}

// 1-based sheet row of a data row, counting the header as row 1
fn sheet_row(row: usize) -> usize {
    row + 2
}
