//! Deduplication, grouping and pivot aggregation of PNL records.

use log::{debug, info};
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::SummaryConfig;
use crate::error::{SummaryError, SummaryResult};
use crate::record::{PnlRecord, UserId};
use crate::table::{extract_records, validate, InputTable, STRATEGY_TAG};

pub const GROUP_COLUMN: &str = "Portfolio Group";

/// Records left after deduplication and how many were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated {
    pub records: Vec<PnlRecord>,
    pub removed: usize,
}

// Equal PNLs must hash equal: -0.0 folds into 0.0 and every NaN is one value.
fn pnl_key(pnl: Option<f64>) -> Option<u64> {
    pnl.map(|p| {
        if p == 0.0 {
            0.0f64.to_bits()
        } else if p.is_nan() {
            f64::NAN.to_bits()
        } else {
            p.to_bits()
        }
    })
}

/// Keep the first record for each (User ID, clean name, PNL) key, in input
/// order. Running it again on its own output removes nothing.
pub fn deduplicate(mut records: Vec<PnlRecord>) -> Deduplicated {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);

    records.retain(|r| {
        seen.insert((
            r.user_id.clone(),
            r.clean_name().to_string(),
            pnl_key(r.pnl),
        ))
    });

    Deduplicated {
        removed: before - records.len(),
        records,
    }
}

/// A record paired with its portfolio group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupedRecord<'a> {
    pub group: &'a str,
    pub record: &'a PnlRecord,
}

pub fn derive_group(records: &[PnlRecord]) -> Vec<GroupedRecord<'_>> {
    records
        .iter()
        .map(|record| GroupedRecord {
            group: record.portfolio_group(),
            record,
        })
        .collect()
}

/// One (group, tag) line of the pivot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub group: String,
    pub strategy_tag: String,
    /// One slot per user column; `None` where the user has no records.
    pub values: Vec<Option<f64>>,
}

/// Pivoted PNL: rows keyed by (group, tag), one column per user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    users: Vec<UserId>,
    rows: Vec<SummaryRow>,
}

impl Summary {
    /// Assemble a summary from parts, checking every row has one value per
    /// user and that users and rows are in sorted order.
    pub fn new(users: Vec<UserId>, rows: Vec<SummaryRow>) -> SummaryResult<Self> {
        if let Some(row) = rows.iter().find(|r| r.values.len() != users.len()) {
            return Err(SummaryError::InvalidSummary(format!(
                "row ({}, {}) has {} values for {} users",
                row.group,
                row.strategy_tag,
                row.values.len(),
                users.len()
            )));
        }
        if users.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SummaryError::InvalidSummary(
                "user columns are not unique and ascending".to_string(),
            ));
        }
        let keys_sorted = rows.windows(2).all(|w| {
            (&w[0].group, &w[0].strategy_tag) < (&w[1].group, &w[1].strategy_tag)
        });
        if !keys_sorted {
            return Err(SummaryError::InvalidSummary(
                "rows are not unique and ascending".to_string(),
            ));
        }
        Ok(Self { users, rows })
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Summed PNL for a triple, `None` if no record contributed to it.
    pub fn cell(&self, group: &str, strategy_tag: &str, user: &UserId) -> Option<f64> {
        let col = self.users.iter().position(|u| u == user)?;
        self.rows
            .iter()
            .find(|r| r.group == group && r.strategy_tag == strategy_tag)
            .and_then(|r| r.values[col])
    }

    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![GROUP_COLUMN.to_string(), STRATEGY_TAG.to_string()];
        names.extend(self.users.iter().map(|u| u.to_string()));
        names
    }

    /// Numeric frame; absent cells are nulls.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let names = self.column_names();
        let groups: Vec<&str> = self.rows.iter().map(|r| r.group.as_str()).collect();
        let tags: Vec<&str> = self.rows.iter().map(|r| r.strategy_tag.as_str()).collect();

        let mut columns = vec![
            Column::new(names[0].as_str().into(), groups),
            Column::new(names[1].as_str().into(), tags),
        ];
        for (idx, name) in names[2..].iter().enumerate() {
            let values: Vec<Option<f64>> = self.rows.iter().map(|r| r.values[idx]).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }
        DataFrame::new(columns)
    }
}

/// Sum PNL per (group, tag, user). Any record creates its triple; a blank PNL
/// counts as zero, so only triples with no records at all stay absent.
pub fn aggregate(records: &[GroupedRecord<'_>]) -> Summary {
    let mut cells: BTreeMap<(&str, &str), BTreeMap<&UserId, f64>> = BTreeMap::new();

    for grouped in records {
        *cells
            .entry((grouped.group, grouped.record.strategy_tag.as_str()))
            .or_default()
            .entry(&grouped.record.user_id)
            .or_insert(0.0) += grouped.record.pnl.unwrap_or(0.0);
    }

    let users: Vec<UserId> = cells
        .values()
        .flat_map(|by_user| by_user.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect();

    let rows = cells
        .into_iter()
        .map(|((group, tag), by_user)| SummaryRow {
            group: group.to_string(),
            strategy_tag: tag.to_string(),
            values: users.iter().map(|u| by_user.get(u).copied()).collect(),
        })
        .collect();

    Summary { users, rows }
}

/// Presentation copy of a summary: every cell as text, blanks as "".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DisplayTable {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<&str> = self.rows.iter().map(|r| r[idx].as_str()).collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();
        DataFrame::new(columns)
    }
}

pub fn format_value(value: f64) -> String {
    value.to_string()
}

pub fn render_for_display(summary: &Summary) -> DisplayTable {
    let rows = summary
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.group.clone(), row.strategy_tag.clone()];
            cells.extend(
                row.values
                    .iter()
                    .map(|v| v.map(format_value).unwrap_or_default()),
            );
            cells
        })
        .collect();

    DisplayTable {
        columns: summary.column_names(),
        rows,
    }
}

/// Outcome of a full run over one input table
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub summary: Summary,
    /// Records that made it past extraction
    pub records: usize,
    /// Rows without a User ID or Strategy Tag
    pub skipped: usize,
    pub duplicates: usize,
}

/// Validate, extract, optionally deduplicate, group and aggregate.
pub fn build_summary(table: &InputTable, config: &SummaryConfig) -> SummaryResult<BuildReport> {
    let index = validate(table, &config.pnl_column)?;
    debug!("Required columns found at {:?}", index);

    let extracted = extract_records(table, &index)?;
    let records_count = extracted.records.len();

    let (records, duplicates) = if config.deduplicate {
        let deduped = deduplicate(extracted.records);
        info!("Removed {} duplicate records", deduped.removed);
        (deduped.records, deduped.removed)
    } else {
        (extracted.records, 0)
    };

    let grouped = derive_group(&records);
    let summary = aggregate(&grouped);
    info!(
        "Summary built: {} rows x {} users from {} records",
        summary.rows.len(),
        summary.users.len(),
        records.len()
    );

    Ok(BuildReport {
        summary,
        records: records_count,
        skipped: extracted.skipped,
        duplicates,
    })
}
