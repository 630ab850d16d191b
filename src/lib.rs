//! Pivoted PNL summaries of per-user trading portfolios.
//!
//! A workbook sheet of `User ID`, `Portfolio Name`, PNL and `Strategy Tag`
//! rows is turned into a table with one row per (portfolio group, strategy
//! tag) and one column per user, each cell holding summed PNL.

pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod record;
pub mod source;
pub mod summary;
pub mod table;

pub use config::{PathConfig, SummaryConfig, Variant};
pub use error::{SummaryError, SummaryResult};
pub use export::{
    load_summary, load_summary_from_bytes, summary_to_xlsx_bytes, write_display_json,
    write_summary_csv, write_summary_xlsx,
};
pub use record::{clean_name, portfolio_group, PnlRecord, UserId};
pub use source::{load_table, load_table_from_bytes, LoadedTable};
pub use summary::{
    aggregate, build_summary, deduplicate, derive_group, render_for_display, BuildReport,
    DisplayTable, Summary, SummaryRow,
};
pub use table::{validate, Cell, InputTable};

/// Load a workbook and build its summary in one call.
pub fn summarize_file(
    path: &std::path::Path,
    config: &SummaryConfig,
) -> SummaryResult<(LoadedTable, BuildReport)> {
    let loaded = load_table(path, config)?;
    let report = build_summary(&loaded.table, config)?;
    Ok((loaded, report))
}

/// Same as [`summarize_file`] for an in-memory upload.
pub fn summarize_bytes(
    bytes: Vec<u8>,
    config: &SummaryConfig,
) -> SummaryResult<(LoadedTable, BuildReport)> {
    let loaded = load_table_from_bytes(bytes, config)?;
    let report = build_summary(&loaded.table, config)?;
    Ok((loaded, report))
}
