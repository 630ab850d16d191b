use clap::Parser;
use log::{info, warn};
use pnl_summary::display::{
    format_error, format_saved, format_sheet_loaded, format_skipped, format_summary_table,
    FMT_MAX_COLS_ENV, FMT_MAX_ROWS_ENV,
};
use pnl_summary::*;
use std::{env, path::PathBuf, process};

/// Portfolio PNL summary - pivots PNL by portfolio group, strategy tag and user
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory input and output file names are relative to (default: $PNL_SUMMARY_DIR or .)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Input workbook (default: S1-11-27-SUMMARY.xlsx)
    #[arg(short, long)]
    input: Option<String>,

    /// Sheet holding the PNL records
    #[arg(short, long)]
    sheet: Option<String>,

    /// Output workbook (default: portfolio_summary.xlsx)
    #[arg(short, long)]
    output: Option<String>,

    /// Report variant: 'batch' or 'interactive'
    #[arg(long, default_value = "batch")]
    variant: String,

    /// Override the PNL column header
    #[arg(long)]
    pnl_column: Option<String>,

    /// Override whether duplicate records are removed
    #[arg(long)]
    dedup: Option<bool>,

    /// Override whether a missing sheet falls back to the first sheet
    #[arg(long)]
    sheet_fallback: Option<bool>,

    /// Also write the summary as CSV (optional)
    #[arg(long)]
    csv: Option<String>,

    /// Also write the display table as JSON (optional)
    #[arg(long)]
    json: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn summary_config(args: &Args, variant: Variant) -> SummaryConfig {
    let mut config = SummaryConfig::for_variant(variant);

    if let Some(sheet) = &args.sheet {
        config.sheet_name = sheet.clone();
    }
    if let Some(column) = &args.pnl_column {
        config.pnl_column = column.clone();
    }
    if let Some(dedup) = args.dedup {
        config.deduplicate = dedup;
    }
    if let Some(fallback) = args.sheet_fallback {
        config.sheet_fallback = fallback;
    }
    config
}

fn run(args: &Args) -> SummaryResult<()> {
    let variant: Variant = args.variant.parse()?;
    let config = summary_config(args, variant);
    let paths = PathConfig::new(args.dir.clone(), args.input.clone(), args.output.clone());
    info!("Variant: {} ({:?})", variant.name(), config);

    let (loaded, report) = summarize_file(&paths.input_path(), &config)?;
    println!("{}", format_sheet_loaded(&loaded.sheet, loaded.table.len()));
    if report.skipped > 0 {
        warn!("{} rows had no User ID or Strategy Tag", report.skipped);
    }

    let output = paths.output_path();
    write_summary_xlsx(&report.summary, &output, &config.output_sheet)?;

    // console table and secondary artifacts never fail the run
    let display = render_for_display(&report.summary);
    match display.to_dataframe() {
        Ok(df) => println!("{}", format_summary_table(&df)),
        Err(e) => eprintln!("Error rendering summary table: {}", e),
    }
    println!("\n{}", format_saved("Summary", &output));

    if let Some(csv) = &args.csv {
        let path = paths.resolve(csv);
        match write_summary_csv(&report.summary, &path) {
            Ok(()) => println!("{}", format_saved("Summary CSV", &path)),
            Err(e) => eprintln!("{}", format_skipped("CSV", &e)),
        }
    }
    if let Some(json) = &args.json {
        let path = paths.resolve(json);
        match write_display_json(&display, &path) {
            Ok(()) => println!("{}", format_saved("Summary JSON", &path)),
            Err(e) => eprintln!("{}", format_skipped("JSON", &e)),
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // print every row and column of the summary
    env::set_var(FMT_MAX_ROWS_ENV, "-1");
    env::set_var(FMT_MAX_COLS_ENV, "-1");

    info!("Portfolio summary starting");

    if let Err(e) = run(&args) {
        eprintln!("{}", format_error(&e));
        process::exit(1);
    }
}
