//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the filtering/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salesdash", version, about = "Retail sales dashboard over a static order sheet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui(SourceArgs),
    /// Print every chart (or the chosen ones) as text tables and ASCII plots.
    Report(ReportArgs),
    /// Write figure specifications to JSON and/or one CSV per chart.
    Export(ExportArgs),
}

/// Where the order sheet comes from.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Order sheet (.xls, .xlsx, .xlsm, .xlsb, .ods or .csv). Overrides config and SALESDASH_DATA.
    #[arg(short = 'd', long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Worksheet name (defaults to the first sheet).
    #[arg(long)]
    pub sheet: Option<String>,

    /// Configuration file (defaults to ./salesdash.toml, then next to the binary).
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,
}

/// Filter controls for the batch commands.
#[derive(Debug, Args, Clone, Default)]
pub struct FilterArgs {
    /// Start of the order-date window (YYYY-MM-DD); defaults to the earliest order.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End of the order-date window (YYYY-MM-DD, inclusive); defaults to the latest order.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Restrict to a region (repeatable). No value means all regions.
    #[arg(long = "region", value_name = "REGION")]
    pub regions: Vec<String>,

    /// Restrict to a category (repeatable). No value means all categories.
    #[arg(long = "category", value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// Only these chart slots (repeatable), e.g. `line-chart-sales`.
    #[arg(long = "chart", value_name = "SLOT")]
    pub charts: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Write all figures as one JSON document.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Write one `<slot>.csv` per figure into this directory.
    #[arg(long = "csv-dir", value_name = "DIR")]
    pub csv_dir: Option<PathBuf>,
}
