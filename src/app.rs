//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves configuration and starts logging
//! - loads the order sheet (fatal on failure)
//! - dispatches to the TUI, the text report, or the exporters

use clap::Parser;

use crate::charts::{ChartId, Figure};
use crate::cli::{Command, ExportArgs, FilterArgs, ReportArgs, SourceArgs};
use crate::config::{AppConfig, load_config};
use crate::domain::FilterSelection;
use crate::error::AppError;

pub mod pipeline;

use pipeline::Dashboard;

/// Entry point for the `salesdash` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
    }
}

fn resolve_config(source: &SourceArgs) -> Result<AppConfig, AppError> {
    let config = load_config(source.config.as_deref())?
        .with_data_path(source.data.clone())
        .with_sheet(source.sheet.clone());
    Ok(config)
}

fn start(source: &SourceArgs, interactive: bool) -> Result<Dashboard, AppError> {
    let config = resolve_config(source)?;
    crate::logging::init(&config.logging, !interactive)?;
    tracing::info!(path = %config.data.path.display(), "starting salesdash");

    let dashboard = Dashboard::load(&config.data).inspect_err(|err| {
        tracing::error!(%err, "dataset load failed");
    })?;
    Ok(dashboard)
}

fn handle_tui(args: SourceArgs) -> Result<(), AppError> {
    let dashboard = start(&args, true)?;
    crate::tui::run(dashboard)
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let dashboard = start(&args.source, false)?;
    let selection = selection_for(&dashboard, &args.filters);
    let figures = figures_for(&dashboard, &args.filters.charts, &selection)?;

    println!("{}", crate::report::format_header(dashboard.dataset(), &selection));
    for figure in &figures {
        println!("{}", crate::report::format_figure(figure, args.width, args.height));
    }
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.json.is_none() && args.csv_dir.is_none() {
        return Err(AppError::new(2, "Nothing to export: pass --json PATH and/or --csv-dir DIR."));
    }

    let dashboard = start(&args.source, false)?;
    let selection = selection_for(&dashboard, &args.filters);
    let figures = figures_for(&dashboard, &args.filters.charts, &selection)?;

    if let Some(path) = &args.json {
        crate::io::export::write_figures_json(path, &figures)?;
        tracing::info!(path = %path.display(), figures = figures.len(), "wrote figure JSON");
    }
    if let Some(dir) = &args.csv_dir {
        let written = crate::io::export::write_figures_csv(dir, &figures)?;
        tracing::info!(dir = %dir.display(), files = written.len(), "wrote figure CSVs");
    }
    Ok(())
}

fn selection_for(dashboard: &Dashboard, filters: &FilterArgs) -> FilterSelection {
    dashboard.selection_from(filters.start, filters.end, &filters.regions, &filters.categories)
}

fn figures_for(
    dashboard: &Dashboard,
    slots: &[String],
    selection: &FilterSelection,
) -> Result<Vec<Figure>, AppError> {
    let charts = parse_chart_slots(slots)?;
    if selection.is_reversed() {
        tracing::warn!(start = %selection.start, end = %selection.end, "start date is after end date");
    }
    Ok(dashboard.render_many(&charts, selection))
}

/// Resolve `--chart` slot names; no names means every chart.
pub fn parse_chart_slots(slots: &[String]) -> Result<Vec<ChartId>, AppError> {
    if slots.is_empty() {
        return Ok(ChartId::ALL.to_vec());
    }
    slots
        .iter()
        .map(|s| {
            ChartId::from_slot(s.trim()).ok_or_else(|| {
                let known = ChartId::ALL.map(|c| c.slot()).join(", ");
                AppError::new(2, format!("Unknown chart slot '{s}'. Known slots: {known}"))
            })
        })
        .collect()
}

/// Rewrite argv so `salesdash` defaults to `salesdash tui`.
///
/// Rules:
/// - `salesdash`                        -> `salesdash tui`
/// - `salesdash -d FILE ...`            -> `salesdash tui -d FILE ...`
/// - `salesdash --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "report" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
