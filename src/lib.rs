pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod diagnostics;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod io_utils;
pub mod merge;
pub mod normalize;
pub mod rankings;
pub mod report;
pub mod rollup;
pub mod source;
pub mod table;

use std::{
    env,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};
use serde::Serialize;

use crate::{
    cli::{CatalogKind, Cli, Commands, OutputFormat, SourceArgs, ViewArgs},
    config::DashboardConfig,
    dashboard::{Dashboard, DashboardError, SourceSpec},
    filter::{ChartView, Selection},
    merge::ChartTable,
    rankings::{Highlight, MoverRecord, TrackSeries},
    report::DashboardReport,
    rollup::{DailyRollup, Kpis},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("chartboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Report(args) => with_view(&args.view, config, |table, selection, view| {
            let report = DashboardReport::build(
                selection,
                view,
                args.track.as_deref(),
                args.search.as_deref(),
            );
            match args.view.format {
                OutputFormat::Table => print!("{}", report.render_text(table.columns())),
                OutputFormat::Json => print_json(&report)?,
            }
            Ok(())
        }),
        Commands::Kpis(args) => with_view(&args, config, |_, selection, view| {
            let kpis = Kpis::compute(view, selection.start, selection.end);
            emit(args.format, &["metric", "value"], kpis.to_rows(), &kpis)
        }),
        Commands::Trends(args) => with_view(&args, config, |_, _, view| {
            let rollups = rollup::daily_rollups(view);
            let rows = rollups.iter().map(DailyRollup::to_row).collect();
            emit(args.format, &DailyRollup::HEADERS, rows, &rollups)
        }),
        Commands::Top(args) => with_view(&args.view, config, |_, _, view| {
            let top = rankings::top_entities(view, args.by);
            match args.view.format {
                OutputFormat::Table => print!("{}", report::render_top(args.by, &top)),
                OutputFormat::Json => print_json(&top)?,
            }
            Ok(())
        }),
        Commands::Movers(args) => with_view(&args, config, |_, _, view| {
            let movers = rankings::movers(view);
            let rows = movers.iter().map(MoverRecord::to_row).collect();
            emit(args.format, &MoverRecord::HEADERS, rows, &movers)
        }),
        Commands::Highlights(args) => with_view(&args, config, |_, _, view| {
            let highlights = rankings::highlights(view);
            let rows = highlights.iter().map(Highlight::to_row).collect();
            emit(args.format, &Highlight::HEADERS, rows, &highlights)
        }),
        Commands::Track(args) => with_view(&args.view, config, |_, _, view| {
            let series = rankings::track_series(view, &args.name);
            if series.points.is_empty() {
                warn!("Track '{}' has no rows in the current selection", args.name);
            }
            emit(args.view.format, &TrackSeries::HEADERS, series.to_rows(), &series)
        }),
        Commands::Table(args) => {
            let export_name = config.export_file_name.clone();
            with_view(&args.view, config, |table, _, view| {
                let rows = view
                    .search(args.search.as_deref().unwrap_or(""))
                    .sorted_by_date_and_position();
                if let Some(target) = &args.export {
                    let path = target
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(&export_name));
                    export::export_to_path(&path, &rows, table.columns())?;
                    return Ok(());
                }
                match args.view.format {
                    OutputFormat::Table => print!(
                        "{}",
                        report::render_entries(table.columns(), rows.entries().iter().copied())
                    ),
                    OutputFormat::Json => print_json(&rows.entries())?,
                }
                Ok(())
            })
        }
        Commands::Catalog(args) => with_view(&args.view, config, |table, _, view| {
            let (header, names) = match args.kind {
                CatalogKind::Artists => ("Artist", table.artists()),
                CatalogKind::Tracks => ("Track", view.tracks()),
            };
            let rows = names.iter().map(|name| vec![name.clone()]).collect();
            emit(args.view.format, &[header], rows, &names)
        }),
        Commands::Sources(args) => handle_sources(&args.source, args.format, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(path) => {
            let config = DashboardConfig::load(path)?;
            info!("Loaded configuration from {path:?}");
            Ok(config)
        }
        None => Ok(DashboardConfig::default()),
    }
}

fn apply_overrides(mut config: DashboardConfig, args: &SourceArgs) -> Result<DashboardConfig> {
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(template) = &args.remote_template {
        config.remote_url_template = template.clone();
    }
    if let Some(encoding) = &args.input_encoding {
        config.input_encoding = Some(encoding.clone());
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn source_spec(dashboard: &Dashboard, args: &SourceArgs) -> Result<SourceSpec> {
    if !args.remote {
        return Ok(dashboard.local_source());
    }
    let (Some(start), Some(end)) = (args.from, args.to) else {
        bail!("--remote requires both --from and --to");
    };
    if start > end {
        bail!("--from ({start}) must not be after --to ({end})");
    }
    Ok(dashboard.remote_source(start, end))
}

/// Loads the charts, applies the selection, and hands the view to `render`.
/// No data at all is an error; an empty selection is only a warning.
fn with_view<F>(args: &ViewArgs, config: DashboardConfig, render: F) -> Result<()>
where
    F: FnOnce(&ChartTable, &Selection, &ChartView<'_>) -> Result<()>,
{
    let mut dashboard = Dashboard::new(apply_overrides(config, &args.source)?);
    let source = source_spec(&dashboard, &args.source)?;
    let loaded = dashboard.load(&source)?;
    let table = dashboard::require_data(&loaded, &source)?;
    let request = args.selection.to_request();
    debug!("Selection request: {request:?}");
    match dashboard::select(table, &request) {
        Ok((selection, view)) => {
            info!(
                "Selected {} of {} row(s) between {} and {} (top {})",
                view.len(),
                table.len(),
                selection.start,
                selection.end,
                selection.rank_max
            );
            render(table, &selection, &view)
        }
        Err(DashboardError::NoRowsMatchFilter) => {
            warn!("{}", DashboardError::NoRowsMatchFilter);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn handle_sources(args: &SourceArgs, format: OutputFormat, config: DashboardConfig) -> Result<()> {
    let mut dashboard = Dashboard::new(apply_overrides(config, args)?);
    let source = source_spec(&dashboard, args)?;
    let loaded = dashboard.load(&source)?;
    let report = &loaded.report;
    if format == OutputFormat::Json {
        return print_json(report);
    }
    let summary = vec![
        vec!["sources read".to_string(), report.sources_read.to_string()],
        vec![
            "sources skipped".to_string(),
            report.sources_skipped().to_string(),
        ],
        vec!["rows kept".to_string(), report.rows_kept.to_string()],
        vec!["rows dropped".to_string(), report.rows_dropped.to_string()],
    ];
    table::print_table(&["metric", "value"], &summary);
    let issues = report
        .skipped_sources
        .iter()
        .chain(report.row_issues.iter())
        .map(|skip| vec![skip.source.clone(), skip.reason.to_string()])
        .collect::<Vec<_>>();
    if !issues.is_empty() {
        println!();
        table::print_table(&["source", "reason"], &issues);
    }
    Ok(())
}

fn emit<T: Serialize + ?Sized>(
    format: OutputFormat,
    headers: &[&str],
    rows: Vec<Vec<String>>,
    records: &T,
) -> Result<()> {
    match format {
        OutputFormat::Table => table::print_table(headers, &rows),
        OutputFormat::Json => print_json(records)?,
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Serializing output")?;
    println!("{rendered}");
    Ok(())
}
