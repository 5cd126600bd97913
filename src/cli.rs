use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    dashboard::SelectionRequest,
    data::parse_naive_date,
    filter::{DEFAULT_TOP_N, DatePreset, MAX_TOP_N, MIN_TOP_N},
    rankings::Entity,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Explore daily Top-200 streaming chart snapshots",
    long_about = None
)]
pub struct Cli {
    /// YAML configuration file (data directory, remote template, cache TTL, ...)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render every dashboard section for the current selection
    Report(ReportArgs),
    /// Headline numbers: rows, unique tracks and artists, average streams
    Kpis(ViewArgs),
    /// Per-day totals, averages and distinct track counts
    Trends(ViewArgs),
    /// Ten most-streamed tracks or artists
    Top(TopArgs),
    /// Biggest day-over-day rank improvements
    Movers(ViewArgs),
    /// Most total streams per track, with best rank reached
    Highlights(ViewArgs),
    /// Rank and stream history of a single track
    Track(TrackArgs),
    /// Filtered data table with optional search and CSV export
    Table(TableArgs),
    /// List artist or track names available for filtering
    Catalog(CatalogArgs),
    /// Show which sources were read, skipped, or had rows dropped
    Sources(SourcesArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Directory holding daily chart CSVs named with a YYYY-MM-DD date
    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,
    /// Fetch one chart per day from the remote endpoint instead of local files
    #[arg(long, requires_all = ["from", "to"])]
    pub remote: bool,
    /// First day to fetch in remote mode (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,
    /// Last day to fetch in remote mode, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
    /// URL template for remote mode; `{date}` is replaced with each day
    #[arg(long = "remote-template")]
    pub remote_template: Option<String>,
    /// Character encoding of the chart files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Quick date window relative to the latest chart day
    #[arg(long, value_enum, default_value_t = DatePreset::Custom)]
    pub preset: DatePreset,
    /// Custom range start (defaults to the earliest chart day)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,
    /// Custom range end (defaults to the latest chart day)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
    /// Include ranks up to this position
    #[arg(
        long = "top-n",
        default_value_t = DEFAULT_TOP_N,
        value_parser = clap::value_parser!(u32).range(MIN_TOP_N as i64..=MAX_TOP_N as i64)
    )]
    pub top_n: u32,
    /// Keep only this exact artist name
    #[arg(long)]
    pub artist: Option<String>,
    /// Keep tracks whose name contains this text (case-insensitive)
    #[arg(long)]
    pub keyword: Option<String>,
}

impl SelectionArgs {
    pub fn to_request(&self) -> SelectionRequest {
        SelectionRequest {
            preset: self.preset,
            start: self.start,
            end: self.end,
            top_n: self.top_n,
            artist: self.artist.clone(),
            keyword: self.keyword.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct TopArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Rank tracks or artists
    #[arg(long, value_enum, default_value_t = Entity::Track)]
    pub by: Entity,
}

#[derive(Debug, Args)]
pub struct TrackArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Exact track name to drill into
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Case-insensitive text matched against track or artist
    #[arg(long)]
    pub search: Option<String>,
    /// Write the table as CSV; without a value the configured file name is used
    #[arg(long, num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Track to drill into (defaults to the first track in the selection)
    #[arg(long)]
    pub track: Option<String>,
    /// Case-insensitive text matched against track or artist in the data table
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum CatalogKind {
    Artists,
    Tracks,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Which names to list
    #[arg(long, value_enum, default_value_t = CatalogKind::Artists)]
    pub kind: CatalogKind,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_naive_date(value).map_err(|err| err.to_string())
}
