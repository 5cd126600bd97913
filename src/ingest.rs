//! Ingestion pipeline: read every source, normalize each day, merge once.
//!
//! Failures are absorbed per source and per row and recorded in the
//! [`LoadReport`]; the only way ingestion itself fails is when the data
//! directory cannot be listed.

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use encoding_rs::Encoding;
use log::info;

use crate::{
    diagnostics::{LoadReport, SkipReason},
    merge::{ChartTable, merge_days},
    normalize::{NormalizedDay, normalize_day},
    source::{self, DayFetcher, RawDayTable},
};

#[derive(Debug, Clone, Default)]
pub struct LoadedCharts {
    pub table: ChartTable,
    pub report: LoadReport,
}

/// Normalizes and merges already-read outcomes, in the order given.
pub fn ingest_days<I>(outcomes: I) -> LoadedCharts
where
    I: IntoIterator<Item = (String, Result<RawDayTable, SkipReason>)>,
{
    let mut report = LoadReport::default();
    let mut days: Vec<NormalizedDay> = Vec::new();
    for (source, outcome) in outcomes {
        let normalized = outcome.and_then(|raw| normalize_day(&raw));
        match normalized {
            Ok(day) => {
                report.sources_read += 1;
                report.rows_kept += day.entries.len();
                for reason in &day.dropped {
                    report.drop_row(&source, reason.clone());
                }
                days.push(day);
            }
            Err(reason) => report.skip_source(source, reason),
        }
    }
    let table = merge_days(days);
    info!(
        "Loaded {} row(s) from {} source(s); {} source(s) skipped, {} row(s) dropped",
        table.len(),
        report.sources_read,
        report.sources_skipped(),
        report.rows_dropped
    );
    LoadedCharts { table, report }
}

pub fn ingest_local(dir: &Path, encoding: &'static Encoding) -> Result<LoadedCharts> {
    let files = source::list_local_sources(dir)?;
    info!("Found {} CSV file(s) in {dir:?}", files.len());
    let outcomes = files.into_iter().map(|path| {
        let outcome = source::read_local_day(&path, encoding);
        (path.display().to_string(), outcome)
    });
    Ok(ingest_days(outcomes))
}

pub fn ingest_remote<F: DayFetcher + ?Sized>(
    fetcher: &F,
    start: NaiveDate,
    end: NaiveDate,
    encoding: &'static Encoding,
) -> LoadedCharts {
    let dates = source::date_range(start, end);
    info!("Fetching {} chart day(s) from {start} to {end}", dates.len());
    let outcomes = dates.into_iter().map(|date| {
        let outcome = source::fetch_remote_day(fetcher, date, encoding);
        (fetcher.describe(date), outcome)
    });
    ingest_days(outcomes)
}
