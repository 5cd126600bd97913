//! Dashboard session: cached loading plus the two user-facing empty states.

use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    cache::TtlCache,
    config::DashboardConfig,
    filter::{ChartView, DatePreset, Selection},
    ingest::{self, LoadedCharts},
    io_utils,
    merge::ChartTable,
    source::{DATE_PLACEHOLDER, DayFetcher, HttpFetcher},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("No chart data available.\n{hint}")]
    NoDataAvailable { hint: String },
    #[error("No rows match your filters. Try widening date range or Top N.")]
    NoRowsMatchFilter,
}

/// Where chart days come from. Also the cache key, together with the encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceSpec {
    Local {
        dir: PathBuf,
    },
    Remote {
        template: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl SourceSpec {
    pub fn no_data_hint(&self) -> String {
        match self {
            SourceSpec::Local { dir } => format!(
                "Fix:\n\
                 1) Create a folder named `{dir}` (or pass --data-dir).\n\
                 2) Put downloaded chart CSVs inside it, with a .csv extension.\n\
                 3) Filenames must contain a date like YYYY-MM-DD \
                 (example: regional-pk-daily-2025-12-22.csv).\n\
                 4) Each file needs position and streams columns.",
                dir = dir.display()
            ),
            SourceSpec::Remote {
                template,
                start,
                end,
            } => format!(
                "Fix:\n\
                 1) Check that {template} serves CSV charts ({DATE_PLACEHOLDER} is replaced per day).\n\
                 2) Try a different range than {start} to {end}.\n\
                 3) Each chart needs position and streams columns."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub source: SourceSpec,
    pub encoding: Option<String>,
}

/// Filter choices as the user expressed them, before they are pinned to the
/// table's date bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequest {
    pub preset: DatePreset,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub top_n: u32,
    pub artist: Option<String>,
    pub keyword: Option<String>,
}

impl SelectionRequest {
    /// `None` when the table has no dates to anchor the window to.
    pub fn resolve(&self, table: &ChartTable) -> Option<Selection> {
        let bounds = table.date_bounds()?;
        let (start, end) = self.preset.resolve(bounds, self.start, self.end);
        let artist = self.artist.clone().filter(|a| !a.trim().is_empty());
        Some(
            Selection::new(start, end, self.top_n)
                .with_artist(artist)
                .with_keyword(self.keyword.clone()),
        )
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    cache: TtlCache<LoadKey, Arc<LoadedCharts>>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = TtlCache::new(config.cache_ttl());
        Self { config, cache }
    }

    pub fn local_source(&self) -> SourceSpec {
        SourceSpec::Local {
            dir: self.config.data_dir.clone(),
        }
    }

    pub fn remote_source(&self, start: NaiveDate, end: NaiveDate) -> SourceSpec {
        SourceSpec::Remote {
            template: self.config.remote_url_template.clone(),
            start,
            end,
        }
    }

    /// Loads through the cache, fetching remote days over HTTP.
    pub fn load(&mut self, source: &SourceSpec) -> Result<Arc<LoadedCharts>> {
        let timeout = self.config.request_timeout();
        self.load_with(source, |template| {
            let fetcher: Box<dyn DayFetcher> = Box::new(HttpFetcher::new(template, timeout)?);
            Ok(fetcher)
        })
    }

    /// Loads through the cache with a caller-supplied fetcher factory for
    /// remote sources.
    pub fn load_with<M>(&mut self, source: &SourceSpec, make_fetcher: M) -> Result<Arc<LoadedCharts>>
    where
        M: FnOnce(&str) -> Result<Box<dyn DayFetcher>>,
    {
        let key = LoadKey {
            source: source.clone(),
            encoding: self.config.input_encoding.clone(),
        };
        let encoding = io_utils::resolve_encoding(self.config.input_encoding.as_deref())?;
        self.cache.purge_expired_at(Instant::now());
        self.cache.get_or_try_insert_with(&key, || -> Result<Arc<LoadedCharts>> {
            let loaded = match source {
                SourceSpec::Local { dir } => ingest::ingest_local(dir, encoding)
                    .with_context(|| format!("Loading charts from {dir:?}"))?,
                SourceSpec::Remote {
                    template,
                    start,
                    end,
                } => {
                    let fetcher = make_fetcher(template)?;
                    ingest::ingest_remote(fetcher.as_ref(), *start, *end, encoding)
                }
            };
            Ok(Arc::new(loaded))
        })
    }
}

/// The merged table, or the terminal no-data condition.
pub fn require_data<'a>(
    loaded: &'a LoadedCharts,
    source: &SourceSpec,
) -> Result<&'a ChartTable, DashboardError> {
    if loaded.table.is_empty() {
        return Err(DashboardError::NoDataAvailable {
            hint: source.no_data_hint(),
        });
    }
    Ok(&loaded.table)
}

/// Applies the request; an empty result is a warning, distinct from no data.
pub fn select<'a>(
    table: &'a ChartTable,
    request: &SelectionRequest,
) -> Result<(Selection, ChartView<'a>), DashboardError> {
    let selection = request
        .resolve(table)
        .ok_or(DashboardError::NoRowsMatchFilter)?;
    let view = selection.apply(table);
    if view.is_empty() {
        return Err(DashboardError::NoRowsMatchFilter);
    }
    Ok((selection, view))
}
