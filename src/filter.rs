//! Row selection over a [`ChartTable`]: date window, rank threshold, artist
//! and track filters, plus the free-text table search.

use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;

use crate::{data::ChartEntry, merge::ChartTable};

pub const MIN_TOP_N: u32 = 10;
pub const MAX_TOP_N: u32 = 200;
pub const DEFAULT_TOP_N: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[value(rename_all = "kebab-case")]
pub enum DatePreset {
    #[default]
    Custom,
    Last7,
    Last14,
    Last30,
}

impl DatePreset {
    pub fn days(&self) -> Option<i64> {
        match self {
            DatePreset::Custom => None,
            DatePreset::Last7 => Some(7),
            DatePreset::Last14 => Some(14),
            DatePreset::Last30 => Some(30),
        }
    }

    /// Window relative to the table's latest date, clamped to its earliest.
    /// `Custom` uses the requested bounds, each defaulting to the table's.
    pub fn resolve(
        &self,
        bounds: (NaiveDate, NaiveDate),
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> (NaiveDate, NaiveDate) {
        let (min_date, max_date) = bounds;
        match self.days() {
            Some(days) => {
                let start = max_date - Duration::days(days - 1);
                (start.max(min_date), max_date)
            }
            None => (start.unwrap_or(min_date), end.unwrap_or(max_date)),
        }
    }
}

/// User-chosen filters applied before every aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rank_max: u32,
    pub artist: Option<String>,
    pub keyword: Option<String>,
}

impl Selection {
    pub fn new(start: NaiveDate, end: NaiveDate, rank_max: u32) -> Self {
        Self {
            start,
            end,
            rank_max,
            artist: None,
            keyword: None,
        }
    }

    pub fn with_artist(mut self, artist: Option<String>) -> Self {
        self.artist = artist;
        self
    }

    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword;
        self
    }

    pub fn matches(&self, entry: &ChartEntry) -> bool {
        if entry.date < self.start || entry.date > self.end || entry.position > self.rank_max {
            return false;
        }
        if let Some(artist) = &self.artist
            && entry.artist != *artist
        {
            return false;
        }
        match self.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => contains_ignore_case(&entry.track, keyword),
            _ => true,
        }
    }

    pub fn apply<'a>(&self, table: &'a ChartTable) -> ChartView<'a> {
        ChartView::new(
            table
                .entries()
                .iter()
                .filter(|entry| self.matches(entry))
                .collect(),
        )
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Read-only subset of a table's rows, in table order unless re-sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartView<'a> {
    entries: Vec<&'a ChartEntry>,
}

impl<'a> ChartView<'a> {
    pub fn new(entries: Vec<&'a ChartEntry>) -> Self {
        Self { entries }
    }

    pub fn from_table(table: &'a ChartTable) -> Self {
        Self::new(table.entries().iter().collect())
    }

    pub fn entries(&self) -> &[&'a ChartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows whose track or artist contains `term`, ignoring case. A blank
    /// term keeps everything.
    pub fn search(&self, term: &str) -> ChartView<'a> {
        let term = term.trim();
        if term.is_empty() {
            return self.clone();
        }
        ChartView::new(
            self.entries
                .iter()
                .copied()
                .filter(|entry| {
                    contains_ignore_case(&entry.track, term)
                        || contains_ignore_case(&entry.artist, term)
                })
                .collect(),
        )
    }

    /// Stable sort by date then position, the data table's display order.
    pub fn sorted_by_date_and_position(&self) -> ChartView<'a> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|entry| (entry.date, entry.position));
        ChartView::new(entries)
    }

    /// Sorted distinct track names, the drilldown picker's options.
    pub fn tracks(&self) -> Vec<String> {
        let mut tracks = self
            .entries
            .iter()
            .map(|entry| entry.track.clone())
            .collect::<Vec<_>>();
        tracks.sort();
        tracks.dedup();
        tracks
    }
}
