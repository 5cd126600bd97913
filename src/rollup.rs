use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    data::{format_date, format_thousands},
    filter::ChartView,
};

/// Per-day totals for the trend charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRollup {
    pub date: NaiveDate,
    pub total_streams: f64,
    pub avg_streams: f64,
    pub tracks_count: usize,
}

impl DailyRollup {
    pub const HEADERS: [&'static str; 4] = ["date", "total_streams", "avg_streams", "tracks_count"];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            format_date(self.date),
            format_thousands(self.total_streams),
            format_thousands(self.avg_streams),
            self.tracks_count.to_string(),
        ]
    }
}

#[derive(Default)]
struct DayAccumulator<'a> {
    total: f64,
    rows: usize,
    tracks: HashSet<&'a str>,
}

/// Groups the view by date, ascending.
pub fn daily_rollups(view: &ChartView<'_>) -> Vec<DailyRollup> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator<'_>> = BTreeMap::new();
    for entry in view.entries() {
        let acc = days.entry(entry.date).or_default();
        acc.total += entry.streams;
        acc.rows += 1;
        acc.tracks.insert(entry.track.as_str());
    }
    days.into_iter()
        .map(|(date, acc)| DailyRollup {
            date,
            total_streams: acc.total,
            avg_streams: acc.total / acc.rows as f64,
            tracks_count: acc.tracks.len(),
        })
        .collect()
}

/// Headline numbers for a selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub rows: usize,
    pub unique_tracks: usize,
    pub unique_artists: usize,
    pub avg_streams: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Kpis {
    pub fn compute(view: &ChartView<'_>, start: NaiveDate, end: NaiveDate) -> Self {
        let entries = view.entries();
        let tracks = entries.iter().map(|e| e.track.as_str()).collect::<HashSet<_>>();
        let artists = entries.iter().map(|e| e.artist.as_str()).collect::<HashSet<_>>();
        let total = entries.iter().map(|e| e.streams).sum::<f64>();
        let avg_streams = if entries.is_empty() {
            0.0
        } else {
            total / entries.len() as f64
        };
        Self {
            rows: entries.len(),
            unique_tracks: tracks.len(),
            unique_artists: artists.len(),
            avg_streams,
            start,
            end,
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<String>> {
        vec![
            vec!["Rows (song-days)".to_string(), format_thousands(self.rows as f64)],
            vec![
                "Unique tracks".to_string(),
                format_thousands(self.unique_tracks as f64),
            ],
            vec![
                "Unique artists".to_string(),
                format_thousands(self.unique_artists as f64),
            ],
            vec!["Avg streams".to_string(), format_thousands(self.avg_streams)],
            vec![
                "Date span".to_string(),
                format!("{} → {}", format_date(self.start), format_date(self.end)),
            ],
        ]
    }
}
