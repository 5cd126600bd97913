use std::collections::BTreeSet;

use chrono::NaiveDate;
use itertools::Itertools;

use crate::{
    data::{ChartEntry, Column},
    normalize::NormalizedDay,
};

/// Long-form table of every chart day, in source order. Never mutated after
/// assembly; filters produce views over it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartTable {
    columns: Vec<Column>,
    entries: Vec<ChartEntry>,
}

impl ChartTable {
    pub fn new(columns: Vec<Column>, entries: Vec<ChartEntry>) -> Self {
        Self { columns, entries }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn entries(&self) -> &[ChartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest and latest chart dates, if any rows exist.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.entries
            .iter()
            .map(|entry| entry.date)
            .minmax()
            .into_option()
    }

    /// Sorted distinct artist names, the artist picker's options.
    pub fn artists(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.artist.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Concatenates per-day tables in the order given. Columns keep canonical
/// order and only include those some contributing day actually carried.
pub fn merge_days<I>(days: I) -> ChartTable
where
    I: IntoIterator<Item = NormalizedDay>,
{
    let mut present = BTreeSet::new();
    let mut entries = Vec::new();
    for day in days {
        if day.entries.is_empty() {
            continue;
        }
        present.extend(day.columns.iter().copied());
        entries.extend(day.entries);
    }
    if entries.is_empty() {
        return ChartTable::default();
    }
    let columns = Column::CANONICAL_ORDER
        .into_iter()
        .filter(|column| present.contains(column))
        .collect();
    ChartTable::new(columns, entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: u32, position: u32, track: &str, artist: &str) -> ChartEntry {
        ChartEntry {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            position,
            track: track.to_string(),
            artist: artist.to_string(),
            streams: 100.0,
            url: String::new(),
        }
    }

    fn normalized(entries: Vec<ChartEntry>) -> NormalizedDay {
        NormalizedDay {
            source: "test".to_string(),
            columns: Column::CANONICAL_ORDER.to_vec(),
            entries,
            dropped: Vec::new(),
        }
    }

    #[test]
    fn merge_keeps_source_order() {
        let table = merge_days(vec![
            normalized(vec![entry(3, 1, "C", "x"), entry(3, 2, "D", "x")]),
            normalized(Vec::new()),
            normalized(vec![entry(1, 1, "A", "y")]),
        ]);
        let tracks = table
            .entries()
            .iter()
            .map(|e| e.track.as_str())
            .collect::<Vec<_>>();
        assert_eq!(tracks, vec!["C", "D", "A"]);
        assert_eq!(table.columns(), &Column::CANONICAL_ORDER);
        assert_eq!(
            table.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
            ))
        );
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let table = merge_days(vec![normalized(Vec::new())]);
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
        assert_eq!(table.date_bounds(), None);
    }

    #[test]
    fn artists_are_sorted_and_distinct() {
        let table = merge_days(vec![normalized(vec![
            entry(1, 1, "A", "Zeb"),
            entry(1, 2, "B", "Abida"),
            entry(2, 1, "A", "Zeb"),
        ])]);
        assert_eq!(table.artists(), vec!["Abida".to_string(), "Zeb".to_string()]);
    }
}
