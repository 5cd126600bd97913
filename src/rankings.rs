//! Leaderboards derived from a selection: top entities by streams, biggest
//! rank movers, stream highlights, and a single track's history.
//!
//! Groups are visited in key order and then stable-sorted, so ties keep
//! alphabetical order.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::{
    data::{ChartEntry, format_date, format_streams, format_thousands},
    filter::ChartView,
};

pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[value(rename_all = "kebab-case")]
pub enum Entity {
    Track,
    Artist,
}

impl Entity {
    fn key<'e>(&self, entry: &'e ChartEntry) -> &'e str {
        match self {
            Entity::Track => &entry.track,
            Entity::Artist => &entry.artist,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Entity::Track => "Track",
            Entity::Artist => "Artist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEntity {
    pub name: String,
    pub total_streams: f64,
}

/// Ten entities with the most summed streams.
pub fn top_entities(view: &ChartView<'_>, entity: Entity) -> Vec<TopEntity> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for entry in view.entries() {
        *totals.entry(entity.key(entry)).or_insert(0.0) += entry.streams;
    }
    let mut ranked = totals
        .into_iter()
        .map(|(name, total_streams)| TopEntity {
            name: name.to_string(),
            total_streams,
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.total_streams.total_cmp(&a.total_streams));
    ranked.truncate(LEADERBOARD_SIZE);
    ranked
}

/// Best and worst day-over-day rank change of one (track, artist) pair.
/// Positive numbers are climbs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoverRecord {
    pub track: String,
    pub artist: String,
    pub best_improvement: i64,
    pub worst_drop: i64,
}

impl MoverRecord {
    pub const HEADERS: [&'static str; 4] = ["Track", "Artist", "best_improvement", "worst_drop"];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.track.clone(),
            self.artist.clone(),
            self.best_improvement.to_string(),
            self.worst_drop.to_string(),
        ]
    }
}

/// Rank deltas are taken between consecutive appearances of the same track
/// name, ordered by date; the first appearance has no delta. Deltas are then
/// grouped by (track, artist).
pub fn movers(view: &ChartView<'_>) -> Vec<MoverRecord> {
    let mut chronological = view.entries().to_vec();
    chronological.sort_by_key(|entry| entry.date);

    let mut previous: HashMap<&str, u32> = HashMap::new();
    let mut deltas: BTreeMap<(&str, &str), (i64, i64)> = BTreeMap::new();
    for entry in chronological {
        let current = entry.position;
        if let Some(prev) = previous.insert(entry.track.as_str(), current) {
            let change = i64::from(prev) - i64::from(current);
            deltas
                .entry((entry.track.as_str(), entry.artist.as_str()))
                .and_modify(|(best, worst)| {
                    *best = (*best).max(change);
                    *worst = (*worst).min(change);
                })
                .or_insert((change, change));
        }
    }

    let mut records = deltas
        .into_iter()
        .map(|((track, artist), (best, worst))| MoverRecord {
            track: track.to_string(),
            artist: artist.to_string(),
            best_improvement: best,
            worst_drop: worst,
        })
        .collect::<Vec<_>>();
    records.sort_by(|a, b| b.best_improvement.cmp(&a.best_improvement));
    records.truncate(LEADERBOARD_SIZE);
    records
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub track: String,
    pub artist: String,
    pub total_streams: i64,
    pub best_rank: u32,
}

impl Highlight {
    pub const HEADERS: [&'static str; 4] = ["Track", "Artist", "total_streams", "best_rank"];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.track.clone(),
            self.artist.clone(),
            format_thousands(self.total_streams as f64),
            self.best_rank.to_string(),
        ]
    }
}

/// Most-streamed (track, artist) pairs, ties going to the better peak rank.
pub fn highlights(view: &ChartView<'_>) -> Vec<Highlight> {
    let mut groups: BTreeMap<(&str, &str), (f64, u32)> = BTreeMap::new();
    for entry in view.entries() {
        groups
            .entry((entry.track.as_str(), entry.artist.as_str()))
            .and_modify(|(total, best)| {
                *total += entry.streams;
                *best = (*best).min(entry.position);
            })
            .or_insert((entry.streams, entry.position));
    }
    let mut ranked = groups.into_iter().collect::<Vec<_>>();
    ranked.sort_by(|(_, (total_a, rank_a)), (_, (total_b, rank_b))| {
        total_b.total_cmp(total_a).then_with(|| rank_a.cmp(rank_b))
    });
    ranked
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .map(|((track, artist), (total, best_rank))| Highlight {
            track: track.to_string(),
            artist: artist.to_string(),
            total_streams: total.round() as i64,
            best_rank,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPoint {
    pub date: NaiveDate,
    pub position: u32,
    pub streams: f64,
}

/// One track's chart history in date order. Charting code should draw the
/// rank axis inverted so position 1 sits on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackSeries {
    pub track: String,
    pub points: Vec<TrackPoint>,
}

impl TrackSeries {
    pub const HEADERS: [&'static str; 3] = ["Date", "Position", "Streams"];

    pub fn rank_series(&self) -> Vec<(NaiveDate, u32)> {
        self.points.iter().map(|p| (p.date, p.position)).collect()
    }

    pub fn stream_series(&self) -> Vec<(NaiveDate, f64)> {
        self.points.iter().map(|p| (p.date, p.streams)).collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.points
            .iter()
            .map(|p| {
                vec![
                    format_date(p.date),
                    p.position.to_string(),
                    format_streams(p.streams),
                ]
            })
            .collect()
    }
}

pub fn track_series(view: &ChartView<'_>, track: &str) -> TrackSeries {
    let mut points = view
        .entries()
        .iter()
        .filter(|entry| entry.track == track)
        .map(|entry| TrackPoint {
            date: entry.date,
            position: entry.position,
            streams: entry.streams,
        })
        .collect::<Vec<_>>();
    points.sort_by_key(|point| point.date);
    TrackSeries {
        track: track.to_string(),
        points,
    }
}
