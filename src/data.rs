use std::fmt;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder used when a source carries no track or artist name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Canonical columns of the merged chart table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Date,
    Position,
    Track,
    Artist,
    Streams,
    Url,
}

impl Column {
    pub const CANONICAL_ORDER: [Column; 6] = [
        Column::Date,
        Column::Position,
        Column::Track,
        Column::Artist,
        Column::Streams,
        Column::Url,
    ];

    /// Header used when the table is written back out as CSV.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Position => "Position",
            Column::Track => "Track",
            Column::Artist => "Artist",
            Column::Streams => "Streams",
            Column::Url => "URL",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One canonical row: a track's standing on a single chart day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub date: NaiveDate,
    pub position: u32,
    pub track: String,
    pub artist: String,
    pub streams: f64,
    pub url: String,
}

impl ChartEntry {
    pub fn value(&self, column: Column) -> String {
        match column {
            Column::Date => format_date(self.date),
            Column::Position => self.position.to_string(),
            Column::Track => self.track.clone(),
            Column::Artist => self.artist.clone(),
            Column::Streams => format_streams(self.streams),
            Column::Url => self.url.clone(),
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("Failed to parse '{value}' as date (expected YYYY-MM-DD)"))
}

/// Parses a stream count. Only finite numbers are accepted.
pub fn parse_streams(value: &str) -> Option<f64> {
    let parsed: f64 = value.trim().parse().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Parses a chart position. Accepts integral numbers written as floats
/// (`"3.0"`) but rejects fractions, zero and negatives.
pub fn parse_position(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if let Ok(int) = trimmed.parse::<u32>() {
        return (int >= 1).then_some(int);
    }
    let parsed: f64 = trimmed.parse().ok()?;
    if !parsed.is_finite() || parsed.fract() != 0.0 || parsed < 1.0 || parsed > u32::MAX as f64 {
        return None;
    }
    Some(parsed as u32)
}

pub fn format_streams(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Human-readable number with thousands separators, rounded to an integer.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative { format!("-{out}") } else { out }
}
