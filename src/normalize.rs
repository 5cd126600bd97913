//! Schema Normalizer: maps heterogeneous daily exports onto [`ChartEntry`].
//!
//! Column names are matched through [`ALIASES`] using a lookup key that
//! ignores case, surrounding whitespace, and runs of spaces/underscores. The
//! first header that resolves to a field claims it; later duplicates are
//! carried along unused, as are unrecognised columns.
//!
//! ## Rules
//!
//! - `position` and `streams` are mandatory. A source missing either column
//!   is discarded as a whole.
//! - `track`/`artist` default to [`UNKNOWN_NAME`] when absent or blank.
//! - `url` comes from a url column, else is derived from a `spotify:track:`
//!   uri, else is empty.
//! - Rows whose position or streams fail numeric coercion are dropped one by
//!   one and reported, never failing the source.

use std::sync::OnceLock;

use regex::Regex;

use crate::{
    data::{ChartEntry, Column, UNKNOWN_NAME, parse_position, parse_streams},
    diagnostics::SkipReason,
    source::RawDayTable,
};

/// Fields a source header can resolve to. `Uri` is only used to derive urls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Position,
    Track,
    Artist,
    Streams,
    Url,
    Uri,
}

/// Recognised header spellings, keyed by [`lookup_key`] form.
pub const ALIASES: &[(&str, Field)] = &[
    ("position", Field::Position),
    ("rank", Field::Position),
    ("chart position", Field::Position),
    ("track name", Field::Track),
    ("track", Field::Track),
    ("trackname", Field::Track),
    ("song", Field::Track),
    ("title", Field::Track),
    ("artist", Field::Artist),
    ("artist name", Field::Artist),
    ("artist names", Field::Artist),
    ("artistname", Field::Artist),
    ("artistnames", Field::Artist),
    ("streams", Field::Streams),
    ("stream", Field::Streams),
    ("url", Field::Url),
    ("track url", Field::Url),
    ("spotify url", Field::Url),
    ("uri", Field::Uri),
];

const TRACK_URL_PREFIX: &str = "https://open.spotify.com/track/";

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[_\s]+").expect("valid separator regex"))
}

fn track_uri_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^spotify:track:([A-Za-z0-9]+)").expect("valid uri regex"))
}

/// Trim, lowercase, and collapse whitespace/underscore runs to one space.
pub fn lookup_key(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    separator_pattern().replace_all(&lowered, " ").into_owned()
}

pub fn resolve_field(header: &str) -> Option<Field> {
    let key = lookup_key(header);
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, field)| *field)
}

/// `spotify:track:<id>` becomes an open.spotify.com link; anything else is empty.
pub fn uri_to_url(uri: &str) -> String {
    track_uri_pattern()
        .captures(uri.trim())
        .and_then(|caps| caps.get(1))
        .map(|id| format!("{TRACK_URL_PREFIX}{}", id.as_str()))
        .unwrap_or_default()
}

/// Header index claimed by each field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub position: Option<usize>,
    pub track: Option<usize>,
    pub artist: Option<usize>,
    pub streams: Option<usize>,
    pub url: Option<usize>,
    pub uri: Option<usize>,
}

impl ColumnMapping {
    pub fn from_headers(headers: &[String]) -> Self {
        let mut mapping = ColumnMapping::default();
        for (idx, header) in headers.iter().enumerate() {
            let Some(field) = resolve_field(header) else {
                continue;
            };
            let slot = match field {
                Field::Position => &mut mapping.position,
                Field::Track => &mut mapping.track,
                Field::Artist => &mut mapping.artist,
                Field::Streams => &mut mapping.streams,
                Field::Url => &mut mapping.url,
                Field::Uri => &mut mapping.uri,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        mapping
    }

    pub fn missing_mandatory(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.position.is_none() {
            missing.push("position");
        }
        if self.streams.is_none() {
            missing.push("streams");
        }
        missing
    }
}

/// Canonical output of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDay {
    pub source: String,
    pub columns: Vec<Column>,
    pub entries: Vec<ChartEntry>,
    pub dropped: Vec<SkipReason>,
}

pub fn normalize_day(raw: &RawDayTable) -> Result<NormalizedDay, SkipReason> {
    let headers = raw
        .headers
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();
    let mapping = ColumnMapping::from_headers(&headers);
    let (Some(position_idx), Some(streams_idx)) = (mapping.position, mapping.streams) else {
        return Err(SkipReason::SchemaIncomplete {
            missing: mapping.missing_mandatory(),
        });
    };

    let mut entries = Vec::with_capacity(raw.rows.len());
    let mut dropped = Vec::new();
    for (row_idx, row) in raw.rows.iter().enumerate() {
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
        let line = row_idx + 2;

        let Some(position) = parse_position(cell(position_idx)) else {
            dropped.push(SkipReason::RowInvalid {
                line,
                field: "position",
                value: cell(position_idx).to_string(),
            });
            continue;
        };
        let Some(streams) = parse_streams(cell(streams_idx)) else {
            dropped.push(SkipReason::RowInvalid {
                line,
                field: "streams",
                value: cell(streams_idx).to_string(),
            });
            continue;
        };

        let name_or_unknown = |idx: Option<usize>| match idx.map(cell) {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => UNKNOWN_NAME.to_string(),
        };
        let url = match (mapping.url, mapping.uri) {
            (Some(idx), _) => cell(idx).to_string(),
            (None, Some(idx)) => uri_to_url(cell(idx)),
            (None, None) => String::new(),
        };

        entries.push(ChartEntry {
            date: raw.date,
            position,
            track: name_or_unknown(mapping.track),
            artist: name_or_unknown(mapping.artist),
            streams,
            url,
        });
    }

    Ok(NormalizedDay {
        source: raw.source.clone(),
        columns: Column::CANONICAL_ORDER.to_vec(),
        entries,
        dropped,
    })
}
