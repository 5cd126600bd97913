mod common;

use std::collections::HashMap;

use chrono::NaiveDate;
use encoding_rs::UTF_8;
use proptest::prelude::*;

use chartboard::{
    dashboard::{self, DashboardError, SelectionRequest, SourceSpec},
    data::{ChartEntry, Column},
    diagnostics::SkipReason,
    export,
    filter::{ChartView, DatePreset},
    ingest::{ingest_local, ingest_remote},
    normalize::{ALIASES, Field, normalize_day},
    source::{DayFetcher, RawDayTable},
};
use common::TestWorkspace;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn raw_table(headers: Vec<String>, rows: Vec<Vec<String>>) -> RawDayTable {
    RawDayTable {
        source: "memory".to_string(),
        date: day(2025, 12, 22),
        headers,
        rows,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn local_ingest_merges_dated_files_and_skips_the_rest() {
    let workspace = TestWorkspace::new();
    workspace.write_chart("2025-12-21", &[(1, "Jhol", "Maanu", 90_000), (2, "Pal Pal", "Afusic", 80_000)]);
    workspace.write_chart("2025-12-22", &[(1, "Pal Pal", "Afusic", 95_000)]);
    workspace.write("notes-undated.csv", "Position,Streams\n1,10\n");
    workspace.write("regional-2025-12-23.txt", "Position,Streams\n1,10\n");
    workspace.write("regional-pk-daily-2025-12-24.csv", "Artist,Track,URL\nA,B,C\n");
    std::fs::write(
        workspace.path().join("regional-pk-daily-2025-12-25.csv"),
        b"Position,Streams\n1,\xc3\x28\n",
    )
    .unwrap();

    let loaded = ingest_local(workspace.path(), UTF_8).unwrap();
    assert_eq!(loaded.table.len(), 3);
    assert_eq!(loaded.table.columns(), &Column::CANONICAL_ORDER);
    assert_eq!(loaded.table.entries()[0].date, day(2025, 12, 21));
    assert_eq!(loaded.table.entries()[2].track, "Pal Pal");
    assert_eq!(
        loaded.table.entries()[0].url,
        "https://open.spotify.com/track/id0x1"
    );

    let report = &loaded.report;
    assert_eq!(report.sources_read, 2);
    assert_eq!(report.sources_skipped(), 3);
    let reasons = report
        .skipped_sources
        .iter()
        .map(|s| &s.reason)
        .collect::<Vec<_>>();
    assert!(reasons.contains(&&SkipReason::MissingDate));
    assert!(
        reasons
            .iter()
            .any(|r| matches!(r, SkipReason::SchemaIncomplete { .. }))
    );
    assert!(reasons.iter().any(|r| matches!(r, SkipReason::Unreadable { .. })));
}

#[test]
fn garbled_values_drop_only_their_row() {
    let workspace = TestWorkspace::new();
    workspace.write(
        "regional-pk-daily-2025-01-05.csv",
        "Position,Track Name,Artist,Streams\n1,A,X,100\n3,B,Y,N/A\n4,C,Z,50\n",
    );
    let loaded = ingest_local(workspace.path(), UTF_8).unwrap();
    let tracks = loaded
        .table
        .entries()
        .iter()
        .map(|e| e.track.as_str())
        .collect::<Vec<_>>();
    assert_eq!(tracks, vec!["A", "C"]);
    assert_eq!(loaded.report.rows_dropped, 1);
    assert_eq!(loaded.report.rows_kept, 2);
}

#[test]
fn canonical_input_normalizes_to_itself() {
    let headers = strings(&["Date", "Position", "Track", "Artist", "Streams", "URL"]);
    let rows = vec![
        strings(&["2025-12-22", "1", "Jhol", "Maanu", "91234", "https://open.spotify.com/track/a"]),
        strings(&["2025-12-22", "2", "1989", "007", "80000.5", ""]),
    ];
    let first = normalize_day(&raw_table(headers.clone(), rows)).unwrap();

    let again_rows = first
        .entries
        .iter()
        .map(|entry| {
            Column::CANONICAL_ORDER
                .iter()
                .map(|column| entry.value(*column))
                .collect()
        })
        .collect();
    let second = normalize_day(&raw_table(headers, again_rows)).unwrap();
    assert_eq!(first.entries, second.entries);
}

#[test]
fn no_data_and_no_matching_rows_are_distinct() {
    let workspace = TestWorkspace::new();
    workspace.write("regional-pk-daily-2025-12-24.csv", "Artist,Track,URL\nA,B,C\n");
    let source = SourceSpec::Local {
        dir: workspace.path().to_path_buf(),
    };
    let empty = ingest_local(workspace.path(), UTF_8).unwrap();
    assert!(matches!(
        dashboard::require_data(&empty, &source),
        Err(DashboardError::NoDataAvailable { .. })
    ));

    workspace.write_chart("2025-12-25", &[(1, "Jhol", "Maanu", 10)]);
    let loaded = ingest_local(workspace.path(), UTF_8).unwrap();
    let table = dashboard::require_data(&loaded, &source).unwrap();
    let request = SelectionRequest {
        preset: DatePreset::Custom,
        start: None,
        end: None,
        top_n: 10,
        artist: Some("Nobody".to_string()),
        keyword: None,
    };
    assert_eq!(
        dashboard::select(table, &request).unwrap_err(),
        DashboardError::NoRowsMatchFilter
    );
}

#[test]
fn exported_csv_reads_back_to_the_same_entries() {
    let workspace = TestWorkspace::new();
    workspace.write(
        "regional-pk-daily-2025-12-22.csv",
        "rank,uri,artist_names,track_name,streams\n\
         1,spotify:track:abc,\"Ali Sethi, Shae Gill\",Pasoori,120000\n\
         2,spotify:track:def,Maanu,\"Jhol \"\"Live\"\"\",99000.25\n\
         3,bad-uri,Afusic,Pal Pal,88000\n",
    );
    let loaded = ingest_local(workspace.path(), UTF_8).unwrap();
    let view = ChartView::from_table(&loaded.table);

    let out_dir = TestWorkspace::new();
    let export_path = out_dir.path().join("spotify_pk_filtered-2025-12-22.csv");
    export::export_to_path(&export_path, &view, loaded.table.columns()).unwrap();

    let reread = ingest_local(out_dir.path(), UTF_8).unwrap();
    assert_eq!(reread.table.entries(), loaded.table.entries());
    assert_eq!(reread.table.entries()[2].url, "");
}

struct MapFetcher(HashMap<NaiveDate, Vec<u8>>);

impl DayFetcher for MapFetcher {
    fn describe(&self, date: NaiveDate) -> String {
        format!("map://{date}")
    }

    fn fetch(&self, date: NaiveDate) -> anyhow::Result<Option<Vec<u8>>> {
        if date == day(2025, 3, 2) {
            anyhow::bail!("connection reset");
        }
        Ok(self.0.get(&date).cloned())
    }
}

#[test]
fn remote_range_tolerates_missing_and_failed_days() {
    let mut bodies = HashMap::new();
    bodies.insert(day(2025, 3, 1), b"Rank,Song,Artist,Stream\n1,A,X,10\n".to_vec());
    bodies.insert(day(2025, 3, 4), b"Rank,Song,Artist,Stream\n1,B,Y,20\n".to_vec());
    bodies.insert(day(2025, 3, 3), b"nothing useful".to_vec());
    let fetcher = MapFetcher(bodies);

    let loaded = ingest_remote(&fetcher, day(2025, 3, 1), day(2025, 3, 5), UTF_8);
    let dates = loaded
        .table
        .entries()
        .iter()
        .map(|e| e.date)
        .collect::<Vec<_>>();
    assert_eq!(dates, vec![day(2025, 3, 1), day(2025, 3, 4)]);
    assert_eq!(loaded.report.sources_read, 2);
    assert_eq!(loaded.report.sources_skipped(), 3);
}

fn aliases_for(field: Field) -> Vec<&'static str> {
    ALIASES
        .iter()
        .filter(|(_, f)| *f == field)
        .map(|(alias, _)| *alias)
        .collect()
}

/// Re-spells an alias the way exports do: random case, and spaces turned
/// into underscores or padded runs.
fn respell(alias: &str, upper: bool, underscore: bool, pad: bool) -> String {
    let cased = if upper {
        alias.to_uppercase()
    } else {
        alias.to_string()
    };
    let joined = if underscore {
        cased.replace(' ', "_")
    } else {
        cased.replace(' ', "  ")
    };
    if pad { format!("  {joined} ") } else { joined }
}

fn canonical_entries(rows: &[(u32, String, String, u64)]) -> Vec<ChartEntry> {
    let headers = strings(&["Position", "Track", "Artist", "Streams", "URL"]);
    let body = rows
        .iter()
        .map(|(p, t, a, s)| vec![p.to_string(), t.clone(), a.clone(), s.to_string(), String::new()])
        .collect();
    normalize_day(&raw_table(headers, body)).unwrap().entries
}

proptest! {
    #[test]
    fn every_alias_spelling_normalizes_like_the_canonical_name(
        position_idx in 0usize..3,
        track_idx in 0usize..5,
        artist_idx in 0usize..5,
        streams_idx in 0usize..2,
        upper in any::<bool>(),
        underscore in any::<bool>(),
        pad in any::<bool>(),
        rows in prop::collection::vec((1u32..=200, "[A-Za-z0-9 ]{1,12}", "[A-Za-z]{1,10}", 0u64..5_000_000), 1..6),
    ) {
        let headers = vec![
            respell(aliases_for(Field::Position)[position_idx], upper, underscore, pad),
            respell(aliases_for(Field::Track)[track_idx], upper, underscore, pad),
            respell(aliases_for(Field::Artist)[artist_idx], upper, underscore, pad),
            respell(aliases_for(Field::Streams)[streams_idx], upper, underscore, pad),
        ];
        let body = rows
            .iter()
            .map(|(p, t, a, s)| vec![p.to_string(), t.clone(), a.clone(), s.to_string()])
            .collect();
        let aliased = normalize_day(&raw_table(headers, body)).unwrap();
        prop_assert_eq!(aliased.entries, canonical_entries(&rows));
    }

    #[test]
    fn url_aliases_are_interchangeable(url_idx in 0usize..3, upper in any::<bool>()) {
        let header = respell(aliases_for(Field::Url)[url_idx], upper, true, false);
        let headers = vec!["Position".to_string(), "Streams".to_string(), header];
        let body = vec![strings(&["1", "10", "https://example.test/t"])];
        let normalized = normalize_day(&raw_table(headers, body)).unwrap();
        prop_assert_eq!(normalized.entries[0].url.as_str(), "https://example.test/t");
    }
}
