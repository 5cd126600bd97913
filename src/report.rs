//! The full dashboard for one selection, as a single serializable value.

use std::fmt::Write as _;

use serde::Serialize;

use crate::{
    data::{ChartEntry, Column, format_thousands},
    filter::{ChartView, Selection},
    rankings::{self, Entity, Highlight, MoverRecord, TopEntity, TrackSeries},
    rollup::{self, DailyRollup, Kpis},
    table::render_table,
};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub selection: Selection,
    pub kpis: Kpis,
    pub trends: Vec<DailyRollup>,
    pub top_tracks: Vec<TopEntity>,
    pub top_artists: Vec<TopEntity>,
    pub movers: Vec<MoverRecord>,
    pub highlights: Vec<Highlight>,
    pub drilldown: Option<TrackSeries>,
    pub table: Vec<ChartEntry>,
}

impl DashboardReport {
    /// `track` picks the drilldown; by default the first name in the picker.
    pub fn build(
        selection: &Selection,
        view: &ChartView<'_>,
        track: Option<&str>,
        search: Option<&str>,
    ) -> Self {
        let drilldown_track = match track {
            Some(name) => Some(name.to_string()),
            None => view.tracks().into_iter().next(),
        };
        let table = view
            .search(search.unwrap_or(""))
            .sorted_by_date_and_position()
            .entries()
            .iter()
            .map(|entry| (*entry).clone())
            .collect();
        Self {
            selection: selection.clone(),
            kpis: Kpis::compute(view, selection.start, selection.end),
            trends: rollup::daily_rollups(view),
            top_tracks: rankings::top_entities(view, Entity::Track),
            top_artists: rankings::top_entities(view, Entity::Artist),
            movers: rankings::movers(view),
            highlights: rankings::highlights(view),
            drilldown: drilldown_track.map(|name| rankings::track_series(view, &name)),
            table,
        }
    }

    pub fn render_text(&self, columns: &[Column]) -> String {
        let mut out = String::new();

        section(&mut out, "KPIs");
        out.push_str(&render_table(&["metric", "value"], &self.kpis.to_rows()));

        section(&mut out, "Temporal trends");
        let trend_rows = self.trends.iter().map(DailyRollup::to_row).collect::<Vec<_>>();
        out.push_str(&render_table(&DailyRollup::HEADERS, &trend_rows));

        section(&mut out, "Top 10 tracks");
        out.push_str(&render_top(Entity::Track, &self.top_tracks));
        section(&mut out, "Top 10 artists");
        out.push_str(&render_top(Entity::Artist, &self.top_artists));

        section(&mut out, "Movers (higher = better)");
        let mover_rows = self.movers.iter().map(MoverRecord::to_row).collect::<Vec<_>>();
        out.push_str(&render_table(&MoverRecord::HEADERS, &mover_rows));

        section(&mut out, "Highlights (most total streams)");
        let highlight_rows = self
            .highlights
            .iter()
            .map(Highlight::to_row)
            .collect::<Vec<_>>();
        out.push_str(&render_table(&Highlight::HEADERS, &highlight_rows));

        if let Some(series) = &self.drilldown {
            section(&mut out, &format!("Track drilldown: {}", series.track));
            out.push_str(&render_table(&TrackSeries::HEADERS, &series.to_rows()));
        }

        section(&mut out, "Data table");
        out.push_str(&render_entries(columns, self.table.iter()));
        out
    }
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "== {title} ==");
}

pub fn render_top(entity: Entity, top: &[TopEntity]) -> String {
    let rows = top
        .iter()
        .map(|item| vec![item.name.clone(), format_thousands(item.total_streams)])
        .collect::<Vec<_>>();
    render_table(&[entity.label(), "total_streams"], &rows)
}

pub fn render_entries<'a, I>(columns: &[Column], entries: I) -> String
where
    I: IntoIterator<Item = &'a ChartEntry>,
{
    let headers = columns.iter().map(Column::header).collect::<Vec<_>>();
    let rows = entries
        .into_iter()
        .map(|entry| columns.iter().map(|column| entry.value(*column)).collect())
        .collect::<Vec<Vec<String>>>();
    render_table(&headers, &rows)
}
