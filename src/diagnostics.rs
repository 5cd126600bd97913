//! Skip bookkeeping for ingestion.
//!
//! Unreadable sources, incomplete schemas and rows that fail numeric coercion
//! are all absorbed silently by the loader. Each of those outcomes is still
//! recorded here so a run can be inspected after the fact.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("no YYYY-MM-DD date in source name")]
    MissingDate,
    #[error("unreadable source: {message}")]
    Unreadable { message: String },
    #[error("fetch failed: {message}")]
    FetchFailed { message: String },
    #[error("missing mandatory column(s): {}", .missing.join(", "))]
    SchemaIncomplete { missing: Vec<&'static str> },
    #[error("line {line}: invalid {field} value '{value}'")]
    RowInvalid {
        line: usize,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub source: String,
    pub reason: SkipReason,
}

/// Summary of one ingestion pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub sources_read: usize,
    pub skipped_sources: Vec<SkippedSource>,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    pub row_issues: Vec<SkippedSource>,
}

impl LoadReport {
    pub fn skip_source(&mut self, source: impl Into<String>, reason: SkipReason) {
        let source = source.into();
        log::debug!("Skipping source {source}: {reason}");
        self.skipped_sources.push(SkippedSource { source, reason });
    }

    pub fn drop_row(&mut self, source: &str, reason: SkipReason) {
        log::debug!("Dropping row from {source}: {reason}");
        self.rows_dropped += 1;
        self.row_issues.push(SkippedSource {
            source: source.to_string(),
            reason,
        });
    }

    pub fn sources_skipped(&self) -> usize {
        self.skipped_sources.len()
    }
}
