//! Source Reader: obtains raw day tables from local files or a remote endpoint.
//!
//! A local source is any `*.csv` file in the data directory whose name embeds a
//! `YYYY-MM-DD` date. A remote source is one HTTP GET per requested date. In
//! both cases a source that cannot be dated, read, or parsed contributes
//! nothing; the reason is handed back as a [`SkipReason`].

use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use encoding_rs::Encoding;
use log::{debug, warn};
use regex::Regex;
use reqwest::StatusCode;

use crate::{data::format_date, diagnostics::SkipReason, io_utils};

pub const DATE_PLACEHOLDER: &str = "{date}";

/// One day's chart exactly as read: header names and cells untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDayTable {
    pub source: String,
    pub date: NaiveDate,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("valid date regex"))
}

/// Finds the first `YYYY-MM-DD` run in `name` and parses it as a calendar date.
pub fn extract_date(name: &str) -> Option<NaiveDate> {
    let found = date_pattern().find(name)?;
    NaiveDate::parse_from_str(found.as_str(), "%Y-%m-%d").ok()
}

/// Reads a whole CSV body. Any malformed record fails the entire body.
pub fn read_raw_records<R: Read>(
    reader: R,
    encoding: &'static Encoding,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = io_utils::open_csv_reader(reader);
    let headers = io_utils::reader_headers(&mut reader, encoding).context("Reading headers")?;
    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        rows.push(decoded);
    }
    Ok((headers, rows))
}

/// Lists `*.csv` files directly under `dir`, in path order. A missing
/// directory simply yields no sources.
pub fn list_local_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        warn!("Data directory {dir:?} does not exist");
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Listing {dir:?}"))? {
        let path = entry.with_context(|| format!("Listing {dir:?}"))?.path();
        let is_csv = path.extension().and_then(|ext| ext.to_str()) == Some("csv");
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_local_day(
    path: &Path,
    encoding: &'static Encoding,
) -> std::result::Result<RawDayTable, SkipReason> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let date = extract_date(&name).ok_or(SkipReason::MissingDate)?;
    let reader = io_utils::open_input_file(path).map_err(|err| SkipReason::Unreadable {
        message: format!("{err:#}"),
    })?;
    let (headers, rows) =
        read_raw_records(reader, encoding).map_err(|err| SkipReason::Unreadable {
            message: format!("{err:#}"),
        })?;
    debug!("Read {} row(s) dated {date} from {path:?}", rows.len());
    Ok(RawDayTable {
        source: path.display().to_string(),
        date,
        headers,
        rows,
    })
}

/// Fetches the raw body of one day's chart.
pub trait DayFetcher {
    /// Identifier used in logs and skip reports.
    fn describe(&self, date: NaiveDate) -> String;

    /// `Ok(None)` means the endpoint has nothing for that date.
    fn fetch(&self, date: NaiveDate) -> Result<Option<Vec<u8>>>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::blocking::Client,
    template: String,
}

impl HttpFetcher {
    pub fn new(template: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build chart http client")?;
        Ok(Self {
            http,
            template: template.to_string(),
        })
    }
}

pub fn render_url(template: &str, date: NaiveDate) -> String {
    template.replace(DATE_PLACEHOLDER, &format_date(date))
}

impl DayFetcher for HttpFetcher {
    fn describe(&self, date: NaiveDate) -> String {
        render_url(&self.template, date)
    }

    fn fetch(&self, date: NaiveDate) -> Result<Option<Vec<u8>>> {
        let url = render_url(&self.template, date);
        let res = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("chart request to {url} failed"))?;
        if res.status() != StatusCode::OK {
            debug!("{url} answered HTTP {}", res.status());
            return Ok(None);
        }
        let body = res
            .bytes()
            .with_context(|| format!("failed to read chart body from {url}"))?;
        Ok(Some(body.to_vec()))
    }
}

pub fn fetch_remote_day<F: DayFetcher + ?Sized>(
    fetcher: &F,
    date: NaiveDate,
    encoding: &'static Encoding,
) -> std::result::Result<RawDayTable, SkipReason> {
    let source = fetcher.describe(date);
    let body = fetcher
        .fetch(date)
        .map_err(|err| SkipReason::FetchFailed {
            message: format!("{err:#}"),
        })?
        .ok_or_else(|| SkipReason::FetchFailed {
            message: "no chart published for this date".to_string(),
        })?;
    let (headers, rows) =
        read_raw_records(body.as_slice(), encoding).map_err(|err| SkipReason::Unreadable {
            message: format!("{err:#}"),
        })?;
    Ok(RawDayTable {
        source,
        date,
        headers,
        rows,
    })
}

/// Every date in `[start, end]`, inclusive. Empty when `start > end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}
