use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{data::Column, filter::ChartView, io_utils};

/// Writes the view as comma-delimited UTF-8 with a header row, columns in
/// `columns` order. Returns the number of data rows written.
pub fn write_view<W: Write>(writer: W, view: &ChartView<'_>, columns: &[Column]) -> Result<usize> {
    let mut writer = io_utils::csv_writer(writer);
    writer
        .write_record(columns.iter().map(Column::header))
        .context("Writing export headers")?;
    for (idx, entry) in view.entries().iter().enumerate() {
        writer
            .write_record(columns.iter().map(|column| entry.value(*column)))
            .with_context(|| format!("Writing export row {}", idx + 1))?;
    }
    writer.flush().context("Flushing export")?;
    Ok(view.len())
}

pub fn export_to_bytes(view: &ChartView<'_>, columns: &[Column]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_view(&mut buffer, view, columns)?;
    Ok(buffer)
}

/// Exports to a file, or to stdout when `path` is `-`.
pub fn export_to_path(path: &Path, view: &ChartView<'_>, columns: &[Column]) -> Result<usize> {
    let writer = io_utils::open_output(Some(path))?;
    let rows = write_view(writer, view, columns)
        .with_context(|| format!("Exporting to {path:?}"))?;
    info!("Exported {rows} row(s) to {path:?}");
    Ok(rows)
}
