//! Output formatting and persistence for prepared datasets and reports.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::Result;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, info};

use crate::dataset::{Dataset, Preview};

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Logs a preview as a header line followed by one line per row.
pub fn print_preview(preview: &Preview) {
    info!("{}", preview.columns.join(" | "));
    for row in &preview.rows {
        info!("{}", row.join(" | "));
    }
}

/// Writes a dataset as CSV with a header row.
///
/// Missing cells are written as empty fields. When `gzip` is set the file is
/// gzip-compressed.
pub fn write_dataset(path: &str, dataset: &Dataset, gzip: bool) -> Result<()> {
    debug!(path, gzip, rows = dataset.row_count(), "Writing dataset");

    let file = BufWriter::new(File::create(path)?);
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_csv(&mut encoder, dataset)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        write_csv(&mut file, dataset)?;
        file.flush()?;
    }

    Ok(())
}

fn write_csv<W: Write>(out: W, dataset: &Dataset) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);

    writer.write_record(dataset.column_names())?;
    for row in 0..dataset.row_count() {
        writer.write_record(dataset.render_row(row))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes a value as pretty-printed JSON to `path`.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    debug!(path, "Writing JSON");
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, value)?;
    file.flush()?;
    Ok(())
}
