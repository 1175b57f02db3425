//! CSV ingestion for latency measurement files.
//!
//! Each file carries a header with at least `Duration_ms` and `Timestamp_ms`.
//! Rows that fail to parse are skipped and returned alongside the good data so
//! the caller can report them.

use crate::model::{Measurement, RejectedRow, Samples};
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

pub const DURATION_COLUMN: &str = "Duration_ms";
pub const TIMESTAMP_COLUMN: &str = "Timestamp_ms";

/// Read a measurement file from disk.
///
/// A missing file or a header without the required columns is an error; bad rows are not.
pub fn read_durations_with_timestamps(path: &Path) -> Result<Samples> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open measurements file {}", path.display()))?;
    let samples = read_samples(file, path)?;
    tracing::debug!(
        path = %path.display(),
        valid = samples.len(),
        rejected = samples.rejected.len(),
        "read measurements"
    );
    Ok(samples)
}

/// Parse measurements from any reader; `path` is only used to label rejected rows.
pub fn read_samples<R: Read>(input: R, path: &Path) -> Result<Samples> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .with_context(|| format!("read CSV header of {}", path.display()))?
        .clone();
    if headers.is_empty() {
        return Ok(Samples::default());
    }
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(duration_idx), Some(timestamp_idx)) =
        (column(DURATION_COLUMN), column(TIMESTAMP_COLUMN))
    else {
        bail!(
            "{} is missing a required column (expected {} and {})",
            path.display(),
            DURATION_COLUMN,
            TIMESTAMP_COLUMN
        );
    };

    let mut samples = Samples::default();
    let mut raw = csv::ByteRecord::new();
    // The header occupies line 1.
    let mut line = 1u64;
    loop {
        line += 1;
        match reader.read_byte_record(&mut raw) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => {
                return Err(e).with_context(|| format!("read {}", path.display()));
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(line);
                samples.rejected.push(RejectedRow {
                    path: path.to_path_buf(),
                    line,
                    fields: lossy_fields(&raw),
                    reason: e.to_string(),
                });
                continue;
            }
        }

        if let Some(pos) = raw.position() {
            line = pos.line();
        }
        let parsed = match csv::StringRecord::from_byte_record(raw.clone()) {
            Ok(record) => parse_row(&record, duration_idx, timestamp_idx),
            Err(e) => Err(format!(
                "field {} is not valid UTF-8",
                e.utf8_error().field() + 1
            )),
        };
        match parsed {
            Ok(m) => samples.push(m),
            Err(reason) => samples.rejected.push(RejectedRow {
                path: path.to_path_buf(),
                line,
                fields: lossy_fields(&raw),
                reason,
            }),
        }
    }

    Ok(samples)
}

fn lossy_fields(raw: &csv::ByteRecord) -> Vec<String> {
    raw.iter()
        .map(|f| String::from_utf8_lossy(f).into_owned())
        .collect()
}

fn parse_row(
    record: &csv::StringRecord,
    duration_idx: usize,
    timestamp_idx: usize,
) -> std::result::Result<Measurement, String> {
    let duration_raw = record
        .get(duration_idx)
        .ok_or_else(|| format!("{DURATION_COLUMN} is missing"))?;
    let timestamp_raw = record
        .get(timestamp_idx)
        .ok_or_else(|| format!("{TIMESTAMP_COLUMN} is missing"))?;

    let duration_ms: f64 = duration_raw
        .trim()
        .parse()
        .map_err(|_| format!("{DURATION_COLUMN} is not a number"))?;
    if !duration_ms.is_finite() {
        return Err(format!("{DURATION_COLUMN} is not finite"));
    }
    let timestamp_ms: i64 = timestamp_raw
        .trim()
        .parse()
        .map_err(|_| format!("{TIMESTAMP_COLUMN} is not an integer"))?;

    Ok(Measurement {
        timestamp_seconds: timestamp_ms as f64 / 1000.0,
        duration_ms,
    })
}
