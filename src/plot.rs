//! Throughput series preparation and the plot entry point.
//!
//! Label formatting lives here so it is usable (and testable) without the `tui` feature.

use crate::model::{ThroughputPoint, ThroughputSummary, ThroughputTable};
use anyhow::Result;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

/// Offset used for `HH:MM:SS` labels. Falls back to UTC when the local offset is unknown.
///
/// Must be called before any other thread is spawned; `time` refuses to read the
/// local offset from a multi-threaded process on some platforms.
pub fn local_offset() -> UtcOffset {
    match UtcOffset::current_local_offset() {
        Ok(offset) => offset,
        Err(e) => {
            tracing::info!(error = %e, "local UTC offset unavailable, labelling in UTC");
            UtcOffset::UTC
        }
    }
}

/// Format an epoch second as `HH:MM:SS` at `offset`.
pub fn time_label(second: i64, offset: UtcOffset) -> String {
    OffsetDateTime::from_unix_timestamp(second)
        .ok()
        .and_then(|dt| {
            dt.to_offset(offset)
                .format(format_description!("[hour]:[minute]:[second]"))
                .ok()
        })
        .unwrap_or_else(|| second.to_string())
}

/// Sorted points for rendering and export, one per tracked second.
pub fn throughput_series(table: &ThroughputTable, offset: UtcOffset) -> Vec<ThroughputPoint> {
    let mut seconds: Vec<i64> = table.keys().copied().collect();
    seconds.sort_unstable();
    seconds
        .into_iter()
        .map(|second| ThroughputPoint {
            second,
            label: time_label(second, offset),
            ops: table[&second],
        })
        .collect()
}

/// Show the combined throughput chart. Returns `false` when there was nothing to plot.
pub fn plot_throughput(points: &[ThroughputPoint], summary: &ThroughputSummary) -> Result<bool> {
    if points.is_empty() {
        return Ok(false);
    }
    show(points, summary)?;
    Ok(true)
}

#[cfg(feature = "tui")]
fn show(points: &[ThroughputPoint], summary: &ThroughputSummary) -> Result<()> {
    crate::tui::run(points, summary)
}

#[cfg(not(feature = "tui"))]
fn show(points: &[ThroughputPoint], _summary: &ThroughputSummary) -> Result<()> {
    tracing::warn!(
        points = points.len(),
        "built without the `tui` feature; skipping throughput plot"
    );
    Ok(())
}
