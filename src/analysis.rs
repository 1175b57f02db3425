//! The read → aggregate → combine → summarize pipeline.
//!
//! Presentation layers (text, JSON, plot) consume an [`Analysis`]; nothing here prints.

use crate::metrics;
use crate::model::{
    Diagnostic, OpKind, PercentileSet, Report, Samples, SourceSummary, ThroughputPoint,
    ThroughputSummary, ThroughputTable,
};
use crate::plot;
use crate::reader;
use crate::throughput;
use anyhow::Result;
use std::path::{Path, PathBuf};
use time::UtcOffset;

/// One input file after reading and per-second aggregation.
#[derive(Debug, Clone)]
pub(crate) struct SourceData {
    pub kind: OpKind,
    pub path: PathBuf,
    pub samples: Samples,
    pub table: ThroughputTable,
}

impl SourceData {
    fn summary(&self) -> SourceSummary {
        SourceSummary {
            kind: self.kind,
            path: self.path.clone(),
            valid_rows: self.samples.len(),
            rejected_rows: self.samples.rejected.len(),
        }
    }
}

/// Result of running the whole pipeline over the SET and GET files.
#[derive(Debug, Clone)]
pub(crate) struct Analysis {
    pub set: SourceData,
    pub get: SourceData,
    pub throughput: ThroughputSummary,
    pub points: Vec<ThroughputPoint>,
    pub latency: Option<PercentileSet>,
    /// Invalid rows and empty-stage notices from reading and aggregation, in pipeline order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    /// Stage diagnostics plus the latency notice, for outputs that have no latency block.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.diagnostics.clone();
        if self.latency.is_none() {
            all.push(Diagnostic::NoValidDurations);
        }
        all
    }

    pub fn to_report(&self, generated_at_utc: String) -> Report {
        Report {
            generated_at_utc,
            sources: vec![self.set.summary(), self.get.summary()],
            throughput: self.throughput,
            per_second: self.points.clone(),
            latency: self.latency.clone(),
            diagnostics: self.all_diagnostics(),
        }
    }
}

/// Run the pipeline from files on disk. Fails only if a file cannot be read at all.
pub(crate) fn run_analysis(set_path: &Path, get_path: &Path, offset: UtcOffset) -> Result<Analysis> {
    let set_samples = reader::read_durations_with_timestamps(set_path)?;
    let get_samples = reader::read_durations_with_timestamps(get_path)?;
    Ok(analyze(
        (set_path.to_path_buf(), set_samples),
        (get_path.to_path_buf(), get_samples),
        offset,
    ))
}

/// Aggregate already-read samples.
pub(crate) fn analyze(
    set: (PathBuf, Samples),
    get: (PathBuf, Samples),
    offset: UtcOffset,
) -> Analysis {
    let mut diagnostics: Vec<Diagnostic> = set
        .1
        .rejected
        .iter()
        .chain(get.1.rejected.iter())
        .cloned()
        .map(Diagnostic::InvalidRow)
        .collect();

    let set = aggregate_source(OpKind::Set, set, &mut diagnostics);
    let get = aggregate_source(OpKind::Get, get, &mut diagnostics);

    let combined = throughput::combine(&set.table, &get.table);
    let throughput = ThroughputSummary::from_table(&combined);
    let points = plot::throughput_series(&combined, offset);

    let combined_durations: Vec<f64> = set
        .samples
        .durations
        .iter()
        .chain(get.samples.durations.iter())
        .copied()
        .collect();
    let latency = metrics::compute_percentiles(&combined_durations);

    tracing::debug!(
        seconds = throughput.total_seconds,
        ops = throughput.total_ops,
        durations = combined_durations.len(),
        "aggregated measurements"
    );

    Analysis {
        set,
        get,
        throughput,
        points,
        latency,
        diagnostics,
    }
}

fn aggregate_source(
    kind: OpKind,
    (path, samples): (PathBuf, Samples),
    diagnostics: &mut Vec<Diagnostic>,
) -> SourceData {
    if samples.is_empty() {
        diagnostics.push(Diagnostic::NoValidTimestamps { kind });
    }
    let table = throughput::calculate_throughput_over_time(&samples.timestamps);
    SourceData {
        kind,
        path,
        samples,
        table,
    }
}
