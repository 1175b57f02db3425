use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Per-second operation counts, keyed by whole epoch second.
pub type ThroughputTable = BTreeMap<i64, u64>;

/// Which measurement file a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    Set,
    Get,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Set => "SET",
            OpKind::Get => "GET",
        }
    }
}

/// One observed operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub timestamp_seconds: f64,
    pub duration_ms: f64,
}

/// A CSV row that could not be turned into a `Measurement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub path: PathBuf,
    /// 1-based line number in the file, header included.
    pub line: u64,
    pub fields: Vec<String>,
    pub reason: String,
}

/// Reader output: parallel sequences in file order plus the rows that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Samples {
    pub timestamps: Vec<f64>,
    pub durations: Vec<f64>,
    pub rejected: Vec<RejectedRow>,
}

impl Samples {
    pub fn push(&mut self, m: Measurement) {
        self.timestamps.push(m.timestamp_seconds);
        self.durations.push(m.duration_ms);
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

/// Latency value at a single percentile rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub percentile: f64,
    pub value_ms: f64,
}

/// The fixed percentile cut points over the combined SET + GET durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileSet {
    pub sample_count: usize,
    pub values: Vec<PercentileValue>,
}

#[cfg(test)]
impl PercentileSet {
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.percentile == percentile)
            .map(|v| v.value_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSummary {
    pub total_ops: u64,
    pub total_seconds: u64,
    pub avg_ops_per_sec: f64,
}

/// One bucket of the combined table, prepared for rendering and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputPoint {
    pub second: i64,
    pub label: String,
    pub ops: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub kind: OpKind,
    pub path: PathBuf,
    pub valid_rows: usize,
    pub rejected_rows: usize,
}

/// Everything a run produces, in a serializable shape for `--json` and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at_utc: String,
    pub sources: Vec<SourceSummary>,
    pub throughput: ThroughputSummary,
    pub per_second: Vec<ThroughputPoint>,
    pub latency: Option<PercentileSet>,
    /// Skipped rows and empty-stage notices, in pipeline order.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Non-fatal conditions surfaced to the user while the pipeline runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    InvalidRow(RejectedRow),
    NoValidTimestamps { kind: OpKind },
    NoValidDurations,
    NoThroughputData,
}

impl Diagnostic {
    /// Render a human-readable message for the console.
    pub fn to_message(&self) -> String {
        match self {
            Diagnostic::InvalidRow(row) => format!(
                "Invalid data row: {} line {}: [{}] ({})",
                row.path.display(),
                row.line,
                row.fields.join(", "),
                row.reason
            ),
            Diagnostic::NoValidTimestamps { kind } => {
                format!("No valid timestamps found ({}).", kind.as_str())
            }
            Diagnostic::NoValidDurations => {
                "No valid durations found for percentile calculation.".to_string()
            }
            Diagnostic::NoThroughputData => "No throughput data to plot.".to_string(),
        }
    }
}
