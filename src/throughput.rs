//! Per-second throughput aggregation.

use crate::model::{ThroughputSummary, ThroughputTable};

/// Count operations per whole second; fractional timestamps truncate toward zero.
pub fn calculate_throughput_over_time(timestamps: &[f64]) -> ThroughputTable {
    let mut table = ThroughputTable::new();
    for &ts in timestamps {
        *table.entry(ts.trunc() as i64).or_insert(0) += 1;
    }
    table
}

/// Sum two per-second tables over the union of their seconds.
pub fn combine(set: &ThroughputTable, get: &ThroughputTable) -> ThroughputTable {
    let mut combined = set.clone();
    for (&second, &ops) in get {
        *combined.entry(second).or_insert(0) += ops;
    }
    combined
}

impl ThroughputSummary {
    /// Totals and average over the tracked seconds; the average is 0 for an empty table.
    pub fn from_table(table: &ThroughputTable) -> Self {
        let total_ops: u64 = table.values().sum();
        let total_seconds = table.len() as u64;
        let avg_ops_per_sec = if total_seconds > 0 {
            total_ops as f64 / total_seconds as f64
        } else {
            0.0
        };
        Self {
            total_ops,
            total_seconds,
            avg_ops_per_sec,
        }
    }
}
