//! Text summary builder for CLI output.
//!
//! Formats the throughput and latency blocks as human-readable lines for text mode.

use crate::analysis::Analysis;
use crate::model::{Diagnostic, PercentileSet, ThroughputSummary};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build the full text report: stage diagnostics, then throughput, then latency.
pub(crate) fn build_text_summary(analysis: &Analysis) -> TextSummary {
    let mut lines: Vec<String> = analysis
        .diagnostics
        .iter()
        .map(Diagnostic::to_message)
        .collect();
    push_throughput_lines(&mut lines, &analysis.throughput);
    push_latency_lines(&mut lines, analysis.latency.as_ref());
    TextSummary { lines }
}

fn push_throughput_lines(lines: &mut Vec<String>, summary: &ThroughputSummary) {
    lines.push(String::new());
    lines.push("[Average Combined Throughput]".to_string());
    lines.push(format!("Total Operations: {}", summary.total_ops));
    lines.push(format!("Total Time Tracked: {} seconds", summary.total_seconds));
    lines.push(format!(
        "Average Throughput: {:.2} ops/sec",
        summary.avg_ops_per_sec
    ));
}

/// Latency block, or the single "no valid durations" notice when there is nothing to report.
fn push_latency_lines(lines: &mut Vec<String>, latency: Option<&PercentileSet>) {
    let Some(set) = latency else {
        lines.push(Diagnostic::NoValidDurations.to_message());
        return;
    };
    lines.push(String::new());
    lines.push("[Latency Percentile Distribution (Combined SET + GET)]".to_string());
    for v in &set.values {
        lines.push(format!("{}th Percentile: {:.6} ms", v.percentile, v.value_ms));
    }
}
