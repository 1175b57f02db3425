use crate::model::{Report, ThroughputPoint};
use anyhow::{Context, Result};
use std::path::Path;

/// Write the full report as pretty-printed JSON.
pub fn export_json(path: &Path, report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write the combined per-second table as `second,time,ops`, ascending by second.
pub fn export_csv(path: &Path, points: &[ThroughputPoint]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    writer.write_record(["second", "time", "ops"])?;
    for p in points {
        writer.write_record([p.second.to_string(), p.label.clone(), p.ops.to_string()])?;
    }
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Diagnostic, ThroughputSummary, ThroughputTable};

    fn points() -> Vec<ThroughputPoint> {
        vec![
            ThroughputPoint {
                second: 1_700_000_000,
                label: "22:13:20".into(),
                ops: 2,
            },
            ThroughputPoint {
                second: 1_700_000_001,
                label: "22:13:21".into(),
                ops: 4,
            },
        ]
    }

    #[test]
    fn csv_has_header_and_one_row_per_second() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("throughput.csv");
        export_csv(&path, &points()).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            body,
            "second,time,ops\n1700000000,22:13:20,2\n1700000001,22:13:21,4\n"
        );
    }

    #[test]
    fn json_round_trips_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = Report {
            generated_at_utc: "2026-01-01T00:00:00Z".into(),
            sources: Vec::new(),
            throughput: ThroughputSummary::from_table(&ThroughputTable::new()),
            per_second: points(),
            latency: None,
            diagnostics: vec![Diagnostic::NoValidDurations],
        };
        export_json(&path, &report).unwrap();
        let back: Report = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.csv");
        assert!(export_csv(&path, &points()).is_err());
    }
}
