use crate::analysis::{self, Analysis};
use crate::model::{Diagnostic, Report};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{LineWriter, Stderr, Stdout, Write};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Output line routing for stdout/stderr.
#[derive(Debug, Clone, PartialEq)]
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Line-buffered console shared by every output mode.
struct Console {
    out: LineWriter<Stdout>,
    err: LineWriter<Stderr>,
}

impl Console {
    fn new() -> Self {
        Self {
            out: LineWriter::new(std::io::stdout()),
            err: LineWriter::new(std::io::stderr()),
        }
    }

    fn send(&mut self, line: OutputLine) {
        let _ = match line {
            OutputLine::Stdout(msg) => writeln!(self.out, "{}", msg),
            OutputLine::Stderr(msg) => writeln!(self.err, "{}", msg),
        };
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "latency-throughput-report",
    version,
    about = "Per-second throughput and latency percentiles from SET/GET duration CSVs"
)]
pub struct Cli {
    /// CSV of SET measurements (columns Duration_ms, Timestamp_ms)
    #[arg(long, default_value = "top_set_durations.csv")]
    pub set_file: PathBuf,

    /// CSV of GET measurements (columns Duration_ms, Timestamp_ms)
    #[arg(long, default_value = "top_get_durations.csv")]
    pub get_file: PathBuf,

    /// Print the text report and exit (no plot)
    #[arg(long, conflicts_with = "json")]
    pub text: bool,

    /// Print the report as JSON and exit (no plot); diagnostics go to stderr
    #[arg(long)]
    pub json: bool,

    /// Export the report as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Export the combined per-second throughput table as CSV
    #[arg(long)]
    pub export_csv: Option<PathBuf>,
}

pub fn run(args: Cli) -> Result<()> {
    // Read before anything else could spawn a thread.
    let offset = crate::plot::local_offset();
    let analysis = analysis::run_analysis(&args.set_file, &args.get_file, offset)?;
    let report = analysis.to_report(now_rfc3339());
    let mut console = Console::new();

    if args.json {
        for line in json_output(&analysis, &report)? {
            console.send(line);
        }
        handle_exports(&args, &analysis, &report, &mut console)?;
        console.flush();
        return Ok(());
    }

    let summary = crate::text_summary::build_text_summary(&analysis);
    for line in summary.lines {
        console.send(OutputLine::Stdout(line));
    }
    handle_exports(&args, &analysis, &report, &mut console)?;
    console.flush();

    if args.text {
        return Ok(());
    }

    if !crate::plot::plot_throughput(&analysis.points, &analysis.throughput)? {
        console.send(OutputLine::Stdout(Diagnostic::NoThroughputData.to_message()));
    }
    console.flush();
    Ok(())
}

/// JSON mode keeps stdout parseable: the report is the only stdout line, diagnostics go to stderr.
fn json_output(analysis: &Analysis, report: &Report) -> Result<Vec<OutputLine>> {
    let mut lines: Vec<OutputLine> = analysis
        .all_diagnostics()
        .iter()
        .map(|d| OutputLine::Stderr(d.to_message()))
        .collect();
    let out = serde_json::to_string_pretty(report).context("serialize report")?;
    lines.push(OutputLine::Stdout(out));
    Ok(lines)
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Handle export operations (JSON and CSV) for every output mode.
fn handle_exports(
    args: &Cli,
    analysis: &Analysis,
    report: &Report,
    console: &mut Console,
) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        crate::export::export_json(p, report).context("export JSON report")?;
        console.send(OutputLine::Stderr(format!("Exported JSON: {}", p.display())));
    }
    if let Some(p) = args.export_csv.as_deref() {
        crate::export::export_csv(p, &analysis.points).context("export CSV table")?;
        console.send(OutputLine::Stderr(format!("Exported CSV: {}", p.display())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn defaults_match_the_conventional_file_names() {
        let args = Cli::try_parse_from(["latency-throughput-report"]).unwrap();
        assert_eq!(args.set_file, PathBuf::from("top_set_durations.csv"));
        assert_eq!(args.get_file, PathBuf::from("top_get_durations.csv"));
        assert!(!args.text && !args.json);
        assert!(args.export_csv.is_none() && args.export_json.is_none());
    }

    #[test]
    fn text_and_json_conflict() {
        assert!(Cli::try_parse_from(["latency-throughput-report", "--text", "--json"]).is_err());
    }

    #[test]
    fn text_mode_runs_end_to_end_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let set_file = dir.path().join("set.csv");
        let get_file = dir.path().join("get.csv");
        std::fs::write(&set_file, "Duration_ms,Timestamp_ms\n1.0,1000\n2.0,1500\n").unwrap();
        std::fs::write(&get_file, "Duration_ms,Timestamp_ms\n3.0,2100\n").unwrap();
        let csv_out = dir.path().join("out.csv");
        let json_out = dir.path().join("out.json");

        let argv: Vec<OsString> = vec![
            "latency-throughput-report".into(),
            "--text".into(),
            "--set-file".into(),
            set_file.into(),
            "--get-file".into(),
            get_file.into(),
            "--export-csv".into(),
            csv_out.clone().into(),
            "--export-json".into(),
            json_out.clone().into(),
        ];
        let args = Cli::try_parse_from(argv).unwrap();
        run(args).unwrap();

        let table = std::fs::read_to_string(&csv_out).unwrap();
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("1,") && rows[1].ends_with(",2"));
        assert!(rows[2].starts_with("2,") && rows[2].ends_with(",1"));

        let report: Report =
            serde_json::from_str(&std::fs::read_to_string(&json_out).unwrap()).unwrap();
        assert_eq!(report.throughput.total_ops, 3);
        assert_eq!(report.latency.unwrap().sample_count, 3);
    }

    #[test]
    fn json_mode_sends_diagnostics_to_stderr_only() {
        let dir = tempfile::tempdir().unwrap();
        let set_file = dir.path().join("top_set_durations.csv");
        let get_file = dir.path().join("top_get_durations.csv");
        std::fs::write(&set_file, "Duration_ms,Timestamp_ms\n1.5,1000\nx,1\n").unwrap();
        std::fs::write(&get_file, "Duration_ms,Timestamp_ms\n").unwrap();

        let analysis =
            analysis::run_analysis(&set_file, &get_file, time::UtcOffset::UTC).unwrap();
        let report = analysis.to_report(now_rfc3339());
        let lines = json_output(&analysis, &report).unwrap();

        let stdout: Vec<&String> = lines
            .iter()
            .filter_map(|l| match l {
                OutputLine::Stdout(s) => Some(s),
                OutputLine::Stderr(_) => None,
            })
            .collect();
        let stderr: Vec<&String> = lines
            .iter()
            .filter_map(|l| match l {
                OutputLine::Stderr(s) => Some(s),
                OutputLine::Stdout(_) => None,
            })
            .collect();

        assert_eq!(stdout.len(), 1);
        let parsed: Report = serde_json::from_str(stdout[0]).unwrap();
        assert_eq!(parsed, report);
        assert_eq!(parsed.diagnostics.len(), 2);

        assert_eq!(stderr.len(), 2);
        assert!(stderr[0].starts_with("Invalid data row"));
        assert!(stderr[0].contains("line 3"));
        assert!(stderr[0].contains("[x, 1]"));
        assert_eq!(stderr[1], "No valid timestamps found (GET).");
    }

    #[test]
    fn json_mode_reports_missing_durations_once() {
        let dir = tempfile::tempdir().unwrap();
        let set_file = dir.path().join("set.csv");
        let get_file = dir.path().join("get.csv");
        std::fs::write(&set_file, "Duration_ms,Timestamp_ms\n").unwrap();
        std::fs::write(&get_file, "Duration_ms,Timestamp_ms\n").unwrap();

        let analysis =
            analysis::run_analysis(&set_file, &get_file, time::UtcOffset::UTC).unwrap();
        let lines = json_output(&analysis, &analysis.to_report(now_rfc3339())).unwrap();
        let notice = OutputLine::Stderr(Diagnostic::NoValidDurations.to_message());
        assert_eq!(lines.iter().filter(|l| **l == notice).count(), 1);
        assert!(matches!(lines.last(), Some(OutputLine::Stdout(_))));
    }

    #[test]
    fn missing_input_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let args = Cli {
            set_file: dir.path().join("absent.csv"),
            get_file: dir.path().join("absent.csv"),
            text: true,
            json: false,
            export_json: None,
            export_csv: None,
        };
        let err = run(args).unwrap_err();
        assert!(format!("{err:#}").contains("absent.csv"));
    }
}
