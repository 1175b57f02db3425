mod charts;
mod help;

use crate::model::{ThroughputPoint, ThroughputSummary};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};

/// Everything the chart needs, precomputed once so redraws only lay out widgets.
pub(crate) struct PlotView {
    /// (x, y) with x the categorical position of each second.
    pub data: Vec<(f64, f64)>,
    pub labels: Vec<String>,
    pub summary: ThroughputSummary,
    pub y_max: f64,
    pub show_help: bool,
}

impl PlotView {
    pub fn new(points: &[ThroughputPoint], summary: &ThroughputSummary) -> Self {
        let data: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.ops as f64))
            .collect();
        let y_max = (max_y(&data) * 1.10).max(1.0);
        Self {
            data,
            labels: points.iter().map(|p| p.label.clone()).collect(),
            summary: *summary,
            y_max,
            show_help: false,
        }
    }

    /// Upper x bound; a single point still gets a non-degenerate axis.
    pub fn x_max(&self) -> f64 {
        (self.data.len().saturating_sub(1) as f64).max(1.0)
    }
}

/// Show the throughput chart full-screen until the user quits.
pub fn run(points: &[ThroughputPoint], summary: &ThroughputSummary) -> Result<()> {
    let mut view = PlotView::new(points, summary);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let res = Terminal::new(CrosstermBackend::new(stdout))
        .context("create terminal")
        .and_then(|mut terminal| {
            terminal.clear().ok();
            event_loop(&mut terminal, &mut view)
        });

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, view: &mut PlotView) -> Result<()> {
    loop {
        terminal
            .draw(|f| charts::draw(f.area(), f, view))
            .context("draw throughput chart")?;

        // Block on input with a timeout so resizes are picked up by the next draw.
        if !event::poll(Duration::from_millis(250)).context("poll terminal events")? {
            continue;
        }
        if let Event::Key(k) = event::read().context("read terminal event")? {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            match (k.modifiers, k.code) {
                (_, KeyCode::Char('q'))
                | (_, KeyCode::Esc)
                | (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Ok(()),
                (_, KeyCode::Char('?')) => view.show_help = !view.show_help,
                _ => {}
            }
        }
    }
}

fn max_y(points: &[(f64, f64)]) -> f64 {
    points.iter().map(|(_, y)| *y).fold(0.0, |a, b| a.max(b))
}
