use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use super::help::draw_help;
use super::PlotView;

const LINE_COLOR: Color = Color::LightRed;
const GRID_COLOR: Color = Color::DarkGray;
const GRID_DIVISIONS: usize = 4;

pub fn draw(area: Rect, f: &mut Frame, view: &PlotView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1)].as_ref())
        .split(area);

    draw_throughput_chart(rows[0], f, view);
    f.render_widget(
        Paragraph::new(footer_line(view)).alignment(Alignment::Center),
        rows[1],
    );

    if view.show_help {
        let popup = centered(area, 44, 9);
        f.render_widget(Clear, popup);
        draw_help(popup, f);
    }
}

fn draw_throughput_chart(area: Rect, f: &mut Frame, view: &PlotView) {
    let x_max = view.x_max();

    // Horizontal reference lines across the plot.
    let grid: Vec<[(f64, f64); 2]> = (1..GRID_DIVISIONS)
        .map(|i| {
            let y = view.y_max * i as f64 / GRID_DIVISIONS as f64;
            [(0.0, y), (x_max, y)]
        })
        .collect();

    let mut datasets: Vec<Dataset> = grid
        .iter()
        .map(|segment| {
            Dataset::default()
                .graph_type(GraphType::Line)
                .marker(symbols::Marker::Dot)
                .style(Style::default().fg(GRID_COLOR))
                .data(segment)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .name("Ops/sec")
            .graph_type(GraphType::Line)
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(LINE_COLOR))
            .data(&view.data),
    );
    // Point markers on top of the line.
    datasets.push(
        Dataset::default()
            .graph_type(GraphType::Scatter)
            .marker(symbols::Marker::Block)
            .style(Style::default().fg(Color::Yellow))
            .data(&view.data),
    );

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let x_axis = Axis::default()
        .title(Span::styled("Time (HH:MM:SS)", bold))
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_max])
        .labels(x_labels(&view.labels));
    let y_axis = Axis::default()
        .title(Span::styled("Operations per Second", bold))
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, view.y_max])
        .labels(vec![
            "0".to_string(),
            format!("{:.0}", view.y_max / 2.0),
            format!("{:.0}", view.y_max),
        ]);

    let title = Line::from(Span::styled(
        "System Throughput Over Time (SET + GET)",
        bold,
    ))
    .alignment(Alignment::Center);

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));
    f.render_widget(chart, area);
}

/// First, middle and last time labels; the axis spreads them evenly.
fn x_labels(labels: &[String]) -> Vec<String> {
    match labels.len() {
        0 => Vec::new(),
        1 | 2 => labels.to_vec(),
        n => vec![
            labels[0].clone(),
            labels[n / 2].clone(),
            labels[n - 1].clone(),
        ],
    }
}

fn footer_line(view: &PlotView) -> Line<'static> {
    let s = &view.summary;
    Line::from(vec![
        Span::styled(
            format!(
                "{} ops / {} s / avg {:.2} ops/sec",
                s.total_ops, s.total_seconds, s.avg_ops_per_sec
            ),
            Style::default().fg(LINE_COLOR),
        ),
        Span::raw("   "),
        Span::styled("q", Style::default().fg(Color::Magenta)),
        Span::raw(" quit  "),
        Span::styled("?", Style::default().fg(Color::Magenta)),
        Span::raw(" help"),
    ])
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("00:00:{i:02}")).collect()
    }

    #[test]
    fn picks_first_middle_last_labels() {
        assert_eq!(x_labels(&labels(5)), vec!["00:00:00", "00:00:02", "00:00:04"]);
        assert_eq!(x_labels(&labels(2)), labels(2));
        assert!(x_labels(&[]).is_empty());
    }

    #[test]
    fn popup_is_clamped_to_area() {
        let area = Rect::new(0, 0, 20, 5);
        let popup = centered(area, 44, 9);
        assert_eq!(popup, Rect::new(0, 0, 20, 5));
        let popup = centered(Rect::new(0, 0, 100, 40), 44, 9);
        assert_eq!(popup, Rect::new(28, 15, 44, 9));
    }
}
