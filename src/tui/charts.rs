use crate::report::{ALLOCATED_LABEL, ChartSeries, USED_LABEL};
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Rect, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Colors cycled through when a chart has a single dataset.
const GROUP_PALETTE: [Color; 6] = [
    Color::Blue,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];

fn dataset_color(label: &str, index: usize) -> Color {
    match label {
        ALLOCATED_LABEL => Color::Blue,
        USED_LABEL => Color::Red,
        _ => GROUP_PALETTE[index % GROUP_PALETTE.len()],
    }
}

/// Bar heights are whole units; negative values draw as empty bars.
fn bar_value(value: Decimal) -> u64 {
    value.round().to_u64().unwrap_or(0)
}

/// Short label printed above a bar, e.g. `12.5K`.
pub fn compact_amount(value: Decimal) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= Decimal::new(1_000_000, 0) {
        (value / Decimal::new(1_000_000, 0), "M")
    } else if abs >= Decimal::new(1_000, 0) {
        (value / Decimal::new(1_000, 0), "K")
    } else {
        (value, "")
    };
    format!("{}{}", scaled.round_dp(1).normalize(), suffix)
}

fn build_groups(series: &ChartSeries) -> Vec<BarGroup<'static>> {
    let single = series.datasets.len() == 1;
    series
        .labels
        .iter()
        .enumerate()
        .map(|(group_idx, label)| {
            let bars: Vec<Bar> = series
                .datasets
                .iter()
                .enumerate()
                .map(|(dataset_idx, dataset)| {
                    let value = dataset.values.get(group_idx).copied().unwrap_or(Decimal::ZERO);
                    let color = if single {
                        GROUP_PALETTE[group_idx % GROUP_PALETTE.len()]
                    } else {
                        dataset_color(&dataset.label, dataset_idx)
                    };
                    Bar::default()
                        .value(bar_value(value))
                        .text_value(compact_amount(value))
                        .style(Style::default().fg(color))
                        .value_style(Style::default().fg(Color::White).bg(color))
                })
                .collect();
            BarGroup::default().label(Line::from(label.clone())).bars(&bars)
        })
        .collect()
}

fn legend(series: &ChartSeries) -> Line<'static> {
    if series.datasets.len() == 1 {
        return Line::from(Span::styled(
            series.datasets[0].label.clone(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let mut spans = Vec::new();
    for (idx, dataset) in series.datasets.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled("■ ", Style::default().fg(dataset_color(&dataset.label, idx))));
        spans.push(Span::raw(dataset.label.clone()));
    }
    Line::from(spans)
}

pub fn render_chart(frame: &mut ratatui::Frame, area: Rect, series: &ChartSeries) {
    let block = Block::default().title(series.title.clone()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if series.is_empty() {
        frame.render_widget(
            Paragraph::new("No data yet")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(inner);
    frame.render_widget(Paragraph::new(legend(series)), chunks[0]);

    // Fit the groups into the available width, at least one cell per bar.
    let bars = series.labels.len() * series.datasets.len().max(1);
    let gaps = series.labels.len().saturating_sub(1) * 2;
    let available = (chunks[1].width as usize).saturating_sub(gaps);
    let bar_width = (available / bars.max(1)).clamp(1, 9) as u16;

    let mut chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(0)
        .group_gap(2);
    for group in build_groups(series) {
        chart = chart.data(group);
    }
    frame.render_widget(chart, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Dataset;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn series(labels: &[&str], datasets: Vec<Dataset>) -> ChartSeries {
        ChartSeries {
            title: "Chart".to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            datasets,
        }
    }

    fn dataset(label: &str, values: &[i64]) -> Dataset {
        Dataset {
            label: label.to_string(),
            values: values.iter().map(|v| Decimal::new(*v, 0)).collect(),
        }
    }

    #[test]
    fn test_compact_amount() {
        assert_eq!(compact_amount(Decimal::new(950, 0)), "950");
        assert_eq!(compact_amount(Decimal::new(12_500, 0)), "12.5K");
        assert_eq!(compact_amount(Decimal::new(3_000_000, 0)), "3M");
        assert_eq!(compact_amount(Decimal::new(-2_000, 0)), "-2K");
    }

    #[test]
    fn test_bar_value_clamps_negative() {
        assert_eq!(bar_value(Decimal::new(-50, 0)), 0);
        assert_eq!(bar_value(Decimal::new(1004, 1)), 100);
        assert_eq!(bar_value(Decimal::new(1017, 1)), 102);
    }

    #[test]
    fn test_group_per_label() {
        let chart = series(
            &["A", "B", "C"],
            vec![dataset(ALLOCATED_LABEL, &[1, 2, 3]), dataset(USED_LABEL, &[0, 1, 2])],
        );
        assert_eq!(build_groups(&chart).len(), 3);
        assert_eq!(dataset_color(ALLOCATED_LABEL, 0), Color::Blue);
        assert_eq!(dataset_color(USED_LABEL, 1), Color::Red);
    }

    #[test]
    fn test_render_empty_and_filled_chart() {
        let backend = TestBackend::new(40, 12);
        let mut terminal = Terminal::new(backend).unwrap();

        let empty = series(&[], vec![dataset(ALLOCATED_LABEL, &[]), dataset(USED_LABEL, &[])]);
        terminal
            .draw(|frame| render_chart(frame, frame.area(), &empty))
            .unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("No data yet"));

        let filled = series(&["Allocated", "Used"], vec![dataset("Total budget", &[1000, 400])]);
        terminal
            .draw(|frame| render_chart(frame, frame.area(), &filled))
            .unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Total budget"));
        assert!(!text.contains("No data yet"));
    }
}
