//! Crash, ANR and rating trend charts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset as ChartSeries, GraphType, Paragraph},
    Frame,
};

use dashboard_core::formatting::format_number;
use dashboard_core::time_utils::day_key;
use dashboard_data::aggregator::{OverviewPoint, QualityPoint};
use dashboard_data::analysis::Dataset;

use crate::components::indicators::RatingIndicator;
use crate::table_view::render_no_data;
use crate::themes::Theme;

/// `(x, y)` points over the series index, skipping missing values.
fn points<T>(series: &[T], value: impl Fn(&T) -> Option<f64>) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .filter_map(|(i, p)| value(p).map(|v| (i as f64, v)))
        .collect()
}

/// Upper y bound with a little headroom; never zero.
fn y_ceiling(series: &[&[(f64, f64)]]) -> f64 {
    let max = series
        .iter()
        .flat_map(|s| s.iter().map(|(_, y)| *y))
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        (max + max / 10.0).ceil()
    }
}

fn x_axis<'a>(dates: &[String], theme: &Theme) -> Axis<'a> {
    let first = dates.first().cloned().unwrap_or_default();
    let last = dates.last().cloned().unwrap_or_default();
    Axis::default()
        .style(theme.chart_axis)
        .bounds([0.0, dates.len().saturating_sub(1).max(1) as f64])
        .labels(vec![Span::raw(first), Span::raw(last)])
}

fn y_axis<'a>(max: f64, theme: &Theme) -> Axis<'a> {
    Axis::default()
        .style(theme.chart_axis)
        .bounds([0.0, max])
        .labels(vec![Span::raw("0"), Span::raw(format_number(max, 0))])
}

/// Render the quality tab: latest values, then crash/ANR and rating charts.
pub fn render_quality_view(frame: &mut Frame, area: Rect, dataset: &Dataset, theme: &Theme) {
    if dataset.quality.is_empty() && dataset.overview.is_empty() {
        render_no_data(frame, area, "No crash or rating reports were loaded.", theme);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Percentage(50),
            Constraint::Min(6),
        ])
        .split(area);

    render_latest(frame, chunks[0], &dataset.quality, &dataset.overview, theme);
    render_crash_chart(frame, chunks[1], &dataset.quality, theme);
    render_rating_chart(frame, chunks[2], &dataset.quality, theme);
}

fn render_latest(frame: &mut Frame, area: Rect, quality: &[QualityPoint], overview: &[OverviewPoint], theme: &Theme) {
    let mut lines = Vec::new();

    if let Some(last) = quality.last() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}  ", day_key(&last.date)), theme.label),
            Span::styled("Crashes ", theme.label),
            Span::styled(format_number(last.crashes, 0), theme.chart_crashes),
            Span::styled(format!(" (7d avg {})", format_number(last.crashes_ma7, 1)), theme.dim),
            Span::styled("   ANRs ", theme.label),
            Span::styled(format_number(last.anrs, 0), theme.chart_anrs),
            Span::styled(format!(" (7d avg {})", format_number(last.anrs_ma7, 1)), theme.dim),
        ]));

        let mut rating = vec![Span::styled("Rating (21d avg) ", theme.label)];
        rating.extend(RatingIndicator::new(last.rating_ma21, theme).to_line().spans);
        lines.push(Line::from(rating));
    }

    if let Some(last) = overview.last() {
        let mut total = vec![Span::styled("Overall rating ", theme.label)];
        total.extend(RatingIndicator::new(last.total_rating, theme).to_line().spans);
        total.push(Span::styled(
            format!("  as of {}", day_key(&last.date)),
            theme.dim,
        ));
        lines.push(Line::from(total));
    }

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Latest ")),
        area,
    );
}

fn render_crash_chart(frame: &mut Frame, area: Rect, quality: &[QualityPoint], theme: &Theme) {
    let dates: Vec<String> = quality.iter().map(|p| day_key(&p.date)).collect();
    let crashes = points(quality, |p| Some(p.crashes));
    let crashes_ma = points(quality, |p| Some(p.crashes_ma7));
    let anrs_ma = points(quality, |p| Some(p.anrs_ma7));
    let max = y_ceiling(&[crashes.as_slice(), crashes_ma.as_slice(), anrs_ma.as_slice()]);

    let series = vec![
        ChartSeries::default()
            .name("crashes")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(theme.chart_crashes)
            .data(&crashes),
        ChartSeries::default()
            .name("crashes 7d")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.chart_average)
            .data(&crashes_ma),
        ChartSeries::default()
            .name("ANRs 7d")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.chart_anrs)
            .data(&anrs_ma),
    ];

    let chart = Chart::new(series)
        .block(Block::default().borders(Borders::ALL).title(" Crashes & ANRs "))
        .x_axis(x_axis(&dates, theme))
        .y_axis(y_axis(max, theme));
    frame.render_widget(chart, area);
}

fn render_rating_chart(frame: &mut Frame, area: Rect, quality: &[QualityPoint], theme: &Theme) {
    let dates: Vec<String> = quality.iter().map(|p| day_key(&p.date)).collect();
    let daily = points(quality, |p| p.rating);
    let average = points(quality, |p| p.rating_ma21);

    let series = vec![
        ChartSeries::default()
            .name("rating")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(theme.chart_rating)
            .data(&daily),
        ChartSeries::default()
            .name("rating 21d")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.chart_average)
            .data(&average),
    ];

    let chart = Chart::new(series)
        .block(Block::default().borders(Borders::ALL).title(" Average Rating "))
        .x_axis(x_axis(&dates, theme))
        .y_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([1.0, 5.0])
                .labels(vec![Span::raw("1"), Span::raw("3"), Span::raw("5")]),
        );
    frame.render_widget(chart, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{buffer_text, sample_dataset};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_points_skip_missing() {
        let values = [Some(1.0), None, Some(3.0)];
        assert_eq!(points(&values, |v| *v), vec![(0.0, 1.0), (2.0, 3.0)]);
    }

    #[test]
    fn test_y_ceiling() {
        let empty: Vec<(f64, f64)> = Vec::new();
        assert_eq!(y_ceiling(&[empty.as_slice()]), 1.0);

        let crashes = vec![(0.0, 10.0)];
        let anrs = vec![(1.0, 4.0)];
        assert_eq!(y_ceiling(&[crashes.as_slice(), anrs.as_slice()]), 11.0);
    }

    #[test]
    fn test_render_quality_view() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let dataset = sample_dataset();

        terminal
            .draw(|frame| render_quality_view(frame, frame.area(), &dataset, &theme))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Crashes & ANRs"), "chart title missing:\n{text}");
        assert!(text.contains("Average Rating"));
        assert!(text.contains("2024-01-02"), "latest date missing:\n{text}");
        assert!(text.contains("Overall rating"));
    }

    #[test]
    fn test_render_quality_view_empty() {
        let backend = TestBackend::new(80, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let mut dataset = sample_dataset();
        dataset.quality.clear();
        dataset.overview.clear();

        terminal
            .draw(|frame| render_quality_view(frame, frame.area(), &dataset, &theme))
            .unwrap();

        assert!(buffer_text(terminal.backend().buffer()).contains("No data to display"));
    }
}
