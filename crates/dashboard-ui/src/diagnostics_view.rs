//! What the last load read, skipped and could not resolve.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use dashboard_core::formatting::{format_count, format_number};
use dashboard_data::analysis::{Dataset, Diagnostics};

use crate::themes::Theme;

/// Lines describing the load: counts, skipped files and unresolved
/// currencies.
pub fn diagnostics_lines<'a>(diagnostics: &Diagnostics, theme: &Theme) -> Vec<Line<'a>> {
    let count = |label: &'static str, value: usize| {
        Line::from(vec![
            Span::styled(format!("{:<30}", label), theme.label),
            Span::styled(format_count(value as u64), theme.value),
        ])
    };

    let mut lines = vec![
        count("Files read", diagnostics.files_read),
        count("Files skipped", diagnostics.skipped_files.len()),
        count("Rows for other products", diagnostics.foreign_product_rows),
        count("Non-charge rows dropped", diagnostics.filtered_rows),
        count("Rows without a valid date", diagnostics.missing_date_rows),
        Line::from(""),
    ];

    if !diagnostics.files_by_kind.is_empty() {
        lines.push(Line::from(Span::styled("Reports by kind", theme.table_header)));
        for (kind, n) in &diagnostics.files_by_kind {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<28}", kind.to_string()), theme.label),
                Span::styled(n.to_string(), theme.value),
            ]));
        }
        lines.push(Line::from(""));
    }

    if diagnostics.unresolved_currencies.is_empty() {
        lines.push(Line::from(Span::styled(
            "All buyer currencies have a conversion rate.",
            theme.success,
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("No conversion rate for: ", theme.warning),
            Span::styled(diagnostics.unresolved_currencies.join(", "), theme.value),
        ]));
    }

    if !diagnostics.skipped_files.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Skipped files", theme.table_header)));
        for skipped in &diagnostics.skipped_files {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}", skipped.path.display()), theme.warning),
                Span::styled(format!("  {}", skipped.reason), theme.dim),
            ]));
        }
    }

    lines
}

pub fn render_diagnostics_view(frame: &mut Frame, area: Rect, dataset: &Dataset, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(30)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Text::from(diagnostics_lines(&dataset.diagnostics, theme)))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Diagnostics ")),
        chunks[0],
    );

    let rates: Vec<Line> = if dataset.currency_rates.is_empty() {
        vec![Line::from(Span::styled("No explicit rates found", theme.dim))]
    } else {
        dataset
            .currency_rates
            .iter()
            .map(|(currency, rate)| {
                Line::from(vec![
                    Span::styled(format!("{:<6}", currency), theme.label),
                    Span::styled(format_number(rate, 4), theme.value),
                ])
            })
            .collect()
    };
    frame.render_widget(
        Paragraph::new(Text::from(rates))
            .block(Block::default().borders(Borders::ALL).title(" Mean Rates ")),
        chunks[1],
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
