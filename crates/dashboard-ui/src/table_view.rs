//! Revenue and SKU table views.
//!
//! Each renders a bordered [`ratatui::widgets::Table`] with one row per month
//! and an inline bar scaled to the busiest month, plus a highlighted totals
//! row at the bottom.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dashboard_core::formatting::{format_amount, format_count};
use dashboard_core::time_utils::month_label;
use dashboard_data::aggregator::{MonthlySales, SkuMonthlySales};
use dashboard_data::analysis::Dataset;

use crate::components::bar::ShareBar;
use crate::components::fit_width;
use crate::components::indicators::TrendIndicator;
use crate::themes::Theme;

/// Width of the SKU list column.
const SKU_LIST_WIDTH: u16 = 28;
/// Width in columns of the inline revenue bars.
const BAR_WIDTH: u16 = 30;

/// One month row shared by the revenue and SKU tables.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRow {
    pub month: String,
    pub transactions: u64,
    pub amount: f64,
}

impl From<&MonthlySales> for MonthRow {
    fn from(m: &MonthlySales) -> Self {
        Self {
            month: m.month.clone(),
            transactions: m.transactions,
            amount: m.amount,
        }
    }
}

impl From<&SkuMonthlySales> for MonthRow {
    fn from(m: &SkuMonthlySales) -> Self {
        Self {
            month: m.month.clone(),
            transactions: m.transactions,
            amount: m.amount,
        }
    }
}

/// Render the monthly revenue tab: a summary line over the month table.
pub fn render_revenue_view(frame: &mut Frame, area: Rect, dataset: &Dataset, currency: &str, theme: &Theme) {
    if dataset.monthly_sales.is_empty() {
        render_no_data(frame, area, "No sales in the loaded reports.", theme);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let mut summary = vec![
        Span::styled("Revenue: ", theme.label),
        Span::styled(format_amount(dataset.total_amount(), currency), theme.value),
        Span::styled("   Transactions: ", theme.label),
        Span::styled(format_count(dataset.total_transactions()), theme.value),
    ];
    if let [.., previous, latest] = dataset.monthly_sales.as_slice() {
        summary.push(Span::styled(
            format!("   {} vs {}: ", month_label(&latest.month), month_label(&previous.month)),
            theme.label,
        ));
        summary.extend(TrendIndicator::new(previous.amount, latest.amount, theme).to_line().spans);
    }
    frame.render_widget(
        Paragraph::new(Line::from(summary))
            .block(Block::default().borders(Borders::ALL).title(" Summary ")),
        chunks[0],
    );

    let rows: Vec<MonthRow> = dataset.monthly_sales.iter().map(MonthRow::from).collect();
    render_month_table(frame, chunks[1], " Monthly Revenue ", &rows, currency, theme);
}

/// Render the SKU tab: the SKU list on the left, the selected SKU's
/// zero-filled monthly series on the right.
pub fn render_sku_view(
    frame: &mut Frame,
    area: Rect,
    dataset: &Dataset,
    selected: usize,
    currency: &str,
    theme: &Theme,
) {
    if dataset.skus.is_empty() {
        render_no_data(frame, area, "No SKU sales in the loaded reports.", theme);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SKU_LIST_WIDTH), Constraint::Min(20)])
        .split(area);

    let selected = selected.min(dataset.skus.len() - 1);
    let label_width = usize::from(SKU_LIST_WIDTH.saturating_sub(4));
    let items: Vec<Line> = dataset
        .skus
        .iter()
        .enumerate()
        .map(|(i, sku)| {
            let label = fit_width(sku, label_width);
            if i == selected {
                Line::from(Span::styled(format!("› {}", label), theme.table_selected))
            } else {
                Line::from(Span::styled(format!("  {}", label), theme.row_style(i)))
            }
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Text::from(items))
            .block(Block::default().borders(Borders::ALL).title(" SKUs (↑/↓) ")),
        chunks[0],
    );

    let sku = &dataset.skus[selected];
    let rows: Vec<MonthRow> = dataset.sku_series(sku).iter().map(MonthRow::from).collect();
    render_month_table(frame, chunks[1], &format!(" {} ", sku), &rows, currency, theme);
}

/// Month table with inline bars and a totals row.
pub fn render_month_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[MonthRow],
    currency: &str,
    theme: &Theme,
) {
    let header = Row::new(
        ["Month", "Transactions", "Revenue", ""]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let max = rows.iter().map(|r| r.amount).fold(0.0_f64, f64::max);
    let mut table_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let bar = ShareBar::new(row.amount, max, "", theme.chart_revenue, theme).width(BAR_WIDTH);
            Row::new(vec![
                Cell::from(month_label(&row.month)),
                Cell::from(format_count(row.transactions)),
                Cell::from(format_amount(row.amount, currency)),
                Cell::from(bar.to_line()),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let total_amount: f64 = rows.iter().map(|r| r.amount).sum();
    let total_transactions: u64 = rows.iter().map(|r| r.transactions).sum();
    table_rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(format_count(total_transactions)),
            Cell::from(format_amount(total_amount, currency)),
            Cell::from(format!("{} months", rows.len())),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Min(BAR_WIDTH + 2),
    ];

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title.to_string()),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder shown when a tab has nothing to display.
pub fn render_no_data(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data to display", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.dim)),
        Line::from(Span::styled(
            "Check the data directory or press 'r' to reload.",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
