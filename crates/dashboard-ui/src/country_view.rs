//! Per-country sales and ratings table.

use ratatui::{
    layout::{Constraint, Rect},
    text::Line,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use dashboard_core::formatting::{format_amount, format_count, format_rating};
use dashboard_data::aggregator::CountryStats;
use dashboard_data::analysis::Dataset;

use crate::components::bar::ShareBar;
use crate::components::fit_width;
use crate::table_view::render_no_data;
use crate::themes::Theme;

const NAME_WIDTH: usize = 24;

/// Which slice of the country rollup is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountryScope {
    /// Every country, sorted by code.
    #[default]
    All,
    /// Buying countries outside the home market, busiest first.
    Emerging,
}

impl CountryScope {
    pub fn toggle(self) -> Self {
        match self {
            Self::All => Self::Emerging,
            Self::Emerging => Self::All,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::All => " All Countries ('e' for emerging markets) ",
            Self::Emerging => " Emerging Markets ('e' for all countries) ",
        }
    }

    /// The rows of `dataset` this scope shows.
    pub fn rows(self, dataset: &Dataset) -> &[CountryStats] {
        match self {
            Self::All => &dataset.countries,
            Self::Emerging => &dataset.emerging_markets,
        }
    }
}

pub fn render_country_view(
    frame: &mut Frame,
    area: Rect,
    dataset: &Dataset,
    scope: CountryScope,
    currency: &str,
    theme: &Theme,
) {
    let countries = scope.rows(dataset);
    if countries.is_empty() {
        render_no_data(frame, area, "No country data for this view.", theme);
        return;
    }

    let header = Row::new(
        ["Code", "Country", "Transactions", "Revenue", "Daily", "Total", ""]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    );

    let max = countries.iter().map(|c| c.transactions as f64).fold(0.0_f64, f64::max);
    let rows: Vec<Row> = countries
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let share = ShareBar::new(c.transactions as f64, max, "", theme.chart_revenue, theme).width(16);
            Row::new(vec![
                Cell::from(c.country.clone()),
                Cell::from(fit_width(&c.name, NAME_WIDTH)),
                Cell::from(format_count(c.transactions)),
                Cell::from(format_amount(c.amount, currency)),
                Cell::from(Line::styled(
                    format_rating(c.latest_daily_rating),
                    theme.rating_style(c.latest_daily_rating),
                )),
                Cell::from(Line::styled(
                    format_rating(c.latest_total_rating),
                    theme.rating_style(c.latest_total_rating),
                )),
                Cell::from(share.to_line()),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(NAME_WIDTH as u16 + 1),
        Constraint::Length(13),
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Min(18),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(scope.title()),
        )
        .style(theme.text);
    frame.render_widget(table, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{buffer_text, sample_dataset};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_scope_toggle() {
        assert_eq!(CountryScope::default(), CountryScope::All);
        assert_eq!(CountryScope::All.toggle(), CountryScope::Emerging);
        assert_eq!(CountryScope::Emerging.toggle(), CountryScope::All);
    }

    #[test]
    fn test_render_all_countries() {
        let backend = TestBackend::new(120, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let dataset = sample_dataset();

        terminal
            .draw(|frame| render_country_view(frame, frame.area(), &dataset, CountryScope::All, "EUR", &theme))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Netherlands"), "missing NL:\n{text}");
        assert!(text.contains("United States"));
        assert!(text.contains("All Countries"));
    }

    #[test]
    fn test_render_emerging_markets_hides_us() {
        let backend = TestBackend::new(120, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let dataset = sample_dataset();

        terminal
            .draw(|frame| {
                render_country_view(frame, frame.area(), &dataset, CountryScope::Emerging, "EUR", &theme)
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Emerging Markets"));
        assert!(text.contains("Brazil"));
        assert!(!text.contains("United States"), "US must not show:\n{text}");
    }
}
