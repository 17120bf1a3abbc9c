use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Characters used to draw a [`ShareBar`].
pub struct BarConfig {
    /// Width in columns of the bar portion (excluding the label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █
            empty_char: '\u{2591}',  // ░
        }
    }
}

// ── ShareBar ──────────────────────────────────────────────────────────────────

/// Horizontal bar sized by `value / max`, followed by a text label.
///
/// Used for revenue per month, per SKU and per country, where every bar in a
/// list shares the same `max` so lengths compare directly.
pub struct ShareBar<'a> {
    pub value: f64,
    pub max: f64,
    pub label: String,
    pub style: Style,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> ShareBar<'a> {
    pub fn new(value: f64, max: f64, label: impl Into<String>, style: Style, theme: &'a Theme) -> Self {
        Self {
            value,
            max,
            label: label.into(),
            style,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.config.width = width;
        self
    }

    /// Fraction of the bar that is filled, clamped to `[0, 1]`.
    ///
    /// Negative values and a non-positive `max` draw an empty bar.
    pub fn ratio(&self) -> f64 {
        if self.max <= 0.0 || self.value <= 0.0 {
            0.0
        } else {
            (self.value / self.max).min(1.0)
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = (self.ratio() * f64::from(self.config.width)).round() as usize;
        let empty = usize::from(self.config.width).saturating_sub(filled);

        Line::from(vec![
            Span::styled(self.config.filled_char.to_string().repeat(filled), self.style),
            Span::styled(self.config.empty_char.to_string().repeat(empty), self.theme.dim),
            Span::styled(format!(" {}", self.label), self.theme.label),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_bar_quarter() {
        let theme = Theme::dark();
        let bar = ShareBar::new(25.0, 100.0, "EUR 25.00", theme.chart_revenue, &theme);
        let line = bar.to_line();

        assert_eq!(line.spans.len(), 3, "expected filled, empty, label");
        assert_eq!(line.spans[0].content.chars().count(), 10);
        assert!(line.spans[0].content.chars().all(|c| c == '█'));
        assert_eq!(line.spans[1].content.chars().count(), 30);
        assert!(line.spans[2].content.contains("EUR 25.00"));
    }

    #[test]
    fn test_share_bar_full_and_overflow() {
        let theme = Theme::dark();
        let bar = ShareBar::new(150.0, 100.0, "", theme.chart_revenue, &theme).width(20);
        let line = bar.to_line();
        assert_eq!(line.spans[0].content.chars().count(), 20);
        assert!(line.spans[1].content.is_empty());
    }

    #[test]
    fn test_share_bar_zero_max() {
        let theme = Theme::dark();
        let bar = ShareBar::new(5.0, 0.0, "x", theme.chart_revenue, &theme);
        assert_eq!(bar.ratio(), 0.0);
        assert!(bar.to_line().spans[0].content.is_empty());
    }

    #[test]
    fn test_share_bar_negative_value() {
        let theme = Theme::dark();
        let bar = ShareBar::new(-3.0, 10.0, "refund", theme.chart_revenue, &theme);
        assert_eq!(bar.ratio(), 0.0);
    }
}
