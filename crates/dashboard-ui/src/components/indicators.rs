use crate::themes::Theme;
use dashboard_core::formatting::{format_number, format_rating};
use ratatui::text::{Line, Span};

// ── RatingIndicator ───────────────────────────────────────────────────────────

/// A star rating rendered as five glyphs plus the numeric value.
///
/// `★★★★☆ 4.26`; stars round to the nearest whole star and a missing rating
/// renders as `☆☆☆☆☆ -`.
pub struct RatingIndicator<'a> {
    pub rating: Option<f64>,
    pub theme: &'a Theme,
}

impl<'a> RatingIndicator<'a> {
    pub fn new(rating: Option<f64>, theme: &'a Theme) -> Self {
        Self { rating, theme }
    }

    /// Number of filled stars, 0 through 5.
    pub fn stars(&self) -> usize {
        self.rating
            .map(|r| r.round().clamp(0.0, 5.0) as usize)
            .unwrap_or(0)
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = self.stars();
        let style = self.theme.rating_style(self.rating);
        Line::from(vec![
            Span::styled("★".repeat(filled), style),
            Span::styled("☆".repeat(5 - filled), self.theme.dim),
            Span::styled(format!(" {}", format_rating(self.rating)), style),
        ])
    }
}

// ── TrendIndicator ────────────────────────────────────────────────────────────

/// Change of the latest value against the previous one, as an arrow and a
/// percentage: `▲ 12.5%`, `▼ 3.0%`, `= 0.0%`.
pub struct TrendIndicator<'a> {
    pub previous: f64,
    pub current: f64,
    pub theme: &'a Theme,
}

impl<'a> TrendIndicator<'a> {
    pub fn new(previous: f64, current: f64, theme: &'a Theme) -> Self {
        Self {
            previous,
            current,
            theme,
        }
    }

    /// Relative change in percent; `None` when the previous value is zero.
    pub fn change_percent(&self) -> Option<f64> {
        (self.previous != 0.0).then(|| (self.current - self.previous) / self.previous.abs() * 100.0)
    }

    pub fn arrow(&self) -> &'static str {
        if self.current > self.previous {
            "▲"
        } else if self.current < self.previous {
            "▼"
        } else {
            "="
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let style = self.theme.trend_style(self.current - self.previous);
        let label = match self.change_percent() {
            Some(pct) => format!("{}%", format_number(pct.abs(), 1)),
            None => "new".to_string(),
        };
        Line::from(vec![
            Span::styled(self.arrow(), style),
            Span::raw(" "),
            Span::styled(label, style),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
