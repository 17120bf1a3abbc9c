use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect the terminal background from `COLORFGBG` (`"fg;bg"`).
///
/// Background values 0–6 are dark, 7–15 light.  A missing or unparseable
/// variable yields `Unknown`.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|val| val.split(';').next_back().and_then(|bg| bg.parse::<u8>().ok()))
        .map_or(BackgroundType::Unknown, |bg| {
            if bg <= 6 {
                BackgroundType::Dark
            } else {
                BackgroundType::Light
            }
        })
}

/// Every style the dashboard widgets draw with.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header & tabs ────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    /// Revenue bars and sparklines.
    pub chart_revenue: Style,
    pub chart_crashes: Style,
    pub chart_anrs: Style,
    pub chart_rating: Style,
    /// Moving-average overlays.
    pub chart_average: Style,
    pub chart_axis: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,
    pub table_selected: Style,
}

impl Theme {
    /// Dark-background theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),
            tab_active: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            tab_inactive: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            chart_revenue: Style::default().fg(Color::Green),
            chart_crashes: Style::default().fg(Color::Red),
            chart_anrs: Style::default().fg(Color::Magenta),
            chart_rating: Style::default().fg(Color::Yellow),
            chart_average: Style::default().fg(Color::Cyan),
            chart_axis: Style::default().fg(Color::DarkGray),

            table_header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            table_selected: Style::default().fg(Color::Black).bg(Color::Cyan),
        }
    }

    /// Light-background theme with dark text and saturated accents.
    pub fn light() -> Self {
        Self {
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),
            tab_active: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            tab_inactive: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            chart_revenue: Style::default().fg(Color::Green),
            chart_crashes: Style::default().fg(Color::Red),
            chart_anrs: Style::default().fg(Color::Magenta),
            chart_rating: Style::default().fg(Color::Blue),
            chart_average: Style::default().fg(Color::DarkGray),
            chart_axis: Style::default().fg(Color::Gray),

            table_header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            table_selected: Style::default().fg(Color::White).bg(Color::Blue),
        }
    }

    /// Basic 8-colour ANSI palette, no bold.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),
            tab_active: Style::default().fg(Color::Yellow).add_modifier(Modifier::REVERSED),
            tab_inactive: Style::default().fg(Color::White),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            chart_revenue: Style::default().fg(Color::Green),
            chart_crashes: Style::default().fg(Color::Red),
            chart_anrs: Style::default().fg(Color::Magenta),
            chart_rating: Style::default().fg(Color::Yellow),
            chart_average: Style::default().fg(Color::White),
            chart_axis: Style::default().fg(Color::DarkGray),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default().fg(Color::Yellow),
            table_selected: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Pick light or dark from the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name; unknown names auto-detect.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Style for a star rating.
    ///
    /// * `≥ 4.0` → `success`
    /// * `≥ 3.0` → `warning`
    /// * below   → `error`
    /// * missing → `dim`
    pub fn rating_style(&self, rating: Option<f64>) -> Style {
        match rating {
            Some(r) if r >= 4.0 => self.success,
            Some(r) if r >= 3.0 => self.warning,
            Some(_) => self.error,
            None => self.dim,
        }
    }

    /// Style for a month-over-month change: up is good, down is bad.
    pub fn trend_style(&self, delta: f64) -> Style {
        if delta > 0.0 {
            self.success
        } else if delta < 0.0 {
            self.error
        } else {
            self.dim
        }
    }

    /// Alternating row style for zebra-striped tables.
    pub fn row_style(&self, index: usize) -> Style {
        if index % 2 == 0 {
            self.table_row
        } else {
            self.table_row_alt
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.chart_revenue.fg, Some(Color::Green));
        assert_eq!(t.chart_crashes.fg, Some(Color::Red));
        assert_eq!(t.table_selected.bg, Some(Color::Cyan));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.table_row.fg, Some(Color::Black));
    }

    #[test]
    fn test_classic_theme_has_no_bold() {
        let t = Theme::classic();
        assert!(!t.header.add_modifier.contains(Modifier::BOLD));
        assert!(!t.value.add_modifier.contains(Modifier::BOLD));
        assert!(!t.table_total.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        assert!(!Theme::from_name("classic")
            .header
            .add_modifier
            .contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("does-not-exist");
        assert!(t.header.fg.is_some());
    }

    #[test]
    fn test_rating_style_thresholds() {
        let t = Theme::dark();
        assert_eq!(t.rating_style(Some(4.6)).fg, Some(Color::Green));
        assert_eq!(t.rating_style(Some(4.0)).fg, Some(Color::Green));
        assert_eq!(t.rating_style(Some(3.5)).fg, Some(Color::Yellow));
        assert_eq!(t.rating_style(Some(2.1)).fg, Some(Color::Red));
        assert_eq!(t.rating_style(None).fg, Some(Color::DarkGray));
    }

    #[test]
    fn test_trend_style() {
        let t = Theme::dark();
        assert_eq!(t.trend_style(12.0).fg, Some(Color::Green));
        assert_eq!(t.trend_style(-0.5).fg, Some(Color::Red));
        assert_eq!(t.trend_style(0.0).fg, Some(Color::DarkGray));
    }

    #[test]
    fn test_row_style_alternates() {
        let t = Theme::dark();
        assert_eq!(t.row_style(0), t.table_row);
        assert_eq!(t.row_style(1), t.table_row_alt);
        assert_eq!(t.row_style(2), t.table_row);
    }
}
