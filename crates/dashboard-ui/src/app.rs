//! Application state and the terminal event loop.
//!
//! [`App`] owns the theme, the current [`Dataset`] and the navigation state.
//! Views are derived from the dataset on every draw; a reload replaces the
//! dataset wholesale.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span, Text},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use tracing::{info, warn};

use dashboard_data::analysis::Dataset;

use crate::components::header::Header;
use crate::country_view::{self, CountryScope};
use crate::diagnostics_view;
use crate::quality_view;
use crate::table_view;
use crate::themes::Theme;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Top-level dashboard tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Revenue,
    Skus,
    Quality,
    Countries,
    Diagnostics,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Revenue,
        Tab::Skus,
        Tab::Quality,
        Tab::Countries,
        Tab::Diagnostics,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Revenue => "Revenue",
            Tab::Skus => "SKUs",
            Tab::Quality => "Quality",
            Tab::Countries => "Countries",
            Tab::Diagnostics => "Diagnostics",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── AppAction ─────────────────────────────────────────────────────────────────

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Reload,
    Quit,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    pub dataset: Dataset,
    /// Merchant currency label used when formatting amounts.
    pub currency: String,
    pub tab: Tab,
    /// Index into `dataset.skus` on the SKU tab.
    pub selected_sku: usize,
    pub country_scope: CountryScope,
    /// One-line message shown in the footer, e.g. after a failed reload.
    pub status: Option<String>,
}

impl App {
    pub fn new(dataset: Dataset, theme_name: &str, currency: impl Into<String>) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            dataset,
            currency: currency.into(),
            tab: Tab::Revenue,
            selected_sku: 0,
            country_scope: CountryScope::default(),
            status: None,
        }
    }

    /// Swap in a freshly built dataset, keeping navigation where possible.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        let previous_sku = self.dataset.skus.get(self.selected_sku).cloned();
        self.dataset = dataset;
        self.selected_sku = previous_sku
            .and_then(|sku| self.dataset.skus.iter().position(|s| *s == sku))
            .unwrap_or(0);
    }

    /// Apply one key press to the navigation state.
    ///
    /// `q`/`Q`/`Ctrl+C` quit, `r` asks for a reload, `Tab`/`→` and
    /// `Shift+Tab`/`←` cycle tabs, `1`–`5` jump to a tab, `↑`/`↓` move the SKU
    /// selection and `e` toggles the emerging-markets view.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return AppAction::Quit
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => return AppAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => return AppAction::Reload,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.tab = self.tab.previous(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.tab = Tab::ALL[idx];
            }
            KeyCode::Down | KeyCode::Char('j') if self.tab == Tab::Skus => {
                if self.selected_sku + 1 < self.dataset.skus.len() {
                    self.selected_sku += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') if self.tab == Tab::Skus => {
                self.selected_sku = self.selected_sku.saturating_sub(1);
            }
            KeyCode::Char('e') if self.tab == Tab::Countries => {
                self.country_scope = self.country_scope.toggle();
            }
            _ => {}
        }
        AppAction::Continue
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until the user quits.
    ///
    /// `reload` is called on `r`; a failure keeps the current dataset and
    /// shows the error in the footer.
    pub fn run<F>(mut self, mut reload: F) -> io::Result<()>
    where
        F: FnMut() -> dashboard_core::Result<Dataset>,
    {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => break Err(e),
            }

            let key = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
                Ok(_) => continue,
                Err(e) => break Err(e),
            };

            match self.handle_key(key) {
                AppAction::Quit => break Ok(()),
                AppAction::Reload => match reload() {
                    Ok(dataset) => {
                        info!("Reloaded dataset");
                        self.replace_dataset(dataset);
                        self.status = Some("Reloaded".to_string());
                    }
                    Err(e) => {
                        warn!("Reload failed: {}", e);
                        self.status = Some(format!("Reload failed: {}", e));
                    }
                },
                AppAction::Continue => {}
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Draw the header, tab bar, active tab and footer into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let files = self
            .dataset
            .diagnostics
            .files_read
            .saturating_sub(self.dataset.diagnostics.skipped_files.len());
        let header = Header::new(&self.dataset.product_id, files, &self.currency, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), chunks[0]);

        let titles: Vec<Line> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider(Span::styled(" | ", self.theme.separator));
        frame.render_widget(tabs, chunks[1]);

        let body = chunks[2];
        let theme = &self.theme;
        match self.tab {
            Tab::Revenue => table_view::render_revenue_view(frame, body, &self.dataset, &self.currency, theme),
            Tab::Skus => table_view::render_sku_view(
                frame,
                body,
                &self.dataset,
                self.selected_sku,
                &self.currency,
                theme,
            ),
            Tab::Quality => quality_view::render_quality_view(frame, body, &self.dataset, theme),
            Tab::Countries => country_view::render_country_view(
                frame,
                body,
                &self.dataset,
                self.country_scope,
                &self.currency,
                theme,
            ),
            Tab::Diagnostics => diagnostics_view::render_diagnostics_view(frame, body, &self.dataset, theme),
        }

        let mut footer = vec![Span::styled(
            "q quit  r reload  ←/→ tabs  ↑/↓ SKU  e emerging",
            self.theme.dim,
        )];
        if let Some(status) = &self.status {
            footer.push(Span::styled(format!("   {}", status), self.theme.info));
        } else if self.dataset.diagnostics.has_warnings() {
            footer.push(Span::styled("   see Diagnostics (5)", self.theme.warning));
        }
        frame.render_widget(Paragraph::new(Line::from(footer)), chunks[3]);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
