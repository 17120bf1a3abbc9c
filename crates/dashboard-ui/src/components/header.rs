use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Application title shown on the first header line.
pub const TITLE: &str = "APP STORE REPORT DASHBOARD";

/// Dashboard header, three lines:
///
/// 1. Title.
/// 2. A `=` separator as wide as the title block.
/// 3. `[ product | N files | currency ]`.
pub struct Header<'a> {
    pub product_id: &'a str,
    /// Exports that contributed to the dataset.
    pub files: usize,
    /// Merchant currency label.
    pub currency: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(product_id: &'a str, files: usize, currency: &'a str, theme: &'a Theme) -> Self {
        Self {
            product_id,
            files,
            currency,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let files_label = if self.files == 1 {
            "1 file".to_string()
        } else {
            format!("{} files", self.files)
        };

        vec![
            Line::from(Span::styled(format!("▌{}", TITLE), self.theme.header)),
            Line::from(Span::styled("=".repeat(TITLE.len() + 1), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.product_id, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(files_label, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.currency.to_uppercase(), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
