//! Small line-level widgets shared by the dashboard views.

pub mod bar;
pub mod header;
pub mod indicators;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `text` to at most `max_width` terminal columns, marking the cut
/// with `…`.
pub fn fit_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_width_short_text_unchanged() {
        assert_eq!(fit_width("premium", 10), "premium");
    }

    #[test]
    fn test_fit_width_truncates_with_ellipsis() {
        assert_eq!(fit_width("premium_upgrade", 8), "premium…");
        assert_eq!(fit_width("premium_upgrade", 8).width(), 8);
    }

    #[test]
    fn test_fit_width_wide_chars() {
        // Each CJK char is two columns wide.
        let fitted = fit_width("日本語のレビュー", 7);
        assert!(fitted.width() <= 7, "got {fitted}");
        assert!(fitted.ends_with('…'));
    }

    #[test]
    fn test_fit_width_zero() {
        assert_eq!(fit_width("abc", 0), "");
    }
}
