use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::trace;

// ── DateParser ────────────────────────────────────────────────────────────────

/// Parses calendar dates from the variety of formats found in store exports.
pub struct DateParser;

impl DateParser {
    /// Date-only patterns.
    const DATE_FORMATS: &'static [&'static str] = &[
        "%Y-%m-%d",
        "%b %d, %Y",
        "%B %d, %Y",
        "%m/%d/%Y",
        "%d.%m.%Y",
    ];

    /// Date-time patterns; only the date part is kept.
    const DATETIME_FORMATS: &'static [&'static str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%b %d, %Y %I:%M:%S %p",
        "%b %d, %Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];

    /// Attempt to parse `value` into a [`NaiveDate`].
    ///
    /// Handles ISO dates, `"Jan 5, 2024"` style dates with or without a
    /// time and trailing time-zone abbreviation (`"PDT"`), US slash dates,
    /// dotted European dates and compact `YYYYMMDD`.  Returns `None` for
    /// anything else; callers treat that as a missing value.
    pub fn parse(value: &str) -> Option<NaiveDate> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }

        let s = strip_zone_suffix(trimmed);

        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            let year = s[0..4].parse().ok()?;
            let month = s[4..6].parse().ok()?;
            let day = s[6..8].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        for fmt in Self::DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
        }
        for fmt in Self::DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }

        trace!("DateParser: could not parse date \"{}\"", value);
        None
    }
}

/// Drop a trailing time-zone abbreviation such as `" PST"` or `" UTC+1"`.
fn strip_zone_suffix(s: &str) -> &str {
    static ZONE: OnceLock<Regex> = OnceLock::new();
    let re = ZONE.get_or_init(|| {
        Regex::new(r"\s+(?:[A-Z]{3,5}|UTC[+-]\d{1,2})$").expect("valid zone regex")
    });
    match re.find(s) {
        Some(m) => &s[..m.start()],
        None => s,
    }
}

// ── NumberParser ──────────────────────────────────────────────────────────────

/// Coerces free-form numeric cells into `f64`.
pub struct NumberParser;

impl NumberParser {
    /// Markers the exports use for "no value".
    const MISSING: &'static [&'static str] = &["", "NA", "N/A", "NaN", "nan", "-", "null"];

    /// Parse `value` as a finite number.
    ///
    /// Thousands separators are removed when the value also carries a decimal
    /// point or consists of well-formed `,ddd` groups.  Anything else that is
    /// not a finite float yields `None`.
    pub fn parse(value: &str) -> Option<f64> {
        let s = value.trim();
        if Self::MISSING.contains(&s) {
            return None;
        }

        if let Ok(n) = s.parse::<f64>() {
            return n.is_finite().then_some(n);
        }

        if s.contains(',') && (s.contains('.') || is_grouped_integer(s)) {
            let cleaned: String = s.chars().filter(|c| *c != ',').collect();
            if let Ok(n) = cleaned.parse::<f64>() {
                return n.is_finite().then_some(n);
            }
        }

        None
    }
}

/// `true` for strings like `"1,234"` or `"-12,345,678"`.
fn is_grouped_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split(',');
    let Some(first) = groups.next() else {
        return false;
    };
    if first.is_empty() || first.len() > 3 || !first.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
