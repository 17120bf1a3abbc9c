use chrono::{Datelike, NaiveDate};

/// Calendar month key of `date` in `"%Y-%m"` form, e.g. `"2024-01"`.
pub fn month_key(date: &NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Day key of `date` in `"%Y-%m-%d"` form.
pub fn day_key(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `"%Y-%m"` month key back into the first day of that month.
pub fn parse_month_key(key: &str) -> Option<NaiveDate> {
    let (year, month) = key.trim().split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Short human label for a month key, e.g. `"Jan 2024"`.
///
/// Falls back to the key itself when it is not a valid month.
pub fn month_label(key: &str) -> String {
    match parse_month_key(key) {
        Some(date) => format!("{} {}", date.format("%b"), date.year()),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(month_key(&date), "2024-01");
    }

    #[test]
    fn test_day_key() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        assert_eq!(day_key(&date), "2024-12-05");
    }

    #[test]
    fn test_parse_month_key() {
        assert_eq!(
            parse_month_key("2023-11"),
            NaiveDate::from_ymd_opt(2023, 11, 1)
        );
        assert_eq!(parse_month_key("2023-13"), None);
        assert_eq!(parse_month_key("garbage"), None);
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label("2024-02"), "Feb 2024");
        assert_eq!(month_label("n/a"), "n/a");
    }
}
