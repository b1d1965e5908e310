//! Date parsing and the display formats searched by the query filter.

use chrono::{Local, NaiveDate};

use crate::errors::LedgerError;

pub const STORAGE_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";
const SHORT_DISPLAY_FORMAT: &str = "%-m/%-d/%Y";
const LONG_FORMAT: &str = "%B %-d, %Y";
const MONTH_DAY_FORMAT: &str = "%b %-d";
const COMPACT_FORMAT: &str = "%m%d%Y";

pub fn format_date_storage(date: NaiveDate) -> String {
    date.format(STORAGE_FORMAT).to_string()
}

/// `01/15/2025`
pub fn format_date_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// `January 15, 2025`
pub fn format_date_long(date: NaiveDate) -> String {
    date.format(LONG_FORMAT).to_string()
}

pub fn parse_storage_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), STORAGE_FORMAT).ok()
}

/// Parses user input as `MM/DD/YYYY` or the slash-free `MMDDYYYY`.
pub fn parse_date(input: &str) -> Result<NaiveDate, LedgerError> {
    let trimmed = input.trim();
    let compact: String = trimmed.chars().filter(|c| *c != '/').collect();
    let parsed = if compact.len() == 8 && compact.chars().all(|c| c.is_ascii_digit()) {
        NaiveDate::parse_from_str(&compact, COMPACT_FORMAT)
    } else {
        NaiveDate::parse_from_str(trimmed, DISPLAY_FORMAT)
    };
    parsed.map_err(|_| LedgerError::InvalidDate(input.to_string()))
}

/// Today's calendar date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Calendar days in `[start, end]`, empty when `end < start`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// Tests an already-lowercased `query` against the display renderings of `date`.
/// `include_month_day` adds the short `Jan 15` form used for entry rows.
pub(crate) fn date_matches_query(date: NaiveDate, query: &str, include_month_day: bool) -> bool {
    let mut formats = vec![DISPLAY_FORMAT, SHORT_DISPLAY_FORMAT, LONG_FORMAT];
    if include_month_day {
        formats.push(MONTH_DAY_FORMAT);
    }
    formats
        .into_iter()
        .any(|fmt| date.format(fmt).to_string().to_lowercase().contains(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn parses_slashed_and_compact_input() {
        assert_eq!(parse_date("01/15/2025").unwrap(), jan_15());
        assert_eq!(parse_date("01152025").unwrap(), jan_15());
        assert_eq!(parse_date(" 1/15/2025 ").unwrap(), jan_15());
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_date("15.01.2025").expect_err("unsupported format");
        assert!(matches!(err, LedgerError::InvalidDate(ref raw) if raw == "15.01.2025"));
        assert!(parse_date("13322025").is_err());
    }

    #[test]
    fn renders_known_formats() {
        assert_eq!(format_date_storage(jan_15()), "2025-01-15");
        assert_eq!(format_date_display(jan_15()), "01/15/2025");
        assert_eq!(format_date_long(jan_15()), "January 15, 2025");
    }

    #[test]
    fn range_iteration_is_inclusive() {
        let end = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        let days: Vec<_> = days_in_range(jan_15(), end).collect();
        assert_eq!(days.len(), 3);
        assert_eq!(days_in_range(end, jan_15()).count(), 0);
    }

    #[test]
    fn month_day_form_is_optional() {
        assert!(date_matches_query(jan_15(), "jan 15", true));
        assert!(!date_matches_query(jan_15(), "jan 15", false));
        assert!(date_matches_query(jan_15(), "january", false));
    }
}
