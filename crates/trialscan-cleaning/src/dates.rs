//! Date normalization for registry exports
//!
//! Enrollment dates in the ICTRP export mix four numeric layouts and free
//! text. The layout is decided from the leading characters; values that fit
//! no layout are parsed best-effort and become `None` on failure.

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref YEAR_FIRST_SLASH: Regex = Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap();
    static ref DAY_FIRST_SLASH: Regex = Regex::new(r"^\d{2}/\d{2}/\d{4}").unwrap();
    static ref YEAR_FIRST_DASH: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap();
    static ref DAY_FIRST_DASH: Regex = Regex::new(r"^\d{2}-\d{2}-\d{4}").unwrap();
    static ref MONTH_YEAR: Regex = Regex::new(r"^(\p{L}+),?\s+(\d{4})$").unwrap();
    static ref NUMERIC_YEAR_MONTH: Regex = Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap();
}

/// Free-text layouts, tried in order
const TEXT_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%B %d,%Y",
    "%d-%B-%Y",
];

/// Best-effort layouts for anything else, tried before the text layouts.
/// Day and month may be unpadded.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y%m%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
];

/// Parse a raw enrollment date.
///
/// Shapes: `YYYY/MM/DD`, `DD/MM/YYYY`, `YYYY-MM-DD`, `DD-MM-YYYY`, or free
/// text beginning with a letter ("April 1, 2020", "1 April 2020",
/// "April 2020").
pub fn enrollment_dates(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    let first = value.chars().next()?;

    if first.is_alphabetic() {
        return parse_free_text(value);
    }

    let shaped = [
        (&*YEAR_FIRST_SLASH, "%Y/%m/%d"),
        (&*DAY_FIRST_SLASH, "%d/%m/%Y"),
        (&*YEAR_FIRST_DASH, "%Y-%m-%d"),
        (&*DAY_FIRST_DASH, "%d-%m-%Y"),
    ];
    for (shape, format) in shaped {
        if let Some(m) = shape.find(value) {
            return NaiveDate::parse_from_str(m.as_str(), format).ok();
        }
    }

    parse_fallback(value)
}

fn parse_free_text(value: &str) -> Option<NaiveDate> {
    let cleaned = value.replace('.', "");

    // Month and year only: first of the month
    if let Some(cap) = MONTH_YEAR.captures(&cleaned) {
        let day_first = format!("1 {} {}", &cap[1], &cap[2]);
        return NaiveDate::parse_from_str(&day_first, "%d %B %Y").ok();
    }

    TEXT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}

fn parse_fallback(value: &str) -> Option<NaiveDate> {
    for format in FALLBACK_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    // Year and month only: first of the month
    if let Some(cap) = NUMERIC_YEAR_MONTH.captures(value) {
        let year = cap[1].parse().ok()?;
        let month = cap[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    // Day-first text such as "1 April 2020"
    let parsed = parse_free_text(value);
    if parsed.is_none() {
        tracing::debug!("Unparseable date coerced to null: {:?}", value);
    }
    parsed
}

/// Parse the ICTRP `Date registration3` column (`YYYYMMDD`)
pub fn parse_registration_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").ok()
}

/// A date cell that may already have been parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Missing,
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Text(String),
}

/// Reduce a date cell to a calendar date.
///
/// Text is returned unchanged, timestamps lose their time of day.
pub fn fix_date(value: DateValue) -> DateValue {
    match value {
        DateValue::Timestamp(ts) => DateValue::Date(ts.date()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_and_day_first_disambiguate() {
        assert_eq!(enrollment_dates("2020-04-01"), Some(date(2020, 4, 1)));
        assert_eq!(enrollment_dates("01-04-2020"), Some(date(2020, 4, 1)));
    }

    #[test]
    fn test_slash_layouts() {
        assert_eq!(enrollment_dates("2020/03/15"), Some(date(2020, 3, 15)));
        assert_eq!(enrollment_dates("15/03/2020"), Some(date(2020, 3, 15)));
    }

    #[test]
    fn test_trailing_time_ignored() {
        assert_eq!(
            enrollment_dates("2020-02-01 00:00:00"),
            Some(date(2020, 2, 1))
        );
    }

    #[test]
    fn test_free_text() {
        assert_eq!(enrollment_dates("April 1, 2020"), Some(date(2020, 4, 1)));
        assert_eq!(enrollment_dates("1 April 2020"), Some(date(2020, 4, 1)));
        assert_eq!(enrollment_dates("April 2020"), Some(date(2020, 4, 1)));
    }

    #[test]
    fn test_fallback_and_null() {
        assert_eq!(enrollment_dates("20200401"), Some(date(2020, 4, 1)));
        assert_eq!(enrollment_dates("2020-4-1"), Some(date(2020, 4, 1)));
        assert_eq!(enrollment_dates("2020-04"), Some(date(2020, 4, 1)));
        assert_eq!(enrollment_dates("2020-13"), None);
        assert_eq!(enrollment_dates("not a date 99"), None);
        assert_eq!(enrollment_dates("31/02/2020"), None);
        assert_eq!(enrollment_dates(""), None);
        assert_eq!(enrollment_dates("??"), None);
    }

    #[test]
    fn test_registration_date() {
        assert_eq!(parse_registration_date("20200310"), Some(date(2020, 3, 10)));
        assert_eq!(parse_registration_date("2020-03-10"), None);
    }

    #[test]
    fn test_fix_date() {
        let ts = date(2020, 4, 1).and_hms_opt(13, 30, 0).unwrap();
        assert_eq!(fix_date(DateValue::Timestamp(ts)), DateValue::Date(date(2020, 4, 1)));
        assert_eq!(
            fix_date(DateValue::Text("pending".to_string())),
            DateValue::Text("pending".to_string())
        );
        assert_eq!(fix_date(DateValue::Date(date(2020, 4, 1))), DateValue::Date(date(2020, 4, 1)));
        assert_eq!(fix_date(DateValue::Missing), DateValue::Missing);
    }
}
