//! Field parsing for raw inspection rows.
//!
//! The export writes `MM/DD/YYYY` dates, but re-saved copies of the dataset
//! routinely carry ISO dates or full timestamps, so several layouts are
//! accepted.

use chrono::{NaiveDate, NaiveDateTime};

/// Date-only layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Timestamp layouts, tried in order. Only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Parses an inspection date. Returns `None` for blank or unrecognized
/// input.
#[must_use]
pub fn parse_inspection_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.date());
        }
    }
    None
}

/// Coerces a score to a finite number. `NaN`, infinities and
/// non-numeric text are all treated as missing.
#[must_use]
pub fn parse_score(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Trims a text field, mapping blank values to `None`.
#[must_use]
pub fn clean_text(s: Option<&str>) -> Option<String> {
    let trimmed = s?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
