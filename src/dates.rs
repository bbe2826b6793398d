//! Date normalization for issue records
//!
//! Comicvine returns dates either as ISO strings (store dates) or as loose
//! "Month Year" text (cover dates). Both are normalized to DD-MM-YYYY; a
//! cover date with no known day is pinned to the 1st.

use chrono::{Datelike, NaiveDate};

use crate::record::NA;

/// Normalize a cover date to `DD-MM-YYYY` with the day forced to 01.
///
/// Accepts `YYYY-MM-DD` or `"Month Year"` (e.g. "March 2023"). Anything else
/// yields the `"N/A"` sentinel instead of an error.
pub fn normalize_cover_date(raw: &str) -> String {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let pinned = date.with_day(1).unwrap_or(date);
        return pinned.format("%d-%m-%Y").to_string();
    }

    // "March 2023" -> parse as "01 March 2023"
    if let Ok(date) = NaiveDate::parse_from_str(&format!("01 {}", raw.trim()), "%d %B %Y") {
        return date.format("%d-%m-%Y").to_string();
    }

    NA.to_string()
}

/// Normalize an in-store date (`YYYY-MM-DD`) to `DD-MM-YYYY`.
pub fn normalize_store_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|_| NA.to_string())
}
