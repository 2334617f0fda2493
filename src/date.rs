//! Calendar-date extraction from post timestamps.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Parse an ISO-8601 style timestamp and keep only its calendar date.
///
/// Offsets are honored as written: `2021-02-24T23:30:00-05:00` is 2021-02-24, not the
/// UTC date. Accepts RFC 3339 (`Z` or numeric offset, optional fraction), naive
/// `YYYY-MM-DDTHH:MM:SS` (or with a space) and a bare `YYYY-MM-DD`.
pub fn parse_post_date(raw: &str) -> Option<Date> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt.date());
    }
    if let Ok(dt) = PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]")) {
        return Some(dt.date());
    }
    if let Ok(dt) = PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")) {
        return Some(dt.date());
    }
    Date::parse(s, format_description!("[year]-[month]-[day]")).ok()
}

/// `YYYY-MM-DD` rendering used for output.
pub fn format_date(d: Date) -> String {
    d.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| d.to_string())
}
