//! Timestamp text format shared by every table.
//!
//! Timestamps are stored as RFC 3339 with exactly six fractional digits and a
//! `Z` suffix (`2025-03-01T09:30:00.000000Z`). The fixed width makes lexical
//! `ORDER BY` and `<` comparisons in SQL agree with chronological order.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};

/// Current instant, truncated to the stored precision so a value survives a
/// format/parse round trip unchanged.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse stored timestamp text.
///
/// Accepts RFC 3339 (any offset), plus the naive `YYYY-MM-DD HH:MM:SS` form
/// SQLite's `CURRENT_TIMESTAMP` writes, which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
