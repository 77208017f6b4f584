//! Free-form date expression parsing
//!
//! Turns user supplied `--date-from` / `--date-to` style expressions into
//! absolute UTC timestamps. Naive inputs are interpreted in the configured
//! timezone.

use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Naive date-time layouts tried after RFC 3339
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a date expression into an absolute timestamp
///
/// Supports, in order:
/// - "now", "today", "tomorrow", "yesterday" (day words resolve to midnight)
/// - "@1700000000" (Unix seconds)
/// - RFC 3339 ("2024-01-15T06:00:00+01:00")
/// - "2024-01-15T06:00[:00]", "2024-01-15 06:00[:00]", "2024-01-15"
/// - anything the `fuzzydate` parser understands ("next friday 6pm")
///
/// Returns `None` for empty or unparsable input.
pub fn parse_date_expression(input: &str, timezone: Tz, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    if let Some(ts) = parse_relative(&input, timezone, now) {
        debug!(input = %input, timestamp = %ts, "Parsed relative date expression");
        return Some(ts);
    }

    if let Some(ts) = parse_unix(&input) {
        return Some(ts);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&input.to_uppercase()) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(ts) = parse_naive_formats(&input, timezone) {
        debug!(input = %input, timestamp = %ts, "Parsed date format");
        return Some(ts);
    }

    // Fall back to fuzzydate, anchored at `now` in the configured zone
    match fuzzydate::aware_parse(input.as_str(), Some(now.with_timezone(&timezone)), timezone) {
        Ok(dt) => {
            let ts = dt.with_timezone(&Utc);
            debug!(input = %input, timestamp = %ts, "Parsed with fuzzydate");
            Some(ts)
        },
        Err(_) => {
            debug!(input = %input, "Failed to parse date expression");
            None
        },
    }
}

/// Resolve "now" and the day words relative to `now` in `timezone`
fn parse_relative(input: &str, timezone: Tz, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let today = now.with_timezone(&timezone).date_naive();
    let day = match input {
        "now" => return Some(now),
        "today" => today,
        "tomorrow" => today.checked_add_days(Days::new(1))?,
        "yesterday" => today.checked_sub_days(Days::new(1))?,
        _ => return None,
    };
    localize(&day.and_hms_opt(0, 0, 0)?, timezone)
}

/// Parse "@<seconds>"
fn parse_unix(input: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = input.strip_prefix('@')?.parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}

fn parse_naive_formats(input: &str, timezone: Tz) -> Option<DateTime<Utc>> {
    let input = input.to_uppercase();
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&input, format) {
            return localize(&naive, timezone);
        }
    }

    let date = NaiveDate::parse_from_str(&input, "%Y-%m-%d").ok()?;
    localize(&date.and_hms_opt(0, 0, 0)?, timezone)
}

/// Interpret a naive date-time in `timezone`, taking the earlier instant
/// when a DST fold makes it ambiguous
fn localize(naive: &NaiveDateTime, timezone: Tz) -> Option<DateTime<Utc>> {
    match timezone.from_local_datetime(naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}
