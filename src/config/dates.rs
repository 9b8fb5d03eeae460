//! Resolution of `period_from` / `period_to` expressions

use crate::error::{Error, Result};
use crate::types::{parse_timestamp, truncate_to_millis};
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// `N unit(s) ago`, e.g. `2 days ago`, `1 week ago`
static RELATIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s+(minute|hour|day|week|month|year)s?\s+ago$")
        .expect("relative date pattern is valid")
});

/// Resolve a date expression against a reference instant
///
/// Accepts `now`, `today`, `yesterday`, `N <unit>s ago`, an ISO date
/// (`2024-01-31`, start of day UTC) or an RFC 3339 datetime.
pub fn resolve_date(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let text = input.trim();
    let lower = text.to_ascii_lowercase();

    let resolved = match lower.as_str() {
        "now" => Some(now),
        "today" => Some(start_of_day(now)),
        "yesterday" => Some(start_of_day(now - Duration::days(1))),
        _ => None,
    };
    if let Some(ts) = resolved {
        return Ok(truncate_to_millis(ts));
    }

    if let Some(captures) = RELATIVE_REGEX.captures(&lower) {
        let amount: u32 = captures[1]
            .parse()
            .map_err(|_| invalid(input, "amount is too large"))?;
        return relative(now, amount, &captures[2])
            .map(truncate_to_millis)
            .ok_or_else(|| invalid(input, "date is out of range"));
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    parse_timestamp(text)
        .map(truncate_to_millis)
        .ok_or_else(|| {
            invalid(
                input,
                "expected now, today, yesterday, 'N days ago', YYYY-MM-DD or an RFC 3339 datetime",
            )
        })
}

fn relative(now: DateTime<Utc>, amount: u32, unit: &str) -> Option<DateTime<Utc>> {
    let amount_i64 = i64::from(amount);
    match unit {
        "minute" => now.checked_sub_signed(Duration::try_minutes(amount_i64)?),
        "hour" => now.checked_sub_signed(Duration::try_hours(amount_i64)?),
        "day" => now.checked_sub_signed(Duration::try_days(amount_i64)?),
        "week" => now.checked_sub_signed(Duration::try_weeks(amount_i64)?),
        "month" => now.checked_sub_months(Months::new(amount)),
        "year" => now.checked_sub_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}

fn start_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn invalid(input: &str, message: &str) -> Error {
    Error::Other(format!("Unrecognized date '{input}': {message}"))
}
