//! Common types used throughout the extractor
//!
//! Shared type aliases, small enums and timestamp helpers used across
//! multiple modules.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single extracted record, fields kept in server order
pub type Record = JsonObject;

/// A page worth of records, handed to the caller as one unit
pub type Batch = Vec<Record>;

// ============================================================================
// Log Level
// ============================================================================

/// Log level for runner messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

// ============================================================================
// Timestamps
// ============================================================================

/// Format a timestamp as ISO-8601 with millisecond precision (`2024-01-31T10:00:00.000Z`)
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp as sent by the API
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Drop everything below millisecond precision
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_millis() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 31, 10, 0, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-31T10:00:00.000Z");
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-01-31T10:00:00.123Z").unwrap();
        assert_eq!(ts.timestamp_millis() % 1000, 123);

        let offset = parse_timestamp("2024-01-31T12:00:00+02:00").unwrap();
        assert_eq!(format_timestamp(&offset), "2024-01-31T10:00:00.000Z");

        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_truncate_to_millis() {
        let ts = parse_timestamp("2024-01-31T10:00:00.123456Z").unwrap();
        assert_eq!(format_timestamp(&truncate_to_millis(ts)), "2024-01-31T10:00:00.123Z");
        assert_eq!(truncate_to_millis(ts).timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_log_level_serde() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"WARN\"");
    }
}
