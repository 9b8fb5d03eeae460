//! Pagination types
//!
//! Configuration, the date window, server-side constraints and the page
//! envelope returned by the API.

use crate::types::{format_timestamp, truncate_to_millis, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field every record carries its modification time in
pub const MODIFIED_DATE_FIELD: &str = "Modified Date";

/// Largest page the API hands out
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Fixed settings for one extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Records per page
    pub limit: u32,
    /// Field the server sorts by
    pub sort_field: String,
    /// Field holding each record's modification timestamp
    pub modified_field: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            sort_field: MODIFIED_DATE_FIELD.to_string(),
            modified_field: MODIFIED_DATE_FIELD.to_string(),
        }
    }
}

impl PaginationConfig {
    /// Create the default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size, clamped to `1..=DEFAULT_PAGE_LIMIT`
    ///
    /// The API serves at most [`DEFAULT_PAGE_LIMIT`] records per page.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, DEFAULT_PAGE_LIMIT);
        self
    }
}

// ============================================================================
// Date Window
// ============================================================================

/// Modification-date bounds applied to the query
///
/// `since` is always held at millisecond precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl DateWindow {
    /// Create a window from optional bounds
    pub fn new(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        Self {
            since: since.map(truncate_to_millis),
            until,
        }
    }

    /// A window without bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Lower bound (exclusive)
    pub fn since(&self) -> Option<DateTime<Utc>> {
        self.since
    }

    /// Upper bound (exclusive)
    pub fn until(&self) -> Option<DateTime<Utc>> {
        self.until
    }

    /// Whether neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    /// Move the lower bound forward
    ///
    /// Returns `false` and leaves the window alone unless `since` is strictly
    /// greater than the current lower bound.
    pub fn advance_since(&mut self, since: DateTime<Utc>) -> bool {
        let since = truncate_to_millis(since);
        if self.since.is_some_and(|current| since <= current) {
            return false;
        }
        self.since = Some(since);
        true
    }

    /// Server-side constraints for this window, lower bound first
    pub fn constraints(&self, field: &str) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        if let Some(since) = &self.since {
            constraints.push(Constraint::new(field, ConstraintType::GreaterThan, since));
        }
        if let Some(until) = &self.until {
            constraints.push(Constraint::new(field, ConstraintType::LessThan, until));
        }
        constraints
    }
}

// ============================================================================
// Constraints
// ============================================================================

/// Comparison operator of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintType {
    #[serde(rename = "greater than")]
    GreaterThan,
    #[serde(rename = "less than")]
    LessThan,
}

/// A single server-side filter clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Field the clause applies to
    pub key: String,
    /// Comparison operator
    pub constraint_type: ConstraintType,
    /// Value compared against
    pub value: String,
}

impl Constraint {
    /// Create a timestamp constraint
    pub fn new(
        key: impl Into<String>,
        constraint_type: ConstraintType,
        value: &DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            constraint_type,
            value: format_timestamp(value),
        }
    }
}

// ============================================================================
// Page Envelope
// ============================================================================

/// Top-level success body: `{"response": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    /// The page itself
    pub response: PageResponse,
}

/// One page of results
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageResponse {
    /// Records in server order
    #[serde(default)]
    pub results: Vec<Record>,
    /// Records of the current window not yet returned
    pub remaining: u64,
}

impl PageResponse {
    /// Create a page by hand
    pub fn new(results: Vec<Record>, remaining: u64) -> Self {
        Self { results, remaining }
    }
}

/// What the engine decided after a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Same window, next offset
    Offset {
        /// Cursor for the next request
        cursor: u32,
    },
    /// Window narrowed, cursor reset to zero
    Reanchor {
        /// New lower bound
        since: DateTime<Utc>,
    },
    /// Server reported nothing remaining
    Exhausted,
}
