//! Extraction types

use crate::pagination::DateWindow;
use chrono::{DateTime, Utc};

/// What to extract: an endpoint and an optional modification-date window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRequest {
    /// Resource name, appended to the base URL
    pub name: String,
    /// Only records modified after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only records modified before this instant
    pub until: Option<DateTime<Utc>>,
}

impl EndpointRequest {
    /// Extract every record of an endpoint
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            since: None,
            until: None,
        }
    }

    /// Set the lower bound
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Set the upper bound
    #[must_use]
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Set both bounds at once
    #[must_use]
    pub fn window(mut self, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    /// The initial date window for this request
    pub fn date_window(&self) -> DateWindow {
        DateWindow::new(self.since, self.until)
    }
}

/// Statistics from one extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Pages received, empty ones included
    pub pages_fetched: usize,
    /// Records received
    pub records_extracted: usize,
    /// Times the window was narrowed
    pub reanchors: usize,
}

impl ExtractStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a received page
    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.records_extracted += records;
    }

    /// Record a re-anchor
    pub fn add_reanchor(&mut self) {
        self.reanchors += 1;
    }
}
