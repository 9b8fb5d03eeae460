//! Cursor / date-window engine
//!
//! Offset pagination is only trusted while pages come back full. The data
//! set can change underneath a running extraction, so a short page while the
//! server still claims records are outstanding means the offset has drifted.
//! The engine then re-anchors: the window's lower bound moves to just below
//! the last record it saw and the cursor starts again at zero.

use super::types::{Advance, DateWindow, PageResponse, PaginationConfig};
use crate::error::{Error, Result};
use crate::http::RequestConfig;
use crate::types::{format_timestamp, parse_timestamp, truncate_to_millis, Record};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{debug, warn};

/// Pagination state for one endpoint extraction
#[derive(Debug, Clone)]
pub struct WindowCursor {
    endpoint: String,
    config: PaginationConfig,
    window: DateWindow,
    cursor: u32,
    reanchors: u32,
}

impl WindowCursor {
    /// Start at cursor zero with the given window
    pub fn new(endpoint: impl Into<String>, config: PaginationConfig, window: DateWindow) -> Self {
        Self {
            endpoint: endpoint.into(),
            config,
            window,
            cursor: 0,
            reanchors: 0,
        }
    }

    /// Current offset into the window
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Current date window
    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    /// Page size
    pub fn limit(&self) -> u32 {
        self.config.limit
    }

    /// How many times the window was narrowed so far
    pub fn reanchors(&self) -> u32 {
        self.reanchors
    }

    /// Query parameters for the next request
    ///
    /// Order: `cursor`, `limit`, `sort_field`, then `constraints` when the
    /// window has any bound.
    pub fn query_params(&self) -> Result<Vec<(String, String)>> {
        let mut params = vec![
            ("cursor".to_string(), self.cursor.to_string()),
            ("limit".to_string(), self.config.limit.to_string()),
            ("sort_field".to_string(), self.config.sort_field.clone()),
        ];

        let constraints = self.window.constraints(&self.config.modified_field);
        if !constraints.is_empty() {
            params.push(("constraints".to_string(), serde_json::to_string(&constraints)?));
        }

        Ok(params)
    }

    /// Request config for the next page
    pub fn request(&self) -> Result<RequestConfig> {
        let config = self
            .query_params()?
            .into_iter()
            .fold(RequestConfig::new(), |config, (key, value)| config.query(key, value));
        Ok(config)
    }

    /// Decide how to continue after a page
    pub fn advance(&mut self, page: &PageResponse) -> Result<Advance> {
        if page.remaining == 0 {
            return Ok(Advance::Exhausted);
        }

        let returned = page.results.len();
        if returned < self.config.limit as usize {
            match page.results.last() {
                Some(last) => {
                    let since =
                        truncate_to_millis(self.modified_at(last)? - Duration::milliseconds(1));
                    if self.window.advance_since(since) {
                        self.cursor = 0;
                        self.reanchors += 1;
                        debug!(
                            "Short page ({returned}) on {} with {} remaining, re-anchoring since {}",
                            self.endpoint,
                            page.remaining,
                            format_timestamp(&since)
                        );
                        return Ok(Advance::Reanchor { since });
                    }
                    warn!(
                        "Re-anchoring {} at {} would not move the window forward, \
                         continuing by offset",
                        self.endpoint,
                        format_timestamp(&since)
                    );
                }
                None => {
                    warn!(
                        "Empty page on {} while {} records remain, continuing by offset",
                        self.endpoint, page.remaining
                    );
                }
            }
        }

        self.cursor = self.cursor.saturating_add(self.config.limit);
        Ok(Advance::Offset {
            cursor: self.cursor,
        })
    }

    /// Modification timestamp of a record
    fn modified_at(&self, record: &Record) -> Result<DateTime<Utc>> {
        let field = &self.config.modified_field;
        let parsed = match record.get(field) {
            Some(Value::String(s)) => parse_timestamp(s),
            Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        };

        parsed.ok_or_else(|| {
            Error::decode(
                &self.endpoint,
                format!("record has no valid '{field}' timestamp to re-anchor on"),
            )
        })
    }
}
