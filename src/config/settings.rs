//! Tunables for the HTTP client and pagination

use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::{PaginationConfig, DEFAULT_PAGE_LIMIT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport and paging settings
///
/// Everything has a default; a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Total attempts per request, the first one included
    pub max_attempts: u32,

    /// Backoff factor in milliseconds
    pub backoff_factor_ms: u64,

    /// Upper bound for a single backoff sleep, in seconds
    pub max_backoff_secs: u64,

    /// Records per page
    pub page_limit: u32,

    /// Client-side request rate cap
    pub requests_per_second: Option<u32>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 10,
            backoff_factor_ms: 300,
            max_backoff_secs: 120,
            page_limit: DEFAULT_PAGE_LIMIT,
            requests_per_second: None,
        }
    }
}

impl ExtractorSettings {
    /// Create a builder
    pub fn builder() -> ExtractorSettingsBuilder {
        ExtractorSettingsBuilder::default()
    }

    /// HTTP client configuration for an API URL and token
    pub fn http_config(&self, base_url: &str, api_token: &str) -> HttpClientConfig {
        let builder = HttpClientConfig::builder()
            .base_url(base_url)
            .bearer_token(api_token)
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_attempts(self.max_attempts)
            .backoff(
                Duration::from_millis(self.backoff_factor_ms),
                Duration::from_secs(self.max_backoff_secs),
            );

        match self.requests_per_second {
            Some(rps) if rps > 0 => builder.rate_limit(RateLimiterConfig::new(rps, rps)),
            _ => builder.no_rate_limit(),
        }
        .build()
    }

    /// Pagination configuration
    pub fn pagination(&self) -> PaginationConfig {
        PaginationConfig::default().with_limit(self.page_limit)
    }
}

/// Builder for [`ExtractorSettings`]
#[derive(Debug, Default)]
pub struct ExtractorSettingsBuilder {
    settings: ExtractorSettings,
}

impl ExtractorSettingsBuilder {
    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.settings.timeout_secs = secs;
        self
    }

    /// Set the total number of attempts (at least 1)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.settings.max_attempts = attempts.max(1);
        self
    }

    /// Set the backoff factor in milliseconds
    pub fn backoff_factor_ms(mut self, ms: u64) -> Self {
        self.settings.backoff_factor_ms = ms;
        self
    }

    /// Set the cap on a single backoff sleep
    pub fn max_backoff_secs(mut self, secs: u64) -> Self {
        self.settings.max_backoff_secs = secs;
        self
    }

    /// Set the page size, clamped to `1..=DEFAULT_PAGE_LIMIT`
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.settings.page_limit = limit.clamp(1, DEFAULT_PAGE_LIMIT);
        self
    }

    /// Enable client-side rate limiting
    pub fn requests_per_second(mut self, rps: u32) -> Self {
        self.settings.requests_per_second = Some(rps);
        self
    }

    /// Build the settings
    pub fn build(self) -> ExtractorSettings {
        self.settings
    }
}
