//! HTTP client with retry and rate limiting
//!
//! Provides the transport used for every page request:
//! - Bearer authentication and JSON content type on every request
//! - Automatic retries with exponential backoff on transient statuses
//! - Retries on connection-level failures (timeouts, resets)
//! - Optional client-side rate limiting
//!
//! The client never turns a status code into an error. After the last
//! attempt the final response is handed back as-is so the classifier can
//! decide what it means.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Statuses retried by default
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of attempts per request, the first one included
    pub max_attempts: u32,
    /// Backoff factor; the n-th retry waits `factor * 2^n`
    pub backoff_factor: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Statuses that trigger a retry
    pub retry_statuses: Vec<u16>,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_attempts: 10,
            backoff_factor: Duration::from_millis(300),
            max_backoff: Duration::from_secs(120),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("bubble-extractor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Authenticate every request with a bearer token
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
            .header("Content-Type", "application/json")
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set the backoff factor and its cap
    pub fn backoff(mut self, factor: Duration, max: Duration) -> Self {
        self.config.backoff_factor = factor;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, sent in insertion order
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// A completed HTTP exchange, body fully read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Declared content type, if any
    pub content_type: Option<String>,
    /// Response body as text
    pub body: String,
    /// Number of attempts it took to get this response
    pub attempts: u32,
}

impl RawResponse {
    /// Create a response by hand
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
            attempts: 1,
        }
    }

    /// Whether the declared content type is JSON
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request with config
    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> Result<RawResponse> {
        self.request(Method::GET, url, config).await
    }

    /// Make a request, retrying transient failures
    ///
    /// Returns the final response whatever its status. Fails only when no
    /// response could be obtained at all.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<RawResponse> {
        let full_url = self.build_url(url);
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            match self.send_once(&method, &full_url, &config).await {
                Ok((mut response, retry_after)) => {
                    response.attempts = attempt;

                    if self.is_retryable_status(response.status) {
                        if attempt < max_attempts {
                            let delay = match retry_after {
                                Some(d) => d.min(self.config.max_backoff),
                                None => self.calculate_backoff(attempt - 1),
                            };
                            warn!(
                                "Request failed with {}, attempt {}/{}, retrying in {:?}",
                                response.status, attempt, max_attempts, delay
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        warn!(
                            "Request failed with {} after {} attempts, giving up",
                            response.status, attempt
                        );
                    }

                    debug!("{} {} -> {}", method, full_url, response.status);
                    return Ok(response);
                }
                Err(e) => {
                    if is_connection_error(&e) && attempt < max_attempts {
                        let delay = self.calculate_backoff(attempt - 1);
                        warn!(
                            "Connection error ({e}), attempt {}/{}, retrying in {:?}",
                            attempt, max_attempts, delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(Error::Http(e));
                }
            }
        }
    }

    /// Send a single attempt and read the whole body
    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        config: &RequestConfig,
    ) -> std::result::Result<(RawResponse, Option<Duration>), reqwest::Error> {
        let mut req = self.client.request(method.clone(), url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let content_type = header_str(response.headers(), CONTENT_TYPE.as_str());
        let retry_after = extract_retry_after(response.headers());
        let body = response.text().await?;

        Ok((
            RawResponse {
                status,
                content_type,
                body,
                attempts: 1,
            },
            retry_after,
        ))
    }

    fn is_retryable_status(&self, status: u16) -> bool {
        self.config.retry_statuses.contains(&status)
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    /// Calculate backoff delay before the given retry (0-based)
    pub fn calculate_backoff(&self, retry: u32) -> Duration {
        let delay = self
            .config
            .backoff_factor
            .checked_mul(2u32.saturating_pow(retry))
            .unwrap_or(self.config.max_backoff);

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("max_attempts", &self.config.max_attempts)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Failures worth another attempt: the request never produced a usable response
fn is_connection_error(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Extract retry-after header value (whole seconds only)
fn extract_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
