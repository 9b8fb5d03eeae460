//! HTTP transport
//!
//! Provides the HTTP client with retry, backoff and optional rate limiting.
//!
//! # Features
//!
//! - **Automatic Retries**: 429/500/502/503/504 and connection failures
//! - **Backoff**: exponential (`factor * 2^retry`), capped
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Authentication**: Bearer token on every request

mod client;
mod rate_limit;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RawResponse, RequestConfig,
    DEFAULT_RETRY_STATUSES,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
