//! Response classifier module
//!
//! Turns a completed HTTP response into either a decoded payload or a typed
//! [`ApiError`](crate::error::ApiError).
//!
//! # Overview
//!
//! - 200/201/202 return the decoded body unchanged
//! - 204 returns [`Payload::NoContent`]
//! - every other status maps to exactly one [`ErrorKind`](crate::error::ErrorKind),
//!   `UnknownError` for anything without a dedicated kind
//!
//! The classifier never retries; that is the transport's job.

mod classifier;
mod types;

pub use classifier::{classify, classify_outcome, MAX_DETAIL_CHARS};
pub use types::{ErrorBody, ErrorDetail, Payload};

#[cfg(test)]
mod tests;
