//! Extraction module
//!
//! The public face of the crate: turn an endpoint name and an optional date
//! window into a lazy sequence of record batches.
//!
//! # Overview
//!
//! - [`Extractor`] - owns the HTTP client and pagination settings
//! - [`PageStream`] - pull-based, single-pass sequence of non-empty batches
//! - [`EndpointRequest`] - what to extract
//!
//! One request is in flight at a time and nothing is prefetched: the next
//! page is requested only when the caller asks for the next batch.

mod stream;
mod types;

pub use stream::{Extractor, PageStream};
pub use types::{EndpointRequest, ExtractStats};
