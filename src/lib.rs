// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Bubble Extractor
//!
//! Incremental, paginated extraction of records from the Bubble data API.
//!
//! ## Features
//!
//! - **Resilient transport**: Retries with exponential backoff on 429/5xx and
//!   connection failures, honoring `Retry-After`
//! - **Typed errors**: Every non-success status maps to exactly one [`ErrorKind`]
//! - **Date windows**: Server-side `Modified Date` constraints, re-anchored on
//!   the last record when a page comes back short
//! - **Lazy paging**: Batches are fetched only as the caller pulls them
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bubble_extractor::{EndpointRequest, Extractor, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let extractor = Extractor::connect("https://app.example.com/api/1.1/obj/", "token")?;
//!
//!     let mut pages = extractor.extract(EndpointRequest::new("user"));
//!     while let Some(batch) = pages.next_batch().await? {
//!         println!("{} records", batch.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │              CLI: validate / check / read                 │
//! └───────────────────────────────┬───────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┴───────────────────────────┐
//! │           extract: Extractor → PageStream (batches)       │
//! └──────────┬────────────────────┬────────────────┬──────────┘
//!            │                    │                │
//! ┌──────────┴───────┐ ┌──────────┴───────┐ ┌──────┴──────────┐
//! │ http             │ │ classify         │ │ pagination      │
//! │ Retry, backoff   │ │ Status → kind    │ │ Cursor, window, │
//! │ Rate limit       │ │ Error messages   │ │ re-anchoring    │
//! └──────────────────┘ └──────────────────┘ └─────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Response classification
pub mod classify;

/// Offset pagination within a date window
pub mod pagination;

/// Extractor and page stream
pub mod extract;

/// Configuration loading and validation
pub mod config;

/// JSON-lines output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{ApiError, Error, ErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{EndpointConfig, ExtractorConfig};
pub use extract::{EndpointRequest, ExtractStats, Extractor, PageStream};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
