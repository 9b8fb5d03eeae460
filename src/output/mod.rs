//! Output module
//!
//! Writes extracted records as JSON lines, one file per endpoint.

mod writer;

pub use writer::{check_file_stem, jsonl_path, JsonlWriter};
