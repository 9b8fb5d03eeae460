//! CLI module
//!
//! Command-line interface for running the extractor.
//!
//! # Commands
//!
//! - `validate` - Check the configuration and show the resolved window
//! - `check` - Fetch one page of every configured endpoint
//! - `read` - Extract every endpoint

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
