//! CLI support for search-syntax
//!
//! Provides programmatic access to the `searchq` commands so other tools can
//! embed them.

mod check;
mod complete;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use complete::{CompleteOptions, execute_complete};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use crate::error::ConfigError;

/// Errors that can occur during CLI operations
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoQuery,
    #[error("Unknown category: '{0}'\nRun 'searchq docs' to see available categories.")]
    UnknownCategory(String),
}
