use std::io;

use crate::scanner::Position;

/// Structural parse failure: no grammar alternative matched at `position`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Expected {expected} but found {} at line {}, column {}", found_display(.found), .position.line, .position.column)]
pub struct ParseError {
    pub position: Position,
    pub expected: &'static str,
    pub found: Option<char>,
}

fn found_display(found: &Option<char>) -> String {
    match found {
        Some(ch) => format!("'{}'", ch.escape_default()),
        None => "end of input".to_string(),
    }
}

/// Failure while loading configuration, registry or tag files.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unable to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}
