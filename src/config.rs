//! Parser and search bar configuration.
//!
//! Both structs deserialize from JSON with every field optional, so a config
//! file only needs to list what it overrides.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::autocomplete::SearchItem;
use crate::error::ConfigError;

fn set(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

/// Key sets and switches consulted while parsing.
///
/// The key sets complement the [`FieldRegistry`](crate::registry::FieldRegistry):
/// a key is numeric when it is listed here *or* the registry declares it
/// numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Text keys that accept comparison operators (`release.version:>1.2.0`)
    pub text_operator_keys: BTreeSet<String>,
    pub duration_keys: BTreeSet<String>,
    pub percentage_keys: BTreeSet<String>,
    pub numeric_keys: BTreeSet<String>,
    pub date_keys: BTreeSet<String>,
    pub boolean_keys: BTreeSet<String>,
    /// When false, `AND`/`OR` still parse but are marked invalid
    pub allow_boolean: bool,
    /// When false, any negated filter is marked invalid
    pub allow_negation: bool,
    /// When true, filters on keys outside `supported_keys` are marked invalid
    pub validate_keys: bool,
    pub supported_keys: BTreeSet<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            text_operator_keys: set(&[
                "release.version",
                "release.build",
                "release.package",
                "release.stage",
            ]),
            duration_keys: set(&["transaction.duration", "age"]),
            percentage_keys: set(&["percentage", "failure_rate"]),
            numeric_keys: set(&[
                "id",
                "project_id",
                "project.id",
                "issue.id",
                "stack.colno",
                "stack.lineno",
                "stack.stack_level",
                "transaction.duration",
                "times_seen",
            ]),
            date_keys: set(&[
                "start",
                "end",
                "first_seen",
                "last_seen",
                "firstSeen",
                "lastSeen",
                "time",
                "event.timestamp",
                "timestamp",
                "timestamp.to_hour",
                "timestamp.to_day",
                "transaction.start_time",
                "transaction.end_time",
            ]),
            boolean_keys: set(&[
                "error.handled",
                "error.unhandled",
                "stack.in_app",
                "team_key_transaction",
            ]),
            allow_boolean: true,
            allow_negation: true,
            validate_keys: false,
            supported_keys: BTreeSet::new(),
        }
    }
}

impl ParserConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&read(path.as_ref())?)
    }
}

/// Behaviour of the autocomplete engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBarOptions {
    /// Longest query the input accepts, in chars
    pub max_query_length: usize,
    /// Cap on suggestions per group (items flagged to ignore it still show)
    pub max_search_items: Option<usize>,
    /// Debounce window for collaborator lookups
    pub debounce_ms: u64,
    /// Shown when the query is empty; falls back to all keys when empty
    pub default_search_items: Vec<SearchItem>,
    pub has_recent_searches: bool,
    /// Hide the `environment` key and its values
    pub exclude_environment: bool,
}

impl Default for SearchBarOptions {
    fn default() -> Self {
        SearchBarOptions {
            max_query_length: 400,
            max_search_items: None,
            debounce_ms: 300,
            default_search_items: Vec::new(),
            has_recent_searches: true,
            exclude_environment: false,
        }
    }
}

impl SearchBarOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

pub(crate) fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ParserConfig::from_json(r#"{"allow_boolean": false, "numeric_keys": ["score"]}"#)
            .unwrap();
        assert!(!config.allow_boolean);
        assert!(config.numeric_keys.contains("score"));
        assert!(!config.numeric_keys.contains("id"));
        assert!(config.boolean_keys.contains("error.handled"));
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(
            SearchBarOptions::from_json("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
