//! Field definitions: what a key means and what kind of value it holds.
//!
//! Both the parser (to decide which filter type a key may take) and the
//! autocomplete engine (descriptions, keyword matching, date pickers) look keys
//! up through [`FieldRegistry`] instead of embedding the tables.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Tag,
    Field,
    Function,
    Measurement,
    Breakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValueType {
    String,
    Boolean,
    Integer,
    Number,
    Duration,
    Date,
    Percentage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub kind: FieldKind,
    #[serde(default)]
    pub value_type: Option<FieldValueType>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
}

impl FieldDefinition {
    pub fn new(kind: FieldKind, value_type: Option<FieldValueType>, desc: &str) -> Self {
        FieldDefinition {
            kind,
            value_type,
            desc: Some(desc.to_string()),
            keywords: Vec::new(),
            deprecated: false,
        }
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }
}

/// Lookup of field definitions by key.
pub trait FieldRegistry: Send + Sync {
    fn field_definition(&self, key: &str) -> Option<FieldDefinition>;
}

/// HashMap-backed registry.
///
/// Keys not found in the map still resolve when they are measurements
/// (`measurements.lcp`) or span breakdowns (`spans.db`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticFieldRegistry {
    fields: HashMap<String, FieldDefinition>,
}

impl StaticFieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, definition: FieldDefinition) {
        self.fields.insert(key.into(), definition);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&crate::config::read(path.as_ref())?)
    }

    /// Definitions for the common issue and event fields.
    pub fn builtin() -> Self {
        use FieldKind::*;
        use FieldValueType as V;

        let mut registry = StaticFieldRegistry::new();
        let entries = [
            ("is", Field, Some(V::String), "The properties of an issue (e.g. unresolved, assigned)"),
            ("has", Field, Some(V::String), "Determines if a tag or field exists in an event"),
            ("assigned", Field, Some(V::String), "Assignee of the issue as a user ID"),
            ("assigned_or_suggested", Field, Some(V::String), "Assignee or suggestee of the issue"),
            ("bookmarks", Field, Some(V::String), "The issue is bookmarked by a user ID"),
            ("age", Field, Some(V::Duration), "The age of the issue"),
            ("times_seen", Field, Some(V::Integer), "Total number of events"),
            ("first_seen", Field, Some(V::Date), "Issues first seen at a given time"),
            ("last_seen", Field, Some(V::Date), "Issues last seen at a given time"),
            ("timestamp", Field, Some(V::Date), "The time an event finishes"),
            ("release", Tag, Some(V::String), "The version of your code deployed to an environment"),
            ("release.version", Field, Some(V::String), "The version number of a release"),
            ("release.build", Field, Some(V::String), "The build number of a release"),
            ("release.package", Field, Some(V::String), "The package of a release"),
            ("release.stage", Field, Some(V::String), "The adoption stage of a release"),
            ("environment", Tag, Some(V::String), "The environment the event was seen in"),
            ("browser", Tag, Some(V::String), "Name and version of the browser"),
            ("browser.name", Tag, Some(V::String), "Name of the browser"),
            ("device", Tag, Some(V::String), "The device the event was seen on"),
            ("device.arch", Tag, Some(V::String), "CPU architecture"),
            ("device.name", Tag, Some(V::String), "Details about the device"),
            ("device.family", Tag, Some(V::String), "Model name across generations"),
            ("os.name", Tag, Some(V::String), "Name of the Operating System"),
            ("user", Tag, Some(V::String), "User identifier"),
            ("user.email", Field, Some(V::String), "Email address of the user"),
            ("level", Tag, Some(V::String), "Severity of the event"),
            ("message", Field, Some(V::String), "The event message"),
            ("transaction", Tag, Some(V::String), "Name of the transaction"),
            ("transaction.duration", Field, Some(V::Duration), "Duration of the transaction"),
            ("error.handled", Field, Some(V::Boolean), "Determines handling status of the error"),
            ("error.unhandled", Field, Some(V::Boolean), "Determines the unhandled status of the error"),
            ("error.type", Field, Some(V::String), "The type of exception"),
            ("stack.in_app", Field, Some(V::Boolean), "Indicates if the frame is related to the app"),
            ("stack.lineno", Field, Some(V::Integer), "The line number of the frame"),
            ("project.id", Field, Some(V::Integer), "The project ID"),
            ("issue.id", Field, Some(V::Integer), "The issue ID"),
            ("count", Function, Some(V::Integer), "Number of events"),
            ("count_if", Function, Some(V::Integer), "Number of events matching a condition"),
            ("avg", Function, None, "Average of a numeric field"),
            ("p95", Function, None, "95th percentile of a numeric field"),
            ("failure_rate", Function, Some(V::Percentage), "Share of failed transactions"),
            ("last_seen()", Function, Some(V::Date), "Most recent event time"),
        ];
        for (key, kind, value_type, desc) in entries {
            registry.insert(key, FieldDefinition::new(kind, value_type, desc));
        }
        if let Some(def) = registry.fields.get_mut("user") {
            def.keywords = vec!["id".into(), "username".into(), "ip".into()];
        }
        if let Some(def) = registry.fields.get_mut("device") {
            def.keywords = vec!["phone".into(), "model".into()];
        }
        registry
    }
}

impl FieldRegistry for StaticFieldRegistry {
    fn field_definition(&self, key: &str) -> Option<FieldDefinition> {
        if let Some(def) = self.fields.get(key) {
            return Some(def.clone());
        }
        if is_measurement(key) {
            return Some(FieldDefinition {
                kind: FieldKind::Measurement,
                value_type: Some(measurement_type(key).unwrap_or(FieldValueType::Number)),
                desc: None,
                keywords: Vec::new(),
                deprecated: false,
            });
        }
        if is_span_operation_breakdown(key) {
            return Some(FieldDefinition {
                kind: FieldKind::Breakdown,
                value_type: Some(FieldValueType::Duration),
                desc: None,
                keywords: Vec::new(),
                deprecated: false,
            });
        }
        None
    }
}

static MEASUREMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^measurements\.[a-zA-Z0-9_.\-]+$").expect("valid regex"));

static SPAN_BREAKDOWN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^spans\.[a-zA-Z0-9_\-]+$").expect("valid regex"));

pub fn is_measurement(key: &str) -> bool {
    MEASUREMENT_PATTERN.is_match(key)
}

pub fn is_span_operation_breakdown(key: &str) -> bool {
    SPAN_BREAKDOWN_PATTERN.is_match(key)
}

/// Declared type of a well-known measurement.
pub fn measurement_type(key: &str) -> Option<FieldValueType> {
    let name = key.strip_prefix("measurements.")?;
    match name {
        "fp" | "fcp" | "lcp" | "fid" | "inp" | "ttfb" | "ttfb.requesttime" | "app_start_cold"
        | "app_start_warm" | "time_to_initial_display" | "time_to_full_display"
        | "stall_longest_time" | "stall_total_time" => Some(FieldValueType::Duration),
        "frames_slow_rate" | "frames_frozen_rate" | "stall_percentage" => {
            Some(FieldValueType::Percentage)
        }
        "cls" | "frames_total" | "frames_slow" | "frames_frozen" | "stall_count" => {
            Some(FieldValueType::Number)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurements_resolve_without_entries() {
        let registry = StaticFieldRegistry::new();
        let lcp = registry.field_definition("measurements.lcp").unwrap();
        assert_eq!(lcp.kind, FieldKind::Measurement);
        assert_eq!(lcp.value_type, Some(FieldValueType::Duration));
        let custom = registry.field_definition("measurements.custom.score").unwrap();
        assert_eq!(custom.value_type, Some(FieldValueType::Number));
        assert!(registry.field_definition("measurements.").is_none());
        assert!(registry.field_definition("spans.db").is_some());
    }

    #[test]
    fn registry_loads_from_json() {
        let registry = StaticFieldRegistry::from_json(
            r#"{"score": {"kind": "field", "value_type": "number", "desc": "Score"}}"#,
        )
        .unwrap();
        let score = registry.field_definition("score").unwrap();
        assert_eq!(score.value_type, Some(FieldValueType::Number));
        assert!(score.keywords.is_empty());
    }
}
