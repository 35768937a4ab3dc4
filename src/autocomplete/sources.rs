//! Collaborators the search bar queries for tag values and recent searches,
//! and the debouncing that sits in front of them.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::autocomplete::items::{ItemType, SearchItem, escape_tag_value};
use crate::error::ConfigError;
use crate::registry::{FieldKind, FieldRegistry, StaticFieldRegistry};

/// A key the search bar knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub name: String,
    /// Values offered without asking the [`TagValueSource`]
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub predefined: bool,
    #[serde(default)]
    pub kind: Option<FieldKind>,
    #[serde(default)]
    pub max_suggested_values: Option<usize>,
}

impl Tag {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Tag {
            name: key.clone(),
            key,
            values: Vec::new(),
            predefined: false,
            kind: None,
            max_suggested_values: None,
        }
    }

    pub fn predefined(mut self, values: &[&str]) -> Self {
        self.values = values.iter().map(|v| v.to_string()).collect();
        self.predefined = true;
        self
    }
}

/// Supported tags by key.
pub type TagCollection = BTreeMap<String, Tag>;

/// Builds a collection from a list of tags.
pub fn tag_collection(tags: impl IntoIterator<Item = Tag>) -> TagCollection {
    tags.into_iter().map(|tag| (tag.key.clone(), tag)).collect()
}

/// Issue states offered for `is:`.
pub const IS_VALUES: [&str; 8] = [
    "resolved",
    "unresolved",
    "ignored",
    "assigned",
    "unassigned",
    "for_review",
    "linked",
    "unlinked",
];

/// One tag per registry key; `is` carries its issue states.
pub fn tags_from_registry(registry: &StaticFieldRegistry) -> TagCollection {
    tag_collection(registry.keys().map(|key| {
        let mut tag = Tag::new(key);
        tag.kind = registry.field_definition(key).map(|def| def.kind);
        if key == "is" {
            tag = tag.predefined(&IS_VALUES);
        }
        tag
    }))
}

/// Reads a JSON array of tags.
pub fn load_tags(path: impl AsRef<Path>) -> Result<TagCollection, ConfigError> {
    let json = crate::config::read(path.as_ref())?;
    let tags: Vec<Tag> = serde_json::from_str(&json)?;
    Ok(tag_collection(tags))
}

/// Time range forwarded to tag value lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateRangeParams {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub stats_period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub query: String,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),
    #[error("Request failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait TagValueSource: Send + Sync {
    async fn fetch_tag_values(
        &self,
        tag: &Tag,
        query: &str,
        params: &DateRangeParams,
    ) -> Result<Vec<String>, SourceError>;
}

#[async_trait]
pub trait RecentSearchSource: Send + Sync {
    async fn fetch_recent_searches(&self, query: &str) -> Result<Vec<RecentSearch>, SourceError>;
}

/// Serves the `values` of known tags, filtered by substring.
#[derive(Debug, Clone, Default)]
pub struct StaticTagValues {
    tags: TagCollection,
}

impl StaticTagValues {
    pub fn new(tags: TagCollection) -> Self {
        StaticTagValues { tags }
    }
}

#[async_trait]
impl TagValueSource for StaticTagValues {
    async fn fetch_tag_values(
        &self,
        tag: &Tag,
        query: &str,
        _params: &DateRangeParams,
    ) -> Result<Vec<String>, SourceError> {
        let known = self
            .tags
            .get(&tag.key)
            .ok_or_else(|| SourceError::Unavailable(format!("no values for {}", tag.key)))?;
        let query = query.to_lowercase();
        Ok(known
            .values
            .iter()
            .filter(|value| value.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
struct DebounceState {
    generation: u64,
    window_end: Option<Instant>,
}

/// Leading and trailing debounce for async calls.
///
/// The first call of a burst runs at once and opens a window. Calls made
/// while the window is open wait for it to close; only the latest of them
/// runs, the others resolve to `None`.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    state: Mutex<DebounceState>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer {
            window,
            state: Mutex::new(DebounceState::default()),
        }
    }

    pub async fn run<F, T>(&self, call: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let (generation, deadline) = {
            let mut state = self.state.lock();
            state.generation += 1;
            let now = Instant::now();
            match state.window_end {
                Some(end) if now < end => (state.generation, Some(end)),
                _ => {
                    state.window_end = Some(now + self.window);
                    (state.generation, None)
                }
            }
        };

        if let Some(deadline) = deadline {
            tokio::time::sleep_until(deadline).await;
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!(generation, "debounced call superseded");
                return None;
            }
            state.window_end = Some(Instant::now() + self.window);
        }

        Some(call.await)
    }
}

/// Tag value lookups with debouncing and a negative cache.
///
/// When a query returns nothing, longer queries with the same prefix are
/// answered empty without asking the source.
pub struct TagValueLookup {
    source: Arc<dyn TagValueSource>,
    debouncer: Debouncer,
    no_value_query: Mutex<Option<(String, String)>>,
}

impl TagValueLookup {
    pub fn new(source: Arc<dyn TagValueSource>, window: Duration) -> Self {
        TagValueLookup {
            source,
            debouncer: Debouncer::new(window),
            no_value_query: Mutex::new(None),
        }
    }

    /// Value suggestions for `tag`, escaped for insertion into a query.
    ///
    /// `None` when a newer lookup superseded this one.
    pub async fn values(
        &self,
        tag: &Tag,
        query: &str,
        params: &DateRangeParams,
    ) -> Option<Vec<SearchItem>> {
        let cached_empty = self
            .no_value_query
            .lock()
            .as_ref()
            .is_some_and(|(key, prefix)| *key == tag.key && query.starts_with(prefix.as_str()));
        if cached_empty {
            return Some(Vec::new());
        }

        let result = self
            .debouncer
            .run(self.source.fetch_tag_values(tag, query, params))
            .await?;
        let mut values = match result {
            Ok(values) => values,
            Err(err) => {
                warn!(%err, tag = %tag.key, "tag value lookup failed");
                Vec::new()
            }
        };

        *self.no_value_query.lock() = (values.is_empty() && !query.is_empty())
            .then(|| (tag.key.clone(), query.to_string()));

        if let Some(max) = tag.max_suggested_values {
            values.truncate(max);
        }
        Some(
            values
                .iter()
                .map(|value| SearchItem::new(ItemType::TagValue, escape_tag_value(value)))
                .collect(),
        )
    }
}

/// Recent search lookups with debouncing.
pub struct RecentSearchLookup {
    source: Arc<dyn RecentSearchSource>,
    debouncer: Debouncer,
}

impl RecentSearchLookup {
    pub fn new(source: Arc<dyn RecentSearchSource>, window: Duration) -> Self {
        RecentSearchLookup {
            source,
            debouncer: Debouncer::new(window),
        }
    }

    pub async fn searches(&self, query: &str) -> Option<Vec<SearchItem>> {
        let result = self
            .debouncer
            .run(self.source.fetch_recent_searches(query))
            .await?;
        let searches = result.unwrap_or_else(|err| {
            warn!(%err, "recent search lookup failed");
            Vec::new()
        });
        Some(
            searches
                .into_iter()
                .map(|recent| SearchItem::new(ItemType::RecentSearch, recent.query))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn leading_call_runs_immediately() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let started = Instant::now();
        assert_eq!(debouncer.run(async { 1 }).await, Some(1));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_latest_trailing_call_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        assert_eq!(debouncer.run(async { 1 }).await, Some(1));

        let (second, third) = tokio::join!(debouncer.run(async { 2 }), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            debouncer.run(async { 3 }).await
        });
        assert_eq!(second, None);
        assert_eq!(third, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn calls_after_the_window_lead_again() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.run(async {}).await;
        tokio::time::sleep(Duration::from_millis(301)).await;
        let started = Instant::now();
        assert_eq!(debouncer.run(async { "again" }).await, Some("again"));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
