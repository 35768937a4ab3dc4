//! Suggestions for a query and caret position

use std::path::PathBuf;
use std::sync::Arc;

use super::CliError;
use super::check::load_context;
use crate::autocomplete::{SearchBar, StaticTagValues, Suggestions, load_tags, tags_from_registry};
use crate::config::SearchBarOptions;

/// Options for the complete command
#[derive(Debug, Clone, Default)]
pub struct CompleteOptions {
    pub query: String,
    /// Caret position in chars, the end of the query when absent
    pub cursor: Option<usize>,
    pub config: Option<PathBuf>,
    pub registry: Option<PathBuf>,
    /// JSON array of tags; one tag per registry key when absent
    pub tags: Option<PathBuf>,
    /// Search bar options as JSON
    pub options: Option<String>,
}

/// Execute a complete operation
pub async fn execute_complete(options: &CompleteOptions) -> Result<Suggestions, CliError> {
    let (config, registry) = load_context(options.config.as_ref(), options.registry.as_ref())?;
    let tags = match &options.tags {
        Some(path) => load_tags(path)?,
        None => tags_from_registry(&registry),
    };
    let bar_options = match &options.options {
        Some(json) => SearchBarOptions::from_json(json)?,
        None => SearchBarOptions {
            has_recent_searches: false,
            ..SearchBarOptions::default()
        },
    };

    let values = Arc::new(StaticTagValues::new(tags.clone()));
    let mut bar = SearchBar::new(bar_options, config, Arc::new(registry), tags)
        .with_tag_values(values);
    let cursor = options
        .cursor
        .unwrap_or_else(|| options.query.chars().count());
    bar.set_query(&options.query, cursor);
    bar.focus().await;

    Ok(bar.suggestions().cloned().unwrap_or_else(|| Suggestions {
        mode: bar.request().mode(),
        search_term: String::new(),
        groups: Vec::new(),
        flat_items: Vec::new(),
        active: None,
        stale: false,
    }))
}
