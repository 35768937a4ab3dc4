use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::ast::{Filter, FilterType, ParsedQuery, Token, TokenKind};
use crate::autocomplete::items::{
    self, ItemType, SearchGroup, SearchGroups, SearchItem, create_search_groups,
    filter_keys_from_query, get_tag_items_from_keys, get_valid_ops, operator_group,
};
use crate::autocomplete::shortcuts::{self, SHORTCUTS, Shortcut, ShortcutType};
use crate::autocomplete::sources::{
    DateRangeParams, RecentSearchLookup, RecentSearchSource, Tag, TagCollection, TagValueLookup,
    TagValueSource,
};
use crate::autocomplete::splice::{self, Edit};
use crate::config::{ParserConfig, SearchBarOptions};
use crate::parser::{self, ParseContext};
use crate::registry::FieldRegistry;
use crate::validation::KeyValidation;
use crate::tree::{self, Visit};

/// Which kind of suggestions the dropdown is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionMode {
    DefaultSearches,
    TagKeys,
    TagValues,
    Operators,
    DatePicker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestions {
    pub mode: SuggestionMode,
    pub search_term: String,
    pub groups: Vec<SearchGroup>,
    #[serde(skip)]
    pub flat_items: Vec<SearchItem>,
    pub active: Option<usize>,
    /// Set once the query or caret moves past the state these were derived
    /// from. Stale suggestions stay visible but cannot be selected.
    #[serde(skip)]
    pub stale: bool,
}

impl Suggestions {
    pub fn active_item(&self) -> Option<&SearchItem> {
        if self.stale {
            return None;
        }
        self.active.and_then(|index| self.flat_items.get(index))
    }

    fn invalidate(&mut self) {
        self.active = None;
        self.stale = true;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dropdown {
    Closed,
    Open(Suggestions),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Tab,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The active suggestion changed
    Moved,
    /// The active suggestion was spliced into the query
    Autocompleted,
    /// Enter without an active suggestion
    SubmitRequested,
    Closed,
    Ignored,
}

/// Query text and caret position a suggestion state was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub query: String,
    pub cursor: usize,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Invalid filter \"{text}\" at offset {offset}: {reason}")]
    InvalidFilter {
        text: String,
        reason: String,
        offset: usize,
    },
}

/// The word under the caret inside a free-text token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorSearchTerm {
    pub search_term: String,
    pub start: usize,
    pub end: usize,
}

enum ValueSuggestions {
    InvalidTag,
    Excluded,
    Items(Vec<SearchItem>),
    Fetch(Tag),
}

/// Everything needed to build suggestions for one snapshot.
///
/// Built synchronously by [`SearchBar::request`]; [`SuggestionRequest::resolve`]
/// performs the collaborator lookups.
pub struct SuggestionRequest {
    snapshot: Snapshot,
    mode: SuggestionMode,
    search_term: String,
    item_type: ItemType,
    items: Vec<SearchItem>,
    leading: Vec<SearchGroup>,
    fixed: Option<Vec<SearchGroup>>,
    fetch_values: Option<Tag>,
    fetch_recent: bool,
    max_search_items: Option<usize>,
    query_chars_left: Option<usize>,
    date_range: DateRangeParams,
    tag_values: Option<Arc<TagValueLookup>>,
    recent_searches: Option<Arc<RecentSearchLookup>>,
}

pub struct SuggestionResponse {
    snapshot: Snapshot,
    suggestions: Suggestions,
}

impl SuggestionResponse {
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn suggestions(&self) -> &Suggestions {
        &self.suggestions
    }
}

impl SuggestionRequest {
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn mode(&self) -> SuggestionMode {
        self.mode
    }

    /// Runs the lookups this request needs. `None` when a newer lookup
    /// superseded it.
    pub async fn resolve(self) -> Option<SuggestionResponse> {
        let groups = match self.fixed {
            Some(groups) => groups,
            None => {
                let mut items = self.items;
                if let (Some(tag), Some(lookup)) = (&self.fetch_values, &self.tag_values) {
                    items.extend(
                        lookup
                            .values(tag, &self.search_term, &self.date_range)
                            .await?,
                    );
                }
                let recent = match (&self.recent_searches, self.fetch_recent) {
                    (Some(lookup), true) => Some(lookup.searches(&self.snapshot.query).await?),
                    _ => None,
                };
                let built = create_search_groups(
                    items,
                    recent,
                    self.item_type,
                    self.max_search_items,
                    self.query_chars_left,
                    None,
                );
                let mut groups = self.leading;
                groups.extend(built.groups);
                groups
            }
        };

        let groups = SearchGroups::from_groups(groups);
        Some(SuggestionResponse {
            snapshot: self.snapshot,
            suggestions: Suggestions {
                mode: self.mode,
                search_term: self.search_term,
                groups: groups.groups,
                flat_items: groups.flat_items,
                active: None,
                stale: false,
            },
        })
    }
}

/// Cursor-aware autocomplete over a single search input.
///
/// Every edit goes through the query text: the query is parsed again after
/// each change and suggestions are derived from the token under the caret.
pub struct SearchBar {
    options: SearchBarOptions,
    config: ParserConfig,
    registry: Arc<dyn FieldRegistry>,
    tags: TagCollection,
    tag_values: Option<Arc<TagValueLookup>>,
    recent_searches: Option<Arc<RecentSearchLookup>>,
    date_range: DateRangeParams,
    query: String,
    cursor: usize,
    parsed: Option<ParsedQuery>,
    dropdown: Dropdown,
}

impl SearchBar {
    pub fn new(
        options: SearchBarOptions,
        config: ParserConfig,
        registry: Arc<dyn FieldRegistry>,
        tags: TagCollection,
    ) -> Self {
        let mut bar = SearchBar {
            options,
            config,
            registry,
            tags,
            tag_values: None,
            recent_searches: None,
            date_range: DateRangeParams::default(),
            query: String::new(),
            cursor: 0,
            parsed: None,
            dropdown: Dropdown::Closed,
        };
        bar.parsed = bar.parse(&bar.query);
        bar
    }

    fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.options.debounce_ms)
    }

    pub fn with_tag_values(mut self, source: Arc<dyn TagValueSource>) -> Self {
        self.tag_values = Some(Arc::new(TagValueLookup::new(
            source,
            self.debounce_window(),
        )));
        self
    }

    pub fn with_recent_searches(mut self, source: Arc<dyn RecentSearchSource>) -> Self {
        self.recent_searches = Some(Arc::new(RecentSearchLookup::new(
            source,
            self.debounce_window(),
        )));
        self
    }

    pub fn with_date_range(mut self, date_range: DateRangeParams) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn parsed_query(&self) -> Option<&ParsedQuery> {
        self.parsed.as_ref()
    }

    pub fn dropdown(&self) -> &Dropdown {
        &self.dropdown
    }

    pub fn suggestions(&self) -> Option<&Suggestions> {
        match &self.dropdown {
            Dropdown::Open(suggestions) => Some(suggestions),
            Dropdown::Closed => None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            query: self.query.clone(),
            cursor: self.cursor,
        }
    }

    fn context(&self) -> ParseContext<'_> {
        ParseContext::new(&self.config, self.registry.as_ref())
    }

    fn parse(&self, query: &str) -> Option<ParsedQuery> {
        parser::parse(query, &self.context())
    }

    fn update_query(&mut self, query: String, cursor: usize) {
        let query = splice::char_prefix(&query, self.options.max_query_length);
        self.cursor = cursor.min(splice::char_len(&query));
        self.parsed = self.parse(&query);
        self.query = query;
        self.invalidate_suggestions();
    }

    fn invalidate_suggestions(&mut self) {
        if let Dropdown::Open(suggestions) = &mut self.dropdown {
            suggestions.invalidate();
        }
    }

    // ---- input events ----

    /// Replaces the query text, as typed into the input.
    pub fn set_query(&mut self, query: &str, cursor: usize) {
        self.update_query(query.to_string(), cursor);
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        let cursor = cursor.min(splice::char_len(&self.query));
        if cursor != self.cursor {
            self.cursor = cursor;
            self.invalidate_suggestions();
        }
    }

    pub async fn focus(&mut self) {
        self.refresh().await;
    }

    pub fn close(&mut self) {
        self.dropdown = Dropdown::Closed;
    }

    /// Re-derives suggestions for the current query and caret.
    pub async fn refresh(&mut self) {
        if let Some(response) = self.request().resolve().await {
            self.apply(response);
        }
    }

    /// Shows a response unless the query or caret moved since it was
    /// requested.
    pub fn apply(&mut self, response: SuggestionResponse) -> bool {
        if response.snapshot.query != self.query || response.snapshot.cursor != self.cursor {
            debug!(
                requested = %response.snapshot.query,
                current = %self.query,
                "discarding stale suggestions"
            );
            return false;
        }
        self.dropdown = Dropdown::Open(response.suggestions);
        true
    }

    // ---- cursor lookups ----

    /// Filter or free-text token under the caret.
    pub fn cursor_token(&self) -> Option<&Token> {
        let parsed = self.parsed.as_ref()?;
        let cursor = self.cursor;
        tree::locate(
            parsed.tokens(),
            |token| match token.kind {
                TokenKind::Filter(_) | TokenKind::FreeText { .. } => {
                    if tree::is_within_token(token, cursor) {
                        Visit::Found(Some(token))
                    } else {
                        Visit::Skip
                    }
                }
                _ => Visit::Continue,
            },
            None,
        )
    }

    /// Text value under the caret inside the cursor filter.
    pub fn cursor_value(&self) -> Option<&Token> {
        let filter = self.cursor_token()?.as_filter()?;
        let cursor = self.cursor;
        tree::locate(
            std::slice::from_ref(&*filter.value),
            |token| match token.kind {
                TokenKind::ValueText { .. } => {
                    if tree::is_within_token(token, cursor) {
                        Visit::Found(Some(token))
                    } else {
                        Visit::Skip
                    }
                }
                _ => Visit::Continue,
            },
            None,
        )
    }

    /// Word under the caret, bounded by spaces and colons, without a leading
    /// `!`.
    pub fn cursor_search_term(&self) -> Option<CursorSearchTerm> {
        let token = self.cursor_token()?;
        let text: Vec<char> = token.text.chars().collect();
        let is_limiter = |c: char| c == ' ' || c == ':';
        let inner = self.cursor.saturating_sub(token.start()).min(text.len());

        let mut start = inner;
        while start > 0 && !is_limiter(text[start - 1]) {
            start -= 1;
        }
        let mut end = inner;
        while end < text.len() && !is_limiter(text[end]) {
            end += 1;
        }
        if text.get(start) == Some(&'!') && start < end {
            start += 1;
        }
        Some(CursorSearchTerm {
            search_term: text[start..end].iter().collect(),
            start: token.start() + start,
            end: token.start() + end,
        })
    }

    /// Top-level filters.
    pub fn filter_tokens(&self) -> Vec<&Token> {
        self.parsed
            .as_ref()
            .map(ParsedQuery::filters)
            .unwrap_or_default()
    }

    /// Shortcuts that can run for the current caret.
    pub fn shortcuts(&self) -> Vec<&'static Shortcut> {
        shortcuts::available(self.cursor_token(), self.filter_tokens().len())
    }

    // ---- suggestion derivation ----

    fn query_chars_left(&self, search_term: &str) -> Option<usize> {
        if self.query.is_empty() {
            return None;
        }
        Some(
            self.options
                .max_query_length
                .saturating_sub(splice::char_len(&self.query))
                + splice::char_len(search_term),
        )
    }

    fn base_request(&self, mode: SuggestionMode, search_term: &str) -> SuggestionRequest {
        SuggestionRequest {
            snapshot: self.snapshot(),
            mode,
            search_term: search_term.to_string(),
            item_type: ItemType::TagKey,
            items: Vec::new(),
            leading: Vec::new(),
            fixed: None,
            fetch_values: None,
            fetch_recent: false,
            max_search_items: self.options.max_search_items,
            query_chars_left: self.query_chars_left(search_term),
            date_range: self.date_range.clone(),
            tag_values: self.tag_values.clone(),
            recent_searches: self.recent_searches.clone(),
        }
    }

    /// Key suggestions matching `search_term`.
    pub fn tag_keys(&self, search_term: &str) -> Vec<SearchItem> {
        let mut keys: Vec<String> = self.tags.keys().cloned().collect();
        if !search_term.is_empty() {
            keys = filter_keys_from_query(&keys, search_term, self.registry.as_ref());
        }
        if self.options.exclude_environment {
            keys.retain(|key| key != "environment");
        }
        get_tag_items_from_keys(&keys, &self.tags, self.registry.as_ref())
    }

    /// Describes the suggestions for the current snapshot without running
    /// any lookups.
    pub fn request(&self) -> SuggestionRequest {
        if self.query.trim().is_empty() {
            return self.default_request();
        }
        let Some(token) = self.cursor_token() else {
            return self.default_request();
        };
        match &token.kind {
            TokenKind::Filter(filter) => self.filter_request(filter),
            _ => {
                let term = self
                    .cursor_search_term()
                    .map(|term| term.search_term)
                    .unwrap_or_default();
                self.tag_key_request(&term)
            }
        }
    }

    fn default_request(&self) -> SuggestionRequest {
        let mut request = self.base_request(SuggestionMode::DefaultSearches, "");
        if self.options.default_search_items.is_empty() {
            request.items = self.tag_keys("");
        } else {
            request.item_type = ItemType::Default;
            request.items = self.options.default_search_items.clone();
        }
        request.fetch_recent = self.options.has_recent_searches;
        request
    }

    fn tag_key_request(&self, search_term: &str) -> SuggestionRequest {
        let mut request = self.base_request(SuggestionMode::TagKeys, search_term);
        request.items = self.tag_keys(search_term);
        request.fetch_recent = self.options.has_recent_searches;
        request
    }

    fn is_date_key(&self, key: &str) -> bool {
        KeyValidation::new(&self.context()).is_date(key)
    }

    fn is_boolean_key(&self, key: &str) -> bool {
        KeyValidation::new(&self.context()).is_boolean(key)
    }

    fn filter_request(&self, filter: &Filter) -> SuggestionRequest {
        let tag_name = tree::key_name(&filter.key, true);
        let cursor = self.cursor;
        let ops = get_valid_ops(filter, &self.config);

        if tree::is_within_token(&filter.value, cursor) {
            let search_text = match self.cursor_value() {
                Some(value) if value.text != "[]" => value.text.clone(),
                _ => String::new(),
            };

            if self.is_date_key(&tag_name) {
                if matches!(filter.value.kind, TokenKind::ValueRelativeDate { .. }) {
                    let mut request = self.base_request(SuggestionMode::TagValues, &search_text);
                    request.fixed = Some(vec![SearchGroup::new(
                        ItemType::TagValue,
                        items::relative_date_items(),
                    )]);
                    return request;
                }
                let mut request = self.base_request(SuggestionMode::DatePicker, &search_text);
                request.fixed = Some(items::date_groups(Utc::now()));
                return request;
            }

            let mut request = self.base_request(SuggestionMode::TagValues, &search_text);
            request.item_type = ItemType::TagValue;
            let at_value_start = cursor == filter.value.start();
            match self.value_suggestions(&tag_name, &search_text) {
                ValueSuggestions::InvalidTag => {
                    let item = SearchItem {
                        item_type: ItemType::InvalidTag,
                        title: Some(tag_name.clone()),
                        desc: Some(tag_name.clone()),
                        ..SearchItem::default()
                    };
                    request.fixed = Some(vec![SearchGroup::new(ItemType::InvalidTag, vec![item])]);
                    return request;
                }
                ValueSuggestions::Excluded => {
                    request.fixed = Some(if at_value_start {
                        vec![operator_group(&ops, &tag_name)]
                    } else {
                        Vec::new()
                    });
                    return request;
                }
                ValueSuggestions::Items(values) => request.items = values,
                ValueSuggestions::Fetch(tag) => request.fetch_values = Some(tag),
            }
            if at_value_start {
                request.leading.push(operator_group(&ops, &tag_name));
            }
            return request;
        }

        if tree::is_within_token(&filter.key, cursor) {
            let mut request = self.tag_key_request(&tag_name);
            if cursor == filter.key.end() {
                request.leading.push(operator_group(&ops, &tag_name));
            }
            return request;
        }

        let mut request = self.base_request(SuggestionMode::Operators, "");
        request.fixed = Some(vec![operator_group(&ops, &tag_name)]);
        request
    }

    fn value_suggestions(&self, tag_name: &str, query: &str) -> ValueSuggestions {
        let Some(tag) = self.tags.get(tag_name) else {
            return ValueSuggestions::InvalidTag;
        };
        if self.options.exclude_environment && tag.key == "environment" {
            return ValueSuggestions::Excluded;
        }

        let query = query.to_lowercase();
        let matching = |values: &[&str]| -> Vec<SearchItem> {
            values
                .iter()
                .filter(|value| value.to_lowercase().contains(&query))
                .map(|value| SearchItem::new(ItemType::TagValue, *value))
                .collect()
        };
        if tag.predefined {
            let values: Vec<&str> = tag.values.iter().map(String::as_str).collect();
            return ValueSuggestions::Items(matching(&values));
        }
        if self.is_boolean_key(&tag.key) {
            return ValueSuggestions::Items(matching(&["true", "false"]));
        }
        ValueSuggestions::Fetch(tag.clone())
    }

    // ---- edits ----

    /// Splices a chosen suggestion into the query.
    pub fn autocomplete(&mut self, item: &SearchItem) -> bool {
        let Some(value) = item.value.as_deref() else {
            return false;
        };
        if item.item_type == ItemType::RecentSearch {
            let cursor = splice::char_len(value);
            self.update_query(value.to_string(), cursor);
            return true;
        }
        match self.autocomplete_edit(value, item.item_type) {
            Some(edit) => {
                self.update_query(edit.query, edit.cursor);
                true
            }
            None => false,
        }
    }

    fn autocomplete_edit(&self, replace_text: &str, item_type: ItemType) -> Option<Edit> {
        let query = self.query.as_str();
        let cursor = self.cursor;
        let Some(token) = self.cursor_token() else {
            return Some(Edit {
                query: format!("{query}{replace_text}"),
                cursor: splice::char_len(query) + splice::char_len(replace_text),
            });
        };

        match &token.kind {
            TokenKind::Filter(filter) if item_type == ItemType::TagOperator => {
                let replacement = match replace_text.strip_prefix('!') {
                    Some(rest) => format!("!{}{}", filter.key.text, rest),
                    None => format!("{}{}", filter.key.text, replace_text),
                };
                Some(splice::replace_clause(
                    query,
                    token.start(),
                    filter.value.start(),
                    &replacement,
                    false,
                ))
            }
            TokenKind::Filter(filter) if tree::is_within_token(&filter.value, cursor) => {
                Some(self.value_edit(filter, replace_text, item_type))
            }
            TokenKind::Filter(filter) if tree::is_within_token(&filter.key, cursor) => {
                Some(splice::replace_clause(
                    query,
                    filter.key.start(),
                    filter.key.end() + 1,
                    replace_text,
                    false,
                ))
            }
            TokenKind::FreeText { .. } => {
                let term = self.cursor_search_term()?;
                Some(splice::replace_clause(
                    query,
                    term.start,
                    term.end,
                    replace_text,
                    true,
                ))
            }
            _ => None,
        }
    }

    fn value_edit(&self, filter: &Filter, replace_text: &str, item_type: ItemType) -> Edit {
        let query = self.query.as_str();
        let cursor_value = self.cursor_value();

        if filter.filter == FilterType::TextIn {
            // an empty slot such as `key:[a, ]` has no value token
            let (start, end) = match cursor_value {
                Some(value) => (value.start(), value.end()),
                None => (self.cursor, self.cursor),
            };
            return splice::replace_clause(query, start, end, replace_text, false);
        }

        let value = cursor_value.unwrap_or(&filter.value);
        if value.text == "[]" {
            return splice::replace_clause(
                query,
                value.start() + 1,
                value.end() - 1,
                replace_text,
                false,
            );
        }

        let mut replacement = if tree::key_name(&filter.key, false) == "user" {
            format!("\"{}\"", replace_text.trim())
        } else {
            replace_text.to_string()
        };
        let next = query.chars().nth(value.end());
        let mut end = value.end();
        if item_type != ItemType::TagValueIsoDate {
            match next {
                Some(' ') => {
                    end += 1;
                    replacement.push(' ');
                }
                None => replacement.push(' '),
                Some(_) => {}
            }
        }
        splice::replace_clause(query, filter.value.start(), end, &replacement, true)
    }

    /// Runs a shortcut if its predicate allows it.
    pub fn run_shortcut(&mut self, shortcut_type: ShortcutType) -> bool {
        match self.shortcut_edit(shortcut_type) {
            Some(edit) => {
                self.update_query(edit.query, edit.cursor);
                true
            }
            None => false,
        }
    }

    fn shortcut_edit(&self, shortcut_type: ShortcutType) -> Option<Edit> {
        let token = self.cursor_token();
        let filters = self.filter_tokens();
        SHORTCUTS.iter().find(|shortcut| {
            shortcut.shortcut_type == shortcut_type && shortcut.can_run(token, filters.len())
        })?;

        match shortcut_type {
            ShortcutType::Delete => Some(shortcuts::delete_token(&self.query, token?)),
            ShortcutType::Negate => shortcuts::toggle_negation(&self.query, token?, self.cursor),
            ShortcutType::Next | ShortcutType::Previous => {
                let cursor = shortcuts::cycle_target(token, &filters, shortcut_type)?;
                Some(Edit {
                    query: self.query.clone(),
                    cursor,
                })
            }
        }
    }

    /// Handles a navigation key while the input has focus.
    pub fn on_key(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::ArrowDown | Key::ArrowUp => {
                let Dropdown::Open(suggestions) = &mut self.dropdown else {
                    return KeyOutcome::Ignored;
                };
                if suggestions.stale {
                    return KeyOutcome::Ignored;
                }
                let count = suggestions.flat_items.len();
                if count == 0 {
                    return KeyOutcome::Ignored;
                }
                suggestions.active = Some(match (key, suggestions.active) {
                    (Key::ArrowDown, Some(index)) => (index + 1) % count,
                    (Key::ArrowDown, None) => 0,
                    (_, Some(index)) => (index + count - 1) % count,
                    (_, None) => count - 1,
                });
                KeyOutcome::Moved
            }
            Key::Tab | Key::Enter => {
                let active = self
                    .suggestions()
                    .and_then(Suggestions::active_item)
                    .cloned();
                match active {
                    Some(item) => {
                        self.autocomplete(&item);
                        KeyOutcome::Autocompleted
                    }
                    None if key == Key::Enter => KeyOutcome::SubmitRequested,
                    None => KeyOutcome::Ignored,
                }
            }
            Key::Escape => {
                self.close();
                KeyOutcome::Closed
            }
        }
    }

    /// Returns the query to search for, unless a token is invalid.
    ///
    /// A query that does not parse is passed through as is.
    pub fn submit(&mut self) -> Result<String, SubmitError> {
        self.close();
        if let Some((token, reason)) = self.parsed.as_ref().and_then(ParsedQuery::first_invalid) {
            return Err(SubmitError::InvalidFilter {
                text: token.text.clone(),
                reason: reason.reason.clone(),
                offset: token.start(),
            });
        }
        Ok(self.query.clone())
    }
}
