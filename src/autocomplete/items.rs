//! Suggestion items and the helpers that build and group them.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ast::{Filter, FilterType, TermOperator};
use crate::autocomplete::sources::TagCollection;
use crate::config::ParserConfig;
use crate::registry::{FieldKind, FieldRegistry};
use crate::tree;

static FUNCTION_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*\)").expect("valid regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    #[default]
    Default,
    TagKey,
    TagValue,
    TagValueIsoDate,
    TagOperator,
    RecentSearch,
    InvalidTag,
}

impl ItemType {
    /// Heading of a suggestion group holding items of this type.
    pub fn group_title(self) -> &'static str {
        match self {
            ItemType::TagValue | ItemType::TagValueIsoDate => "Values",
            ItemType::RecentSearch => "Recent Searches",
            ItemType::Default => "Common Search Terms",
            ItemType::TagOperator => "Operator Helpers",
            ItemType::InvalidTag => "Invalid Tag",
            ItemType::TagKey => "Keys",
        }
    }
}

/// One entry of the suggestion dropdown.
///
/// `value` is the text spliced into the query when the item is chosen; parent
/// entries synthesised for key grouping have none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchItem {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub value: Option<String>,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub documentation: Option<String>,
    pub kind: Option<FieldKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SearchItem>,
    pub ignore_max_search_items: bool,
}

impl SearchItem {
    pub fn new(item_type: ItemType, value: impl Into<String>) -> Self {
        let value = value.into();
        SearchItem {
            item_type,
            desc: Some(value.clone()),
            value: Some(value),
            ..SearchItem::default()
        }
    }

    fn value_len(&self) -> usize {
        self.value.as_deref().map_or(0, |v| v.chars().count())
    }
}

/// A titled bucket of suggestions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchGroup {
    pub title: String,
    #[serde(rename = "type")]
    pub group_type: ItemType,
    pub children: Vec<SearchItem>,
}

impl SearchGroup {
    pub fn new(group_type: ItemType, children: Vec<SearchItem>) -> Self {
        SearchGroup {
            title: group_type.group_title().to_string(),
            group_type,
            children,
        }
    }
}

/// Operators that may be offered for a filter.
///
/// An invalid filter offers the operators of the types it was expected to
/// be; interchangeable types contribute theirs too.
pub fn get_valid_ops(filter: &Filter, config: &ParserConfig) -> Vec<TermOperator> {
    let types = match filter.invalid.as_ref().and_then(|i| i.expected_type.as_ref()) {
        Some(expected) if !expected.is_empty() => expected.clone(),
        _ => vec![filter.filter],
    };

    let text_operators = filter.filter == FilterType::Text
        && config
            .text_operator_keys
            .contains(&tree::key_name(&filter.key, false));

    let mut seen = HashSet::new();
    let mut ops = Vec::new();
    for filter_type in types
        .iter()
        .flat_map(|t| std::iter::once(t).chain(t.interchangeable()))
    {
        let valid = if text_operators {
            FilterType::Numeric.config().valid_ops
        } else {
            filter_type.config().valid_ops
        };
        for op in valid {
            if seen.insert(*op) {
                ops.push(*op);
            }
        }
    }
    ops
}

/// Suggestion for one operator on `key`.
pub fn operator_item(op: TermOperator, key: &str) -> SearchItem {
    let (value, desc, documentation) = match op {
        TermOperator::Default => (":", format!("{key}:[value]"), "is equal to"),
        TermOperator::GreaterThanEqual => (
            ":>=",
            format!("{key}:>=[value]"),
            "is greater than or equal to",
        ),
        TermOperator::LessThanEqual => {
            (":<=", format!("{key}:<=[value]"), "is less than or equal to")
        }
        TermOperator::GreaterThan => (":>", format!("{key}:>[value]"), "is greater than"),
        TermOperator::LessThan => (":<", format!("{key}:<[value]"), "is less than"),
        TermOperator::Equal => (":=", format!("{key}:=[value]"), "is equal to"),
        TermOperator::NotEqual => ("!:", format!("!{key}:[value]"), "is not equal to"),
    };
    SearchItem {
        item_type: ItemType::TagOperator,
        value: Some(value.to_string()),
        desc: Some(desc),
        documentation: Some(documentation.to_string()),
        ..SearchItem::default()
    }
}

/// Group of operator suggestions for a key.
pub fn operator_group(ops: &[TermOperator], key: &str) -> SearchGroup {
    SearchGroup::new(
        ItemType::TagOperator,
        ops.iter().map(|op| operator_item(*op, key)).collect(),
    )
}

/// Builds key suggestions, nesting `a.b` keys under an `a` entry.
///
/// Keys are sorted first. When the parent key exists on its own it provides
/// the parent entry's value; otherwise the parent is a blank heading.
pub fn get_tag_items_from_keys(
    tag_keys: &[String],
    supported: &TagCollection,
    registry: &dyn FieldRegistry,
) -> Vec<SearchItem> {
    let mut keys = tag_keys.to_vec();
    keys.sort();

    let mut groups: Vec<SearchItem> = Vec::new();
    for key in keys {
        let supported_kind = supported.get(&key).and_then(|tag| tag.kind);
        let definition = if supported_kind == Some(FieldKind::Function) {
            registry.field_definition(key.split('(').next().unwrap_or(&key))
        } else {
            registry.field_definition(&key)
        };
        let kind = supported_kind.or(definition.as_ref().map(|d| d.kind));
        let item = SearchItem {
            item_type: ItemType::TagKey,
            value: Some(format!("{key}:")),
            title: Some(key.clone()),
            documentation: Some(
                definition
                    .as_ref()
                    .and_then(|d| d.desc.clone())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            kind,
            ..SearchItem::default()
        };

        let section = key.split('.').next().unwrap_or(&key).to_string();
        if kind != Some(FieldKind::Function)
            && let Some(last) = groups.last_mut()
        {
            let last_title = last.title.clone().unwrap_or_default();
            if !last.children.is_empty() && last_title == section {
                last.children.push(item);
                continue;
            }
            if last_title.split('.').next() == Some(section.as_str()) {
                let previous = std::mem::take(last);
                *last = if last_title == section {
                    // the standalone key becomes the parent
                    SearchItem {
                        children: vec![item],
                        ..previous
                    }
                } else {
                    SearchItem {
                        item_type: ItemType::TagKey,
                        title: Some(section),
                        documentation: Some("-".to_string()),
                        kind: previous.kind,
                        children: vec![previous, item],
                        ..SearchItem::default()
                    }
                };
                continue;
            }
        }
        groups.push(item);
    }
    groups
}

/// Keys matching `search_term`, key-name matches first.
///
/// A key matches when its name (function arguments removed) contains the
/// term, or when its description or keywords do.
pub fn filter_keys_from_query(
    tag_keys: &[String],
    search_term: &str,
    registry: &dyn FieldRegistry,
) -> Vec<String> {
    let term = search_term.to_lowercase();
    let mut matches: Vec<(bool, &String)> = tag_keys
        .iter()
        .filter_map(|key| {
            let bare = FUNCTION_PART.replace_all(key, "").to_lowercase();
            let definition = registry.field_definition(&bare);
            let keywords = definition
                .map(|d| {
                    d.desc
                        .into_iter()
                        .chain(d.keywords)
                        .collect::<Vec<_>>()
                        .join(" ")
                        .to_lowercase()
                })
                .unwrap_or_default();
            let in_key = bare.contains(&term);
            let in_keywords = !term.is_empty() && keywords.contains(&term);
            (in_key || in_keywords).then_some((in_key, key))
        })
        .collect();
    matches.sort_by(|(a_key, a), (b_key, b)| b_key.cmp(a_key).then_with(|| a.cmp(b)));
    matches.into_iter().map(|(_, key)| key.clone()).collect()
}

/// Wraps a value in quotes when it holds spaces or quotes.
pub fn escape_tag_value(value: &str) -> String {
    if value.contains(' ') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Relative date suggestions offered for date keys.
pub const RELATIVE_DATE_SUGGESTIONS: [&str; 6] = ["-1h", "-24h", "-7d", "-14d", "-30d", "+1d"];

pub fn relative_date_items() -> Vec<SearchItem> {
    RELATIVE_DATE_SUGGESTIONS
        .iter()
        .map(|value| SearchItem::new(ItemType::TagValue, *value))
        .collect()
}

/// Groups shown by the date picker: relative suggestions plus an absolute
/// date to edit.
pub fn date_groups(now: DateTime<Utc>) -> Vec<SearchGroup> {
    let absolute = SearchItem {
        title: Some("Absolute date".to_string()),
        ..SearchItem::new(
            ItemType::TagValueIsoDate,
            now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        )
    };
    vec![
        SearchGroup::new(ItemType::TagValue, relative_date_items()),
        SearchGroup {
            title: "Absolute".to_string(),
            group_type: ItemType::TagValueIsoDate,
            children: vec![absolute],
        },
    ]
}

/// Result of [`filter_search_items`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredItems {
    pub search_items: Vec<SearchItem>,
    pub recent_items: Option<Vec<SearchItem>>,
}

/// Applies the item cap and drops items that no longer fit in the query.
pub fn filter_search_items(
    mut search_items: Vec<SearchItem>,
    mut recent_items: Option<Vec<SearchItem>>,
    max_search_items: Option<usize>,
    query_chars_left: Option<usize>,
) -> FilteredItems {
    if let Some(max) = max_search_items.filter(|max| *max > 0) {
        search_items = search_items
            .into_iter()
            .enumerate()
            .filter(|(index, item)| *index < max || item.ignore_max_search_items)
            .map(|(_, item)| item)
            .collect();
    }

    if let Some(left) = query_chars_left {
        let fits = |item: &SearchItem| item.value.is_none() || item.value_len() <= left;
        search_items = search_items
            .into_iter()
            .filter_map(|mut item| {
                if item.children.is_empty() {
                    return fits(&item).then_some(item);
                }
                item.children.retain(|child| fits(child));
                (!item.children.is_empty()).then_some(item)
            })
            .filter(|item| fits(item))
            .collect();
        if let Some(recent) = recent_items.as_mut() {
            recent.retain(|item| fits(item));
        }
    }

    FilteredItems {
        search_items,
        recent_items,
    }
}

/// Groups for one suggestion state, with the flattened list used for
/// keyboard navigation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchGroups {
    pub groups: Vec<SearchGroup>,
    pub flat_items: Vec<SearchItem>,
}

pub fn create_search_groups(
    search_items: Vec<SearchItem>,
    recent_items: Option<Vec<SearchItem>>,
    item_type: ItemType,
    max_search_items: Option<usize>,
    query_chars_left: Option<usize>,
    default_group: Option<SearchGroup>,
) -> SearchGroups {
    let filtered = filter_search_items(
        search_items,
        recent_items,
        max_search_items,
        query_chars_left,
    );

    let mut groups = vec![SearchGroup::new(item_type, filtered.search_items)];
    if let Some(recent) = filtered.recent_items.filter(|r| !r.is_empty()) {
        groups.push(SearchGroup::new(ItemType::RecentSearch, recent));
    }
    if let Some(mut default_group) = default_group {
        if let Some(max) = max_search_items.filter(|max| *max > 0) {
            default_group.children.truncate(max);
        }
        groups.push(default_group);
    }
    SearchGroups::from_groups(groups)
}

impl SearchGroups {
    pub fn from_groups(groups: Vec<SearchGroup>) -> Self {
        let flat_items = flatten(&groups);
        SearchGroups { groups, flat_items }
    }
}

/// Items in display order; parents without a value are headings only.
pub fn flatten(groups: &[SearchGroup]) -> Vec<SearchItem> {
    let mut flat = Vec::new();
    for item in groups.iter().flat_map(|g| &g.children) {
        if item.value.is_some() {
            flat.push(SearchItem {
                children: Vec::new(),
                ..item.clone()
            });
        }
        flat.extend(item.children.iter().filter(|c| c.value.is_some()).cloned());
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_quotes_values_with_spaces() {
        assert_eq!(escape_tag_value("chrome"), "chrome");
        assert_eq!(escape_tag_value("Mobile Safari"), "\"Mobile Safari\"");
        assert_eq!(escape_tag_value("a\"b"), "\"a\\\"b\"");
    }

    #[test]
    fn max_items_keeps_flagged_items() {
        let mut pinned = SearchItem::new(ItemType::TagValue, "pinned");
        pinned.ignore_max_search_items = true;
        let items = vec![
            SearchItem::new(ItemType::TagValue, "a"),
            SearchItem::new(ItemType::TagValue, "b"),
            pinned,
        ];
        let filtered = filter_search_items(items, None, Some(1), None);
        let values: Vec<_> = filtered
            .search_items
            .iter()
            .filter_map(|i| i.value.as_deref())
            .collect();
        assert_eq!(values, vec!["a", "pinned"]);
    }

    #[test]
    fn chars_left_drops_long_values() {
        let items = vec![
            SearchItem::new(ItemType::TagValue, "short"),
            SearchItem::new(ItemType::TagValue, "much-too-long"),
        ];
        let recent = Some(vec![SearchItem::new(ItemType::RecentSearch, "is:unresolved")]);
        let filtered = filter_search_items(items, recent, None, Some(6));
        assert_eq!(filtered.search_items.len(), 1);
        assert_eq!(filtered.recent_items, Some(vec![]));
    }
}
