// tests/autocomplete_tests.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use search_syntax::autocomplete::{
    DateRangeParams, Dropdown, ItemType, Key, KeyOutcome, RecentSearch, RecentSearchSource,
    SearchBar, SearchItem, ShortcutType, SourceError, SubmitError, SuggestionMode, Tag,
    TagValueSource, Suggestions, tag_collection, tags_from_registry,
};
use search_syntax::{ParserConfig, SearchBarOptions, StaticFieldRegistry};

// ============================================================================
// In-memory collaborators
// ============================================================================

#[derive(Default)]
struct FakeValues {
    values: Vec<&'static str>,
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl TagValueSource for FakeValues {
    async fn fetch_tag_values(
        &self,
        _tag: &Tag,
        query: &str,
        _params: &DateRangeParams,
    ) -> Result<Vec<String>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SourceError::Failed("boom".to_string()));
        }
        Ok(self
            .values
            .iter()
            .filter(|value| value.contains(query))
            .map(|value| value.to_string())
            .collect())
    }
}

struct FakeRecent(Vec<&'static str>);

#[async_trait]
impl RecentSearchSource for FakeRecent {
    async fn fetch_recent_searches(&self, _query: &str) -> Result<Vec<RecentSearch>, SourceError> {
        Ok(self
            .0
            .iter()
            .map(|query| RecentSearch {
                query: query.to_string(),
                last_seen: None,
            })
            .collect())
    }
}

fn options() -> SearchBarOptions {
    SearchBarOptions {
        has_recent_searches: false,
        ..SearchBarOptions::default()
    }
}

fn bar_with(options: SearchBarOptions) -> SearchBar {
    let registry = StaticFieldRegistry::builtin();
    let tags = tags_from_registry(&registry);
    SearchBar::new(options, ParserConfig::default(), Arc::new(registry), tags)
}

fn bar() -> SearchBar {
    bar_with(options())
}

fn open(bar: &SearchBar) -> &Suggestions {
    match bar.dropdown() {
        Dropdown::Open(suggestions) => suggestions,
        Dropdown::Closed => panic!("dropdown is closed"),
    }
}

fn values(suggestions: &Suggestions) -> Vec<&str> {
    suggestions
        .flat_items
        .iter()
        .filter_map(|item| item.value.as_deref())
        .collect()
}

fn group_types(suggestions: &Suggestions) -> Vec<ItemType> {
    suggestions.groups.iter().map(|g| g.group_type).collect()
}

// ============================================================================
// Suggestion states
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_empty_query_shows_keys_and_recent_searches() {
    let mut bar = bar_with(SearchBarOptions::default())
        .with_recent_searches(Arc::new(FakeRecent(vec!["is:unresolved"])));
    bar.focus().await;

    let suggestions = open(&bar);
    assert_eq!(suggestions.mode, SuggestionMode::DefaultSearches);
    assert_eq!(
        group_types(suggestions),
        [ItemType::TagKey, ItemType::RecentSearch]
    );
    assert!(values(suggestions).contains(&"browser:"));
    assert!(values(suggestions).contains(&"is:unresolved"));
}

#[tokio::test(start_paused = true)]
async fn test_default_search_items_replace_keys() {
    let mut bar = bar_with(SearchBarOptions {
        default_search_items: vec![SearchItem::new(ItemType::Default, "is:unresolved")],
        ..options()
    });
    bar.focus().await;

    let suggestions = open(&bar);
    assert_eq!(group_types(suggestions), [ItemType::Default]);
    assert_eq!(values(suggestions), ["is:unresolved"]);
}

#[tokio::test(start_paused = true)]
async fn test_free_text_suggests_matching_keys() {
    let mut bar = bar();
    bar.set_query("is:unresolved devi", 18);
    bar.refresh().await;

    let suggestions = open(&bar);
    assert_eq!(suggestions.mode, SuggestionMode::TagKeys);
    assert_eq!(suggestions.search_term, "devi");
    // the device keys are nested under the device entry
    let device = &suggestions.groups[0].children[0];
    assert_eq!(device.title.as_deref(), Some("device"));
    let children: Vec<_> = device
        .children
        .iter()
        .filter_map(|c| c.title.as_deref())
        .collect();
    assert_eq!(children, ["device.arch", "device.family", "device.name"]);
}

#[tokio::test(start_paused = true)]
async fn test_keywords_match_keys() {
    let mut bar = bar();
    bar.set_query("username", 8);
    bar.refresh().await;
    assert!(values(open(&bar)).contains(&"user:"));
}

#[tokio::test(start_paused = true)]
async fn test_value_suggestions_come_from_the_source() {
    let source = Arc::new(FakeValues {
        values: vec!["chrome", "Mobile Safari", "firefox"],
        ..FakeValues::default()
    });
    let mut bar = bar().with_tag_values(source.clone());
    bar.set_query("browser:", 8);
    bar.refresh().await;

    let suggestions = open(&bar);
    assert_eq!(suggestions.mode, SuggestionMode::TagValues);
    // the caret sits at the value start, so operators come first
    assert_eq!(
        group_types(suggestions),
        [ItemType::TagOperator, ItemType::TagValue]
    );
    let values: Vec<_> = suggestions.groups[1]
        .children
        .iter()
        .filter_map(|item| item.value.as_deref())
        .collect();
    assert_eq!(values, ["chrome", "\"Mobile Safari\"", "firefox"]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_results_are_remembered_per_prefix() {
    let source = Arc::new(FakeValues {
        values: vec!["chrome"],
        ..FakeValues::default()
    });
    let mut bar = bar().with_tag_values(source.clone());
    bar.set_query("browser:xy", 10);
    bar.refresh().await;
    bar.set_query("browser:xyz", 11);
    bar.refresh().await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(open(&bar).groups.last().unwrap().children.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failing_source_shows_no_values() {
    let source = Arc::new(FakeValues {
        fail: true,
        ..FakeValues::default()
    });
    let mut bar = bar().with_tag_values(source);
    bar.set_query("browser:ch", 10);
    bar.refresh().await;

    let suggestions = open(&bar);
    assert_eq!(suggestions.mode, SuggestionMode::TagValues);
    assert!(suggestions.flat_items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_predefined_and_boolean_values() {
    let mut bar = bar();
    bar.set_query("is:un", 5);
    bar.refresh().await;
    assert_eq!(
        values(open(&bar)),
        ["unresolved", "unassigned", "unlinked"]
    );

    bar.set_query("error.handled:t", 15);
    bar.refresh().await;
    assert_eq!(values(open(&bar)), ["true"]);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_tag() {
    let mut bar = bar();
    bar.set_query("nope:", 5);
    bar.refresh().await;

    let suggestions = open(&bar);
    assert_eq!(group_types(suggestions), [ItemType::InvalidTag]);
    assert_eq!(suggestions.groups[0].children[0].desc.as_deref(), Some("nope"));
    assert!(suggestions.flat_items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_excluded_environment() {
    let mut bar = bar_with(SearchBarOptions {
        exclude_environment: true,
        ..options()
    });
    bar.set_query("env", 3);
    bar.refresh().await;
    assert!(!values(open(&bar)).contains(&"environment:"));

    bar.set_query("environment:pro", 15);
    bar.refresh().await;
    assert!(open(&bar).flat_items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_date_keys_open_the_date_picker() {
    let mut bar = bar();
    bar.set_query("first_seen:", 11);
    bar.refresh().await;
    let suggestions = open(&bar);
    assert_eq!(suggestions.mode, SuggestionMode::DatePicker);
    assert!(values(suggestions).contains(&"-24h"));

    bar.set_query("last_seen:-24h", 14);
    bar.refresh().await;
    let suggestions = open(&bar);
    assert_eq!(suggestions.mode, SuggestionMode::TagValues);
    assert_eq!(
        values(suggestions),
        ["-1h", "-24h", "-7d", "-14d", "-30d", "+1d"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_configured_date_keys_parse_and_suggest_as_dates() {
    let config = ParserConfig {
        date_keys: ["deployed".to_string()].into_iter().collect(),
        ..ParserConfig::default()
    };
    let tags = tag_collection([Tag::new("deployed")]);
    let mut bar = SearchBar::new(options(), config, Arc::new(StaticFieldRegistry::new()), tags);

    bar.set_query("deployed:>2024-01-31", 20);
    let filter = bar.parsed_query().unwrap().filters()[0].as_filter().unwrap();
    assert_eq!(filter.filter, search_syntax::FilterType::Date);

    bar.set_query("deployed:", 9);
    bar.refresh().await;
    assert_eq!(open(&bar).mode, SuggestionMode::DatePicker);
}

#[tokio::test(start_paused = true)]
async fn test_caret_after_operator_region_offers_operators() {
    let mut bar = bar();
    bar.set_query("times_seen:>10", 11);
    bar.refresh().await;
    let suggestions = open(&bar);
    assert_eq!(suggestions.mode, SuggestionMode::Operators);
    assert_eq!(
        values(suggestions),
        [":", ":>=", ":<=", ":>", ":<", ":=", "!:"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_max_query_length_limits_suggestions() {
    let mut bar = bar_with(SearchBarOptions {
        max_query_length: 10,
        ..options()
    });
    bar.set_query("leve", 4);
    bar.refresh().await;
    // 10 - 4 + 4 chars are left for the key
    assert_eq!(values(open(&bar)), ["level:"]);

    bar.set_query("a b c leve", 10);
    bar.refresh().await;
    assert!(open(&bar).flat_items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stale_responses_are_discarded() {
    let mut bar = bar();
    bar.set_query("brow", 4);
    let request = bar.request();
    bar.set_query("brows", 5);

    let response = request.resolve().await.unwrap();
    assert!(!bar.apply(response));
    assert_eq!(bar.dropdown(), &Dropdown::Closed);

    let response = bar.request().resolve().await.unwrap();
    assert!(bar.apply(response));
}

// ============================================================================
// Autocompletion
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_complete_key_in_free_text() {
    let mut bar = bar();
    bar.set_query("is:unresolved brow", 18);
    assert!(bar.autocomplete(&SearchItem::new(ItemType::TagKey, "browser:")));
    assert_eq!(bar.query(), "is:unresolved browser:");
    assert_eq!(bar.cursor(), 22);
}

#[tokio::test(start_paused = true)]
async fn test_complete_key_keeps_following_text() {
    let mut bar = bar();
    bar.set_query("brow is:unresolved", 4);
    bar.autocomplete(&SearchItem::new(ItemType::TagKey, "browser:"));
    assert_eq!(bar.query(), "browser: is:unresolved");
    assert_eq!(bar.cursor(), 8);
}

#[tokio::test(start_paused = true)]
async fn test_complete_value() {
    let mut bar = bar();
    bar.set_query("browser:chr", 11);
    bar.autocomplete(&SearchItem::new(ItemType::TagValue, "chrome"));
    assert_eq!(bar.query(), "browser:chrome ");
    assert_eq!(bar.cursor(), 15);

    bar.set_query("browser:chr is:unresolved", 10);
    bar.autocomplete(&SearchItem::new(ItemType::TagValue, "chrome"));
    assert_eq!(bar.query(), "browser:chrome is:unresolved");
    assert_eq!(bar.cursor(), 15);
}

#[tokio::test(start_paused = true)]
async fn test_complete_value_keeps_the_operator() {
    let mut bar = bar();
    bar.set_query("release.version:>1.", 19);
    bar.autocomplete(&SearchItem::new(ItemType::TagValue, "1.2.0"));
    assert_eq!(bar.query(), "release.version:>1.2.0 ");
}

#[tokio::test(start_paused = true)]
async fn test_user_values_are_quoted() {
    let mut bar = bar();
    bar.set_query("user:", 5);
    bar.autocomplete(&SearchItem::new(ItemType::TagValue, "id:1"));
    assert_eq!(bar.query(), "user:\"id:1\" ");
}

#[tokio::test(start_paused = true)]
async fn test_complete_list_item() {
    let mut bar = bar();
    bar.set_query("browser:[chrome, fi]", 19);
    bar.autocomplete(&SearchItem::new(ItemType::TagValue, "firefox"));
    assert_eq!(bar.query(), "browser:[chrome, firefox]");
    assert_eq!(bar.cursor(), 24);
}

#[tokio::test(start_paused = true)]
async fn test_complete_operator() {
    let mut bar = bar();
    bar.set_query("times_seen:100", 11);
    bar.autocomplete(&SearchItem::new(ItemType::TagOperator, ":>"));
    assert_eq!(bar.query(), "times_seen:>100");
    assert_eq!(bar.cursor(), 12);

    bar.autocomplete(&SearchItem::new(ItemType::TagOperator, "!:"));
    assert_eq!(bar.query(), "!times_seen:100");
}

#[tokio::test(start_paused = true)]
async fn test_recent_search_replaces_the_query() {
    let mut bar = bar();
    bar.set_query("brow", 4);
    bar.autocomplete(&SearchItem::new(ItemType::RecentSearch, "is:unresolved age:>1d"));
    assert_eq!(bar.query(), "is:unresolved age:>1d");
    assert_eq!(bar.cursor(), 21);
}

#[tokio::test(start_paused = true)]
async fn test_heading_items_do_nothing() {
    let mut bar = bar();
    bar.set_query("dev", 3);
    assert!(!bar.autocomplete(&SearchItem::default()));
    assert_eq!(bar.query(), "dev");
}

// ============================================================================
// Keyboard
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_arrow_navigation_wraps() {
    let mut bar = bar();
    bar.set_query("is:un", 5);
    bar.refresh().await;

    assert_eq!(bar.on_key(Key::ArrowUp), KeyOutcome::Moved);
    assert_eq!(open(&bar).active, Some(2));
    assert_eq!(bar.on_key(Key::ArrowDown), KeyOutcome::Moved);
    assert_eq!(open(&bar).active, Some(0));
    assert_eq!(
        open(&bar).active_item().and_then(|i| i.value.as_deref()),
        Some("unresolved")
    );

    assert_eq!(bar.on_key(Key::Enter), KeyOutcome::Autocompleted);
    assert_eq!(bar.query(), "is:unresolved ");
}

#[tokio::test(start_paused = true)]
async fn test_selection_does_not_survive_autocomplete() {
    let mut bar = bar();
    bar.set_query("is:un", 5);
    bar.refresh().await;
    bar.on_key(Key::ArrowDown);

    assert_eq!(bar.on_key(Key::Tab), KeyOutcome::Autocompleted);
    assert_eq!(bar.query(), "is:unresolved ");
    assert!(open(&bar).stale);
    assert_eq!(open(&bar).active_item(), None);

    assert_eq!(bar.on_key(Key::ArrowDown), KeyOutcome::Ignored);
    assert_eq!(bar.on_key(Key::Enter), KeyOutcome::SubmitRequested);
    assert_eq!(bar.query(), "is:unresolved ");
}

#[tokio::test(start_paused = true)]
async fn test_typing_discards_the_selection() {
    let mut bar = bar();
    bar.set_query("brow", 4);
    bar.refresh().await;
    assert_eq!(bar.on_key(Key::ArrowDown), KeyOutcome::Moved);

    bar.set_query("timeout", 7);
    assert_eq!(bar.on_key(Key::Tab), KeyOutcome::Ignored);
    assert_eq!(bar.on_key(Key::Enter), KeyOutcome::SubmitRequested);
    assert_eq!(bar.query(), "timeout");

    // fresh suggestions can be selected again
    bar.refresh().await;
    assert!(!open(&bar).stale);
}

#[tokio::test(start_paused = true)]
async fn test_moving_the_caret_discards_the_selection() {
    let mut bar = bar();
    bar.set_query("is:un browser:chrome", 5);
    bar.refresh().await;
    bar.on_key(Key::ArrowDown);

    bar.set_cursor(18);
    assert_eq!(bar.on_key(Key::Enter), KeyOutcome::SubmitRequested);
    assert_eq!(bar.query(), "is:un browser:chrome");
}

#[tokio::test(start_paused = true)]
async fn test_enter_without_selection_requests_submit() {
    let mut bar = bar();
    bar.set_query("timeout", 7);
    assert_eq!(bar.on_key(Key::Enter), KeyOutcome::SubmitRequested);
    assert_eq!(bar.on_key(Key::ArrowDown), KeyOutcome::Ignored);
    bar.refresh().await;
    assert_eq!(bar.on_key(Key::Escape), KeyOutcome::Closed);
    assert_eq!(bar.dropdown(), &Dropdown::Closed);
}

// ============================================================================
// Shortcuts and submit
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_negate_shortcut_round_trips() {
    let mut bar = bar();
    bar.set_query("browser:chrome is:unresolved", 3);
    assert!(bar.run_shortcut(ShortcutType::Negate));
    assert_eq!(bar.query(), "!browser:chrome is:unresolved");
    assert_eq!(bar.cursor(), 4);
    assert!(bar.run_shortcut(ShortcutType::Negate));
    assert_eq!(bar.query(), "browser:chrome is:unresolved");
}

#[tokio::test(start_paused = true)]
async fn test_delete_and_move_shortcuts() {
    let mut bar = bar();
    bar.set_query("a:1 b:2 c:3", 1);
    assert!(bar.run_shortcut(ShortcutType::Next));
    assert_eq!(bar.cursor(), 7);
    assert!(bar.run_shortcut(ShortcutType::Delete));
    assert_eq!(bar.query(), "a:1 c:3");
    assert_eq!(bar.cursor(), 4);

    bar.set_query("timeout", 2);
    assert!(!bar.run_shortcut(ShortcutType::Delete));
    assert!(!bar.run_shortcut(ShortcutType::Next));
}

#[tokio::test(start_paused = true)]
async fn test_available_shortcuts() {
    let mut bar = bar();
    bar.set_query("!a:1 b:2", 2);
    let texts: Vec<_> = bar.shortcuts().iter().map(|s| s.text).collect();
    assert_eq!(texts, ["Delete", "Include", "Previous", "Next"]);
}

#[tokio::test(start_paused = true)]
async fn test_submit() {
    let mut bar = bar();
    bar.set_query("is:unresolved times_seen:lots", 0);
    assert_eq!(
        bar.submit(),
        Err(SubmitError::InvalidFilter {
            text: "times_seen:lots".to_string(),
            reason: "Invalid number. Expected number then optional k, m, or b suffix (e.g. 500k)"
                .to_string(),
            offset: 14,
        })
    );

    bar.set_query("is:unresolved", 0);
    assert_eq!(bar.submit(), Ok("is:unresolved".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_query_is_truncated() {
    let mut bar = bar_with(SearchBarOptions {
        max_query_length: 5,
        ..options()
    });
    bar.set_query("browser:chrome", 14);
    assert_eq!(bar.query(), "brows");
    assert_eq!(bar.cursor(), 5);
}

#[test]
fn test_tags_from_json() {
    let tags: Vec<Tag> =
        serde_json::from_str(r#"[{"key": "team", "name": "Team", "values": ["a"]}]"#).unwrap();
    let tags = tag_collection(tags);
    assert_eq!(tags["team"].values, ["a"]);
    assert!(!tags["team"].predefined);
}
