//! Cursor-aware autocomplete for the search input.
//!
//! [`SearchBar`] owns the query text and the caret. Every change re-parses
//! the query, and suggestions are derived from the token under the caret:
//! keys while typing a key, operators and values inside a filter, and common
//! searches for an empty query. Tag values and recent searches come from
//! async collaborators behind a debounce.
//!
//! ```
//! use std::sync::Arc;
//! use search_syntax::autocomplete::{SearchBar, tags_from_registry};
//! use search_syntax::config::{ParserConfig, SearchBarOptions};
//! use search_syntax::registry::StaticFieldRegistry;
//!
//! let registry = StaticFieldRegistry::builtin();
//! let tags = tags_from_registry(&registry);
//! let mut bar = SearchBar::new(
//!     SearchBarOptions::default(),
//!     ParserConfig::default(),
//!     Arc::new(registry),
//!     tags,
//! );
//! bar.set_query("is:unresolved brow", 18);
//! assert!(bar.cursor_token().is_some());
//! ```

pub mod engine;
pub mod items;
pub mod shortcuts;
pub mod sources;
pub mod splice;

pub use engine::{
    CursorSearchTerm, Dropdown, Key, KeyOutcome, SearchBar, Snapshot, SubmitError,
    SuggestionMode, SuggestionRequest, SuggestionResponse, Suggestions,
};
pub use items::{ItemType, SearchGroup, SearchGroups, SearchItem};
pub use shortcuts::{SHORTCUTS, Shortcut, ShortcutType};
pub use sources::{
    DateRangeParams, Debouncer, RecentSearch, RecentSearchLookup, RecentSearchSource,
    SourceError, StaticTagValues, Tag, TagCollection, TagValueLookup, TagValueSource,
    load_tags, tag_collection, tags_from_registry,
};
pub use splice::Edit;
