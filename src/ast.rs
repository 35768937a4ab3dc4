//! # Search Query Language - Token Model
//!
//! This module defines the token tree produced by the parser. Unlike a classic
//! AST, every node keeps the exact text it was parsed from and its location in
//! the query, so the tree can be rendered positionally over the raw input and
//! the query can be rebuilt byte for byte.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Positioned tokens and their variant payloads
//! - **[filters]** - Filter types, term operators, the per-type configuration
//!   table and invalid reasons
//! - **[query]** - The top-level parsed query
//!
//! ## Quick Start
//!
//! ```text
//! is:unresolved !browser:firefox (device.arch:arm64 OR age:>24h) timeout
//! ```
//!
//! parses into a `Filter` (`Is`), a negated `Filter` (`Text`), a `LogicGroup`
//! holding two filters joined by a `LogicBoolean`, and `FreeText`, with
//! `Spaces` tokens in between.
//!
//! ## Filters
//!
//! A filter is `[!]key:[operator]value`. Which [`FilterType`] a filter gets is
//! decided by the grammar trying each type in a fixed priority order and the
//! key registry accepting the key for that type. Anything that does not fit a
//! typed filter falls back to a `Text` filter, which is where invalid reasons
//! are attached:
//!
//! ```text
//! age:>1d              // Duration
//! timestamp:-24h       // RelativeDate
//! id:[1,2,3]           // NumericIn
//! count():>100         // AggregateNumeric
//! error.handled:maybe  // Text, invalid (expects Boolean)
//! ```
pub mod filters;
pub mod query;
pub mod tokens;

pub use filters::{FilterType, FilterTypeConfig, InvalidKind, InvalidReason, TermOperator};
pub use query::ParsedQuery;
pub use tokens::{
    BooleanOperator, DurationUnit, Filter, ListItem, Location, NumberUnit, RelativeDateUnit, Sign,
    Token, TokenKind, TokenType,
};
