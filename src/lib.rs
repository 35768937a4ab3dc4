pub mod ast;
pub mod autocomplete;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod registry;
pub mod scanner;
pub mod tree;
pub mod validation;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{
    Filter, FilterType, InvalidKind, InvalidReason, ParsedQuery, TermOperator, Token, TokenKind,
    TokenType,
};
pub use autocomplete::{SearchBar, SearchGroup, SearchItem};
pub use config::{ParserConfig, SearchBarOptions};
pub use error::{ConfigError, ParseError};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseContext, parse, try_parse};
pub use registry::{FieldDefinition, FieldKind, FieldRegistry, FieldValueType, StaticFieldRegistry};
pub use scanner::Position;

/// Parses with the default key sets and the built-in field registry.
pub fn parse_with_defaults(input: &str) -> Option<ParsedQuery> {
    parse(input, &ParseContext::builtin())
}
