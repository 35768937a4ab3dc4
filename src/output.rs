//! JSON rendering of parse results and suggestions.
//!
//! Token trees serialize with their kind tagged as `type`, which is the shape
//! front ends consume. Decimal values are written as strings so no precision
//! is lost.
//!
//! ```
//! use search_syntax::{output::to_json, parse_with_defaults};
//!
//! let parsed = parse_with_defaults("is:unresolved").unwrap();
//! let json = to_json(&parsed).unwrap();
//! assert!(json.contains(r#""type":"filter""#));
//! ```

use serde::Serialize;

use crate::ast::ParsedQuery;
use crate::autocomplete::Suggestions;
use crate::error::ParseError;

/// Compact JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// JSON with two-space indentation.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Outcome of parsing one query, as reported by the command line.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseReport<'a> {
    Parsed {
        query: &'a str,
        valid: bool,
        tokens: &'a ParsedQuery,
    },
    Failed {
        query: &'a str,
        offset: usize,
        line: usize,
        column: usize,
        message: String,
    },
}

impl<'a> ParseReport<'a> {
    pub fn new(query: &'a str, result: &'a Result<ParsedQuery, ParseError>) -> Self {
        match result {
            Ok(parsed) => ParseReport::Parsed {
                query,
                valid: parsed.has_valid_search(),
                tokens: parsed,
            },
            Err(err) => ParseReport::Failed {
                query,
                offset: err.position.offset,
                line: err.position.line,
                column: err.position.column,
                message: err.to_string(),
            },
        }
    }
}

/// Suggestions alongside the query they were computed for.
#[derive(Debug, Serialize)]
pub struct CompletionReport<'a> {
    pub query: &'a str,
    pub cursor: usize,
    pub suggestions: Option<&'a Suggestions>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseContext, try_parse};

    #[test]
    fn failed_parse_reports_position() {
        let result = try_parse("(is:unresolved", &ParseContext::builtin());
        let json = to_json(&ParseReport::new("(is:unresolved", &result)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["offset"], 14);
    }

    #[test]
    fn parsed_report_marks_validity() {
        let result = try_parse("count():abc", &ParseContext::builtin());
        let json = to_json_pretty(&ParseReport::new("count():abc", &result)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "parsed");
        assert_eq!(value["valid"], false);
        assert!(value["tokens"].is_array());
    }
}
