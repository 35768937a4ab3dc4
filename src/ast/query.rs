use serde::Serialize;

use crate::ast::{Filter, InvalidReason, Token, TokenKind};
use crate::tree::{self, Visit};

/// Result of parsing a search query.
///
/// Holds the top-level tokens in input order. A parsed query is never edited
/// in place: changes are made on the query text, which is then parsed again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedQuery {
    tokens: Vec<Token>,
}

impl ParsedQuery {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        ParsedQuery { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rebuilds the query by concatenating token text.
    pub fn to_query_string(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Top-level filter tokens, in order.
    pub fn filters(&self) -> Vec<&Token> {
        self.tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Filter(_)))
            .collect()
    }

    /// Every filter in the query, including those inside groups.
    pub fn all_filters(&self) -> Vec<&Filter> {
        let mut filters = Vec::new();
        tree::locate(
            &self.tokens,
            |token| {
                if let TokenKind::Filter(filter) = &token.kind {
                    filters.push(filter);
                    return Visit::Skip;
                }
                Visit::Continue
            },
            (),
        );
        filters
    }

    /// First token carrying an invalid reason, if any.
    pub fn first_invalid(&self) -> Option<(&Token, &InvalidReason)> {
        tree::locate(
            &self.tokens,
            |token| match token.invalid() {
                Some(reason) => Visit::Found(Some((token, reason))),
                None if token.is_filter() => Visit::Skip,
                None => Visit::Continue,
            },
            None,
        )
    }

    /// A query can be submitted only when no token is invalid.
    pub fn has_valid_search(&self) -> bool {
        self.first_invalid().is_none()
    }
}
