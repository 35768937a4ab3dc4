//! Keyboard shortcuts acting on the filter under the cursor.

use serde::Serialize;

use crate::ast::{Token, TokenKind};
use crate::autocomplete::splice::{self, Edit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutType {
    Delete,
    Negate,
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Shortcut {
    pub text: &'static str,
    pub shortcut_type: ShortcutType,
    pub hotkey: &'static str,
    #[serde(skip)]
    can_run: fn(Option<&Token>, usize) -> bool,
}

impl Shortcut {
    /// Whether the shortcut applies given the cursor token and the number of
    /// top-level filters.
    pub fn can_run(&self, token: Option<&Token>, filter_count: usize) -> bool {
        (self.can_run)(token, filter_count)
    }
}

fn is_negated_filter(token: Option<&Token>) -> Option<bool> {
    match token.map(|t| &t.kind) {
        Some(TokenKind::Filter(filter)) => Some(filter.negated),
        _ => None,
    }
}

fn can_move(token: Option<&Token>, filter_count: usize) -> bool {
    filter_count > 1 || (filter_count > 0 && !token.is_some_and(Token::is_filter))
}

pub static SHORTCUTS: [Shortcut; 5] = [
    Shortcut {
        text: "Delete",
        shortcut_type: ShortcutType::Delete,
        hotkey: "ctrl+option+backspace",
        can_run: |token, _| token.is_some_and(Token::is_filter),
    },
    Shortcut {
        text: "Exclude",
        shortcut_type: ShortcutType::Negate,
        hotkey: "ctrl+option+1",
        can_run: |token, _| is_negated_filter(token) == Some(false),
    },
    Shortcut {
        text: "Include",
        shortcut_type: ShortcutType::Negate,
        hotkey: "ctrl+option+1",
        can_run: |token, _| is_negated_filter(token) == Some(true),
    },
    Shortcut {
        text: "Previous",
        shortcut_type: ShortcutType::Previous,
        hotkey: "ctrl+option+left",
        can_run: can_move,
    },
    Shortcut {
        text: "Next",
        shortcut_type: ShortcutType::Next,
        hotkey: "ctrl+option+right",
        can_run: can_move,
    },
];

/// Shortcuts that can run in the current state.
pub fn available(token: Option<&Token>, filter_count: usize) -> Vec<&'static Shortcut> {
    SHORTCUTS
        .iter()
        .filter(|shortcut| shortcut.can_run(token, filter_count))
        .collect()
}

/// Removes `token`, joining the text around it with one space.
pub fn delete_token(query: &str, token: &Token) -> Edit {
    let before = splice::char_prefix(query, token.start());
    let before = before.trim();
    let after = splice::char_suffix(query, token.end());
    let after = after.trim();
    let joiner = if before.is_empty() || after.is_empty() {
        ""
    } else {
        " "
    };
    Edit {
        query: format!("{before}{joiner}{after}"),
        cursor: splice::char_len(before) + joiner.len(),
    }
}

/// Adds or removes the `!` of a filter. The caret keeps its place relative
/// to the key.
pub fn toggle_negation(query: &str, token: &Token, cursor: usize) -> Option<Edit> {
    let TokenKind::Filter(filter) = &token.kind else {
        return None;
    };
    let start = token.start();
    if filter.negated {
        Some(Edit {
            query: splice::splice(query, start, start + 1, ""),
            cursor: if cursor > start { cursor - 1 } else { cursor },
        })
    } else {
        Some(Edit {
            query: splice::splice(query, start, start, "!"),
            cursor: if cursor >= start { cursor + 1 } else { cursor },
        })
    }
}

/// Caret target when cycling through filters; wraps around at both ends.
pub fn cycle_target(
    token: Option<&Token>,
    filters: &[&Token],
    direction: ShortcutType,
) -> Option<usize> {
    let first = *filters.first()?;
    let last = *filters.last()?;
    let index = token.and_then(|token| filters.iter().position(|f| *f == token));

    let target = match (direction, index) {
        (ShortcutType::Next, Some(index)) if filters.len() > 1 => {
            filters[(index + 1) % filters.len()]
        }
        (ShortcutType::Previous, Some(index)) if filters.len() > 1 => {
            filters[(index + filters.len() - 1) % filters.len()]
        }
        (ShortcutType::Next, _) => first,
        (ShortcutType::Previous, _) => last,
        _ => return None,
    };
    Some(target.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseContext, parse};

    fn filters(query: &str) -> Vec<Token> {
        parse(query, &ParseContext::builtin())
            .unwrap()
            .into_tokens()
            .into_iter()
            .filter(Token::is_filter)
            .collect()
    }

    #[test]
    fn delete_joins_neighbours() {
        let query = "is:unresolved browser:chrome  age:>1d";
        let tokens = filters(query);
        let edit = delete_token(query, &tokens[1]);
        assert_eq!(edit.query, "is:unresolved age:>1d");
        assert_eq!(edit.cursor, 14);

        let edit = delete_token(query, &tokens[0]);
        assert_eq!(edit.query, "browser:chrome  age:>1d");
        assert_eq!(edit.cursor, 0);
    }

    #[test]
    fn negation_moves_the_caret_with_the_key() {
        let query = "a:1 b:2";
        let tokens = filters(query);
        let edit = toggle_negation(query, &tokens[1], 6).unwrap();
        assert_eq!(edit.query, "a:1 !b:2");
        assert_eq!(edit.cursor, 7);
    }

    #[test]
    fn cycling_wraps() {
        let tokens = filters("a:1 b:2 c:3");
        let refs: Vec<&Token> = tokens.iter().collect();
        assert_eq!(cycle_target(Some(refs[2]), &refs, ShortcutType::Next), Some(3));
        assert_eq!(cycle_target(Some(refs[0]), &refs, ShortcutType::Previous), Some(11));
        assert_eq!(cycle_target(None, &refs, ShortcutType::Next), Some(3));
        assert_eq!(cycle_target(None, &refs, ShortcutType::Delete), None);
    }

    #[test]
    fn availability_follows_the_cursor_token() {
        let tokens = filters("a:1");
        let texts: Vec<_> = available(Some(&tokens[0]), 1)
            .iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(texts, ["Delete", "Exclude"]);
        let texts: Vec<_> = available(None, 1).iter().map(|s| s.text).collect();
        assert_eq!(texts, ["Previous", "Next"]);
    }
}
