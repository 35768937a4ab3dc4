//! Walking, rewriting and printing token trees.

use crate::ast::{ListItem, Token, TokenKind};

/// What [`locate`] should do after visiting a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit<T> {
    /// Stop the walk and return this value
    Found(T),
    /// Do not descend into this token's children
    Skip,
    /// Keep walking, children included
    Continue,
}

/// Depth-first search over `tree`.
///
/// Returns the first value the visitor reports as [`Visit::Found`], or
/// `default` when the walk finishes without one.
pub fn locate<'a, T, F>(tree: &'a [Token], mut visitor: F, default: T) -> T
where
    F: FnMut(&'a Token) -> Visit<T>,
{
    for token in tree {
        if let Some(found) = locate_in(token, &mut visitor) {
            return found;
        }
    }
    default
}

fn locate_in<'a, T, F>(token: &'a Token, visitor: &mut F) -> Option<T>
where
    F: FnMut(&'a Token) -> Visit<T>,
{
    match visitor(token) {
        Visit::Found(found) => return Some(found),
        Visit::Skip => return None,
        Visit::Continue => {}
    }
    children(token)
        .into_iter()
        .find_map(|child| locate_in(child, visitor))
}

/// Direct children of a token, in input order.
pub fn children(token: &Token) -> Vec<&Token> {
    match &token.kind {
        TokenKind::Filter(filter) => vec![&*filter.key, &*filter.value],
        TokenKind::KeyExplicitTag { key, .. } => vec![&**key],
        TokenKind::KeyAggregate {
            name,
            args,
            args_space_before,
            args_space_after,
        } => {
            let mut out = vec![&**name, &**args_space_before];
            if let Some(args) = args {
                out.push(&**args);
            }
            out.push(&**args_space_after);
            out
        }
        TokenKind::LogicGroup { inner } => inner.iter().collect(),
        TokenKind::KeyAggregateArgs { args: items }
        | TokenKind::ValueTextList { items }
        | TokenKind::ValueNumberList { items } => {
            items.iter().filter_map(|item| item.value.as_ref()).collect()
        }
        _ => Vec::new(),
    }
}

/// Bottom-up map over a tree: children are rewritten before their parent is
/// handed to `f`.
pub fn transform<F>(tree: Vec<Token>, f: &mut F) -> Vec<Token>
where
    F: FnMut(Token) -> Token,
{
    tree.into_iter().map(|token| transform_token(token, f)).collect()
}

fn transform_token<F>(token: Token, f: &mut F) -> Token
where
    F: FnMut(Token) -> Token,
{
    let Token {
        kind,
        text,
        location,
    } = token;

    let kind = match kind {
        TokenKind::Filter(mut filter) => {
            filter.key = Box::new(transform_token(*filter.key, f));
            filter.value = Box::new(transform_token(*filter.value, f));
            TokenKind::Filter(filter)
        }
        TokenKind::KeyExplicitTag { prefix, key } => TokenKind::KeyExplicitTag {
            prefix,
            key: Box::new(transform_token(*key, f)),
        },
        TokenKind::KeyAggregate {
            name,
            args,
            args_space_before,
            args_space_after,
        } => TokenKind::KeyAggregate {
            name: Box::new(transform_token(*name, f)),
            args: args.map(|args| Box::new(transform_token(*args, f))),
            args_space_before: Box::new(transform_token(*args_space_before, f)),
            args_space_after: Box::new(transform_token(*args_space_after, f)),
        },
        TokenKind::LogicGroup { inner } => TokenKind::LogicGroup {
            inner: transform(inner, f),
        },
        TokenKind::KeyAggregateArgs { args } => TokenKind::KeyAggregateArgs {
            args: transform_items(args, f),
        },
        TokenKind::ValueTextList { items } => TokenKind::ValueTextList {
            items: transform_items(items, f),
        },
        TokenKind::ValueNumberList { items } => TokenKind::ValueNumberList {
            items: transform_items(items, f),
        },
        other => other,
    };

    f(Token {
        kind,
        text,
        location,
    })
}

fn transform_items<F>(items: Vec<ListItem>, f: &mut F) -> Vec<ListItem>
where
    F: FnMut(Token) -> Token,
{
    items
        .into_iter()
        .map(|item| ListItem {
            separator: item.separator,
            value: item.value.map(|value| transform_token(value, f)),
        })
        .collect()
}

/// Whether `offset` falls inside the token, both ends included.
pub fn is_within_token(token: &Token, offset: usize) -> bool {
    token.start() <= offset && offset <= token.end()
}

/// Name of a filter key.
///
/// Explicit tags resolve to their inner key. Aggregates resolve to the
/// function name, or `name(args)` when `aggregate_with_args` is set.
pub fn key_name(key: &Token, aggregate_with_args: bool) -> String {
    match &key.kind {
        TokenKind::KeySimple { value, .. } => value.clone(),
        TokenKind::KeyExplicitTag { key, .. } => key_name(key, aggregate_with_args),
        TokenKind::KeyAggregate { name, args, .. } => {
            if aggregate_with_args {
                let args = args.as_ref().map(|a| a.text.as_str()).unwrap_or("");
                format!("{}({})", name.text, args)
            } else {
                name.text.clone()
            }
        }
        _ => key.text.clone(),
    }
}

/// Canonical text of a token, rebuilt from its structure.
///
/// Spacing inside lists and aggregate arguments is normalised; leaf values
/// keep the text they were written with.
pub fn stringify(token: &Token) -> String {
    match &token.kind {
        TokenKind::Spaces => String::new(),
        TokenKind::FreeText { value, quoted } => quote_if(value, *quoted),
        TokenKind::LogicGroup { inner } => format!("({})", stringify_tree(inner)),
        TokenKind::LogicBoolean { value, .. } => value.as_str().to_string(),
        TokenKind::Filter(filter) => format!(
            "{}{}:{}{}",
            if filter.negated { "!" } else { "" },
            stringify(&filter.key),
            filter.operator,
            stringify(&filter.value)
        ),
        TokenKind::KeySimple { value, quoted } => quote_if(value, *quoted),
        TokenKind::KeyExplicitTag { prefix, key } => format!("{}[{}]", prefix, stringify(key)),
        TokenKind::KeyAggregate { name, args, .. } => format!(
            "{}({})",
            stringify(name),
            args.as_ref().map(|a| stringify(a)).unwrap_or_default()
        ),
        TokenKind::KeyAggregateArgs { args } => join_items(args),
        TokenKind::KeyAggregateParam { value, .. } => value.clone(),
        TokenKind::ValueText { value, quoted } => quote_if(value, *quoted),
        TokenKind::ValueTextList { items } | TokenKind::ValueNumberList { items } => {
            format!("[{}]", join_items(items))
        }
        TokenKind::ValueNumber { .. }
        | TokenKind::ValueBoolean { .. }
        | TokenKind::ValueDuration { .. }
        | TokenKind::ValuePercentage { .. }
        | TokenKind::ValueIso8601Date { .. }
        | TokenKind::ValueRelativeDate { .. } => token.text.clone(),
    }
}

/// Canonical text of a sequence of tokens, terms separated by one space.
pub fn stringify_tree(tree: &[Token]) -> String {
    tree.iter()
        .filter(|token| !matches!(token.kind, TokenKind::Spaces))
        .map(stringify)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_items(items: &[ListItem]) -> String {
    items
        .iter()
        .map(|item| item.value.as_ref().map(stringify).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_if(value: &str, quoted: bool) -> String {
    if quoted {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}
