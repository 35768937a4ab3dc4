//! Key type checks and the semantic validation of parsed filters.
//!
//! The grammar uses [`KeyValidation`] to decide whether a typed filter
//! alternative may apply to a key. Filters that parse but do not make sense
//! get an [`InvalidReason`] from [`check_invalid_filter`] instead of failing
//! the whole parse.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::ast::{FilterType, InvalidKind, InvalidReason, ListItem, Token, TokenKind};
use crate::parser::ParseContext;
use crate::registry::{self, FieldValueType};
use crate::tree;

static UNESCAPED_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(^|[^\\])""#).expect("valid regex"));

/// Key type lookups against the parser config and the field registry.
pub struct KeyValidation<'a, 'ctx> {
    ctx: &'a ParseContext<'ctx>,
}

impl<'a, 'ctx> KeyValidation<'a, 'ctx> {
    pub fn new(ctx: &'a ParseContext<'ctx>) -> Self {
        KeyValidation { ctx }
    }

    fn value_type(&self, key: &str) -> Option<FieldValueType> {
        self.ctx
            .registry
            .field_definition(key)
            .and_then(|def| def.value_type)
    }

    pub fn is_numeric(&self, key: &str) -> bool {
        self.ctx.config.numeric_keys.contains(key)
            || matches!(
                self.value_type(key),
                Some(FieldValueType::Integer | FieldValueType::Number)
            )
            || registry::is_measurement(key)
            || registry::is_span_operation_breakdown(key)
    }

    pub fn is_duration(&self, key: &str) -> bool {
        self.ctx.config.duration_keys.contains(key)
            || self.value_type(key) == Some(FieldValueType::Duration)
            || registry::is_span_operation_breakdown(key)
            || registry::measurement_type(key) == Some(FieldValueType::Duration)
    }

    pub fn is_percentage(&self, key: &str) -> bool {
        self.ctx.config.percentage_keys.contains(key)
            || self.value_type(key) == Some(FieldValueType::Percentage)
            || registry::measurement_type(key) == Some(FieldValueType::Percentage)
    }

    pub fn is_boolean(&self, key: &str) -> bool {
        self.ctx.config.boolean_keys.contains(key)
            || self.value_type(key) == Some(FieldValueType::Boolean)
    }

    pub fn is_date(&self, key: &str) -> bool {
        self.ctx.config.date_keys.contains(key)
            || self.value_type(key) == Some(FieldValueType::Date)
    }

    pub fn is_text_operator(&self, key: &str) -> bool {
        self.ctx.config.text_operator_keys.contains(key)
    }

    /// Keys are always supported unless key validation is switched on.
    pub fn is_supported(&self, key: &str) -> bool {
        !self.ctx.config.validate_keys
            || self.ctx.config.supported_keys.contains(key)
            || self.ctx.registry.field_definition(key).is_some()
    }

    /// Predicate guarding a typed filter alternative.
    pub fn accepts(&self, filter: FilterType, key: &Token) -> bool {
        let accepted = match filter {
            FilterType::Numeric | FilterType::NumericIn => self.is_numeric(&tree::key_name(key, false)),
            FilterType::Duration => self.is_duration(&tree::key_name(key, false)),
            FilterType::Boolean => self.is_boolean(&tree::key_name(key, false)),
            FilterType::Date | FilterType::SpecificDate | FilterType::RelativeDate => {
                self.is_date(&tree::key_name(key, false))
            }
            FilterType::AggregateDuration => self.aggregate_matches(key, |k| self.is_duration(k)),
            FilterType::AggregatePercentage => {
                self.aggregate_matches(key, |k| self.is_percentage(k))
            }
            FilterType::AggregateDate | FilterType::AggregateRelativeDate => {
                self.aggregate_matches(key, |k| self.is_date(k))
            }
            _ => true,
        };
        if !accepted {
            trace!(key = %key.text, ?filter, "key rejected by filter predicate");
        }
        accepted
    }

    /// Whether the aggregate's function name or any of its arguments passes
    /// `check`.
    fn aggregate_matches(&self, key: &Token, check: impl Fn(&str) -> bool) -> bool {
        let TokenKind::KeyAggregate { name, args, .. } = &key.kind else {
            return false;
        };
        if check(tree::key_name(name, false).as_str()) || check(tree::key_name(key, true).as_str()) {
            return true;
        }
        aggregate_params(args.as_deref()).any(|param| check(param))
    }
}

fn aggregate_params(args: Option<&Token>) -> impl Iterator<Item = &str> {
    let items: &[ListItem] = match args.map(|a| &a.kind) {
        Some(TokenKind::KeyAggregateArgs { args }) => args,
        _ => &[],
    };
    items.iter().filter_map(|item| match &item.value {
        Some(Token {
            kind: TokenKind::KeyAggregateParam { value, .. },
            ..
        }) => Some(value.as_str()),
        _ => None,
    })
}

/// Semantic checks for a filter that parsed as `filter`.
///
/// Pure function of its inputs; returns the first problem found.
pub fn check_invalid_filter(
    ctx: &ParseContext<'_>,
    filter: FilterType,
    key: &Token,
    value: &Token,
    negated: bool,
) -> Option<InvalidReason> {
    let keys = KeyValidation::new(ctx);

    let reason = match filter {
        FilterType::Text => check_text_filter(&keys, key, value),
        FilterType::TextIn | FilterType::NumericIn => check_list(value),
        FilterType::Is | FilterType::Has => check_text_value(value),
        _ => None,
    };
    if reason.is_some() {
        return reason;
    }

    if let TokenKind::KeySimple { value: name, .. } = &key.kind
        && !keys.is_supported(name)
    {
        return Some(InvalidReason::new(
            InvalidKind::UnknownKey,
            format!("Invalid key. \"{name}\" is not a supported search key."),
        ));
    }

    if negated && !ctx.config.allow_negation {
        return Some(InvalidReason::new(
            InvalidKind::NegationNotAllowed,
            "Negation is not supported in this search",
        ));
    }
    if negated && !filter.config().can_negate {
        return Some(InvalidReason::new(
            InvalidKind::NegationNotAllowed,
            "This filter cannot be negated",
        ));
    }

    None
}

/// Reason attached to `AND`/`OR` when boolean logic is disabled.
pub fn check_invalid_boolean(ctx: &ParseContext<'_>) -> Option<InvalidReason> {
    if ctx.config.allow_boolean {
        return None;
    }
    Some(InvalidReason::new(
        InvalidKind::LogicNotAllowed,
        "Boolean statements containing \"OR\" or \"AND\" are not supported in this search",
    ))
}

fn check_text_filter(keys: &KeyValidation<'_, '_>, key: &Token, value: &Token) -> Option<InvalidReason> {
    match &key.kind {
        TokenKind::KeyExplicitTag { .. } => return check_text_value(value),
        TokenKind::KeyAggregate { name, args, .. } => {
            let mut expected = Vec::new();
            let any = |check: &dyn Fn(&str) -> bool| {
                check(tree::key_name(name, false).as_str())
                    || aggregate_params(args.as_deref()).any(|param| check(param))
            };
            if any(&|k| keys.is_duration(k)) {
                expected.push(FilterType::AggregateDuration);
            }
            if any(&|k| keys.is_percentage(k)) {
                expected.push(FilterType::AggregatePercentage);
            }
            expected.push(FilterType::AggregateNumeric);
            if any(&|k| keys.is_date(k)) {
                expected.push(FilterType::AggregateDate);
                expected.push(FilterType::AggregateRelativeDate);
            }
            return Some(
                InvalidReason::new(InvalidKind::InvalidAggregateValue, "Invalid aggregate value")
                    .expecting(expected),
            );
        }
        _ => {}
    }

    let name = tree::key_name(key, false);
    if keys.is_duration(&name) {
        return Some(
            InvalidReason::new(
                InvalidKind::WrongValueType,
                "Invalid duration. Expected number followed by duration unit suffix",
            )
            .expecting(vec![FilterType::Duration]),
        );
    }
    if keys.is_date(&name) {
        return Some(
            InvalidReason::new(
                InvalidKind::WrongValueType,
                "Invalid date format. Expected +/-duration (e.g. +1h) or ISO 8601-like (e.g. 2024-01-31 or 2024-01-31T12:00:00)",
            )
            .expecting(vec![
                FilterType::Date,
                FilterType::SpecificDate,
                FilterType::RelativeDate,
            ]),
        );
    }
    if keys.is_boolean(&name) {
        return Some(
            InvalidReason::new(
                InvalidKind::WrongValueType,
                "Invalid boolean. Expected true, 1, false, or 0.",
            )
            .expecting(vec![FilterType::Boolean]),
        );
    }
    if keys.is_numeric(&name) {
        return Some(
            InvalidReason::new(
                InvalidKind::WrongValueType,
                "Invalid number. Expected number then optional k, m, or b suffix (e.g. 500k)",
            )
            .expecting(vec![FilterType::Numeric, FilterType::NumericIn]),
        );
    }

    check_text_value(value)
}

/// Generic rule for free-form text values.
fn check_text_value(value: &Token) -> Option<InvalidReason> {
    let TokenKind::ValueText {
        value: text,
        quoted: false,
    } = &value.kind
    else {
        return None;
    };
    if UNESCAPED_QUOTE.is_match(text) {
        return Some(InvalidReason::new(
            InvalidKind::UnescapedQuote,
            "Quotes must enclose text or be escaped",
        ));
    }
    if text.is_empty() {
        return Some(InvalidReason::new(
            InvalidKind::EmptyValue,
            "Filter must have a value",
        ));
    }
    None
}

fn check_list(value: &Token) -> Option<InvalidReason> {
    let items = match &value.kind {
        TokenKind::ValueTextList { items } | TokenKind::ValueNumberList { items } => items,
        _ => return None,
    };
    if items.iter().any(|item| item.value.is_none()) {
        return Some(InvalidReason::new(
            InvalidKind::EmptyListValue,
            "Lists should not have empty values",
        ));
    }
    None
}
