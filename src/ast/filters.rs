use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::TokenType;

/// Semantic kind of a filter.
///
/// The order of [`FilterType::PRIORITY`] is the order in which the grammar
/// tries the alternatives; the first one that matches structurally and is
/// accepted by the key registry wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    Text,
    TextIn,
    Date,
    SpecificDate,
    RelativeDate,
    Duration,
    Numeric,
    NumericIn,
    Boolean,
    AggregateDuration,
    AggregatePercentage,
    AggregateNumeric,
    AggregateDate,
    AggregateRelativeDate,
    Has,
    Is,
}

/// Comparison operator between a filter key and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermOperator {
    /// No explicit operator (equality)
    #[serde(rename = "")]
    Default,
    #[serde(rename = ">=")]
    GreaterThanEqual,
    #[serde(rename = "<=")]
    LessThanEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl TermOperator {
    /// Operators in the order the grammar tries them.
    pub const PARSE_ORDER: [TermOperator; 6] = [
        TermOperator::GreaterThanEqual,
        TermOperator::LessThanEqual,
        TermOperator::GreaterThan,
        TermOperator::LessThan,
        TermOperator::Equal,
        TermOperator::NotEqual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TermOperator::Default => "",
            TermOperator::GreaterThanEqual => ">=",
            TermOperator::LessThanEqual => "<=",
            TermOperator::GreaterThan => ">",
            TermOperator::LessThan => "<",
            TermOperator::Equal => "=",
            TermOperator::NotEqual => "!=",
        }
    }
}

impl fmt::Display for TermOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ALL_OPERATORS: &[TermOperator] = &[
    TermOperator::Default,
    TermOperator::GreaterThanEqual,
    TermOperator::LessThanEqual,
    TermOperator::GreaterThan,
    TermOperator::LessThan,
    TermOperator::Equal,
    TermOperator::NotEqual,
];

const BASIC_OPERATORS: &[TermOperator] = &[TermOperator::Default, TermOperator::NotEqual];

/// Static description of what a filter type accepts.
///
/// The parser tries `valid_keys` and `valid_values` in the listed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterTypeConfig {
    pub valid_keys: &'static [TokenType],
    pub valid_ops: &'static [TermOperator],
    pub valid_values: &'static [TokenType],
    pub can_negate: bool,
}

const TEXT: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[
        TokenType::KeyExplicitTag,
        TokenType::KeyAggregate,
        TokenType::KeySimple,
    ],
    valid_ops: BASIC_OPERATORS,
    valid_values: &[TokenType::ValueText],
    can_negate: true,
};

const TEXT_IN: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeyExplicitTag, TokenType::KeySimple],
    valid_ops: &[],
    valid_values: &[TokenType::ValueTextList],
    can_negate: true,
};

const DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeySimple],
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenType::ValueIso8601Date],
    can_negate: false,
};

const SPECIFIC_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeySimple],
    valid_ops: &[],
    valid_values: &[TokenType::ValueIso8601Date],
    can_negate: false,
};

const RELATIVE_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeySimple],
    valid_ops: &[],
    valid_values: &[TokenType::ValueRelativeDate],
    can_negate: false,
};

const DURATION: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeySimple],
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenType::ValueDuration],
    can_negate: true,
};

const NUMERIC: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeySimple],
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenType::ValueNumber],
    can_negate: true,
};

const NUMERIC_IN: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeySimple],
    valid_ops: &[],
    valid_values: &[TokenType::ValueNumberList],
    can_negate: true,
};

const BOOLEAN: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeySimple],
    valid_ops: BASIC_OPERATORS,
    valid_values: &[TokenType::ValueBoolean],
    can_negate: true,
};

const AGGREGATE_DURATION: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeyAggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenType::ValueDuration],
    can_negate: true,
};

const AGGREGATE_NUMERIC: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeyAggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenType::ValueNumber],
    can_negate: true,
};

const AGGREGATE_PERCENTAGE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeyAggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenType::ValuePercentage],
    can_negate: true,
};

const AGGREGATE_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeyAggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenType::ValueIso8601Date],
    can_negate: true,
};

const AGGREGATE_RELATIVE_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeyAggregate],
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenType::ValueRelativeDate],
    can_negate: true,
};

const HAS: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeySimple],
    valid_ops: BASIC_OPERATORS,
    valid_values: &[TokenType::ValueText],
    can_negate: true,
};

const IS: FilterTypeConfig = FilterTypeConfig {
    valid_keys: &[TokenType::KeySimple],
    valid_ops: BASIC_OPERATORS,
    valid_values: &[TokenType::ValueText],
    can_negate: true,
};

impl FilterType {
    /// Grammar alternatives in priority order. `Text` is the fallback.
    pub const PRIORITY: [FilterType; 16] = [
        FilterType::Date,
        FilterType::SpecificDate,
        FilterType::RelativeDate,
        FilterType::Duration,
        FilterType::Boolean,
        FilterType::NumericIn,
        FilterType::Numeric,
        FilterType::AggregateDuration,
        FilterType::AggregatePercentage,
        FilterType::AggregateNumeric,
        FilterType::AggregateDate,
        FilterType::AggregateRelativeDate,
        FilterType::Has,
        FilterType::Is,
        FilterType::TextIn,
        FilterType::Text,
    ];

    pub fn config(self) -> &'static FilterTypeConfig {
        match self {
            FilterType::Text => &TEXT,
            FilterType::TextIn => &TEXT_IN,
            FilterType::Date => &DATE,
            FilterType::SpecificDate => &SPECIFIC_DATE,
            FilterType::RelativeDate => &RELATIVE_DATE,
            FilterType::Duration => &DURATION,
            FilterType::Numeric => &NUMERIC,
            FilterType::NumericIn => &NUMERIC_IN,
            FilterType::Boolean => &BOOLEAN,
            FilterType::AggregateDuration => &AGGREGATE_DURATION,
            FilterType::AggregatePercentage => &AGGREGATE_PERCENTAGE,
            FilterType::AggregateNumeric => &AGGREGATE_NUMERIC,
            FilterType::AggregateDate => &AGGREGATE_DATE,
            FilterType::AggregateRelativeDate => &AGGREGATE_RELATIVE_DATE,
            FilterType::Has => &HAS,
            FilterType::Is => &IS,
        }
    }

    /// Filter types whose operators may be offered in place of this one's.
    pub fn interchangeable(self) -> &'static [FilterType] {
        match self {
            FilterType::SpecificDate => &[FilterType::Date],
            FilterType::Date => &[FilterType::SpecificDate],
            _ => &[],
        }
    }

    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            FilterType::AggregateDuration
                | FilterType::AggregatePercentage
                | FilterType::AggregateNumeric
                | FilterType::AggregateDate
                | FilterType::AggregateRelativeDate
        )
    }

    pub fn is_list(self) -> bool {
        matches!(self, FilterType::TextIn | FilterType::NumericIn)
    }
}

/// Machine-readable category of an [`InvalidReason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidKind {
    /// Unquoted value with a stray `"`
    UnescapedQuote,
    /// Unquoted empty value
    EmptyValue,
    /// A list with an empty slot
    EmptyListValue,
    /// A typed key whose value did not match its type
    WrongValueType,
    /// An aggregate key with a value that is not a number/duration/percentage/date
    InvalidAggregateValue,
    /// Key not in the supported key list
    UnknownKey,
    /// Negation on a filter that cannot be negated
    NegationNotAllowed,
    /// `AND`/`OR` while boolean logic is disabled
    LogicNotAllowed,
}

/// Why a syntactically accepted token is semantically invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidReason {
    pub kind: InvalidKind,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<Vec<FilterType>>,
}

impl InvalidReason {
    pub fn new(kind: InvalidKind, reason: impl Into<String>) -> Self {
        InvalidReason {
            kind,
            reason: reason.into(),
            expected_type: None,
        }
    }

    pub fn expecting(mut self, expected: Vec<FilterType>) -> Self {
        self.expected_type = Some(expected);
        self
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_the_last_alternative() {
        assert_eq!(FilterType::PRIORITY.last(), Some(&FilterType::Text));
        assert_eq!(FilterType::PRIORITY[0], FilterType::Date);
    }

    #[test]
    fn date_filters_cannot_be_negated() {
        assert!(!FilterType::Date.config().can_negate);
        assert!(!FilterType::RelativeDate.config().can_negate);
        assert!(FilterType::Numeric.config().can_negate);
    }
}
