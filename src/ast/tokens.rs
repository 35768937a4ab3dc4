use std::fmt;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ast::{FilterType, InvalidReason, TermOperator};
use crate::scanner::Position;

/// Half-open range of a token in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(start: Position, end: Position) -> Self {
        Location { start, end }
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains(&self, other: &Location) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }
}

/// Discriminant of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    Spaces,
    FreeText,
    LogicGroup,
    LogicBoolean,
    Filter,
    KeySimple,
    KeyExplicitTag,
    KeyAggregate,
    KeyAggregateArgs,
    KeyAggregateParam,
    ValueText,
    ValueTextList,
    ValueNumber,
    ValueNumberList,
    ValueBoolean,
    ValueDuration,
    ValuePercentage,
    ValueIso8601Date,
    ValueRelativeDate,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// `AND` / `OR` between terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BooleanOperator {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl BooleanOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOperator::And => "AND",
            BooleanOperator::Or => "OR",
        }
    }
}

/// Magnitude suffix of a number (`500k`, `2m`, `1b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumberUnit {
    #[serde(rename = "k")]
    Thousand,
    #[serde(rename = "m")]
    Million,
    #[serde(rename = "b")]
    Billion,
}

impl NumberUnit {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'k' => Some(NumberUnit::Thousand),
            'm' => Some(NumberUnit::Million),
            'b' => Some(NumberUnit::Billion),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NumberUnit::Thousand => "k",
            NumberUnit::Million => "m",
            NumberUnit::Billion => "b",
        }
    }

    pub fn multiplier(self) -> Decimal {
        match self {
            NumberUnit::Thousand => Decimal::from(1_000),
            NumberUnit::Million => Decimal::from(1_000_000),
            NumberUnit::Billion => Decimal::from(1_000_000_000),
        }
    }
}

/// Duration suffix, kept with the spelling used in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DurationUnit {
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "min")]
    Minutes,
    #[serde(rename = "m")]
    MinutesShort,
    #[serde(rename = "hr")]
    Hours,
    #[serde(rename = "h")]
    HoursShort,
    #[serde(rename = "day")]
    Days,
    #[serde(rename = "d")]
    DaysShort,
    #[serde(rename = "wk")]
    Weeks,
    #[serde(rename = "w")]
    WeeksShort,
}

impl DurationUnit {
    /// Suffixes in the order the grammar tries them (longest spelling first
    /// where one is a prefix of another).
    pub const PARSE_ORDER: [DurationUnit; 10] = [
        DurationUnit::Milliseconds,
        DurationUnit::Seconds,
        DurationUnit::Minutes,
        DurationUnit::MinutesShort,
        DurationUnit::Hours,
        DurationUnit::HoursShort,
        DurationUnit::Days,
        DurationUnit::DaysShort,
        DurationUnit::Weeks,
        DurationUnit::WeeksShort,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DurationUnit::Milliseconds => "ms",
            DurationUnit::Seconds => "s",
            DurationUnit::Minutes => "min",
            DurationUnit::MinutesShort => "m",
            DurationUnit::Hours => "hr",
            DurationUnit::HoursShort => "h",
            DurationUnit::Days => "day",
            DurationUnit::DaysShort => "d",
            DurationUnit::Weeks => "wk",
            DurationUnit::WeeksShort => "w",
        }
    }

    /// Length of one unit in milliseconds.
    pub fn millis(self) -> Decimal {
        match self {
            DurationUnit::Milliseconds => Decimal::ONE,
            DurationUnit::Seconds => Decimal::from(1_000),
            DurationUnit::Minutes | DurationUnit::MinutesShort => Decimal::from(60_000),
            DurationUnit::Hours | DurationUnit::HoursShort => Decimal::from(3_600_000),
            DurationUnit::Days | DurationUnit::DaysShort => Decimal::from(86_400_000),
            DurationUnit::Weeks | DurationUnit::WeeksShort => Decimal::from(604_800_000),
        }
    }
}

/// Unit of a relative date (`-24h`, `+7d`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelativeDateUnit {
    #[serde(rename = "w")]
    Weeks,
    #[serde(rename = "d")]
    Days,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "m")]
    Minutes,
}

impl RelativeDateUnit {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'w' => Some(RelativeDateUnit::Weeks),
            'd' => Some(RelativeDateUnit::Days),
            'h' => Some(RelativeDateUnit::Hours),
            'm' => Some(RelativeDateUnit::Minutes),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelativeDateUnit::Weeks => "w",
            RelativeDateUnit::Days => "d",
            RelativeDateUnit::Hours => "h",
            RelativeDateUnit::Minutes => "m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sign {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Sign {
    pub fn as_str(self) -> &'static str {
        match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
        }
    }
}

/// One slot of a list (`[a, b]`) or of aggregate arguments (`f(a, b)`).
///
/// `separator` is the text before the value: empty for the first slot, the
/// comma with its surrounding spaces otherwise. `value` is `None` for an empty
/// slot such as the middle of `[1,,3]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub separator: String,
    pub value: Option<Token>,
}

/// A `key:value` search term.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub filter: FilterType,
    pub negated: bool,
    pub key: Box<Token>,
    pub operator: TermOperator,
    pub value: Box<Token>,
    pub invalid: Option<InvalidReason>,
}

/// A typed, positioned piece of the query.
///
/// `text` is the exact input consumed by this token; concatenating the text of
/// the top-level tokens of a query gives back the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(flatten)]
    pub kind: TokenKind,
    pub text: String,
    pub location: Location,
}

/// Variant payload of a [`Token`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TokenKind {
    /// Run of spaces between terms (possibly empty)
    Spaces,

    /// Unstructured search text
    ///
    /// # Examples
    /// ```text
    /// timeout error
    /// "connection reset"
    /// ```
    FreeText { value: String, quoted: bool },

    /// Parenthesized sub-expression
    LogicGroup { inner: Vec<Token> },

    /// `AND` / `OR`
    LogicBoolean {
        value: BooleanOperator,
        invalid: Option<InvalidReason>,
    },

    /// `key:value` term
    Filter(Filter),

    /// Plain or quoted key
    ///
    /// # Examples
    /// ```text
    /// browser.name
    /// "device:arch"
    /// ```
    KeySimple { value: String, quoted: bool },

    /// `tags[key]`
    KeyExplicitTag { prefix: String, key: Box<Token> },

    /// Function-call shaped key
    ///
    /// # Examples
    /// ```text
    /// count()
    /// p95(transaction.duration)
    /// count_if(transaction.duration, greater, 300)
    /// ```
    #[serde(rename_all = "camelCase")]
    KeyAggregate {
        name: Box<Token>,
        args: Option<Box<Token>>,
        args_space_before: Box<Token>,
        args_space_after: Box<Token>,
    },

    /// Argument list of an aggregate key
    KeyAggregateArgs { args: Vec<ListItem> },

    /// Single aggregate argument; quoted arguments keep their quotes
    KeyAggregateParam { value: String, quoted: bool },

    /// Text value; escapes are kept as written
    ValueText { value: String, quoted: bool },

    /// `[a, "b c", d]`
    ValueTextList { items: Vec<ListItem> },

    /// Number as written plus its value after applying the unit
    #[serde(rename_all = "camelCase")]
    ValueNumber {
        value: Decimal,
        raw_value: Decimal,
        unit: Option<NumberUnit>,
    },

    /// `[1, 2k, 3]`
    ValueNumberList { items: Vec<ListItem> },

    ValueBoolean { value: bool },

    ValueDuration { value: Decimal, unit: DurationUnit },

    ValuePercentage { value: Decimal },

    /// ISO 8601-like date. Dates written without a zone are read as UTC and
    /// have `has_zone` unset.
    #[serde(rename_all = "camelCase")]
    ValueIso8601Date {
        value: DateTime<FixedOffset>,
        has_zone: bool,
    },

    ValueRelativeDate {
        value: u64,
        sign: Sign,
        unit: RelativeDateUnit,
    },
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: Location) -> Self {
        Token {
            kind,
            text: text.into(),
            location,
        }
    }

    pub fn token_type(&self) -> TokenType {
        match &self.kind {
            TokenKind::Spaces => TokenType::Spaces,
            TokenKind::FreeText { .. } => TokenType::FreeText,
            TokenKind::LogicGroup { .. } => TokenType::LogicGroup,
            TokenKind::LogicBoolean { .. } => TokenType::LogicBoolean,
            TokenKind::Filter(_) => TokenType::Filter,
            TokenKind::KeySimple { .. } => TokenType::KeySimple,
            TokenKind::KeyExplicitTag { .. } => TokenType::KeyExplicitTag,
            TokenKind::KeyAggregate { .. } => TokenType::KeyAggregate,
            TokenKind::KeyAggregateArgs { .. } => TokenType::KeyAggregateArgs,
            TokenKind::KeyAggregateParam { .. } => TokenType::KeyAggregateParam,
            TokenKind::ValueText { .. } => TokenType::ValueText,
            TokenKind::ValueTextList { .. } => TokenType::ValueTextList,
            TokenKind::ValueNumber { .. } => TokenType::ValueNumber,
            TokenKind::ValueNumberList { .. } => TokenType::ValueNumberList,
            TokenKind::ValueBoolean { .. } => TokenType::ValueBoolean,
            TokenKind::ValueDuration { .. } => TokenType::ValueDuration,
            TokenKind::ValuePercentage { .. } => TokenType::ValuePercentage,
            TokenKind::ValueIso8601Date { .. } => TokenType::ValueIso8601Date,
            TokenKind::ValueRelativeDate { .. } => TokenType::ValueRelativeDate,
        }
    }

    pub fn as_filter(&self) -> Option<&Filter> {
        match &self.kind {
            TokenKind::Filter(filter) => Some(filter),
            _ => None,
        }
    }

    pub fn is_filter(&self) -> bool {
        matches!(self.kind, TokenKind::Filter(_))
    }

    /// Invalid reason carried by a filter or a boolean operator.
    pub fn invalid(&self) -> Option<&InvalidReason> {
        match &self.kind {
            TokenKind::Filter(filter) => filter.invalid.as_ref(),
            TokenKind::LogicBoolean { invalid, .. } => invalid.as_ref(),
            _ => None,
        }
    }

    pub fn start(&self) -> usize {
        self.location.start.offset
    }

    pub fn end(&self) -> usize {
        self.location.end.offset
    }
}
