use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::debug;

use crate::ast::{
    BooleanOperator, DurationUnit, Filter, FilterType, ListItem, Location, NumberUnit,
    ParsedQuery, RelativeDateUnit, Sign, TermOperator, Token, TokenKind, TokenType,
};
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::registry::{FieldRegistry, StaticFieldRegistry};
use crate::scanner::{Position, Scanner};
use crate::validation::{self, KeyValidation};

static DEFAULT_CONFIG: LazyLock<ParserConfig> = LazyLock::new(ParserConfig::default);
static BUILTIN_REGISTRY: LazyLock<StaticFieldRegistry> =
    LazyLock::new(StaticFieldRegistry::builtin);

/// Everything a parse consults besides the input.
#[derive(Clone, Copy)]
pub struct ParseContext<'a> {
    pub config: &'a ParserConfig,
    pub registry: &'a dyn FieldRegistry,
}

impl<'a> ParseContext<'a> {
    pub fn new(config: &'a ParserConfig, registry: &'a dyn FieldRegistry) -> Self {
        ParseContext { config, registry }
    }
}

impl ParseContext<'static> {
    /// Default key sets with the built-in field registry.
    pub fn builtin() -> Self {
        ParseContext {
            config: &DEFAULT_CONFIG,
            registry: &*BUILTIN_REGISTRY,
        }
    }
}

/// Parses a query, returning `None` when it is not valid syntax.
pub fn parse(input: &str, ctx: &ParseContext<'_>) -> Option<ParsedQuery> {
    match try_parse(input, ctx) {
        Ok(query) => Some(query),
        Err(err) => {
            debug!(%err, query = input, "discarding unparseable query");
            None
        }
    }
}

/// Parses a query, keeping the reason when it is not valid syntax.
pub fn try_parse(input: &str, ctx: &ParseContext<'_>) -> Result<ParsedQuery, ParseError> {
    Parser::new(input, ctx).parse_search().map(ParsedQuery::new)
}

pub struct Parser<'a, 'ctx> {
    scanner: Scanner,
    ctx: &'a ParseContext<'ctx>,
    furthest: Option<ParseError>,
}

fn is_end_value(ch: Option<char>) -> bool {
    matches!(ch, None | Some(' ' | '\t' | '\n' | ')'))
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-')
}

impl<'a, 'ctx> Parser<'a, 'ctx> {
    pub fn new(input: &str, ctx: &'a ParseContext<'ctx>) -> Self {
        Parser {
            scanner: Scanner::new(input),
            ctx,
            furthest: None,
        }
    }

    /// search = spaces term* EOF
    pub fn parse_search(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = vec![self.spaces()];
        while !self.scanner.is_eof() {
            match self.term() {
                Some(term) => tokens.extend(term),
                None => return Err(self.error("search term")),
            }
        }
        Ok(tokens)
    }

    // ---- helpers ----

    /// Runs `rule`, rewinding the scanner when it does not match.
    fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let start = self.scanner.position();
        let result = rule(self);
        if result.is_none() {
            self.scanner.reset(start);
        }
        result
    }

    /// Lookahead: whether `rule` matches here, without consuming input.
    fn check<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> bool {
        let start = self.scanner.position();
        let matched = rule(self).is_some();
        self.scanner.reset(start);
        matched
    }

    fn expect(&mut self, ch: char, expected: &'static str) -> Option<()> {
        if self.scanner.eat(ch) {
            return Some(());
        }
        self.fail(expected)
    }

    /// Records a failure so the furthest one can be reported.
    fn fail<T>(&mut self, expected: &'static str) -> Option<T> {
        let position = self.scanner.position();
        let further = self
            .furthest
            .as_ref()
            .is_none_or(|err| err.position.offset <= position.offset);
        if further {
            self.furthest = Some(ParseError {
                position,
                expected,
                found: self.scanner.current_char(),
            });
        }
        None
    }

    fn error(&mut self, expected: &'static str) -> ParseError {
        let here = ParseError {
            position: self.scanner.position(),
            expected,
            found: self.scanner.current_char(),
        };
        match self.furthest.take() {
            Some(err) if err.position.offset > here.position.offset => err,
            _ => here,
        }
    }

    fn at_end_value(&self) -> bool {
        is_end_value(self.scanner.current_char())
    }

    fn token(&self, kind: TokenKind, start: Position) -> Token {
        Token::new(
            kind,
            self.scanner.text_since(start),
            Location::new(start, self.scanner.position()),
        )
    }

    fn digits(&mut self, count: usize) -> Option<()> {
        for _ in 0..count {
            if !self.scanner.current_char().is_some_and(|c| c.is_ascii_digit()) {
                return None;
            }
            self.scanner.advance();
        }
        Some(())
    }

    /// `"(\\"|[^"])*"`, returning the text between the quotes.
    fn quoted(&mut self, allow_breaks: bool) -> Option<String> {
        self.attempt(|p| {
            if !p.scanner.eat('"') {
                return None;
            }
            let inner = p.scanner.position();
            loop {
                match p.scanner.current_char() {
                    None => return p.fail("closing quote"),
                    Some('\\') if p.scanner.peek_char(1) == Some('"') => {
                        p.scanner.advance();
                        p.scanner.advance();
                    }
                    Some('"') => break,
                    Some('\t' | '\n') if !allow_breaks => return None,
                    Some(_) => p.scanner.advance(),
                }
            }
            let value = p.scanner.text_since(inner);
            p.expect('"', "closing quote")?;
            Some(value)
        })
    }

    /// `\d+(\.\d*)?`
    fn numeric(&mut self) -> Option<Decimal> {
        self.attempt(|p| {
            let start = p.scanner.offset();
            if p.scanner.eat_while(|c| c.is_ascii_digit()) == 0 {
                return None;
            }
            if p.scanner.eat('.') {
                p.scanner.eat_while(|c| c.is_ascii_digit());
            }
            let literal = p.scanner.slice(start, p.scanner.offset());
            Decimal::from_str(literal.trim_end_matches('.')).ok()
        })
    }

    // ---- terms ----

    fn spaces(&mut self) -> Token {
        let start = self.scanner.position();
        self.scanner.eat_while(|c| c == ' ');
        self.token(TokenKind::Spaces, start)
    }

    /// term = (boolean_operator / paren_group / filter / free_text) spaces
    fn term(&mut self) -> Option<[Token; 2]> {
        let token = self
            .boolean_operator()
            .or_else(|| self.paren_group())
            .or_else(|| self.filter())
            .or_else(|| self.free_text())?;
        Some([token, self.spaces()])
    }

    fn boolean_operator(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            let value = if p.scanner.eat_str_ignore_case("OR") {
                BooleanOperator::Or
            } else if p.scanner.eat_str_ignore_case("AND") {
                BooleanOperator::And
            } else {
                return None;
            };
            if !p.at_end_value() {
                return None;
            }
            let invalid = validation::check_invalid_boolean(p.ctx);
            Some(p.token(TokenKind::LogicBoolean { value, invalid }, start))
        })
    }

    fn paren_group(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            if !p.scanner.eat('(') {
                return None;
            }
            let mut inner = vec![p.spaces()];
            while !p.scanner.is_eof() && p.scanner.current_char() != Some(')') {
                inner.extend(p.term()?);
            }
            if inner.len() == 1 {
                return p.fail("search term");
            }
            p.expect(')', "')'")?;
            Some(p.token(TokenKind::LogicGroup { inner }, start))
        })
    }

    fn free_text(&mut self) -> Option<Token> {
        let start = self.scanner.position();
        if let Some(value) = self.quoted(true) {
            return Some(self.token(
                TokenKind::FreeText {
                    value,
                    quoted: true,
                },
                start,
            ));
        }

        self.attempt(|p| {
            loop {
                if p.check(Self::filter) || p.check(Self::boolean_operator) {
                    break;
                }
                let matched = p.free_parens().is_some()
                    || p.scanner.eat_while(|c| !matches!(c, '(' | ')' | '\n' | ' ')) > 0;
                if !matched {
                    break;
                }
                p.scanner.eat_while(|c| c == ' ');
            }
            if p.scanner.offset() == start.offset {
                return p.fail("free text");
            }
            let text = p.scanner.text_since(start);
            let value = text.trim_end_matches(' ').to_string();
            Some(p.token(
                TokenKind::FreeText {
                    value,
                    quoted: false,
                },
                start,
            ))
        })
    }

    /// free_parens = "(" free_text? ")"
    fn free_parens(&mut self) -> Option<()> {
        self.attempt(|p| {
            if !p.scanner.eat('(') {
                return None;
            }
            p.free_text();
            p.scanner.eat(')').then_some(())
        })
    }

    // ---- filters ----

    fn filter(&mut self) -> Option<Token> {
        FilterType::PRIORITY
            .into_iter()
            .find_map(|filter| self.filter_of(filter))
    }

    /// `"!"? key ":" operator? value` for one filter type.
    fn filter_of(&mut self, filter: FilterType) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            let negated = p.scanner.eat('!');

            let literal_key = match filter {
                FilterType::Has => Some("has:"),
                FilterType::Is => Some("is:"),
                _ => None,
            };
            if literal_key.is_some_and(|literal| !p.scanner.looking_at(literal)) {
                return None;
            }

            let config = filter.config();
            let key = config
                .valid_keys
                .iter()
                .find_map(|&kind| p.key_of(kind))?;
            if !p.scanner.eat(':') {
                return None;
            }
            let operator = p.operator_for(filter, &key)?;
            let value = config
                .valid_values
                .iter()
                .find_map(|&kind| p.value_of(kind))?;

            if !KeyValidation::new(p.ctx).accepts(filter, &key) {
                return None;
            }
            let invalid = validation::check_invalid_filter(p.ctx, filter, &key, &value, negated);
            Some(p.token(
                TokenKind::Filter(Filter {
                    filter,
                    negated,
                    key: Box::new(key),
                    operator,
                    value: Box::new(value),
                    invalid,
                }),
                start,
            ))
        })
    }

    fn operator(&mut self) -> Option<TermOperator> {
        TermOperator::PARSE_ORDER
            .into_iter()
            .find(|op| self.scanner.eat_str(op.as_str()))
    }

    fn operator_for(&mut self, filter: FilterType, key: &Token) -> Option<TermOperator> {
        match filter {
            FilterType::Date => self.operator(),
            FilterType::Duration | FilterType::Numeric => {
                Some(self.operator().unwrap_or(TermOperator::Default))
            }
            _ if filter.is_aggregate() => Some(self.operator().unwrap_or(TermOperator::Default)),
            FilterType::Text => {
                let name = crate::tree::key_name(key, false);
                if KeyValidation::new(self.ctx).is_text_operator(&name) {
                    Some(self.operator().unwrap_or(TermOperator::Default))
                } else {
                    Some(TermOperator::Default)
                }
            }
            _ => Some(TermOperator::Default),
        }
    }

    fn value_of(&mut self, kind: TokenType) -> Option<Token> {
        match kind {
            TokenType::ValueIso8601Date => self.iso_date(),
            TokenType::ValueRelativeDate => self.relative_date(),
            TokenType::ValueDuration => self.duration(),
            TokenType::ValueNumber => self.number(),
            TokenType::ValuePercentage => self.percentage(),
            TokenType::ValueBoolean => self.boolean(),
            TokenType::ValueNumberList => self.list(Self::number, |items| {
                TokenKind::ValueNumberList { items }
            }),
            TokenType::ValueTextList => self.list(Self::text_list_item, |items| {
                TokenKind::ValueTextList { items }
            }),
            TokenType::ValueText => Some(self.text_value()),
            _ => None,
        }
    }

    // ---- keys ----

    fn simple_key(&mut self) -> Option<Token> {
        let start = self.scanner.position();
        if self.scanner.eat_while(is_key_char) == 0 {
            return None;
        }
        let value = self.scanner.text_since(start);
        Some(self.token(
            TokenKind::KeySimple {
                value,
                quoted: false,
            },
            start,
        ))
    }

    fn quoted_key(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            if !p.scanner.eat('"') {
                return None;
            }
            let inner = p.scanner.position();
            if p.scanner.eat_while(|c| is_key_char(c) || c == ':') == 0 {
                return None;
            }
            let value = p.scanner.text_since(inner);
            if !p.scanner.eat('"') {
                return None;
            }
            Some(p.token(
                TokenKind::KeySimple {
                    value,
                    quoted: true,
                },
                start,
            ))
        })
    }

    fn search_key(&mut self) -> Option<Token> {
        self.quoted_key().or_else(|| self.simple_key())
    }

    /// `tags[key]`
    fn explicit_tag_key(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            if !p.scanner.eat_str("tags") || !p.scanner.eat('[') {
                return None;
            }
            let key = p.search_key()?;
            if !p.scanner.eat(']') {
                return None;
            }
            Some(p.token(
                TokenKind::KeyExplicitTag {
                    prefix: "tags".to_string(),
                    key: Box::new(key),
                },
                start,
            ))
        })
    }

    /// `name(spaces args? spaces)`
    fn aggregate_key(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            let name = p.simple_key()?;
            if !p.scanner.eat('(') {
                return None;
            }
            let args_space_before = p.spaces();
            let args = p.aggregate_args();
            let args_space_after = p.spaces();
            if !p.scanner.eat(')') {
                return None;
            }
            Some(p.token(
                TokenKind::KeyAggregate {
                    name: Box::new(name),
                    args: args.map(Box::new),
                    args_space_before: Box::new(args_space_before),
                    args_space_after: Box::new(args_space_after),
                },
                start,
            ))
        })
    }

    fn aggregate_args(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            let first = p.aggregate_param()?;
            let mut args = vec![ListItem {
                separator: String::new(),
                value: Some(first),
            }];
            while let Some(separator) = p.separator() {
                args.push(ListItem {
                    separator,
                    value: p.aggregate_param(),
                });
            }
            Some(p.token(TokenKind::KeyAggregateArgs { args }, start))
        })
    }

    fn aggregate_param(&mut self) -> Option<Token> {
        let start = self.scanner.position();
        if self.quoted(false).is_some() {
            let value = self.scanner.text_since(start);
            return Some(self.token(
                TokenKind::KeyAggregateParam {
                    value,
                    quoted: true,
                },
                start,
            ));
        }
        let raw = self
            .scanner
            .eat_while(|c| !matches!(c, '(' | ')' | '\t' | '\n' | ',' | ' ' | '"'));
        if raw == 0 {
            return None;
        }
        let value = self.scanner.text_since(start);
        Some(self.token(
            TokenKind::KeyAggregateParam {
                value,
                quoted: false,
            },
            start,
        ))
    }

    /// One key alternative from a filter type's `valid_keys`.
    fn key_of(&mut self, kind: TokenType) -> Option<Token> {
        match kind {
            TokenType::KeySimple => self.search_key(),
            TokenType::KeyExplicitTag => self.explicit_tag_key(),
            TokenType::KeyAggregate => self.aggregate_key(),
            _ => None,
        }
    }

    // ---- values ----

    /// `spaces "," spaces`, returning the consumed text.
    fn separator(&mut self) -> Option<String> {
        self.attempt(|p| {
            let start = p.scanner.position();
            p.scanner.eat_while(|c| c == ' ');
            if !p.scanner.eat(',') {
                return None;
            }
            p.scanner.eat_while(|c| c == ' ');
            Some(p.scanner.text_since(start))
        })
    }

    /// `"[" item (separator item?)* "]"` followed by the end of the value.
    fn list(
        &mut self,
        item: fn(&mut Self) -> Option<Token>,
        build: fn(Vec<ListItem>) -> TokenKind,
    ) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            if !p.scanner.eat('[') {
                return None;
            }
            let first = item(p)?;
            let mut items = vec![ListItem {
                separator: String::new(),
                value: Some(first),
            }];
            while let Some(separator) = p.separator() {
                items.push(ListItem {
                    separator,
                    value: item(p),
                });
            }
            if !p.scanner.eat(']') || !p.at_end_value() {
                return None;
            }
            Some(p.token(build(items), start))
        })
    }

    fn text_list_item(&mut self) -> Option<Token> {
        let start = self.scanner.position();
        if let Some(value) = self.quoted(true) {
            return Some(self.token(
                TokenKind::ValueText {
                    value,
                    quoted: true,
                },
                start,
            ));
        }
        while let Some(ch) = self.scanner.current_char() {
            if matches!(ch, '(' | ')' | ',' | ' ') {
                break;
            }
            // A `]` closes the list only where the list may end.
            if ch == ']' {
                let next = self.scanner.peek_char(1);
                if is_end_value(next) || next == Some(',') {
                    break;
                }
            }
            self.scanner.advance();
        }
        if self.scanner.offset() == start.offset {
            return None;
        }
        let value = self.scanner.text_since(start);
        Some(self.token(
            TokenKind::ValueText {
                value,
                quoted: false,
            },
            start,
        ))
    }

    fn text_value(&mut self) -> Token {
        let start = self.scanner.position();
        if let Some(value) = self.quoted(true) {
            return self.token(
                TokenKind::ValueText {
                    value,
                    quoted: true,
                },
                start,
            );
        }
        self.scanner
            .eat_while(|c| !matches!(c, '(' | ')' | '\t' | '\n' | ' '));
        let value = self.scanner.text_since(start);
        self.token(
            TokenKind::ValueText {
                value,
                quoted: false,
            },
            start,
        )
    }

    /// `-?\d+(\.\d*)?[kmb]?` followed by the end of the value, `,` or `]`.
    fn number(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            let negative = p.scanner.eat('-');
            let magnitude = p.numeric()?;
            let unit = p.scanner.current_char().and_then(NumberUnit::from_char);
            if unit.is_some() {
                p.scanner.advance();
            }
            let next = p.scanner.current_char();
            if !(is_end_value(next) || matches!(next, Some(',' | ']'))) {
                return None;
            }
            let value = if negative { -magnitude } else { magnitude };
            let raw_value = match unit {
                Some(unit) => value.checked_mul(unit.multiplier())?,
                None => value,
            };
            Some(p.token(
                TokenKind::ValueNumber {
                    value,
                    raw_value,
                    unit,
                },
                start,
            ))
        })
    }

    fn boolean(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            let value = if p.scanner.eat_str_ignore_case("true") || p.scanner.eat('1') {
                true
            } else if p.scanner.eat_str_ignore_case("false") || p.scanner.eat('0') {
                false
            } else {
                return None;
            };
            if !p.at_end_value() {
                return None;
            }
            Some(p.token(TokenKind::ValueBoolean { value }, start))
        })
    }

    fn duration(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            let value = p.numeric()?;
            let unit = DurationUnit::PARSE_ORDER
                .into_iter()
                .find(|unit| p.scanner.eat_str(unit.as_str()))?;
            if !p.at_end_value() {
                return None;
            }
            Some(p.token(TokenKind::ValueDuration { value, unit }, start))
        })
    }

    fn percentage(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            let value = p.numeric()?;
            if !p.scanner.eat('%') || !p.at_end_value() {
                return None;
            }
            Some(p.token(TokenKind::ValuePercentage { value }, start))
        })
    }

    /// `[+-]\d+[wdhm]`
    fn relative_date(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            let sign = if p.scanner.eat('+') {
                Sign::Plus
            } else if p.scanner.eat('-') {
                Sign::Minus
            } else {
                return None;
            };
            let digits = p.scanner.position();
            if p.scanner.eat_while(|c| c.is_ascii_digit()) == 0 {
                return None;
            }
            let value = p.scanner.text_since(digits).parse::<u64>().ok()?;
            let unit = p.scanner.current_char().and_then(RelativeDateUnit::from_char)?;
            p.scanner.advance();
            if !p.at_end_value() {
                return None;
            }
            Some(p.token(TokenKind::ValueRelativeDate { value, sign, unit }, start))
        })
    }

    /// `YYYY-MM-DD[THH:MM:SS[.ffffff][Z|±HH:MM]]`, checked against the
    /// calendar.
    fn iso_date(&mut self) -> Option<Token> {
        self.attempt(|p| {
            let start = p.scanner.position();
            p.digits(4)?;
            p.scanner.eat('-').then_some(())?;
            p.digits(2)?;
            p.scanner.eat('-').then_some(())?;
            p.digits(2)?;

            let mut has_time = false;
            let mut has_fraction = false;
            let mut zone_start = None;
            let mut offset_seconds = 0;

            if p.scanner.eat('T') {
                has_time = true;
                p.digits(2)?;
                p.scanner.eat(':').then_some(())?;
                p.digits(2)?;
                p.scanner.eat(':').then_some(())?;
                p.digits(2)?;
                if p.scanner.eat('.') {
                    let fraction = p.scanner.eat_while(|c| c.is_ascii_digit());
                    if fraction == 0 || fraction > 6 {
                        return None;
                    }
                    has_fraction = true;
                }

                zone_start = Some(p.scanner.offset());
                if p.scanner.eat('Z') {
                    offset_seconds = 0;
                } else if matches!(p.scanner.current_char(), Some('+' | '-')) {
                    let sign = if p.scanner.eat('-') {
                        -1
                    } else {
                        p.scanner.advance();
                        1
                    };
                    let hours_at = p.scanner.offset();
                    p.digits(2)?;
                    p.scanner.eat(':').then_some(())?;
                    p.digits(2)?;
                    let hours: i32 = p.scanner.slice(hours_at, hours_at + 2).parse().ok()?;
                    let minutes: i32 =
                        p.scanner.slice(hours_at + 3, hours_at + 5).parse().ok()?;
                    offset_seconds = sign * (hours * 3600 + minutes * 60);
                } else {
                    zone_start = None;
                }
            }

            if !p.at_end_value() {
                return None;
            }

            let naive_end = zone_start.unwrap_or(p.scanner.offset());
            let naive_text = p.scanner.slice(start.offset, naive_end);
            let naive = if has_time {
                let format = if has_fraction {
                    "%Y-%m-%dT%H:%M:%S%.f"
                } else {
                    "%Y-%m-%dT%H:%M:%S"
                };
                NaiveDateTime::parse_from_str(&naive_text, format).ok()?
            } else {
                NaiveDate::parse_from_str(&naive_text, "%Y-%m-%d")
                    .ok()?
                    .and_hms_opt(0, 0, 0)?
            };
            let zone = FixedOffset::east_opt(offset_seconds)?;
            let value = naive.and_local_timezone(zone).single()?;

            Some(p.token(
                TokenKind::ValueIso8601Date {
                    value,
                    has_zone: zone_start.is_some(),
                },
                start,
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Token {
        let query = try_parse(input, &ParseContext::builtin()).unwrap();
        query
            .into_tokens()
            .into_iter()
            .find(|t| !matches!(t.kind, TokenKind::Spaces))
            .unwrap()
    }

    #[test]
    fn test_filters_match_their_type_table() {
        let queries = [
            "first_seen:>2024-01-31",
            "last_seen:-24h",
            "age:>1d",
            "error.handled:true",
            "id:[1,2]",
            "times_seen:>10",
            "avg(transaction.duration):>1s",
            "failure_rate():>50%",
            "count():>5",
            "has:user",
            "browser:[a,b]",
            "tags[browser]:chrome",
            "tags[browser]:[a,b]",
            "count():abc",
            "age:soon",
        ];
        for query in queries {
            let token = parse_one(query);
            let filter = token.as_filter().unwrap();
            let config = filter.filter.config();
            assert!(
                config.valid_keys.contains(&filter.key.token_type()),
                "{query}"
            );
            assert!(
                config.valid_values.contains(&filter.value.token_type()),
                "{query}"
            );
        }
    }

    #[test]
    fn test_unclosed_group_reports_position() {
        let err = try_parse("(browser:chrome", &ParseContext::builtin()).unwrap_err();
        assert_eq!(err.position.offset, 15);
        assert_eq!(err.expected, "')'");
        assert_eq!(err.found, None);
    }

    #[test]
    fn test_iso_date_rejects_impossible_days() {
        let token = parse_one("timestamp:2024-02-30");
        let filter = token.as_filter().unwrap();
        assert_eq!(filter.filter, FilterType::Text);
        assert!(filter.invalid.is_some());
    }

    #[test]
    fn test_iso_date_with_zone() {
        let token = parse_one("timestamp:>2024-01-31T12:30:00.123+02:00");
        let filter = token.as_filter().unwrap();
        assert_eq!(filter.filter, FilterType::Date);
        assert_eq!(filter.operator, TermOperator::GreaterThan);
        match &filter.value.kind {
            TokenKind::ValueIso8601Date { value, has_zone } => {
                assert!(*has_zone);
                assert_eq!(value.offset().local_minus_utc(), 7200);
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_number_units_scale_the_value() {
        let token = parse_one("times_seen:>2.5k");
        let filter = token.as_filter().unwrap();
        match &filter.value.kind {
            TokenKind::ValueNumber {
                value,
                raw_value,
                unit,
            } => {
                assert_eq!(*value, Decimal::from_str("2.5").unwrap());
                assert_eq!(*raw_value, Decimal::from(2500));
                assert_eq!(*unit, Some(NumberUnit::Thousand));
            }
            other => panic!("unexpected value {other:?}"),
        }
    }
}
