// tests/parser_tests.rs

use search_syntax::ast::{BooleanOperator, RelativeDateUnit, Sign};
use search_syntax::{
    Filter, FilterType, ParseContext, ParserConfig, StaticFieldRegistry, TermOperator, Token,
    TokenKind, TokenType, parse, parse_with_defaults, try_parse,
};

fn terms(query: &str) -> Vec<Token> {
    parse_with_defaults(query)
        .unwrap_or_else(|| panic!("failed to parse {query:?}"))
        .into_tokens()
        .into_iter()
        .filter(|t| t.token_type() != TokenType::Spaces)
        .collect()
}

fn only_filter(query: &str) -> Filter {
    let mut tokens = terms(query);
    assert_eq!(tokens.len(), 1, "expected one term in {query:?}");
    match tokens.remove(0).kind {
        TokenKind::Filter(filter) => filter,
        other => panic!("expected a filter, got {other:?}"),
    }
}

// ============================================================================
// Terms
// ============================================================================

#[test]
fn test_empty_query() {
    let parsed = parse_with_defaults("").unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.tokens()[0].token_type(), TokenType::Spaces);
}

#[test]
fn test_free_text_words_form_one_term() {
    let tokens = terms("connection reset by peer");
    assert_eq!(tokens.len(), 1);
    match &tokens[0].kind {
        TokenKind::FreeText { value, quoted } => {
            assert_eq!(value, "connection reset by peer");
            assert!(!quoted);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_quoted_free_text() {
    let tokens = terms(r#""connection reset""#);
    assert!(matches!(
        &tokens[0].kind,
        TokenKind::FreeText { value, quoted: true } if value == "connection reset"
    ));
}

#[test]
fn test_filters_and_free_text_mix() {
    let types: Vec<TokenType> = terms("is:unresolved timeout browser:firefox")
        .iter()
        .map(Token::token_type)
        .collect();
    assert_eq!(
        types,
        [TokenType::Filter, TokenType::FreeText, TokenType::Filter]
    );
}

#[test]
fn test_boolean_operators_and_groups() {
    let tokens = terms("is:unresolved (browser:chrome OR age:<1h)");
    assert_eq!(tokens.len(), 2);
    let TokenKind::LogicGroup { inner } = &tokens[1].kind else {
        panic!("expected a group");
    };
    let inner: Vec<&Token> = inner
        .iter()
        .filter(|t| t.token_type() != TokenType::Spaces)
        .collect();
    assert_eq!(inner.len(), 3);
    assert!(matches!(
        inner[1].kind,
        TokenKind::LogicBoolean {
            value: BooleanOperator::Or,
            invalid: None
        }
    ));
}

#[test]
fn test_boolean_operator_must_stand_alone() {
    let tokens = terms("ORDER");
    assert_eq!(tokens[0].token_type(), TokenType::FreeText);
}

#[test]
fn test_free_text_parentheses() {
    let tokens = terms("foo(bar)");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type(), TokenType::FreeText);
}

// ============================================================================
// Filter types
// ============================================================================

#[test]
fn test_text_filter() {
    let filter = only_filter("browser:chrome");
    assert_eq!(filter.filter, FilterType::Text);
    assert_eq!(filter.operator, TermOperator::Default);
    assert!(!filter.negated);
    assert!(filter.invalid.is_none());
    assert_eq!(filter.key.text, "browser");
    assert_eq!(filter.value.text, "chrome");
}

#[test]
fn test_negated_filter() {
    let filter = only_filter("!browser:firefox");
    assert!(filter.negated);
    assert_eq!(filter.key.start(), 1);
}

#[test]
fn test_text_operator_keys_take_comparisons() {
    let filter = only_filter("release.version:>1.2.0");
    assert_eq!(filter.filter, FilterType::Text);
    assert_eq!(filter.operator, TermOperator::GreaterThan);
    assert_eq!(filter.value.text, "1.2.0");

    // other text keys keep the operator in the value
    let filter = only_filter("browser:>chrome");
    assert_eq!(filter.operator, TermOperator::Default);
    assert_eq!(filter.value.text, ">chrome");
}

#[test]
fn test_text_list() {
    let filter = only_filter("browser:[chrome, \"fire fox\"]");
    assert_eq!(filter.filter, FilterType::TextIn);
    let TokenKind::ValueTextList { items } = &filter.value.kind else {
        panic!("expected a list");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].separator, ", ");
    assert!(matches!(
        &items[1].value.as_ref().unwrap().kind,
        TokenKind::ValueText { value, quoted: true } if value == "fire fox"
    ));
}

#[test]
fn test_numeric_filter() {
    let filter = only_filter("times_seen:>=100");
    assert_eq!(filter.filter, FilterType::Numeric);
    assert_eq!(filter.operator, TermOperator::GreaterThanEqual);
}

#[test]
fn test_numeric_list() {
    let filter = only_filter("id:[1,2,3]");
    assert_eq!(filter.filter, FilterType::NumericIn);
    assert!(filter.invalid.is_none());
}

#[test]
fn test_duration_filter() {
    let filter = only_filter("age:>1d");
    assert_eq!(filter.filter, FilterType::Duration);
    assert_eq!(filter.value.token_type(), TokenType::ValueDuration);
}

#[test]
fn test_boolean_filter() {
    for value in ["true", "1", "false", "0"] {
        let filter = only_filter(&format!("error.handled:{value}"));
        assert_eq!(filter.filter, FilterType::Boolean, "{value}");
    }
}

#[test]
fn test_date_filters() {
    let filter = only_filter("first_seen:>2024-01-31");
    assert_eq!(filter.filter, FilterType::Date);

    let filter = only_filter("first_seen:2024-01-31T12:00:00");
    assert_eq!(filter.filter, FilterType::SpecificDate);

    let filter = only_filter("last_seen:-24h");
    assert_eq!(filter.filter, FilterType::RelativeDate);
    assert!(matches!(
        filter.value.kind,
        TokenKind::ValueRelativeDate {
            value: 24,
            sign: Sign::Minus,
            unit: RelativeDateUnit::Hours
        }
    ));
}

#[test]
fn test_has_and_is() {
    assert_eq!(only_filter("has:user").filter, FilterType::Has);
    assert_eq!(only_filter("is:unresolved").filter, FilterType::Is);
}

#[test]
fn test_aggregate_filters() {
    let filter = only_filter("count():>100");
    assert_eq!(filter.filter, FilterType::AggregateNumeric);
    assert_eq!(filter.key.token_type(), TokenType::KeyAggregate);

    let filter = only_filter("avg(transaction.duration):>1s");
    assert_eq!(filter.filter, FilterType::AggregateDuration);

    let filter = only_filter("failure_rate():>50%");
    assert_eq!(filter.filter, FilterType::AggregatePercentage);

    let filter = only_filter("last_seen():-24h");
    assert_eq!(filter.filter, FilterType::AggregateRelativeDate);
}

#[test]
fn test_aggregate_arguments() {
    let filter = only_filter("count_if(transaction.duration, greater, 300):>10");
    let TokenKind::KeyAggregate { args, .. } = &filter.key.kind else {
        panic!("expected aggregate key");
    };
    let TokenKind::KeyAggregateArgs { args } = &args.as_ref().unwrap().kind else {
        panic!("expected arguments");
    };
    assert_eq!(args.len(), 3);
}

#[test]
fn test_explicit_tag() {
    let filter = only_filter("tags[browser]:chrome");
    assert_eq!(filter.filter, FilterType::Text);
    assert_eq!(filter.key.token_type(), TokenType::KeyExplicitTag);
}

#[test]
fn test_measurements_are_typed() {
    assert_eq!(
        only_filter("measurements.lcp:>300ms").filter,
        FilterType::Duration
    );
    assert_eq!(
        only_filter("measurements.custom:>2.5k").filter,
        FilterType::Numeric
    );
    assert_eq!(only_filter("spans.http:>1s").filter, FilterType::Duration);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_custom_key_sets() {
    let config = ParserConfig::from_json(r#"{"numeric_keys": ["score"]}"#).unwrap();
    let registry = StaticFieldRegistry::new();
    let ctx = ParseContext::new(&config, &registry);
    let parsed = parse("score:>5", &ctx).unwrap();
    assert_eq!(
        parsed.filters()[0].as_filter().unwrap().filter,
        FilterType::Numeric
    );
}

#[test]
fn test_disallowed_boolean_still_parses() {
    let config = ParserConfig {
        allow_boolean: false,
        ..ParserConfig::default()
    };
    let registry = StaticFieldRegistry::builtin();
    let parsed = parse("a OR b", &ParseContext::new(&config, &registry)).unwrap();
    let (token, reason) = parsed.first_invalid().unwrap();
    assert_eq!(token.text, "OR");
    assert!(reason.reason.contains("\"OR\" or \"AND\""));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unclosed_group_is_an_error() {
    assert!(parse_with_defaults("(browser:chrome").is_none());
    let err = try_parse("is:unresolved (a", &ParseContext::builtin()).unwrap_err();
    assert_eq!(err.position.offset, 16);
}

#[test]
fn test_stray_quote_is_plain_free_text() {
    let tokens = terms(r#""timeout"#);
    assert!(matches!(
        &tokens[0].kind,
        TokenKind::FreeText { quoted: false, .. }
    ));
}
