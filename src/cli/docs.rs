//! Documentation content for the searchq CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Filters,
    Values,
    Operators,
    Logic,
    Shortcuts,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "filters" | "filter" | "keys" => Some(Self::Filters),
            "values" | "value" | "types" => Some(Self::Values),
            "operators" | "ops" => Some(Self::Operators),
            "logic" | "boolean" | "groups" => Some(Self::Logic),
            "shortcuts" | "shortcut" | "hotkeys" => Some(Self::Shortcuts),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"SEARCH SYNTAX DOCUMENTATION

A search query is a space separated list of filters and free text. Filters
narrow results on a key; free text matches anywhere.

DOCUMENTATION CATEGORIES

  syntax            Terms, spaces, quoting and free text
  filters           Filter kinds and how a key picks one
  values            Numbers, durations, percentages, dates and lists
  operators         Comparison operators and negation
  logic             AND, OR and parenthesized groups
  shortcuts         Keyboard shortcuts of the search bar

QUICK REFERENCE

  key:value         Text filter
  !key:value        Negated filter
  key:>10           Comparison
  key:[a, b]        Any of the listed values
  has:key           Key is present
  is:unresolved     Issue state
  count():>100      Aggregate filter
  ( ... OR ... )    Grouping

Run 'searchq doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Filters) => Ok(FILTERS_DOC),
        Some(DocCategory::Values) => Ok(VALUES_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Logic) => Ok(LOGIC_DOC),
        Some(DocCategory::Shortcuts) => Ok(SHORTCUTS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Terms and Free Text

TERMS
  A query is a sequence of terms separated by spaces. Each term is a filter,
  a boolean operator, a parenthesized group or free text.

    Example:
      is:unresolved browser:firefox timeout

FREE TEXT
  Words that are not filters are searched as text. Consecutive words form a
  single free text term.

    Example:
      connection reset by peer

QUOTING
  Wrap a value in double quotes when it holds spaces. Escape a quote inside
  with a backslash.

    Example:
      message:"connection reset"
      message:"say \"hi\""

    Constraints:
      - A bare quote inside an unquoted value marks the filter invalid
      - An unclosed group or quote is a syntax error

ROUND TRIP
  Every character of the query belongs to exactly one token, so joining the
  token texts gives back the query unchanged.
"#;

const FILTERS_DOC: &str = r#"FILTERS - Filter Kinds

FORM
  [!]key:[operator]value

  The key decides which kind of filter is parsed. A value that does not fit
  the key's kind still parses, as a text filter marked invalid.

KINDS
  text               browser:chrome
  text list          browser:[chrome, firefox]
  numeric            times_seen:>100
  numeric list       id:[1, 2, 3]
  duration           age:>24h
  percentage         failure_rate:>50%
  boolean            error.handled:true
  date               first_seen:>2024-01-31
  relative date      last_seen:-24h
  has                has:user
  is                 is:unresolved
  aggregate numeric  count():>100
  aggregate duration avg(transaction.duration):>1s
  aggregate date     last_seen():-24h
  explicit tag       tags[browser]:chrome

UNKNOWN KEYS
  When key validation is enabled, keys outside the supported set are
  marked invalid.

MEASUREMENTS
  Keys such as measurements.lcp and spans.http are typed without being
  registered.
"#;

const VALUES_DOC: &str = r#"VALUES - Typed Values

NUMBERS
  Digits with an optional fraction and a k, m or b suffix.

    Example:
      times_seen:>2.5k      2500

DURATIONS
  A number followed by one of ms, s, min, m, hr, h, day, d, wk or w.

    Example:
      age:>1d
      transaction.duration:<300ms

PERCENTAGES
  A number followed by %.

DATES
  ISO 8601 dates with optional time, fraction and zone, or a relative date.

    Example:
      first_seen:>2024-01-31
      first_seen:>2024-01-31T12:00:00+02:00
      last_seen:-24h

    Constraints:
      - Absolute dates need a comparison operator
      - Impossible dates such as 2024-02-30 are invalid

BOOLEANS
  true, 1, false or 0.

LISTS
  Comma separated values in brackets.

    Constraints:
      - Lists may not hold empty values, as in id:[1,,3]
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Comparison and Negation

COMPARISON
  :       Equal (the default)
  :>      Greater than
  :>=     Greater than or equal
  :<      Less than
  :<=     Less than or equal
  :=      Equal, written out
  :!=     Not equal

  Examples:
    times_seen:>=100
    age:<1h

  Constraints:
    - Text keys take comparisons only when they are text operator keys,
      such as release.version
    - Dates require a comparison

NEGATION
  Prefix a filter with ! to exclude matches.

    Example:
      !browser:firefox
"#;

const LOGIC_DOC: &str = r#"LOGIC - Boolean Operators and Groups

OPERATORS
  AND     Both sides match
  OR      Either side matches

  Operators are case sensitive and must stand alone between terms.

    Example:
      browser:chrome OR browser:firefox

GROUPS
  Parentheses group terms.

    Example:
      is:unresolved (browser:chrome OR age:<1h)

  Constraints:
    - A group must be closed
    - Boolean operators can be disallowed by configuration; they then parse
      but are marked invalid
"#;

const SHORTCUTS_DOC: &str = r#"SHORTCUTS - Search Bar Hotkeys

  ctrl+option+backspace   Delete the filter under the cursor
  ctrl+option+1           Exclude or include the filter under the cursor
  ctrl+option+left        Move to the previous filter
  ctrl+option+right       Move to the next filter

  Moving wraps around at both ends of the query.
"#;
