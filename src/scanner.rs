use serde::Serialize;

/// A point in the query string.
///
/// `offset` counts chars (Unicode scalar values) from the start of the input;
/// `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Char cursor over a query string with backtracking support.
///
/// The grammar is scannerless, so the parser drives this directly: every rule
/// saves a [`Position`], tries to consume input and restores the position if
/// the rule does not match.
#[derive(Debug, Clone)]
pub struct Scanner {
    input: Vec<char>,
    position: Position,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Scanner {
            input: input.chars().collect(),
            position: Position::start(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn offset(&self) -> usize {
        self.position.offset
    }

    pub fn reset(&mut self, position: Position) {
        self.position = position;
    }

    pub fn is_eof(&self) -> bool {
        self.position.offset >= self.input.len()
    }

    pub fn current_char(&self) -> Option<char> {
        self.input.get(self.position.offset).copied()
    }

    pub fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position.offset + offset).copied()
    }

    pub fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position.offset += 1;
            if ch == '\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
        }
    }

    /// Consumes `ch` if it is the current char.
    pub fn eat(&mut self, ch: char) -> bool {
        if self.current_char() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `literal` if the input continues with it.
    pub fn eat_str(&mut self, literal: &str) -> bool {
        if self.looking_at(literal) {
            for _ in literal.chars() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    /// Case-insensitive variant of [`Scanner::eat_str`] for ASCII literals.
    pub fn eat_str_ignore_case(&mut self, literal: &str) -> bool {
        let matches = literal
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_char(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)));
        if matches {
            for _ in literal.chars() {
                self.advance();
            }
        }
        matches
    }

    pub fn looking_at(&self, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_char(i) == Some(c))
    }

    /// Consumes chars while `pred` holds and returns how many were consumed.
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while let Some(ch) = self.current_char() {
            if !pred(ch) {
                break;
            }
            self.advance();
            count += 1;
        }
        count
    }

    /// Text between two offsets of the input.
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.input[start.min(self.input.len())..end.min(self.input.len())]
            .iter()
            .collect()
    }

    /// Text consumed since `start`.
    pub fn text_since(&self, start: Position) -> String {
        self.slice(start.offset, self.position.offset)
    }
}

#[test]
fn test_position_tracking() {
    let mut scanner = Scanner::new("a\nbc");
    scanner.advance();
    scanner.advance();
    assert_eq!(
        scanner.position(),
        Position {
            offset: 2,
            line: 2,
            column: 1
        }
    );
    scanner.advance();
    assert_eq!(scanner.position().column, 2);
}

#[test]
fn test_eat_and_reset() {
    let mut scanner = Scanner::new("OR browser");
    let start = scanner.position();
    assert!(scanner.eat_str_ignore_case("or"));
    assert!(scanner.eat(' '));
    assert!(!scanner.eat_str("device"));
    assert_eq!(scanner.eat_while(|c| c.is_ascii_alphabetic()), 7);
    assert!(scanner.is_eof());
    assert_eq!(scanner.text_since(start), "OR browser");
    scanner.reset(start);
    assert_eq!(scanner.current_char(), Some('O'));
}
