//! Text edits on the query, addressed by char offsets like token locations.

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `count` chars.
pub fn char_prefix(text: &str, count: usize) -> String {
    text.chars().take(count).collect()
}

/// Everything from char `start` on.
pub fn char_suffix(text: &str, start: usize) -> String {
    text.chars().skip(start).collect()
}

/// Replaces chars `start..end` with `replacement`.
pub fn splice(text: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = char_prefix(text, start);
    out.push_str(replacement);
    out.push_str(&char_suffix(text, end.max(start)));
    out
}

/// An edit and the caret position that should follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub query: String,
    pub cursor: usize,
}

/// Replaces the clause `start..end`. With `join` set, the replacement is
/// separated from the remaining text by a space unless one of them already
/// provides it or the remainder closes a group. The caret lands after the
/// replacement.
pub fn replace_clause(query: &str, start: usize, end: usize, replacement: &str, join: bool) -> Edit {
    let length = char_len(query);
    let start = start.min(length);
    let end = end.clamp(start, length);

    let before = char_prefix(query, start);
    let after = char_suffix(query, end);
    let joined = if !join
        || after.is_empty()
        || after.starts_with([' ', ')'])
        || replacement.ends_with(' ')
    {
        format!("{before}{replacement}{after}")
    } else {
        format!("{before}{replacement} {after}")
    };
    Edit {
        query: joined,
        cursor: start + char_len(replacement),
    }
}

#[test]
fn test_splice_counts_chars() {
    assert_eq!(splice("é:b c", 2, 3, "xyz"), "é:xyz c");
}

#[test]
fn test_replace_clause_adds_joiner() {
    let edit = replace_clause("brow is:unresolved", 0, 4, "browser:", true);
    assert_eq!(edit.query, "browser: is:unresolved");
    assert_eq!(edit.cursor, 8);

    let edit = replace_clause("browser:chr", 8, 12, "chrome ", true);
    assert_eq!(edit.query, "browser:chrome ");
    assert_eq!(edit.cursor, 15);

    let edit = replace_clause("brow:chrome", 0, 5, "browser:", false);
    assert_eq!(edit.query, "browser:chrome");

    let edit = replace_clause("browser:chr is:unresolved", 8, 12, "chrome ", true);
    assert_eq!(edit.query, "browser:chrome is:unresolved");
}
