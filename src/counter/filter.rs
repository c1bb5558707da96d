//! Line filtering heuristics for blank and comment-like lines.
//!
//! The comment check is a prefix/suffix heuristic, not a tokenizer: it does
//! not understand string literals, nested comments, or comment syntaxes
//! beyond `//` and `/* ... */`. Lines are matched raw, without trimming.

/// Decide whether a single line survives filtering.
///
/// Blank lines are dropped when `include_blanks` is false. Lines starting
/// with `//` or `/*`, or ending with `*/`, are dropped when
/// `include_comments` is false.
#[must_use]
pub fn keep_line(line: &str, include_blanks: bool, include_comments: bool) -> bool {
    if !include_blanks && line.is_empty() {
        return false;
    }
    if !include_comments
        && (line.starts_with("//") || line.starts_with("/*") || line.ends_with("*/"))
    {
        return false;
    }
    true
}

/// Count the lines of `text` that survive filtering.
///
/// The text is split on `\n`, so a trailing newline contributes a final
/// empty element that counts as a blank line. That matches how the totals
/// have always been computed and is covered by tests.
#[must_use]
pub fn count_lines(text: &str, include_blanks: bool, include_comments: bool) -> usize {
    text.split('\n')
        .filter(|line| keep_line(line, include_blanks, include_comments))
        .count()
}
