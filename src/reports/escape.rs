//! Escaping utilities for Markdown report generation.
//!
//! ODIS values are free text written by ECU suppliers and testers; they
//! regularly contain `|`, `*`, `_` and line breaks. Every value embedded in
//! a Markdown report goes through one of these helpers so it cannot break
//! table structure or open stray emphasis.

/// Append one character to `out`, escaped for a Markdown table cell.
///
/// Emphasis markers are escaped too, because cells may be wrapped in `**`
/// for highlighting.
pub fn push_escaped(out: &mut String, c: char) {
    match c {
        '|' | '*' | '_' | '`' | '[' | ']' | '<' | '>' | '~' | '#' => {
            out.push('\\');
            out.push(c);
        }
        '\n' | '\t' => out.push(' '),
        '\r' => {}
        _ => out.push(c),
    }
}

/// Escape a string for safe inclusion in a Markdown table cell.
///
/// # Examples
///
/// ```
/// use odis_compare::reports::escape::escape_markdown_cell;
///
/// assert_eq!(escape_markdown_cell("a | b"), "a \\| b");
/// assert_eq!(escape_markdown_cell("SW_VERSION"), "SW\\_VERSION");
/// ```
#[must_use]
pub fn escape_markdown_cell(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        push_escaped(&mut result, c);
    }
    result
}

/// Escape a string for a Markdown heading line.
#[must_use]
pub fn escape_markdown_heading(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' | '_' | '`' | '[' | ']' | '#' | '<' | '>' => {
                result.push('\\');
                result.push(c);
            }
            '\n' | '\r' => result.push(' '),
            _ => result.push(c),
        }
    }
    result
}

/// Escape an optional value for a table cell, returning "-" for None.
#[must_use]
pub fn escape_md_opt(s: Option<&str>) -> String {
    match s {
        Some(v) if !v.is_empty() => escape_markdown_cell(v),
        _ => "-".to_string(),
    }
}
