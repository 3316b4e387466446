// src/parser/line.rs

//! Single-line quoted field splitting.

use std::mem::take;

/// Split one line of comma-delimited text into trimmed fields.
///
/// Double quotes group text containing commas and are not emitted; inside
/// quotes `""` yields a literal quote. An unterminated quote simply runs to
/// the end of the line. Fields never span lines.
///
/// # Examples
/// ```
/// use catalog_feed::parser::parse_line;
///
/// assert_eq!(
///     parse_line(r#""A, B","say ""hi""""#),
///     vec!["A, B".to_string(), r#"say "hi""#.to_string()]
/// );
/// ```
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    chars.next(); // escaped quote
                    field.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => fields.push(take(&mut field).trim().to_string()),
            _ => field.push(ch),
        }
    }

    fields.push(field.trim().to_string());
    fields
}
