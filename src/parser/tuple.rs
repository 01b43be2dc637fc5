//! Tuple-level scanning for `VALUES (...),(...)` clauses.
//!
//! Both scanners share the same string rules: a backslash escapes the next
//! character and a doubled `''` is a quote inside the string.

/// Split a VALUES clause into balanced `(...)` tuple slices.
///
/// Parentheses are only counted outside strings. A `;` at depth zero ends
/// the clause. An unterminated trailing tuple is dropped.
pub fn split_value_list(clause: &str) -> Vec<&str> {
    let bytes = clause.as_bytes();
    let mut tuples = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            match b {
                b'\\' => i += 1,
                b'\'' if bytes.get(i + 1) == Some(&b'\'') => i += 1,
                b'\'' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }

        match b {
            b'\'' => in_string = true,
            b'(' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        tuples.push(&clause[s..=i]);
                    }
                }
            }
            b';' if depth == 0 => break,
            _ => {}
        }
        i += 1;
    }

    tuples
}

/// Split one `(v1, v2, ...)` tuple into raw value tokens.
///
/// Tokens keep their quotes; a doubled `''` inside a string is re-encoded
/// as `\'` so [`lex_value`](super::lex_value) only has to handle one
/// convention. Whitespace outside strings is dropped.
pub fn tokenize_row(tuple: &str) -> Vec<String> {
    let trimmed = tuple.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            match c {
                '\\' => {
                    current.push('\\');
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    current.push_str("\\'");
                }
                '\'' => {
                    current.push('\'');
                    in_string = false;
                }
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '\'' => {
                in_string = true;
                current.push(c);
            }
            ',' => tokens.push(std::mem::take(&mut current)),
            c if c.is_whitespace() => {}
            _ => current.push(c),
        }
    }

    if !current.is_empty() || !tokens.is_empty() {
        tokens.push(current);
    }

    tokens
}
