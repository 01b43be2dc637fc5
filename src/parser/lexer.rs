//! Literal lexer for single values from a MySQL VALUES tuple.
//!
//! Turns one raw token (as isolated by [`tokenize_row`](super::tokenize_row))
//! into a typed [`Scalar`].

use chrono::{NaiveDate, NaiveDateTime};

/// A typed SQL literal
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Unquoted `NULL`
    Null,
    /// Integer literal
    Int(i64),
    /// Decimal / scientific literal
    Float(f64),
    /// Quoted string, already unescaped
    Text(String),
    /// Anything else (function calls, hex blobs, ...), kept verbatim
    Raw(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Integer view. Accepts whole floats and numeric strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Scalar::Text(s) | Scalar::Raw(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) | Scalar::Raw(s) => s.trim().parse().ok(),
            Scalar::Null => None,
        }
    }

    /// Borrow the string payload of `Text` and `Raw` values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) | Scalar::Raw(s) => Some(s),
            _ => None,
        }
    }

    /// Render any non-null value as text
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Int(n) => Some(n.to_string()),
            Scalar::Float(f) => Some(f.to_string()),
            Scalar::Text(s) | Scalar::Raw(s) => Some(s.clone()),
        }
    }

    /// MySQL boolean semantics: non-zero numbers and `'1'`/`'true'` are true
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Null => None,
            Scalar::Int(n) => Some(*n != 0),
            Scalar::Float(f) => Some(*f != 0.0),
            Scalar::Text(s) | Scalar::Raw(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Some(true),
                "0" | "false" | "no" | "" => Some(false),
                _ => None,
            },
        }
    }

    /// Date view. Datetime strings are truncated to their date part;
    /// zero dates (`0000-00-00`) yield `None`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        let s = self.as_str()?.trim();
        let day = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Datetime view. A bare date is taken at midnight.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        let s = self.as_str()?.trim();
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .or_else(|| self.as_date().and_then(|d| d.and_hms_opt(0, 0, 0)))
    }
}

/// Lex one raw token into a [`Scalar`].
///
/// Never fails: tokens that are neither `NULL`, quoted strings nor clean
/// numbers come back as [`Scalar::Raw`].
pub fn lex_value(token: &str) -> Scalar {
    let token = token.trim();

    if token == "NULL" {
        return Scalar::Null;
    }

    if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        return Scalar::Text(unescape(&token[1..token.len() - 1]));
    }

    if looks_numeric(token) {
        if let Ok(n) = token.parse::<i64>() {
            return Scalar::Int(n);
        }
        if let Ok(f) = token.parse::<f64>() {
            return Scalar::Float(f);
        }
    }

    Scalar::Raw(token.to_string())
}

/// Unescape a string body in one left-to-right pass.
///
/// Handles both quote conventions (`\'` and `''`) so a body is never
/// processed twice.
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some('\\') => out.push('\\'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\'');
            }
            _ => out.push(c),
        }
    }

    out
}

// Rejects "inf", "NaN" and friends that f64::from_str would accept
fn looks_numeric(token: &str) -> bool {
    !token.is_empty()
        && token.bytes().any(|b| b.is_ascii_digit())
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
}
