//! Scalar classification and coercion.
//!
//! The classifier infers a [`Value`] from raw scalar text with a fixed
//! precedence: integer, float, boolean, null, string. The coercions answer a
//! single typed question each and return `None` instead of failing; they
//! treat the null spellings exactly like the classifier does.

use crate::value::Value;

/// Infer the type of raw scalar text.
///
/// ```
/// use libminyaml::{classify, Value};
///
/// assert_eq!(classify("42"), Value::Integer(42));
/// assert_eq!(classify("On"), Value::Bool(true));
/// assert_eq!(classify("~"), Value::Null);
/// ```
pub fn classify(text: &str) -> Value {
    if let Ok(n) = text.parse::<i64>() {
        return Value::Integer(n);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::Float(f);
    }
    if let Some(b) = parse_bool(text) {
        return Value::Bool(b);
    }
    if is_null(text) {
        return Value::Null;
    }
    Value::String(text.to_string())
}

/// `null` (any case), `~`, or empty.
pub fn is_null(text: &str) -> bool {
    text.is_empty() || text == "~" || text.eq_ignore_ascii_case("null")
}

fn parse_bool(text: &str) -> Option<bool> {
    const TRUE: [&str; 3] = ["yes", "true", "on"];
    const FALSE: [&str; 3] = ["no", "false", "off"];

    if TRUE.iter().any(|t| text.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE.iter().any(|f| text.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

/// Read scalar text as a boolean.
pub fn to_bool(text: &str) -> Option<bool> {
    if is_null(text) {
        return None;
    }
    parse_bool(text)
}

/// Read scalar text as a 64-bit integer; the whole text must be consumed.
pub fn to_i64(text: &str) -> Option<i64> {
    if is_null(text) {
        return None;
    }
    text.parse().ok()
}

/// Read scalar text as a double; the whole text must be consumed.
pub fn to_f64(text: &str) -> Option<f64> {
    if is_null(text) {
        return None;
    }
    text.parse().ok()
}

/// Strip one matching pair of surrounding quotes and resolve escapes.
///
/// Returns `None` when the text is not quoted.
pub fn dequote(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let quote = bytes[0];
    if (quote == b'"' || quote == b'\'') && bytes[bytes.len() - 1] == quote {
        Some(unescape(&text[1..text.len() - 1]))
    } else {
        None
    }
}

/// Resolve `\n`, `\t`, `\\`, `\'` and `\"`. Any other escaped character
/// stands for itself; a trailing lone backslash is kept.
pub fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}
