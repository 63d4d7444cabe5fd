//! Numeric extraction from free-text upstream fields.

/// Pulls a decimal number out of free text by stripping every character that
/// is not an ASCII digit or a decimal point and parsing the remainder.
///
/// `"$1,234.56"` → 1234.56, `"2.4 pounds"` → 2.4. An empty or unparseable
/// remainder yields 0.0, never an error.
#[must_use]
pub fn extract_decimal(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Returns the longest prefix of `s` holding at most `max` characters,
/// respecting char boundaries.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Renders a JSON scalar as the text the extraction routines expect.
///
/// Upstream price and weight values arrive as either strings or bare
/// numbers; anything else is treated as empty.
pub(crate) fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
