//! Text tokenisation for projections and queries

use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").expect("static regex"));

/// Split text into lowercase tokens
///
/// Words are split on non-alphanumerics and again on camelCase and
/// letter/digit boundaries; compound words also contribute their whole
/// lowercase form.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in WORD.find_iter(text).map(|m| m.as_str()) {
        let parts = split_camel(word);
        if parts.len() > 1 {
            tokens.push(word.to_ascii_lowercase());
        }
        tokens.extend(parts);
    }
    tokens
}

fn split_camel(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut parts = Vec::new();
    let mut start = 0;
    for i in 1..chars.len() {
        let (prev, cur) = (chars[i - 1], chars[i]);
        let next_lower = chars.get(i + 1).is_some_and(|c| c.is_ascii_lowercase());
        let boundary = (prev.is_ascii_lowercase() && cur.is_ascii_uppercase())
            || (prev.is_ascii_uppercase() && cur.is_ascii_uppercase() && next_lower)
            || (prev.is_ascii_digit() != cur.is_ascii_digit());
        if boundary {
            parts.push(chars[start..i].iter().collect::<String>().to_ascii_lowercase());
            start = i;
        }
    }
    if start < chars.len() {
        parts.push(chars[start..].iter().collect::<String>().to_ascii_lowercase());
    }
    parts
}
