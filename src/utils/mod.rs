//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;
pub mod time;

use regex::Regex;
use std::sync::OnceLock;

/// Decorative glyphs AtCoder prefixes to contest names (rated/heuristic/etc.)
const DECORATIVE_GLYPHS: &[char] = &['Ⓐ', 'Ⓗ', '◉'];

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Remove decorative glyphs and collapse whitespace in a contest title
pub fn clean_title(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !DECORATIVE_GLYPHS.contains(c))
        .collect();
    normalize_whitespace(&stripped)
}

/// Return `value` when it has visible content, otherwise `fallback`
pub fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}
