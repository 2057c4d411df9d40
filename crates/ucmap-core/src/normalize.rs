//! Text normalization and collation shared by the filter and sort steps.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalizes optional free text into a comparable form.
///
/// Absent or empty input yields `""`; anything else is trimmed and
/// lowercased. Accents are kept: `"Camaçari"` and `"Camacari"` do not match.
#[must_use]
pub fn normalize(text: Option<&str>) -> String {
    text.map(|s| s.trim().to_lowercase()).unwrap_or_default()
}

/// Compares two strings the way a browser's `localeCompare` orders them
/// under the root locale.
///
/// Levels, most significant first: base letters ignoring case and accents,
/// then accents, then case (lowercase before uppercase). A final code-point
/// comparison keeps the order total.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| a.chars().map(swap_case).cmp(b.chars().map(swap_case)))
        .then_with(|| a.cmp(b))
}

fn primary_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn secondary_key(s: &str) -> String {
    s.nfd().collect::<String>().to_lowercase()
}

// Lowercase letters map below their uppercase forms after the swap.
fn swap_case(c: char) -> char {
    if c.is_uppercase() {
        c.to_lowercase().next().unwrap_or(c)
    } else if c.is_lowercase() {
        c.to_uppercase().next().unwrap_or(c)
    } else {
        c
    }
}
