//! Canonical comparison form for food names.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Convert text to its comparison form: accents stripped, lowercase, trimmed.
///
/// The text is NFD-decomposed so that `"ç"` becomes `'c'` plus a combining
/// cedilla, the combining marks are dropped, and the remainder is lowercased.
/// Interior whitespace is left untouched.
///
/// Every mark category is dropped (Mn, Mc and Me), not only nonspacing marks.
/// Spacing vowel signs in scripts such as Devanagari are removed as well.
///
/// `normalize(&normalize(s)) == normalize(s)` for every input.
pub fn normalize(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = stripped.to_lowercase();
    // Lowercasing can reintroduce decomposable characters (e.g. 'İ' -> "i̇").
    let lowered: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
    lowered.trim().to_string()
}
