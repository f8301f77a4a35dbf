//! Edit-distance similarity between food names.

use strsim::levenshtein;

/// Similarity in `[0.0, 1.0]` derived from the Levenshtein distance.
///
/// Both inputs are lowercased here regardless of prior normalization.
/// Lengths are counted in chars, so an accented letter costs one edit.
///
/// `(max_len - distance) / max_len`, with two empty strings scoring 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    // strsim keeps a single rolling row sized to the second argument.
    let distance = levenshtein(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}
