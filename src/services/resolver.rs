//! Best-match selection of a candidate name against the canonical vocabulary.
//!
//! Every candidate is compared against every canonical name. That costs
//! O(vocabulary × name_len²) per candidate, which is fine for a few thousand
//! names; any prefilter added later must keep first-match tie breaking.

use crate::services::normalize::normalize;
use crate::services::similarity::similarity;

/// A match is accepted only when its score is strictly above this value.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.35;

/// Outcome of resolving one candidate name.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    /// Accepted canonical name, if the best score cleared the threshold.
    pub best_match: Option<&'a str>,
    /// Highest score seen, reported even when rejected.
    pub score: f64,
}

impl Resolution<'_> {
    pub fn is_match(&self) -> bool {
        self.best_match.is_some()
    }
}

/// Resolve `candidate` against `canonical_names`, normalizing both sides.
pub fn resolve<'a, S: AsRef<str>>(candidate: &str, canonical_names: &'a [S]) -> Resolution<'a> {
    let normalized_candidate = normalize(candidate);
    let scored = canonical_names.iter().map(|name| {
        let name = name.as_ref();
        (name, similarity(&normalized_candidate, &normalize(name)))
    });
    select_best(scored)
}

/// Resolve against names whose normalized forms were computed in advance.
///
/// `entries` yields `(canonical_name, normalized_name)` pairs in vocabulary order.
pub fn resolve_normalized<'a, I>(normalized_candidate: &str, entries: I) -> Resolution<'a>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let scored = entries
        .into_iter()
        .map(|(name, normalized)| (name, similarity(normalized_candidate, normalized)));
    select_best(scored)
}

/// Keep the first strictly-highest score, then apply the threshold.
fn select_best<'a>(scored: impl Iterator<Item = (&'a str, f64)>) -> Resolution<'a> {
    let mut best_match = None;
    let mut best_score = 0.0;

    for (name, score) in scored {
        if score > best_score {
            best_score = score;
            best_match = Some(name);
        }
    }

    Resolution {
        best_match: best_match.filter(|_| best_score > ACCEPTANCE_THRESHOLD),
        score: best_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &[
        "Arroz, integral, cozido",
        "Arroz, tipo 1, cozido",
        "Banana, nanica, crua",
        "Banana, prata, crua",
        "Ovo, galinha, cozido",
        "Pão, trigo, francês",
    ];

    #[test]
    fn test_exact_name_wins() {
        let r = resolve("Banana, prata, crua", NAMES);
        assert_eq!(r.best_match, Some("Banana, prata, crua"));
        assert_eq!(r.score, 1.0);
    }

    #[test]
    fn test_accent_and_case_insensitive() {
        let r = resolve("PAO, TRIGO, FRANCES", NAMES);
        assert_eq!(r.best_match, Some("Pão, trigo, francês"));
        assert_eq!(r.score, 1.0);
    }

    #[test]
    fn test_approximate_match() {
        let r = resolve("Ovo cozido", NAMES);
        assert_eq!(r.best_match, Some("Ovo, galinha, cozido"));
        assert!(r.score > ACCEPTANCE_THRESHOLD);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let r = resolve("xyzxyz", NAMES);
        assert!(!r.is_match());
        assert!(r.score <= ACCEPTANCE_THRESHOLD);
    }

    #[test]
    fn test_empty_vocabulary() {
        let names: &[&str] = &[];
        let r = resolve("banana", names);
        assert_eq!(r.best_match, None);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn test_first_name_wins_ties() {
        // "abcd" is one substitution away from both entries.
        let names = ["abce", "abcf"];
        let r = resolve("abcd", &names);
        assert_eq!(r.best_match, Some("abce"));

        let reversed = ["abcf", "abce"];
        let r = resolve("abcd", &reversed);
        assert_eq!(r.best_match, Some("abcf"));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // "abcdefghijklmnopqrst" vs "abcdefgxxxxxxxxxxxxx": 7 of 20 chars kept -> 0.35
        let names = ["abcdefgxxxxxxxxxxxxx"];
        let r = resolve("abcdefghijklmnopqrst", &names);
        assert!((r.score - 0.35).abs() < 1e-12);
        assert_eq!(r.best_match, None);

        // 8 of 20 -> 0.40
        let names = ["abcdefghxxxxxxxxxxxx"];
        let r = resolve("abcdefghijklmnopqrst", &names);
        assert_eq!(r.best_match, Some("abcdefghxxxxxxxxxxxx"));
    }

    #[test]
    fn test_deterministic() {
        let first = resolve("arroz cozido", NAMES);
        for _ in 0..10 {
            assert_eq!(resolve("arroz cozido", NAMES), first);
        }
    }

    #[test]
    fn test_prenormalized_agrees_with_resolve() {
        let normalized: Vec<String> = NAMES.iter().map(|n| normalize(n)).collect();
        for candidate in ["Ovo cozido", "banana", "pao frances", "xyzxyz", ""] {
            let direct = resolve(candidate, NAMES);
            let entries = NAMES.iter().copied().zip(normalized.iter().map(String::as_str));
            let cached = resolve_normalized(&normalize(candidate), entries);
            assert_eq!(direct, cached, "diverged for {candidate:?}");
        }
    }
}
