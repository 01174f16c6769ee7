//! Heuristic textual similarity between two memory contents.

use std::collections::HashSet;

use crate::tokenize::tokenize;

/// Score how similar two contents are, in [0, 1].
///
/// Comparison is case-insensitive:
/// - exact match scores 1.0;
/// - one string containing the other scores 0.5, raised to 0.8 when the
///   contained string is a prefix or suffix of the container;
/// - otherwise the Jaccard index of the two word sets. Words come from the
///   ranking tokenizer, which matches a whitespace split for Latin text and
///   gives segmented words for CJK text, where whitespace carries no signal.
pub fn content_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return 1.0;
    }

    if a.contains(&b) || b.contains(&a) {
        let affix = a.starts_with(&b)
            || a.ends_with(&b)
            || b.starts_with(&a)
            || b.ends_with(&a);
        return if affix { 0.8 } else { 0.5 };
    }

    let tokens_a = tokenize(&a);
    let tokens_b = tokenize(&b);
    let words_a: HashSet<&str> = tokens_a.iter().map(String::as_str).collect();
    let words_b: HashSet<&str> = tokens_b.iter().map(String::as_str).collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    if intersection == 0 {
        return 0.0;
    }
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}
