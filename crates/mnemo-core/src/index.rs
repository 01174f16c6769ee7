//! BM25 term-frequency ranking over the tokenized memory corpus.
//!
//! The index is rebuilt from the full corpus after every insertion. That is
//! O(total tokens) per add, which is fine at the scale this store targets
//! (thousands of memories, not millions); retrieval quality matters more
//! here than insert throughput.

use std::collections::HashMap;

/// Standard Okapi BM25 term-frequency saturation parameter.
pub const DEFAULT_K1: f64 = 1.5;
/// Standard Okapi BM25 length-normalization parameter.
pub const DEFAULT_B: f64 = 0.75;

/// Okapi BM25 index over an ordered document corpus.
#[derive(Debug)]
pub struct Bm25Index {
    k1: f64,
    b: f64,
    /// Per-document term frequencies, in corpus order.
    doc_tfs: Vec<HashMap<String, usize>>,
    /// Per-document token counts, in corpus order.
    doc_lens: Vec<usize>,
    /// Average document length over the corpus.
    avgdl: f64,
    /// Inverse document frequency per term.
    idf: HashMap<String, f64>,
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Bm25Index {
    pub fn new() -> Self {
        Self::with_params(DEFAULT_K1, DEFAULT_B)
    }

    pub fn with_params(k1: f64, b: f64) -> Self {
        Self {
            k1,
            b,
            doc_tfs: Vec::new(),
            doc_lens: Vec::new(),
            avgdl: 0.0,
            idf: HashMap::new(),
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_tfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_tfs.is_empty()
    }

    /// Rebuild all ranking statistics from the tokenized corpus.
    ///
    /// Replaces any previous state; callers re-index after each insertion.
    pub fn index(&mut self, corpus: &[Vec<String>]) {
        self.doc_tfs.clear();
        self.doc_lens.clear();
        self.idf.clear();

        let mut total_len = 0usize;
        for doc in corpus {
            let mut tf: HashMap<String, usize> = HashMap::new();
            for token in doc {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            total_len += doc.len();
            self.doc_lens.push(doc.len());
            self.doc_tfs.push(tf);
        }

        let n = corpus.len();
        self.avgdl = if n > 0 { total_len as f64 / n as f64 } else { 0.0 };

        // Document frequency per term, then the non-negative idf variant:
        // ln(1 + (N - df + 0.5) / (df + 0.5)).
        let mut df: HashMap<&str, usize> = HashMap::new();
        for tf in &self.doc_tfs {
            for term in tf.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        let n = n as f64;
        self.idf = df
            .into_iter()
            .map(|(term, df)| {
                let df = df as f64;
                (term.to_string(), (1.0 + (n - df + 0.5) / (df + 0.5)).ln())
            })
            .collect();
    }

    /// Score every document against the query tokens.
    ///
    /// Returns one `(document_index, score)` per document in corpus order,
    /// including zero-scoring documents; callers rank, they do not filter.
    pub fn score(&self, query: &[String]) -> Vec<(usize, f64)> {
        let avgdl = if self.avgdl > 0.0 { self.avgdl } else { 1.0 };

        self.doc_tfs
            .iter()
            .enumerate()
            .map(|(i, tf)| {
                let len_norm = 1.0 - self.b + self.b * self.doc_lens[i] as f64 / avgdl;
                let score: f64 = query
                    .iter()
                    .map(|token| {
                        let freq = tf.get(token).copied().unwrap_or(0) as f64;
                        if freq == 0.0 {
                            return 0.0;
                        }
                        let idf = self.idf.get(token).copied().unwrap_or(0.0);
                        idf * freq * (self.k1 + 1.0) / (freq + self.k1 * len_norm)
                    })
                    .sum();
                (i, score)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;

    fn build(corpus: &[&str]) -> (Bm25Index, Vec<Vec<String>>) {
        let tokenized: Vec<Vec<String>> = corpus.iter().map(|d| tokenize(d)).collect();
        let mut index = Bm25Index::new();
        index.index(&tokenized);
        (index, tokenized)
    }

    #[test]
    fn test_scores_every_document() {
        let (index, _) = build(&["apple fruit", "banana fruit", "rust language"]);
        let scores = index.score(&tokenize("fruit"));
        assert_eq!(scores.len(), 3);
        assert!(scores[0].1 > 0.0);
        assert!(scores[1].1 > 0.0);
        // Non-matching documents still appear, with zero score.
        assert_eq!(scores[2].1, 0.0);
    }

    #[test]
    fn test_mixed_script_ranking() {
        let (index, _) = build(&["苹果是一种水果", "香蕉是黄色的水果", "Python是编程语言"]);
        let mut scores = index.score(&tokenize("水果"));
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        // The two fruit documents outrank the programming one.
        let top_two: Vec<usize> = scores[..2].iter().map(|(i, _)| *i).collect();
        assert!(top_two.contains(&0));
        assert!(top_two.contains(&1));
        assert_eq!(scores[2].0, 2);
        assert_eq!(scores[2].1, 0.0);
    }

    #[test]
    fn test_rarer_terms_score_higher() {
        let (index, _) = build(&["common rare", "common", "common"]);
        let rare = index.score(&tokenize("rare"));
        let common = index.score(&tokenize("common"));
        assert!(rare[0].1 > common[0].1);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let (index, _) = build(&["one two", "three"]);
        let scores = index.score(&[]);
        assert!(scores.iter().all(|(_, s)| *s == 0.0));
    }

    #[test]
    fn test_reindex_after_insert_replaces_state() {
        // The index is rebuilt wholesale on every insert; this exercises
        // that path rather than incremental updates, which the index does
        // not support.
        let mut corpus: Vec<Vec<String>> = vec![tokenize("apple fruit")];
        let mut index = Bm25Index::new();
        index.index(&corpus);
        assert_eq!(index.len(), 1);

        corpus.push(tokenize("banana fruit"));
        index.index(&corpus);
        assert_eq!(index.len(), 2);
        assert_eq!(index.score(&tokenize("fruit")).len(), 2);
    }
}
