//! Sparse TF-IDF vectors and cosine similarity.
//!
//! The corpus for a query is always the queried spell plus its candidate
//! pool -- never the whole tree -- so document frequency stays meaningful
//! for each pool. The smoothed IDF `ln((N+1)/(df+1)) + 1` is strictly
//! positive, which keeps every present term contributing to the norm.

use std::collections::BTreeMap;

/// A sparse TF-IDF vector with its pre-computed L2 norm.
#[derive(Debug, Clone, Default)]
pub struct SparseVector {
    /// Token weights (tf x idf).
    weights: BTreeMap<String, f64>,
    /// L2 magnitude of the weights; 0.0 marks a degenerate vector.
    norm: f64,
}

impl SparseVector {
    /// The vector's L2 magnitude.
    pub const fn norm(&self) -> f64 {
        self.norm
    }

    /// Whether the vector carries no usable weight.
    pub fn is_degenerate(&self) -> bool {
        self.norm == 0.0
    }

    /// Number of distinct weighted terms.
    pub fn term_count(&self) -> usize {
        self.weights.len()
    }
}

/// Compute TF-IDF vectors for a corpus of tokenized documents.
///
/// Term frequency is `count / doc_len`; inverse document frequency is the
/// smoothed `ln((N+1)/(df+1)) + 1`. Empty documents produce degenerate
/// vectors with norm 0.
#[allow(clippy::cast_precision_loss)]
pub fn compute_tfidf(documents: &[Vec<String>]) -> Vec<SparseVector> {
    // Document frequency over unique tokens per document.
    let mut df: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in documents {
        let unique: std::collections::BTreeSet<&str> =
            doc.iter().map(String::as_str).collect();
        for token in unique {
            let count = df.entry(token).or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    let n_docs = documents.len() as f64;
    let idf: BTreeMap<&str, f64> = df
        .into_iter()
        .map(|(token, freq)| {
            let value = ((n_docs + 1.0) / (freq as f64 + 1.0)).ln() + 1.0;
            (token, value)
        })
        .collect();

    documents
        .iter()
        .map(|doc| {
            let mut tf: BTreeMap<&str, usize> = BTreeMap::new();
            for token in doc {
                let count = tf.entry(token.as_str()).or_insert(0);
                *count = count.saturating_add(1);
            }
            let total = if doc.is_empty() { 1.0 } else { doc.len() as f64 };

            let mut weights = BTreeMap::new();
            let mut norm_sq = 0.0_f64;
            for (token, count) in tf {
                let weight = (count as f64 / total) * idf.get(token).copied().unwrap_or(1.0);
                norm_sq += weight * weight;
                weights.insert(String::from(token), weight);
            }

            SparseVector {
                weights,
                norm: if norm_sq > 0.0 { norm_sq.sqrt() } else { 0.0 },
            }
        })
        .collect()
}

/// Cosine similarity between two sparse vectors, in `[0, 1]`.
///
/// Returns exactly 0.0 when either vector is degenerate. The dot product
/// iterates over the smaller vector and probes the larger one.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    if a.is_degenerate() || b.is_degenerate() {
        return 0.0;
    }

    let (small, large) = if a.weights.len() <= b.weights.len() {
        (a, b)
    } else {
        (b, a)
    };

    let mut dot = 0.0_f64;
    for (token, weight) in &small.weights {
        if let Some(other) = large.weights.get(token) {
            dot += weight * other;
        }
    }

    (dot / (a.norm * b.norm)).clamp(0.0, 1.0)
}
