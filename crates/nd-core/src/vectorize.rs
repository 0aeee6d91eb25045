//! TF-IDF term vectors over unigrams and bigrams.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::EngineConfig;

/// Weighted term vectors for a corpus plus the feature vocabulary.
#[derive(Clone, Debug, Default)]
pub struct TermVectors {
    /// Feature terms, alphabetically ordered. Column `j` of every row is `vocabulary[j]`.
    pub vocabulary: Vec<String>,
    /// One L2-normalized dense row per input document.
    pub rows: Vec<Vec<f64>>,
}

impl TermVectors {
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }
}

/// Builds [`TermVectors`] with document-frequency pruning and a vocabulary cap.
#[derive(Clone, Debug)]
pub struct VectorSpaceBuilder {
    pub max_features: usize,
    pub min_df: usize,
    pub max_df: f64,
}

impl Default for VectorSpaceBuilder {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl VectorSpaceBuilder {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_features: config.max_features,
            min_df: config.min_df,
            max_df: config.max_df,
        }
    }

    /// Vectorize tokenized documents.
    ///
    /// Terms appearing in fewer than `min_df` documents or in more than
    /// `max_df * n` documents are dropped. If more than `max_features` remain,
    /// the most frequent across the corpus win (ties alphabetical). Weights
    /// are raw term counts times smoothed IDF `ln((1+n)/(1+df)) + 1`.
    pub fn build(&self, docs: &[Vec<String>]) -> TermVectors {
        let n = docs.len();
        if n == 0 {
            return TermVectors::default();
        }

        let doc_counts: Vec<BTreeMap<String, usize>> = docs.iter().map(|d| term_counts(d)).collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        let mut corpus_tf: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &doc_counts {
            for (term, &c) in counts {
                *df.entry(term.as_str()).or_default() += 1;
                *corpus_tf.entry(term.as_str()).or_default() += c;
            }
        }

        let max_doc_count = self.max_df * n as f64;
        let mut kept: Vec<&str> = df
            .iter()
            .filter(|&(_, &d)| d >= self.min_df && d as f64 <= max_doc_count)
            .map(|(&t, _)| t)
            .collect();

        if kept.len() > self.max_features {
            kept.sort_by(|a, b| corpus_tf[b].cmp(&corpus_tf[a]).then_with(|| a.cmp(b)));
            kept.truncate(self.max_features);
        }

        let vocabulary: Vec<String> = kept
            .into_iter()
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|t| ((1.0 + n as f64) / (1.0 + df[t.as_str()] as f64)).ln() + 1.0)
            .collect();

        let rows = doc_counts
            .iter()
            .map(|counts| {
                let mut row: Vec<f64> = vocabulary
                    .iter()
                    .zip(&idf)
                    .map(|(t, w)| counts.get(t).copied().unwrap_or(0) as f64 * w)
                    .collect();
                l2_normalize(&mut row);
                row
            })
            .collect();

        TermVectors { vocabulary, rows }
    }
}

/// Unigram and bigram counts for one token sequence.
fn term_counts(tokens: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for t in tokens {
        *counts.entry(t.clone()).or_default() += 1;
    }
    for pair in tokens.windows(2) {
        *counts.entry(format!("{} {}", pair[0], pair[1])).or_default() += 1;
    }
    counts
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in row.iter_mut() {
            *x /= norm;
        }
    }
}
