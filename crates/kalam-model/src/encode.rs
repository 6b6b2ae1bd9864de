// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature and label encoding.
//!
//! Both encoders are fit once on the training split and reused
//! unchanged for the test split and for every later inference call;
//! neither has a refit path.

use serde::{Deserialize, Serialize};

/// Vocabulary cap for the TF-IDF vectorizer.
pub const MAX_FEATURES: usize = 5000;

/// A sparse feature vector: parallel `indices`/`values` arrays with
/// strictly increasing indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f32>,
}

impl SparseVector {
    /// Value at a feature index (0.0 when absent).
    pub fn get(&self, index: usize) -> f32 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Iterate `(index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn l2_norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

/// Bijection between observed label strings and dense integer ids.
///
/// Ids are assigned in sorted label order, so the mapping is a pure
/// function of the observed label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on every label in the corpus.
    pub fn fit(labels: &[String]) -> Self {
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    /// Dense id of a label, if it was observed at fit time.
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(label)).ok()
    }

    /// Label string for a dense id.
    pub fn decode(&self, id: usize) -> Option<&str> {
        self.classes.get(id).map(String::as_str)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Lowercased word tokens of a text.
///
/// Tokens are maximal alphanumeric runs of at least two characters,
/// so punctuation and stray single letters never become features.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Unigram + adjacent-bigram terms of a text.
fn terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = tokens.clone();
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

/// Term-frequency / inverse-document-frequency text vectorizer over
/// unigrams and bigrams, vocabulary capped at [`MAX_FEATURES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Sorted vocabulary; a term's position is its feature index.
    vocabulary: Vec<String>,
    /// Smoothed idf weight per vocabulary term.
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Fit the vocabulary and idf weights on the training documents.
    ///
    /// Vocabulary selection keeps the [`MAX_FEATURES`] terms with the
    /// highest corpus-wide counts (ties broken lexicographically), then
    /// assigns feature indices in sorted term order. Idf uses the
    /// smoothed form `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit(documents: &[String]) -> Self {
        use std::collections::HashMap;

        let mut total_counts: HashMap<String, u64> = HashMap::new();
        let mut doc_frequency: HashMap<String, u64> = HashMap::new();

        for document in documents {
            let document_terms = terms(document);
            let mut seen = std::collections::HashSet::new();
            for term in &document_terms {
                *total_counts.entry(term.clone()).or_default() += 1;
                if seen.insert(term.clone()) {
                    *doc_frequency.entry(term.clone()).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(String, u64)> = total_counts.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(MAX_FEATURES);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        vocabulary.sort_unstable();

        let n_docs = documents.len() as f32;
        let idf = vocabulary
            .iter()
            .map(|term| {
                let df = *doc_frequency.get(term).unwrap_or(&0) as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        Self { vocabulary, idf }
    }

    /// Map a text to an L2-normalized sparse tf-idf vector.
    ///
    /// Out-of-vocabulary terms are ignored; a text with no known terms
    /// maps to the zero vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        use std::collections::BTreeMap;

        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for term in terms(text) {
            if let Ok(index) = self
                .vocabulary
                .binary_search_by(|v| v.as_str().cmp(term.as_str()))
            {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let mut vector = SparseVector {
            indices: counts.keys().copied().collect(),
            values: counts
                .iter()
                .map(|(index, count)| count * self.idf[*index])
                .collect(),
        };

        let norm = vector.l2_norm();
        if norm > 0.0 {
            for value in &mut vector.values {
                *value /= norm;
            }
        }
        vector
    }

    /// Vectorize a batch of documents.
    pub fn transform_all(&self, documents: &[String]) -> Vec<SparseVector> {
        documents.iter().map(|d| self.transform(d)).collect()
    }

    /// Feature-space dimensionality.
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }
}
