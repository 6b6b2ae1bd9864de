// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multinomial naive Bayes over tf-idf features.

use serde::{Deserialize, Serialize};

use crate::encode::SparseVector;

/// Laplace smoothing strength.
const SMOOTHING: f64 = 1.0;

/// Log-prior assigned to classes absent from the training split. Large
/// enough to lose every argmax, finite so the model survives JSON
/// serialization (JSON has no -inf).
const ABSENT_CLASS_LOG_PRIOR: f64 = -1.0e30;

/// Fitted multinomial naive Bayes classifier.
///
/// Classes absent from the training split keep the sentinel log-prior,
/// so they can never win the argmax — the same behavior a model that
/// has never seen them would have.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayes {
    class_log_prior: Vec<f64>,
    /// `[class][feature]` log-likelihoods.
    feature_log_prob: Vec<Vec<f64>>,
}

impl NaiveBayes {
    /// Fit on sparse rows with dense integer labels in `0..num_classes`.
    pub fn fit(
        rows: &[SparseVector],
        labels: &[usize],
        num_classes: usize,
        num_features: usize,
    ) -> Self {
        let mut class_counts = vec![0usize; num_classes];
        let mut feature_sums = vec![vec![0.0f64; num_features]; num_classes];

        for (row, &label) in rows.iter().zip(labels) {
            class_counts[label] += 1;
            for (index, value) in row.iter() {
                feature_sums[label][index] += f64::from(value);
            }
        }

        let total = rows.len() as f64;
        let class_log_prior = class_counts
            .iter()
            .map(|&count| {
                if count > 0 {
                    (count as f64 / total).ln()
                } else {
                    ABSENT_CLASS_LOG_PRIOR
                }
            })
            .collect();

        let feature_log_prob = feature_sums
            .iter()
            .map(|sums| {
                let class_total: f64 = sums.iter().sum();
                let denominator = class_total + SMOOTHING * num_features as f64;
                sums.iter()
                    .map(|&sum| ((sum + SMOOTHING) / denominator).ln())
                    .collect()
            })
            .collect();

        Self {
            class_log_prior,
            feature_log_prob,
        }
    }

    /// Predict the dense label of one row (ties go to the lowest id).
    pub fn predict(&self, row: &SparseVector) -> usize {
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (class, prior) in self.class_log_prior.iter().enumerate() {
            let mut score = *prior;
            for (index, value) in row.iter() {
                score += f64::from(value) * self.feature_log_prob[class][index];
            }
            if score > best_score {
                best_score = score;
                best = class;
            }
        }
        best
    }
}
