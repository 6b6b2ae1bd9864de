// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Held-out evaluation: accuracy and support-weighted precision,
//! recall, and F1.
//!
//! Undefined ratios (a label never predicted, or absent from the test
//! split) resolve to 0 instead of erroring, matching the convention of
//! `zero_division=0` evaluation.

use serde::{Deserialize, Serialize};

/// The persisted evaluation report for one training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Evaluate predictions against ground truth over `num_classes` labels.
///
/// Weighted averaging: each label contributes proportionally to its
/// support in `truth`.
pub fn evaluate(truth: &[usize], predicted: &[usize], num_classes: usize) -> Report {
    assert_eq!(truth.len(), predicted.len());
    let n = truth.len();
    if n == 0 {
        return Report {
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
        };
    }

    let mut true_positive = vec![0usize; num_classes];
    let mut predicted_count = vec![0usize; num_classes];
    let mut support = vec![0usize; num_classes];

    let mut correct = 0usize;
    for (&t, &p) in truth.iter().zip(predicted) {
        support[t] += 1;
        predicted_count[p] += 1;
        if t == p {
            true_positive[t] += 1;
            correct += 1;
        }
    }

    let mut precision = 0.0;
    let mut recall = 0.0;
    let mut f1 = 0.0;
    for class in 0..num_classes {
        if support[class] == 0 {
            continue;
        }
        let weight = support[class] as f64 / n as f64;
        let class_precision = if predicted_count[class] > 0 {
            true_positive[class] as f64 / predicted_count[class] as f64
        } else {
            0.0
        };
        let class_recall = true_positive[class] as f64 / support[class] as f64;
        let class_f1 = if class_precision + class_recall > 0.0 {
            2.0 * class_precision * class_recall / (class_precision + class_recall)
        } else {
            0.0
        };
        precision += weight * class_precision;
        recall += weight * class_recall;
        f1 += weight * class_f1;
    }

    Report {
        accuracy: correct as f64 / n as f64,
        precision,
        recall,
        f1_score: f1,
    }
}
