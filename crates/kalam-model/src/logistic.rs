// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multinomial logistic regression (softmax) over tf-idf features,
//! trained by full-batch gradient descent.

use serde::{Deserialize, Serialize};

use crate::encode::SparseVector;

/// Gradient-descent epochs.
const EPOCHS: usize = 200;

/// Learning rate.
const LEARNING_RATE: f64 = 0.5;

/// L2 regularization strength.
const WEIGHT_DECAY: f64 = 1.0e-4;

/// Fitted softmax classifier. Weights start at zero, so training is
/// fully deterministic for a given input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// `[class][feature]` weights.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl LogisticRegression {
    /// Fit on sparse rows with dense integer labels in `0..num_classes`.
    pub fn fit(
        rows: &[SparseVector],
        labels: &[usize],
        num_classes: usize,
        num_features: usize,
    ) -> Self {
        let mut model = Self {
            weights: vec![vec![0.0; num_features]; num_classes],
            bias: vec![0.0; num_classes],
        };
        let n = rows.len() as f64;

        for _ in 0..EPOCHS {
            let mut weight_grad = vec![vec![0.0; num_features]; num_classes];
            let mut bias_grad = vec![0.0; num_classes];

            for (row, &label) in rows.iter().zip(labels) {
                let probabilities = model.probabilities(row);
                for class in 0..num_classes {
                    let error =
                        probabilities[class] - if class == label { 1.0 } else { 0.0 };
                    bias_grad[class] += error;
                    for (index, value) in row.iter() {
                        weight_grad[class][index] += error * f64::from(value);
                    }
                }
            }

            for class in 0..num_classes {
                model.bias[class] -= LEARNING_RATE * bias_grad[class] / n;
                let class_weights = &mut model.weights[class];
                for (weight, grad) in class_weights.iter_mut().zip(&weight_grad[class]) {
                    *weight -= LEARNING_RATE * (grad / n + WEIGHT_DECAY * *weight);
                }
            }
        }

        model
    }

    /// Softmax class probabilities for one row.
    fn probabilities(&self, row: &SparseVector) -> Vec<f64> {
        let mut scores: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(weights, bias)| {
                bias + row
                    .iter()
                    .map(|(index, value)| f64::from(value) * weights[index])
                    .sum::<f64>()
            })
            .collect();

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut total = 0.0;
        for score in &mut scores {
            *score = (*score - max).exp();
            total += *score;
        }
        for score in &mut scores {
            *score /= total;
        }
        scores
    }

    /// Predict the dense label of one row (ties go to the lowest id).
    pub fn predict(&self, row: &SparseVector) -> usize {
        let probabilities = self.probabilities(row);
        let mut best = 0;
        let mut best_probability = f64::NEG_INFINITY;
        for (class, &probability) in probabilities.iter().enumerate() {
            if probability > best_probability {
                best_probability = probability;
                best = class;
            }
        }
        best
    }
}
