// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random forest over tf-idf features: bagged Gini-impurity decision
//! trees with per-split feature subsampling and majority voting.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::encode::SparseVector;

/// Trees in the forest.
const NUM_TREES: usize = 50;

/// Depth cap; also bounds the nesting depth of the serialized trees.
const MAX_DEPTH: usize = 20;

/// Nodes smaller than this become leaves.
const MIN_SAMPLES_SPLIT: usize = 2;

/// One decision-tree node.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &SparseVector) -> usize {
        match self {
            Node::Leaf { class } => *class,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row.get(*feature) <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

/// Fitted random forest classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<Node>,
    num_classes: usize,
}

impl RandomForest {
    /// Fit on sparse rows with dense integer labels in `0..num_classes`.
    ///
    /// Each tree draws a bootstrap sample and, at every split,
    /// considers a fresh `sqrt(num_features)` feature subset. The seed
    /// makes the whole forest reproducible.
    pub fn fit(
        rows: &[SparseVector],
        labels: &[usize],
        num_classes: usize,
        num_features: usize,
        seed: u64,
    ) -> Self {
        let n = rows.len();
        let trees = (0..NUM_TREES)
            .map(|tree_index| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(tree_index as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                build_tree(rows, labels, &sample, num_classes, num_features, 0, &mut rng)
            })
            .collect();

        Self { trees, num_classes }
    }

    /// Majority vote over all trees (ties go to the lowest class id).
    pub fn predict(&self, row: &SparseVector) -> usize {
        let mut votes = vec![0usize; self.num_classes];
        for tree in &self.trees {
            votes[tree.predict(row)] += 1;
        }
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        best
    }
}

/// Class histogram of a sample index set.
fn class_counts(labels: &[usize], indices: &[usize], num_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; num_classes];
    for &index in indices {
        counts[labels[index]] += 1;
    }
    counts
}

/// Majority class of a histogram (ties to the lowest id).
fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

/// Gini impurity of a histogram.
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&count| {
            let p = count as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn build_tree(
    rows: &[SparseVector],
    labels: &[usize],
    indices: &[usize],
    num_classes: usize,
    num_features: usize,
    depth: usize,
    rng: &mut StdRng,
) -> Node {
    let counts = class_counts(labels, indices, num_classes);
    let node_impurity = gini(&counts, indices.len());

    if node_impurity == 0.0 || depth >= MAX_DEPTH || indices.len() < MIN_SAMPLES_SPLIT {
        return Node::Leaf {
            class: majority(&counts),
        };
    }

    let subset_size = ((num_features as f64).sqrt().floor() as usize)
        .clamp(1, num_features);
    let feature_subset = rand::seq::index::sample(rng, num_features, subset_size);

    let mut best: Option<(usize, f32, f64)> = None;
    for feature in feature_subset {
        if let Some((threshold, impurity)) =
            best_threshold(rows, labels, indices, feature, num_classes)
        {
            let better = match best {
                Some((_, _, best_impurity)) => impurity < best_impurity,
                None => impurity < node_impurity,
            };
            if better {
                best = Some((feature, threshold, impurity));
            }
        }
    }

    let Some((feature, threshold, _)) = best else {
        return Node::Leaf {
            class: majority(&counts),
        };
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&index| rows[index].get(feature) <= threshold);

    if left_indices.is_empty() || right_indices.is_empty() {
        return Node::Leaf {
            class: majority(&counts),
        };
    }

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(
            rows,
            labels,
            &left_indices,
            num_classes,
            num_features,
            depth + 1,
            rng,
        )),
        right: Box::new(build_tree(
            rows,
            labels,
            &right_indices,
            num_classes,
            num_features,
            depth + 1,
            rng,
        )),
    }
}

/// Best threshold for one feature over a sample set: the midpoint
/// between consecutive distinct values minimizing weighted Gini.
/// `None` when the feature is constant over the samples.
fn best_threshold(
    rows: &[SparseVector],
    labels: &[usize],
    indices: &[usize],
    feature: usize,
    num_classes: usize,
) -> Option<(f32, f64)> {
    let mut pairs: Vec<(f32, usize)> = indices
        .iter()
        .map(|&index| (rows[index].get(feature), labels[index]))
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let total = pairs.len();
    let mut right_counts = vec![0usize; num_classes];
    for &(_, label) in &pairs {
        right_counts[label] += 1;
    }
    let mut left_counts = vec![0usize; num_classes];

    let mut best: Option<(f32, f64)> = None;
    for position in 0..total - 1 {
        let (value, label) = pairs[position];
        left_counts[label] += 1;
        right_counts[label] -= 1;

        let next_value = pairs[position + 1].0;
        if next_value <= value {
            continue;
        }

        let left_total = position + 1;
        let right_total = total - left_total;
        let weighted = (left_total as f64 / total as f64) * gini(&left_counts, left_total)
            + (right_total as f64 / total as f64) * gini(&right_counts, right_total);

        if best.map(|(_, impurity)| weighted < impurity).unwrap_or(true) {
            best = Some(((value + next_value) / 2.0, weighted));
        }
    }
    best
}
