// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequence classifier: word embeddings -> single LSTM layer ->
//! softmax over labels, trained per-sample with backpropagation
//! through time.
//!
//! Unlike the vector algorithms this model owns its tokenization (a
//! word-index vocabulary), so no tf-idf vectorizer artifact exists for
//! it and it is not servable through the tf-idf inference path.

use ndarray::{s, Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::encode::tokenize;

/// Word-vector width.
const EMBEDDING_DIM: usize = 32;

/// LSTM hidden-state width.
const HIDDEN_DIM: usize = 32;

/// Vocabulary cap (plus the two reserved ids).
const MAX_VOCAB: usize = 5000;

/// Sequences are truncated to this many tokens.
const MAX_SEQUENCE_LEN: usize = 50;

/// Default training epochs.
const EPOCHS: usize = 30;

/// Default learning rate for per-sample SGD.
const LEARNING_RATE: f32 = 0.05;

/// Reserved id for the padding token (used for empty documents).
const PAD_ID: usize = 0;

/// Reserved id for out-of-vocabulary tokens.
const UNK_ID: usize = 1;

/// Initialization range for all weight matrices.
const INIT_RANGE: f32 = 0.1;

/// Fitted LSTM text classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmClassifier {
    /// Sorted word vocabulary; a word's id is its position plus two.
    vocabulary: Vec<String>,
    /// `(vocab + 2, EMBEDDING_DIM)` word vectors.
    embedding: Array2<f32>,
    /// `(4 * HIDDEN_DIM, EMBEDDING_DIM)` input projection, gate order
    /// `[input, forget, cell, output]`.
    w_input: Array2<f32>,
    /// `(4 * HIDDEN_DIM, HIDDEN_DIM)` recurrent projection.
    w_hidden: Array2<f32>,
    /// `(4 * HIDDEN_DIM)` gate bias.
    bias: Array1<f32>,
    /// `(classes, HIDDEN_DIM)` output projection.
    w_out: Array2<f32>,
    /// `(classes)` output bias.
    b_out: Array1<f32>,
}

/// Per-timestep forward activations kept for backpropagation.
struct StepCache {
    token_id: usize,
    x: Array1<f32>,
    input_gate: Array1<f32>,
    forget_gate: Array1<f32>,
    cell_candidate: Array1<f32>,
    output_gate: Array1<f32>,
    cell: Array1<f32>,
    cell_prev: Array1<f32>,
    hidden_prev: Array1<f32>,
    tanh_cell: Array1<f32>,
}

impl LstmClassifier {
    /// Fit with the default schedule.
    pub fn fit(documents: &[String], labels: &[usize], num_classes: usize, seed: u64) -> Self {
        let (model, _losses) =
            Self::fit_with(documents, labels, num_classes, seed, EPOCHS, LEARNING_RATE);
        model
    }

    /// Fit with an explicit schedule; returns the model and the mean
    /// training loss per epoch.
    pub fn fit_with(
        documents: &[String],
        labels: &[usize],
        num_classes: usize,
        seed: u64,
        epochs: usize,
        learning_rate: f32,
    ) -> (Self, Vec<f32>) {
        let vocabulary = build_vocabulary(documents);
        let mut rng = StdRng::seed_from_u64(seed);
        let vocab_rows = vocabulary.len() + 2;

        let mut model = Self {
            vocabulary,
            embedding: random_matrix(&mut rng, vocab_rows, EMBEDDING_DIM),
            w_input: random_matrix(&mut rng, 4 * HIDDEN_DIM, EMBEDDING_DIM),
            w_hidden: random_matrix(&mut rng, 4 * HIDDEN_DIM, HIDDEN_DIM),
            bias: Array1::zeros(4 * HIDDEN_DIM),
            w_out: random_matrix(&mut rng, num_classes, HIDDEN_DIM),
            b_out: Array1::zeros(num_classes),
        };

        let sequences: Vec<Vec<usize>> =
            documents.iter().map(|d| model.encode_sequence(d)).collect();

        let mut losses = Vec::with_capacity(epochs);
        for _ in 0..epochs {
            let mut epoch_loss = 0.0;
            for (sequence, &label) in sequences.iter().zip(labels) {
                epoch_loss += model.train_sample(sequence, label, learning_rate);
            }
            losses.push(epoch_loss / sequences.len().max(1) as f32);
        }

        (model, losses)
    }

    /// Predict the dense label of a text.
    pub fn predict(&self, text: &str) -> usize {
        let sequence = self.encode_sequence(text);
        let (hidden, _) = self.forward(&sequence);
        let logits = self.w_out.dot(&hidden) + &self.b_out;
        argmax(&logits)
    }

    /// Map a text to a bounded token-id sequence. Empty documents
    /// become a single padding token so the recurrence still runs.
    fn encode_sequence(&self, text: &str) -> Vec<usize> {
        let mut ids: Vec<usize> = tokenize(text)
            .into_iter()
            .take(MAX_SEQUENCE_LEN)
            .map(|token| {
                self.vocabulary
                    .binary_search(&token)
                    .map(|position| position + 2)
                    .unwrap_or(UNK_ID)
            })
            .collect();
        if ids.is_empty() {
            ids.push(PAD_ID);
        }
        ids
    }

    /// Full forward pass; returns the final hidden state and the
    /// per-step caches.
    fn forward(&self, sequence: &[usize]) -> (Array1<f32>, Vec<StepCache>) {
        let mut hidden = Array1::zeros(HIDDEN_DIM);
        let mut cell = Array1::zeros(HIDDEN_DIM);
        let mut caches = Vec::with_capacity(sequence.len());

        for &token_id in sequence {
            let x = self.embedding.row(token_id).to_owned();
            let z = self.w_input.dot(&x) + self.w_hidden.dot(&hidden) + &self.bias;

            let input_gate = z.slice(s![0..HIDDEN_DIM]).mapv(sigmoid);
            let forget_gate = z.slice(s![HIDDEN_DIM..2 * HIDDEN_DIM]).mapv(sigmoid);
            let cell_candidate = z.slice(s![2 * HIDDEN_DIM..3 * HIDDEN_DIM]).mapv(f32::tanh);
            let output_gate = z.slice(s![3 * HIDDEN_DIM..4 * HIDDEN_DIM]).mapv(sigmoid);

            let cell_prev = cell.clone();
            let hidden_prev = hidden.clone();

            cell = &forget_gate * &cell_prev + &input_gate * &cell_candidate;
            let tanh_cell = cell.mapv(f32::tanh);
            hidden = &output_gate * &tanh_cell;

            caches.push(StepCache {
                token_id,
                x,
                input_gate,
                forget_gate,
                cell_candidate,
                output_gate,
                cell: cell.clone(),
                cell_prev,
                hidden_prev,
                tanh_cell,
            });
        }

        (hidden, caches)
    }

    /// One SGD step on one sample; returns the sample's loss.
    fn train_sample(&mut self, sequence: &[usize], label: usize, learning_rate: f32) -> f32 {
        let (hidden, caches) = self.forward(sequence);

        let logits = self.w_out.dot(&hidden) + &self.b_out;
        let probabilities = softmax(&logits);
        let loss = -(probabilities[label].max(1e-12)).ln();

        // Output layer gradients.
        let mut d_logits = probabilities;
        d_logits[label] -= 1.0;
        let grad_w_out = outer(&d_logits, &hidden);
        let mut d_hidden = self.w_out.t().dot(&d_logits);

        // Backpropagation through time.
        let mut grad_embedding: Vec<(usize, Array1<f32>)> = Vec::with_capacity(caches.len());
        let mut grad_w_input: Array2<f32> = Array2::zeros(self.w_input.raw_dim());
        let mut grad_w_hidden: Array2<f32> = Array2::zeros(self.w_hidden.raw_dim());
        let mut grad_bias: Array1<f32> = Array1::zeros(self.bias.raw_dim());
        let mut d_cell: Array1<f32> = Array1::zeros(HIDDEN_DIM);

        for cache in caches.iter().rev() {
            let d_output_gate = &d_hidden * &cache.tanh_cell;
            let dz_output = &d_output_gate
                * &cache.output_gate.mapv(|v| v * (1.0 - v));

            d_cell = &d_cell
                + &(&d_hidden * &cache.output_gate * &cache.tanh_cell.mapv(|v| 1.0 - v * v));

            let d_input_gate = &d_cell * &cache.cell_candidate;
            let dz_input = &d_input_gate * &cache.input_gate.mapv(|v| v * (1.0 - v));

            let d_forget_gate = &d_cell * &cache.cell_prev;
            let dz_forget = &d_forget_gate * &cache.forget_gate.mapv(|v| v * (1.0 - v));

            let d_candidate = &d_cell * &cache.input_gate;
            let dz_candidate = &d_candidate * &cache.cell_candidate.mapv(|v| 1.0 - v * v);

            let mut dz = Array1::zeros(4 * HIDDEN_DIM);
            dz.slice_mut(s![0..HIDDEN_DIM]).assign(&dz_input);
            dz.slice_mut(s![HIDDEN_DIM..2 * HIDDEN_DIM]).assign(&dz_forget);
            dz.slice_mut(s![2 * HIDDEN_DIM..3 * HIDDEN_DIM])
                .assign(&dz_candidate);
            dz.slice_mut(s![3 * HIDDEN_DIM..4 * HIDDEN_DIM]).assign(&dz_output);

            grad_w_input = grad_w_input + outer(&dz, &cache.x);
            grad_w_hidden = grad_w_hidden + outer(&dz, &cache.hidden_prev);
            grad_bias = grad_bias + &dz;

            grad_embedding.push((cache.token_id, self.w_input.t().dot(&dz)));

            d_hidden = self.w_hidden.t().dot(&dz);
            d_cell = &d_cell * &cache.forget_gate;
        }

        // SGD update.
        self.w_out = &self.w_out - &(grad_w_out * learning_rate);
        self.b_out = &self.b_out - &(d_logits * learning_rate);
        self.w_input = &self.w_input - &(grad_w_input * learning_rate);
        self.w_hidden = &self.w_hidden - &(grad_w_hidden * learning_rate);
        self.bias = &self.bias - &(grad_bias * learning_rate);
        for (token_id, grad) in grad_embedding {
            self.embedding
                .row_mut(token_id)
                .scaled_add(-learning_rate, &grad);
        }

        loss
    }
}

/// Uniform random matrix in `[-INIT_RANGE, INIT_RANGE]`.
fn random_matrix(rng: &mut StdRng, rows: usize, columns: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, columns), |_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
}

/// Top-[`MAX_VOCAB`] words by corpus count, stored sorted for binary
/// search; reserved ids 0 (pad) and 1 (unk) sit outside this list.
fn build_vocabulary(documents: &[String]) -> Vec<String> {
    use std::collections::HashMap;

    let mut counts: HashMap<String, u64> = HashMap::new();
    for document in documents {
        for token in tokenize(document) {
            *counts.entry(token).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(MAX_VOCAB);

    let mut vocabulary: Vec<String> = ranked.into_iter().map(|(token, _)| token).collect();
    vocabulary.sort_unstable();
    vocabulary
}

fn sigmoid(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}

fn softmax(logits: &Array1<f32>) -> Array1<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp = logits.mapv(|v| (v - max).exp());
    let total = exp.sum();
    exp / total
}

fn argmax(values: &Array1<f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (index, &value) in values.iter().enumerate() {
        if value > best_value {
            best_value = value;
            best = index;
        }
    }
    best
}

/// Outer product `a ⊗ b` as an `(a.len, b.len)` matrix.
fn outer(a: &Array1<f32>, b: &Array1<f32>) -> Array2<f32> {
    let a2 = a.view().insert_axis(Axis(1));
    let b2 = b.view().insert_axis(Axis(0));
    a2.dot(&b2)
}
