// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini-backed corpus transformations.
//!
//! Three operations over training corpora, all delegating text
//! generation to the Gemini `generateContent` API and all pure at the
//! corpus boundary (read one artifact, write the next, never mutate in
//! place):
//!
//! - [`generate_synthetic_data`] — seed a synthetic corpus from a small
//!   sample of real conversations;
//! - [`augment_synthetic_data`] — enlarge an existing synthetic corpus
//!   in batches, resampling fresh examples for every batch;
//! - [`clean_training_data`] — ask the model to drop unreadable
//!   messages and conversations from a corpus.
//!
//! Every emitted conversation is shape-validated and must carry
//! non-empty `messages` before it is merged into any corpus.

pub mod clean;
pub mod client;
pub mod generate;
pub mod types;

pub use clean::clean_training_data;
pub use client::GeminiClient;
pub use generate::{augment_synthetic_data, generate_synthetic_data, retain_usable};
