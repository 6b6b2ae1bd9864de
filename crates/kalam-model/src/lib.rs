// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature encoding, classifier training, and bundle persistence for
//! the Kalam intent chatbot.
//!
//! Four interchangeable algorithms train on the same corpus: three
//! vector-space classifiers over shared tf-idf features
//! (`random_forest`, `naive_bayes`, `logistic_regression`) and a
//! sequence model (`lstm`) with its own vocabulary. Each persists an
//! isolated bundle; see [`bundle`].

pub mod bundle;
pub mod dataset;
pub mod encode;
pub mod forest;
pub mod logistic;
pub mod lstm;
pub mod metrics;
pub mod naive_bayes;

pub use bundle::{compare, train, Algorithm, ClassifierModel, ModelBundle};
pub use dataset::{dataset_from_corpus, train_test_split, SPLIT_SEED, TEST_RATIO};
pub use encode::{LabelEncoder, SparseVector, TfidfVectorizer, MAX_FEATURES};
pub use metrics::{evaluate, Report};
