// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Training entry point and model bundle persistence.
//!
//! Each algorithm owns an isolated directory under the models root:
//!
//! ```text
//! models/saved/<algorithm>/
//!   label_encoder.json
//!   tfidf_vectorizer.json      (vector algorithms only)
//!   <algorithm>.json
//!   metrics_<algorithm>.json
//! ```
//!
//! Training one algorithm never touches another's directory, and every
//! write is a whole-file replace, so a concurrent loader sees either
//! the old complete bundle or the new one.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, warn};

use kalam_core::corpus::{read_json, read_non_empty_corpus, write_json};
use kalam_core::KalamError;

use crate::dataset::{dataset_from_corpus, train_test_split, SPLIT_SEED, TEST_RATIO};
use crate::encode::{LabelEncoder, SparseVector, TfidfVectorizer};
use crate::forest::RandomForest;
use crate::logistic::LogisticRegression;
use crate::lstm::LstmClassifier;
use crate::metrics::{evaluate, Report};
use crate::naive_bayes::NaiveBayes;

/// Trainable classification algorithms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    RandomForest,
    NaiveBayes,
    LogisticRegression,
    Lstm,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::RandomForest,
        Algorithm::NaiveBayes,
        Algorithm::LogisticRegression,
        Algorithm::Lstm,
    ];

    /// Whether this algorithm predicts from tf-idf vectors. The LSTM
    /// owns its tokenization instead, so it has no vectorizer artifact
    /// and is not servable through the tf-idf inference path.
    pub fn uses_vectorizer(self) -> bool {
        !matches!(self, Algorithm::Lstm)
    }

    /// This algorithm's bundle directory under the models root.
    pub fn bundle_dir(self, models_dir: &Path) -> PathBuf {
        models_dir.join(self.to_string())
    }

    fn model_path(self, models_dir: &Path) -> PathBuf {
        self.bundle_dir(models_dir).join(format!("{self}.json"))
    }

    fn metrics_path(self, models_dir: &Path) -> PathBuf {
        self.bundle_dir(models_dir)
            .join(format!("metrics_{self}.json"))
    }

    fn label_encoder_path(self, models_dir: &Path) -> PathBuf {
        self.bundle_dir(models_dir).join("label_encoder.json")
    }

    fn vectorizer_path(self, models_dir: &Path) -> PathBuf {
        self.bundle_dir(models_dir).join("tfidf_vectorizer.json")
    }
}

/// A fitted vector-space classifier, tagged for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ClassifierModel {
    RandomForest(RandomForest),
    NaiveBayes(NaiveBayes),
    LogisticRegression(LogisticRegression),
}

impl ClassifierModel {
    pub fn predict(&self, row: &SparseVector) -> usize {
        match self {
            ClassifierModel::RandomForest(model) => model.predict(row),
            ClassifierModel::NaiveBayes(model) => model.predict(row),
            ClassifierModel::LogisticRegression(model) => model.predict(row),
        }
    }
}

/// The persisted (label encoder, vectorizer, classifier) unit for one
/// vector algorithm. Created once per training run, loaded wholesale
/// at inference time, never partially updated.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub label_encoder: LabelEncoder,
    pub vectorizer: TfidfVectorizer,
    pub classifier: ClassifierModel,
}

impl ModelBundle {
    /// Load a bundle for inference.
    ///
    /// Algorithms without a vectorizer artifact are rejected before any
    /// file I/O happens.
    pub fn load(models_dir: &Path, algorithm: Algorithm) -> Result<Self, KalamError> {
        if !algorithm.uses_vectorizer() {
            return Err(KalamError::InvalidAlgorithm {
                name: algorithm.to_string(),
            });
        }
        Ok(Self {
            label_encoder: read_json(&algorithm.label_encoder_path(models_dir))?,
            vectorizer: read_json(&algorithm.vectorizer_path(models_dir))?,
            classifier: read_json(&algorithm.model_path(models_dir))?,
        })
    }
}

/// Seed for stochastic model initialization (forest bagging, LSTM
/// weights), distinct from the split seed on purpose.
const MODEL_SEED: u64 = 42;

/// Train one algorithm on the corpus file and persist its bundle.
///
/// Returns the held-out evaluation report. A missing or empty corpus
/// aborts only this algorithm; callers running several algorithms in
/// sequence keep going.
pub fn train(
    corpus_path: &Path,
    models_dir: &Path,
    algorithm: Algorithm,
) -> Result<Report, KalamError> {
    let corpus = read_non_empty_corpus(corpus_path)?;
    let dataset = dataset_from_corpus(&corpus);
    if dataset.len() < 2 {
        return Err(KalamError::CorpusEmpty {
            path: corpus_path.to_path_buf(),
        });
    }

    info!(algorithm = %algorithm, conversations = dataset.len(), "training started");

    let label_encoder = LabelEncoder::fit(&dataset.labels);
    let encoded_labels: Vec<usize> = dataset
        .labels
        .iter()
        .filter_map(|label| label_encoder.encode(label))
        .collect();
    let num_classes = label_encoder.len();

    let (train_indices, test_indices) =
        train_test_split(dataset.len(), TEST_RATIO, SPLIT_SEED);

    let select = |indices: &[usize]| -> (Vec<String>, Vec<usize>) {
        (
            indices.iter().map(|&i| dataset.documents[i].clone()).collect(),
            indices.iter().map(|&i| encoded_labels[i]).collect(),
        )
    };
    let (train_documents, train_labels) = select(&train_indices);
    let (test_documents, test_labels) = select(&test_indices);

    let report = match algorithm {
        Algorithm::Lstm => {
            let model = LstmClassifier::fit(
                &train_documents,
                &train_labels,
                num_classes,
                MODEL_SEED,
            );
            let predictions: Vec<usize> = test_documents
                .iter()
                .map(|document| model.predict(document))
                .collect();
            let report = evaluate(&test_labels, &predictions, num_classes);

            let dir = algorithm.bundle_dir(models_dir);
            write_json(&dir.join("label_encoder.json"), &label_encoder)?;
            write_json(&algorithm.model_path(models_dir), &model)?;
            write_json(&algorithm.metrics_path(models_dir), &report)?;
            report
        }
        _ => {
            // The vectorizer is fit on the train split only and reused
            // unchanged for the test split.
            let vectorizer = TfidfVectorizer::fit(&train_documents);
            let train_rows = vectorizer.transform_all(&train_documents);
            let test_rows = vectorizer.transform_all(&test_documents);
            let num_features = vectorizer.dimension();

            let classifier = match algorithm {
                Algorithm::RandomForest => ClassifierModel::RandomForest(RandomForest::fit(
                    &train_rows,
                    &train_labels,
                    num_classes,
                    num_features,
                    MODEL_SEED,
                )),
                Algorithm::NaiveBayes => ClassifierModel::NaiveBayes(NaiveBayes::fit(
                    &train_rows,
                    &train_labels,
                    num_classes,
                    num_features,
                )),
                Algorithm::LogisticRegression => {
                    ClassifierModel::LogisticRegression(LogisticRegression::fit(
                        &train_rows,
                        &train_labels,
                        num_classes,
                        num_features,
                    ))
                }
                Algorithm::Lstm => unreachable!("handled above"),
            };

            let predictions: Vec<usize> =
                test_rows.iter().map(|row| classifier.predict(row)).collect();
            let report = evaluate(&test_labels, &predictions, num_classes);

            let dir = algorithm.bundle_dir(models_dir);
            write_json(&dir.join("label_encoder.json"), &label_encoder)?;
            write_json(&algorithm.vectorizer_path(models_dir), &vectorizer)?;
            write_json(&algorithm.model_path(models_dir), &classifier)?;
            write_json(&algorithm.metrics_path(models_dir), &report)?;
            report
        }
    };

    info!(
        algorithm = %algorithm,
        accuracy = report.accuracy,
        precision = report.precision,
        recall = report.recall,
        f1_score = report.f1_score,
        "training finished"
    );
    Ok(report)
}

/// Read every persisted metrics report under the models root.
///
/// Algorithms that were never trained are skipped with a warning.
pub fn compare(models_dir: &Path) -> Vec<(Algorithm, Report)> {
    let mut results = Vec::new();
    for algorithm in Algorithm::ALL {
        match read_json::<Report>(&algorithm.metrics_path(models_dir)) {
            Ok(report) => results.push((algorithm, report)),
            Err(KalamError::SourceNotFound { .. }) => {
                warn!(algorithm = %algorithm, "no metrics report found, skipping");
            }
            Err(e) => {
                warn!(algorithm = %algorithm, error = %e, "unreadable metrics report, skipping");
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalam_core::corpus::write_corpus;
    use kalam_core::{Conversation, Message, SenderType};
    use std::str::FromStr;

    fn conversation(status: &str, texts: &[&str]) -> Conversation {
        Conversation {
            status: status.into(),
            messages: texts
                .iter()
                .map(|text| Message {
                    timestamp: String::new(),
                    sender_type: SenderType::Contact,
                    text: text.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn sample_corpus() -> Vec<Conversation> {
        let mut corpus = Vec::new();
        for _ in 0..5 {
            corpus.push(conversation("Qualified", &["nheb naaraf el prix", "prix formation"]));
            corpus.push(conversation("Unqualified", &["merci nchoufou baad", "baad merci"]));
        }
        corpus
    }

    #[test]
    fn algorithm_names_roundtrip_snake_case() {
        for algorithm in Algorithm::ALL {
            let name = algorithm.to_string();
            assert_eq!(Algorithm::from_str(&name).unwrap(), algorithm);
        }
        assert_eq!(Algorithm::LogisticRegression.to_string(), "logistic_regression");
        assert!(Algorithm::from_str("transformer").is_err());
    }

    #[test]
    fn training_persists_a_complete_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.json");
        let models_dir = dir.path().join("saved");
        write_corpus(&corpus_path, &sample_corpus()).unwrap();

        let report = train(&corpus_path, &models_dir, Algorithm::NaiveBayes).unwrap();
        assert!(report.accuracy >= 0.0 && report.accuracy <= 1.0);

        let bundle_dir = models_dir.join("naive_bayes");
        for artifact in [
            "label_encoder.json",
            "tfidf_vectorizer.json",
            "naive_bayes.json",
            "metrics_naive_bayes.json",
        ] {
            assert!(bundle_dir.join(artifact).exists(), "missing {artifact}");
        }

        let bundle = ModelBundle::load(&models_dir, Algorithm::NaiveBayes).unwrap();
        let row = bundle.vectorizer.transform("nheb naaraf el prix");
        let label = bundle
            .label_encoder
            .decode(bundle.classifier.predict(&row))
            .unwrap();
        assert_eq!(label, "Qualified");
    }

    #[test]
    fn each_algorithm_owns_an_isolated_directory() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.json");
        let models_dir = dir.path().join("saved");
        write_corpus(&corpus_path, &sample_corpus()).unwrap();

        train(&corpus_path, &models_dir, Algorithm::NaiveBayes).unwrap();
        let before = std::fs::read_to_string(
            models_dir.join("naive_bayes").join("naive_bayes.json"),
        )
        .unwrap();

        train(&corpus_path, &models_dir, Algorithm::LogisticRegression).unwrap();
        let after = std::fs::read_to_string(
            models_dir.join("naive_bayes").join("naive_bayes.json"),
        )
        .unwrap();
        assert_eq!(before, after, "training one algorithm touched another's bundle");
    }

    #[test]
    fn missing_corpus_aborts_with_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let err = train(
            &dir.path().join("absent.json"),
            &dir.path().join("saved"),
            Algorithm::NaiveBayes,
        )
        .unwrap_err();
        assert!(matches!(err, KalamError::SourceNotFound { .. }));
    }

    #[test]
    fn empty_corpus_aborts_with_corpus_empty() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.json");
        write_corpus(&corpus_path, &[]).unwrap();
        let err = train(&corpus_path, &dir.path().join("saved"), Algorithm::NaiveBayes)
            .unwrap_err();
        assert!(matches!(err, KalamError::CorpusEmpty { .. }));
    }

    #[test]
    fn lstm_bundle_has_no_vectorizer_and_is_not_servable() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.json");
        let models_dir = dir.path().join("saved");
        write_corpus(&corpus_path, &sample_corpus()).unwrap();

        train(&corpus_path, &models_dir, Algorithm::Lstm).unwrap();
        let bundle_dir = models_dir.join("lstm");
        assert!(bundle_dir.join("lstm.json").exists());
        assert!(bundle_dir.join("label_encoder.json").exists());
        assert!(!bundle_dir.join("tfidf_vectorizer.json").exists());

        // Rejected before any file I/O.
        let err = ModelBundle::load(&models_dir, Algorithm::Lstm).unwrap_err();
        assert!(matches!(err, KalamError::InvalidAlgorithm { .. }));
    }

    #[test]
    fn metrics_report_has_fixed_keys_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.json");
        let models_dir = dir.path().join("saved");
        write_corpus(&corpus_path, &sample_corpus()).unwrap();

        train(&corpus_path, &models_dir, Algorithm::LogisticRegression).unwrap();
        let raw = std::fs::read_to_string(
            models_dir
                .join("logistic_regression")
                .join("metrics_logistic_regression.json"),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for key in ["accuracy", "precision", "recall", "f1_score"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn compare_skips_untrained_algorithms() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.json");
        let models_dir = dir.path().join("saved");
        write_corpus(&corpus_path, &sample_corpus()).unwrap();

        train(&corpus_path, &models_dir, Algorithm::NaiveBayes).unwrap();
        let results = compare(&models_dir);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, Algorithm::NaiveBayes);
    }
}
