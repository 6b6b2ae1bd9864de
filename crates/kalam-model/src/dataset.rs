// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Corpus -> (document, label) rows and the reproducible split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use kalam_core::Conversation;

/// Fixed seed for the train/test split, so every training run of the
/// same corpus evaluates on the same held-out rows.
pub const SPLIT_SEED: u64 = 42;

/// Held-out fraction of the corpus.
pub const TEST_RATIO: f64 = 0.2;

/// Flat training rows: one text document and one label per conversation.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub documents: Vec<String>,
    pub labels: Vec<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Flatten a corpus: each conversation becomes one document (all
/// message texts joined by spaces) labeled with its status.
pub fn dataset_from_corpus(corpus: &[Conversation]) -> Dataset {
    let mut dataset = Dataset::default();
    for conversation in corpus {
        dataset.documents.push(conversation.document());
        dataset.labels.push(conversation.status.clone());
    }
    dataset
}

/// Split `0..n` into shuffled (train, test) index sets.
///
/// The test set takes `ceil(n * test_ratio)` rows, at least one, so a
/// tiny corpus still gets evaluated.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = ((n as f64) * test_ratio).ceil().max(1.0) as usize;
    let test_len = test_len.min(n);
    let test = indices[..test_len].to_vec();
    let train = indices[test_len..].to_vec();
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalam_core::{Message, SenderType};

    #[test]
    fn dataset_joins_messages_per_conversation() {
        let corpus = vec![Conversation {
            status: "Qualified".into(),
            messages: vec![
                Message {
                    timestamp: String::new(),
                    sender_type: SenderType::Contact,
                    text: "salut".into(),
                },
                Message {
                    timestamp: String::new(),
                    sender_type: SenderType::User,
                    text: "ahla".into(),
                },
            ],
            ..Default::default()
        }];
        let dataset = dataset_from_corpus(&corpus);
        assert_eq!(dataset.documents, vec!["salut ahla"]);
        assert_eq!(dataset.labels, vec!["Qualified"]);
    }

    #[test]
    fn split_is_reproducible() {
        let (train_a, test_a) = train_test_split(100, TEST_RATIO, SPLIT_SEED);
        let (train_b, test_b) = train_test_split(100, TEST_RATIO, SPLIT_SEED);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn split_partitions_without_overlap() {
        let (train, test) = train_test_split(50, TEST_RATIO, SPLIT_SEED);
        assert_eq!(train.len() + test.len(), 50);
        assert_eq!(test.len(), 10);
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn tiny_corpus_still_gets_a_test_row() {
        let (train, test) = train_test_split(3, TEST_RATIO, SPLIT_SEED);
        assert_eq!(test.len(), 1);
        assert_eq!(train.len(), 2);
    }

    #[test]
    fn different_seed_gives_different_shuffle() {
        let (train_a, _) = train_test_split(100, TEST_RATIO, 1);
        let (train_b, _) = train_test_split(100, TEST_RATIO, 2);
        assert_ne!(train_a, train_b);
    }
}
