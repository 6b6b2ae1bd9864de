// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The loaded chatbot: classify an incoming message, then retrieve a
//! historical reply for the predicted intent.
//!
//! Lifecycle is load-then-serve: [`Chatbot::load`] reads the bundle and
//! corpus once, after which every method takes `&self` and mutates
//! nothing, so concurrent `respond` calls are safe without locking.
//! A failed load is the caller's `Failed` state; the host process keeps
//! running and serves its own unavailable message.

use std::path::Path;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use kalam_core::corpus::read_corpus;
use kalam_core::{Conversation, KalamError};
use kalam_model::{Algorithm, ModelBundle};

/// Reply when the classifier cannot produce an intent.
pub const FALLBACK_RESPONSE: &str =
    "Je ne suis pas sûr de ce que vous voulez dire. Pouvez-vous reformuler ?";

/// Reply when the predicted intent has no candidate responses.
pub const NO_MATCH_RESPONSE: &str =
    "Je n'ai pas de réponse correspondante pour cette intention.";

/// A ready-to-serve chatbot instance.
///
/// Holds one model bundle and the retrieval corpus, both read-only
/// after [`load`](Chatbot::load).
#[derive(Debug)]
pub struct Chatbot {
    bundle: ModelBundle,
    corpus: Vec<Conversation>,
}

impl Chatbot {
    /// Load the bundle for `algorithm_name` plus the retrieval corpus.
    ///
    /// Unknown algorithm names, and algorithms with no servable
    /// vectorizer bundle, are rejected as
    /// [`KalamError::InvalidAlgorithm`] before any file is touched. Any
    /// missing or unreadable artifact becomes
    /// [`KalamError::ModelLoad`].
    pub fn load(
        models_dir: &Path,
        corpus_path: &Path,
        algorithm_name: &str,
    ) -> Result<Self, KalamError> {
        let algorithm =
            Algorithm::from_str(algorithm_name).map_err(|_| KalamError::InvalidAlgorithm {
                name: algorithm_name.to_string(),
            })?;
        if !algorithm.uses_vectorizer() {
            return Err(KalamError::InvalidAlgorithm {
                name: algorithm_name.to_string(),
            });
        }

        let bundle = ModelBundle::load(models_dir, algorithm).map_err(load_failure)?;
        let corpus = read_corpus(corpus_path).map_err(load_failure)?;

        info!(
            algorithm = %algorithm,
            labels = bundle.label_encoder.len(),
            conversations = corpus.len(),
            "chatbot ready"
        );
        Ok(Self { bundle, corpus })
    }

    /// Predict the intent label for a message.
    ///
    /// Deterministic for a fixed bundle. `None` means the classifier
    /// could not name an intent (an empty label space).
    pub fn classify(&self, text: &str) -> Option<String> {
        let row = self.bundle.vectorizer.transform(text);
        let index = self.bundle.classifier.predict(&row);
        self.bundle.label_encoder.decode(index).map(str::to_string)
    }

    /// Produce a reply for a message.
    ///
    /// Never fails: classification trouble yields
    /// [`FALLBACK_RESPONSE`], an intent without candidates yields
    /// [`NO_MATCH_RESPONSE`].
    pub fn respond(&self, text: &str) -> String {
        self.respond_with_rng(text, &mut rand::thread_rng())
    }

    /// [`respond`](Chatbot::respond) with an explicit random source,
    /// so the uniform-choice policy is testable.
    pub fn respond_with_rng<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        let Some(label) = self.classify(text) else {
            return FALLBACK_RESPONSE.to_string();
        };
        debug!(intent = %label, "intent predicted");

        match self.candidates(&label).choose(rng) {
            Some(candidate) => (*candidate).to_string(),
            None => NO_MATCH_RESPONSE.to_string(),
        }
    }

    /// Candidate replies for a label: the first non-empty agent-side
    /// message of each matching conversation, at most one per
    /// conversation, in corpus order.
    fn candidates(&self, label: &str) -> Vec<&str> {
        self.corpus
            .iter()
            .filter(|conversation| conversation.status == label)
            .filter_map(|conversation| {
                conversation
                    .messages
                    .iter()
                    .find(|message| message.sender_type.is_agent())
            })
            .filter(|message| !message.text.is_empty())
            .map(|message| message.text.as_str())
            .collect()
    }
}

/// Any artifact problem at load time means the instance is unusable,
/// whatever the underlying cause was.
fn load_failure(err: KalamError) -> KalamError {
    KalamError::ModelLoad {
        message: err.to_string(),
    }
}
