// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synthetic conversation generation and incremental augmentation.
//!
//! Both operations prompt the model with a sample of real
//! conversations and merge the generated rows into a synthetic corpus
//! file. Augmentation runs in batches and resamples fresh examples for
//! every batch so the output does not collapse onto one seed set. A
//! failed batch is abandoned; conversations from earlier batches are
//! kept and written out.

use std::path::Path;

use rand::seq::SliceRandom;
use tracing::{info, warn};

use kalam_core::corpus::{read_corpus, read_non_empty_corpus, write_corpus};
use kalam_core::{Conversation, KalamError};

use crate::client::GeminiClient;
use crate::types::generation_schema;

/// Conversations requested by the from-scratch generation pass.
const GENERATE_TARGET: usize = 5;

/// Real conversations sampled as prompt examples by the from-scratch
/// generation pass.
const GENERATE_SAMPLE_SIZE: usize = 5;

/// Keep only conversations that carry at least one message.
///
/// The generation service occasionally emits empty shells; they would
/// poison both training and retrieval, so they are dropped before any
/// merge.
pub fn retain_usable(conversations: Vec<Conversation>) -> Vec<Conversation> {
    let before = conversations.len();
    let usable: Vec<Conversation> = conversations
        .into_iter()
        .filter(|conversation| !conversation.messages.is_empty())
        .collect();
    if usable.len() < before {
        warn!(
            dropped = before - usable.len(),
            "discarded generated conversations without messages"
        );
    }
    usable
}

/// Render sample conversations into the example block of a prompt.
fn example_text(sample: &[&Conversation]) -> String {
    sample
        .iter()
        .map(|conversation| {
            let messages = conversation
                .messages
                .iter()
                .map(|message| format!(" - {}: {}", message.sender_type, message.text))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "Conversation with status '{}' and summary '{}':\n{}",
                conversation.status, conversation.summary, messages
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The generation prompt: persona, domain, examples, output contract.
fn generation_prompt(count: usize, examples: &str) -> String {
    format!(
        "You are a data generation tool for a chatbot. Your task is to generate {count} new, \
         synthetic, but realistic, conversation data based on a provided style and theme.\n\n\
         The conversations are between a 'contact' (customer) and a 'user' or 'echo' (a sales \
         representative or a chatbot). The language used is Tunisian Arabic, and the themes \
         revolve around student inquiries about educational programs.\n\n\
         Here are a few examples of real conversations to guide your generation. Use these \
         examples to generate a wide variety of new scenarios, statuses, and summaries:\n\n\
         {examples}\n\n\
         Generate {count} new, short, and realistic synthetic conversations. Ensure the flow is \
         logical, and the messages are correctly ordered by sender type. The conversations \
         should be formatted as a JSON array of objects, where each object represents a \
         conversation. Each conversation object must contain a 'status', a 'summary', and an \
         array of 'messages'. Each message object must contain a 'sender_type' ('contact', \
         'user', or 'echo') and 'text'. The 'summary' should be a brief note about the \
         conversation's outcome, and the 'status' should be 'Qualified', 'Unqualified', or \
         'To follow up'.\n\n\
         Make sure to write everything in Tunisian Arabic just like the examples."
    )
}

/// Seed a synthetic corpus from scratch.
///
/// Samples a handful of real conversations from `input`, asks for
/// [`GENERATE_TARGET`] synthetic ones, and writes them to `output`.
pub async fn generate_synthetic_data(
    client: &GeminiClient,
    input: &Path,
    output: &Path,
) -> Result<usize, KalamError> {
    let corpus = read_non_empty_corpus(input)?;

    // Scoped so the rng is gone before the request future is awaited.
    let prompt = {
        let mut rng = rand::thread_rng();
        let sample: Vec<&Conversation> = corpus
            .choose_multiple(&mut rng, GENERATE_SAMPLE_SIZE.min(corpus.len()))
            .collect();
        generation_prompt(GENERATE_TARGET, &example_text(&sample))
    };

    let generated = retain_usable(
        client
            .generate_conversations(&prompt, generation_schema())
            .await?,
    );
    write_corpus(output, &generated)?;
    info!(count = generated.len(), output = %output.display(), "synthetic corpus generated");
    Ok(generated.len())
}

/// Enlarge the synthetic corpus in batches until `target` new
/// conversations have been collected.
///
/// `real` is required; a missing or unreadable synthetic file only
/// means starting from an empty set. On a batch failure the loop stops
/// and everything accumulated so far is written out, so no earlier
/// batch is ever lost.
pub async fn augment_synthetic_data(
    client: &GeminiClient,
    real: &Path,
    synthetic: &Path,
    target: usize,
    batch_size: usize,
    sample_size: usize,
) -> Result<usize, KalamError> {
    let real_corpus = read_non_empty_corpus(real)?;
    let mut synthetic_corpus = match read_corpus(synthetic) {
        Ok(corpus) => corpus,
        Err(KalamError::SourceNotFound { .. }) => {
            warn!(path = %synthetic.display(), "no existing synthetic corpus, starting empty");
            Vec::new()
        }
        Err(KalamError::Json { path, .. }) => {
            warn!(path = %path.display(), "unreadable synthetic corpus, starting empty");
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    info!(
        real = real_corpus.len(),
        existing = synthetic_corpus.len(),
        target,
        "augmenting synthetic corpus"
    );

    let mut generated_count = 0;
    while generated_count < target {
        let batch_target = batch_size.min(target - generated_count);
        // Fresh examples each batch; rng scoped out before the await.
        let prompt = {
            let mut rng = rand::thread_rng();
            let sample: Vec<&Conversation> = real_corpus
                .choose_multiple(&mut rng, sample_size.min(real_corpus.len()))
                .collect();
            generation_prompt(batch_target, &example_text(&sample))
        };

        match client
            .generate_conversations(&prompt, generation_schema())
            .await
        {
            Ok(batch) => {
                let usable = retain_usable(batch);
                if usable.is_empty() {
                    warn!("batch produced no usable conversations, stopping");
                    break;
                }
                generated_count += usable.len();
                synthetic_corpus.extend(usable);
                info!(generated = generated_count, target, "batch merged");
            }
            Err(e) => {
                warn!(error = %e, "batch abandoned, keeping accumulated results");
                break;
            }
        }

        if generated_count < target {
            tokio::time::sleep(client.batch_pause()).await;
        }
    }

    write_corpus(synthetic, &synthetic_corpus)?;
    info!(
        generated = generated_count,
        total = synthetic_corpus.len(),
        output = %synthetic.display(),
        "synthetic corpus written"
    );
    Ok(generated_count)
}
