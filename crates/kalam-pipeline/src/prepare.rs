// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Final corpus stage: merged conversations -> text-only training corpus.
//!
//! Keeps only `message_type == "text"` messages, projects each down to
//! the three fields training needs, and drops conversations left with
//! no messages at all.

use std::path::Path;

use tracing::info;

use kalam_core::corpus::{read_json, write_corpus};
use kalam_core::{Conversation, KalamError, Message, SenderType};

use crate::merge::MergedConversation;

/// Fields lifted out of the flat record into [`Conversation`] proper.
const PROMOTED_FIELDS: &[&str] = &["status", "summary"];

/// Rewrite merged conversations into the training corpus shape.
pub fn filter_to_training_text(merged: &[MergedConversation]) -> Vec<Conversation> {
    merged
        .iter()
        .filter_map(|conversation| {
            let messages: Vec<Message> = conversation
                .messages
                .iter()
                .filter(|m| m.get("message_type").map(String::as_str) == Some("text"))
                .map(|m| Message {
                    timestamp: m.get("timestamp").cloned().unwrap_or_default(),
                    sender_type: SenderType::parse_lossy(
                        m.get("sender_type").map(String::as_str).unwrap_or(""),
                    ),
                    text: m.get("text").cloned().unwrap_or_default(),
                })
                .collect();

            if messages.is_empty() {
                return None;
            }

            let extra = conversation
                .fields
                .iter()
                .filter(|(key, _)| !PROMOTED_FIELDS.contains(&key.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            Some(Conversation {
                status: conversation
                    .fields
                    .get("status")
                    .cloned()
                    .unwrap_or_default(),
                summary: conversation
                    .fields
                    .get("summary")
                    .cloned()
                    .unwrap_or_default(),
                messages,
                extra,
            })
        })
        .collect()
}

/// File-level stage: `merged_data.json` -> `training_dataset.json`.
pub fn prepare_training_dataset(input: &Path, output: &Path) -> Result<usize, KalamError> {
    let merged: Vec<MergedConversation> = read_json(input)?;
    let corpus = filter_to_training_text(&merged);
    write_corpus(output, &corpus)?;
    info!(
        kept = corpus.len(),
        dropped = merged.len() - corpus.len(),
        output = %output.display(),
        "training corpus prepared"
    );
    Ok(corpus.len())
}
