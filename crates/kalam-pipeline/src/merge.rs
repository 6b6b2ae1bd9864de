// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Joining normalized conversation records with their messages.
//!
//! The export carries no conversation id on message rows that lines up
//! with the conversation table, so the join goes through the message's
//! `sender_id` matched against the conversation's `contact_id`. This is
//! the deliberate linkage policy inherited from the data source; it
//! means every conversation of a contact receives that contact's whole
//! message history. Flagged as a data-quality risk, not silently fixed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use kalam_core::corpus::{read_json, write_json};
use kalam_core::KalamError;

use crate::normalize::NormalizedRecord;

/// A conversation record with its joined message records embedded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedConversation {
    /// All normalized conversation fields, passed through losslessly.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
    /// Message records whose `sender_id` equals this conversation's
    /// `contact_id`, in source order.
    #[serde(default)]
    pub messages: Vec<NormalizedRecord>,
}

/// Join conversations with messages in memory.
///
/// The first element of each input is a header artifact from the
/// headerless CSV read and is skipped unconditionally.
pub fn assemble(
    conversations: &[NormalizedRecord],
    messages: &[NormalizedRecord],
) -> Vec<MergedConversation> {
    let data_conversations = conversations.iter().skip(1);
    let data_messages = messages.iter().skip(1);

    let mut by_sender: BTreeMap<&str, Vec<&NormalizedRecord>> = BTreeMap::new();
    for message in data_messages {
        let sender_id = message.get("sender_id").map(String::as_str).unwrap_or("");
        if !sender_id.is_empty() {
            by_sender.entry(sender_id).or_default().push(message);
        }
    }

    data_conversations
        .map(|conversation| {
            let contact_id = conversation
                .get("contact_id")
                .map(String::as_str)
                .unwrap_or("");
            let messages = by_sender
                .get(contact_id)
                .map(|group| group.iter().map(|m| (*m).clone()).collect())
                .unwrap_or_default();
            MergedConversation {
                fields: conversation.clone(),
                messages,
            }
        })
        .collect()
}

/// File-level merge stage: `conversations_clean.json` +
/// `messages_clean.json` -> `merged_data.json`.
pub fn merge_files(
    conversations_path: &Path,
    messages_path: &Path,
    output: &Path,
) -> Result<usize, KalamError> {
    let conversations: Vec<NormalizedRecord> = read_json(conversations_path)?;
    let messages: Vec<NormalizedRecord> = read_json(messages_path)?;

    let merged = assemble(&conversations, &messages);
    write_json(output, &merged)?;
    info!(count = merged.len(), output = %output.display(), "conversations merged");
    Ok(merged.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> NormalizedRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn header(columns: &[&str]) -> NormalizedRecord {
        columns.iter().map(|c| (c.to_string(), c.to_string())).collect()
    }

    #[test]
    fn conversation_gets_messages_of_its_contact() {
        let conversations = vec![
            header(&["conversation_id", "contact_id", "status"]),
            record(&[("conversation_id", "conv-1"), ("contact_id", "C1"), ("status", "Qualified")]),
        ];
        let messages = vec![
            header(&["sender_id", "text"]),
            record(&[("sender_id", "C1"), ("text", "hi")]),
        ];

        let merged = assemble(&conversations, &messages);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].messages.len(), 1);
        assert_eq!(merged[0].messages[0]["text"], "hi");
    }

    #[test]
    fn conversation_without_matching_sender_gets_empty_messages() {
        let conversations = vec![
            header(&["contact_id"]),
            record(&[("contact_id", "C9")]),
        ];
        let messages = vec![
            header(&["sender_id"]),
            record(&[("sender_id", "C1"), ("text", "hi")]),
        ];

        let merged = assemble(&conversations, &messages);
        assert_eq!(merged[0].messages, Vec::<NormalizedRecord>::new());
    }

    #[test]
    fn header_rows_are_skipped_unconditionally() {
        // The header artifact has contact_id == "contact_id"; a message
        // row with that sender would otherwise join onto it.
        let conversations = vec![
            header(&["contact_id"]),
            record(&[("contact_id", "C1")]),
        ];
        let messages = vec![
            header(&["sender_id"]),
            record(&[("sender_id", "contact_id"), ("text", "never joined")]),
            record(&[("sender_id", "C1"), ("text", "joined")]),
        ];

        let merged = assemble(&conversations, &messages);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].messages.len(), 1);
        assert_eq!(merged[0].messages[0]["text"], "joined");
    }

    #[test]
    fn message_order_within_a_group_is_preserved() {
        let conversations = vec![
            header(&["contact_id"]),
            record(&[("contact_id", "C1")]),
        ];
        let messages = vec![
            header(&["sender_id"]),
            record(&[("sender_id", "C1"), ("text", "first")]),
            record(&[("sender_id", "C2"), ("text", "other contact")]),
            record(&[("sender_id", "C1"), ("text", "second")]),
        ];

        let merged = assemble(&conversations, &messages);
        let texts: Vec<&str> = merged[0]
            .messages
            .iter()
            .map(|m| m["text"].as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn same_contact_messages_attach_to_every_conversation() {
        // Known consequence of the sender_id/contact_id linkage.
        let conversations = vec![
            header(&["conversation_id", "contact_id"]),
            record(&[("conversation_id", "conv-1"), ("contact_id", "C1")]),
            record(&[("conversation_id", "conv-2"), ("contact_id", "C1")]),
        ];
        let messages = vec![
            header(&["sender_id"]),
            record(&[("sender_id", "C1"), ("text", "hi")]),
        ];

        let merged = assemble(&conversations, &messages);
        assert_eq!(merged[0].messages.len(), 1);
        assert_eq!(merged[1].messages.len(), 1);
    }

    #[test]
    fn merge_files_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let conversations_path = dir.path().join("conversations_clean.json");
        let messages_path = dir.path().join("messages_clean.json");
        let output = dir.path().join("merged_data.json");

        let conversations = vec![
            header(&["contact_id", "status"]),
            record(&[("contact_id", "C1"), ("status", "Qualified")]),
        ];
        let messages = vec![
            header(&["sender_id", "text"]),
            record(&[("sender_id", "C1"), ("text", "hi")]),
        ];
        write_json(&conversations_path, &conversations).unwrap();
        write_json(&messages_path, &messages).unwrap();

        let count = merge_files(&conversations_path, &messages_path, &output).unwrap();
        assert_eq!(count, 1);

        let merged: Vec<MergedConversation> = read_json(&output).unwrap();
        assert_eq!(merged[0].fields["status"], "Qualified");
        assert_eq!(merged[0].messages[0]["text"], "hi");
    }

    #[test]
    fn missing_input_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge_files(
            &dir.path().join("absent.json"),
            &dir.path().join("also_absent.json"),
            &dir.path().join("out.json"),
        )
        .unwrap_err();
        assert!(matches!(err, KalamError::SourceNotFound { .. }));
    }
}
