// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The labeled conversation types that make up a training corpus.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who sent a message within a conversation.
///
/// `contact` is the customer; `user` is a human agent; `echo` is the
/// automated responder. Synthetic rows from the generation service can
/// carry arbitrary sender strings, so deserialization folds anything
/// unrecognized into [`SenderType::Unknown`] instead of failing the
/// whole corpus load.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SenderType {
    Contact,
    User,
    Echo,
    #[serde(other)]
    Unknown,
}

impl SenderType {
    /// Parse a raw sender string, folding unrecognized values into
    /// [`SenderType::Unknown`].
    pub fn parse_lossy(raw: &str) -> Self {
        SenderType::from_str(raw).unwrap_or(SenderType::Unknown)
    }

    /// True for the sender types whose messages are eligible as
    /// candidate responses (the agent side of the conversation).
    pub fn is_agent(self) -> bool {
        matches!(self, SenderType::User | SenderType::Echo)
    }
}

/// One text message inside a training conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Normalized timestamp, or empty when the source had none
    /// (synthetic rows never carry one).
    #[serde(default)]
    pub timestamp: String,
    pub sender_type: SenderType,
    #[serde(default)]
    pub text: String,
}

/// A labeled conversation: the unit of the training corpus.
///
/// `status` is the classification label. Fields beyond the three the
/// classifier needs (conversation ids, reply times, handling totals)
/// ride along in `extra` so pipeline stages stay lossless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Conversation {
    /// The single text document this conversation contributes to
    /// training: every message body joined by single spaces.
    pub fn document(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
