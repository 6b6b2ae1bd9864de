// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of raw message payloads into a closed set of variants.
//!
//! The CSV export embeds each message body as a JSON document, usually
//! with doubled double-quote escaping (`{""type"":""text""...}`). The
//! decoder is total: every input string maps to exactly one
//! [`MessagePayload`], and malformed JSON resolves to
//! [`MessagePayload::ParseError`] rather than an error.
//!
//! The branch order below is a policy, not an accident: an attachment
//! whose serialized form happens to contain the word "reaction" must
//! still decode as an attachment.

use serde_json::Value;

/// Default display name for attachments that carry no file name.
const DEFAULT_ATTACHMENT_NAME: &str = "Fichier";

/// Decoded representation of one raw message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    /// A plain text message; carries the trimmed text body.
    Text(String),
    /// A file attachment; carries the file name.
    Attachment(String),
    /// A reaction event, or a payload explicitly typed `unsupported`.
    Reaction,
    /// The payload field was empty or absent.
    Unsupported,
    /// A well-formed object of a type the pipeline does not know.
    NonText,
    /// The payload did not parse as JSON.
    ParseError,
}

impl MessagePayload {
    /// Decode a raw payload string.
    ///
    /// Branches, in priority order:
    /// 1. empty or whitespace-only input -> [`Unsupported`](Self::Unsupported)
    /// 2. doubled quotes normalized, then JSON parse; failure (or a
    ///    non-object document) -> [`ParseError`](Self::ParseError)
    /// 3. `type == "text"` -> [`Text`](Self::Text) with the trimmed body
    /// 4. `type == "attachment"` -> [`Attachment`](Self::Attachment)
    /// 5. the serialized object contains `reaction` anywhere, or
    ///    `type == "unsupported"` -> [`Reaction`](Self::Reaction)
    /// 6. anything else -> [`NonText`](Self::NonText)
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return MessagePayload::Unsupported;
        }

        let normalized = raw.replace("\"\"", "\"");
        let value: Value = match serde_json::from_str(&normalized) {
            Ok(v) => v,
            Err(_) => return MessagePayload::ParseError,
        };
        let Some(object) = value.as_object() else {
            return MessagePayload::ParseError;
        };

        let kind = object.get("type").and_then(Value::as_str).unwrap_or("");
        match kind {
            "text" => {
                let text = object
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                MessagePayload::Text(text.trim().to_string())
            }
            "attachment" => {
                let file_name = object
                    .get("attachment")
                    .and_then(|a| a.get("fileName"))
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_ATTACHMENT_NAME);
                MessagePayload::Attachment(file_name.to_string())
            }
            _ => {
                // Reaction markers can appear at any depth, so the check
                // runs over the serialized form of the whole object.
                let serialized = value.to_string();
                if serialized.contains("reaction") || kind == "unsupported" {
                    MessagePayload::Reaction
                } else {
                    MessagePayload::NonText
                }
            }
        }
    }

    /// Render the payload as the text stored in cleaned message records.
    pub fn render(&self) -> String {
        match self {
            MessagePayload::Text(text) => text.clone(),
            MessagePayload::Attachment(file_name) => {
                format!("[Pièce jointe] {file_name}")
            }
            MessagePayload::Reaction => "[Réaction]".to_string(),
            MessagePayload::Unsupported => "[Vide]".to_string(),
            MessagePayload::NonText => "[Message non texte]".to_string(),
            MessagePayload::ParseError => "[Erreur parsing]".to_string(),
        }
    }
}
