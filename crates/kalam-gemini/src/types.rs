// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Gemini `generateContent` endpoint.
//!
//! The API returns generated JSON *as a string* embedded inside the
//! first candidate's first part; callers re-parse that string against
//! the corpus schema. [`GenerateContentResponse::embedded_text`] is the
//! extraction point.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Request body for `models/<model>:generateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// A single-prompt request constrained to structured JSON output.
    pub fn structured(prompt: &str, response_schema: Value) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// Structured-output constraints passed with every request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
    #[serde(rename = "responseSchema")]
    pub response_schema: Value,
}

/// Response envelope; fields the caller does not use are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

impl GenerateContentResponse {
    /// The generated text of the first candidate, if any.
    pub fn embedded_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .parts
            .first()
            .map(|part| part.text.as_str())
    }
}

/// Response schema for conversation generation: status, summary, and
/// ordered sender/text messages.
pub fn generation_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "status": {"type": "STRING"},
                "summary": {"type": "STRING"},
                "messages": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "sender_type": {"type": "STRING"},
                            "text": {"type": "STRING"}
                        },
                        "propertyOrdering": ["sender_type", "text"]
                    }
                }
            },
            "propertyOrdering": ["status", "summary", "messages"]
        }
    })
}

/// Response schema for corpus cleaning: the full conversation record,
/// passthrough fields included, so nothing is lost on the round trip.
pub fn cleaning_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "conversation_id": {"type": "STRING"},
                "start_time": {"type": "STRING"},
                "end_time": {"type": "STRING"},
                "contact_id": {"type": "STRING"},
                "assignee_id": {"type": "STRING"},
                "incoming_messages": {"type": "STRING"},
                "outgoing_messages": {"type": "STRING"},
                "last_reply_time": {"type": "STRING"},
                "status": {"type": "STRING"},
                "summary": {"type": "STRING"},
                "last_assignee_id": {"type": "STRING"},
                "first_reply_time": {"type": "STRING"},
                "total_handling_time": {"type": "STRING"},
                "recipient_id": {"type": "STRING"},
                "messages": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "timestamp": {"type": "STRING"},
                            "sender_type": {"type": "STRING"},
                            "text": {"type": "STRING"}
                        },
                        "propertyOrdering": ["timestamp", "sender_type", "text"]
                    }
                }
            },
            "propertyOrdering": [
                "conversation_id", "start_time", "end_time", "contact_id",
                "assignee_id", "incoming_messages", "outgoing_messages",
                "last_reply_time", "status", "summary", "last_assignee_id",
                "first_reply_time", "total_handling_time", "recipient_id",
                "messages"
            ]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_config() {
        let request = GenerateContentRequest::structured("p", generation_schema());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "p");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(value["generationConfig"]["responseSchema"].is_object());
    }

    #[test]
    fn embedded_text_reads_first_candidate_part() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"[]"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.embedded_text(), Some("[]"));
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(response.embedded_text(), None);

        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert_eq!(response.embedded_text(), None);
    }
}
