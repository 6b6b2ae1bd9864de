// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.
//!
//! Every request runs with a fixed timeout and bounded retries with
//! exponential backoff: a fixed base delay, doubled after each failed
//! attempt, up to a capped attempt count. On exhaustion the call
//! returns [`KalamError::ExternalService`] and the caller abandons the
//! batch, keeping whatever it already accumulated.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use kalam_core::{Conversation, KalamError};

use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// Attempts per request, including the first.
const MAX_ATTEMPTS: u32 = 5;

/// Backoff base delay; doubled after every failed attempt.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Pause between consecutive generation batches.
const BATCH_PAUSE: Duration = Duration::from_secs(5);

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_attempts: u32,
    base_delay: Duration,
    batch_pause: Duration,
}

impl GeminiClient {
    /// Create a client against `base_url` (overridable so tests can
    /// point it at a local mock).
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self, KalamError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| KalamError::ExternalService {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
            batch_pause: BATCH_PAUSE,
        })
    }

    /// How long batch loops wait between consecutive requests.
    pub fn batch_pause(&self) -> Duration {
        self.batch_pause
    }

    #[cfg(test)]
    pub(crate) fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.base_delay = base_delay;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    /// Ask the model for a JSON array of conversations.
    ///
    /// The API embeds its structured output as a string inside the
    /// first candidate; that string is re-parsed against the
    /// [`Conversation`] shape here, so callers only ever see typed
    /// rows.
    pub async fn generate_conversations(
        &self,
        prompt: &str,
        response_schema: Value,
    ) -> Result<Vec<Conversation>, KalamError> {
        let request = GenerateContentRequest::structured(prompt, response_schema);
        let response = self.post_with_backoff(&request).await?;

        let text = response
            .embedded_text()
            .ok_or_else(|| KalamError::ExternalService {
                message: "response carries no candidate text".to_string(),
            })?;
        serde_json::from_str(text).map_err(|e| KalamError::ExternalService {
            message: format!("embedded candidate JSON does not match the corpus shape: {e}"),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// POST with bounded exponential backoff. Any failure counts
    /// against the attempt budget: connection errors, timeouts, and
    /// non-success statuses alike.
    async fn post_with_backoff(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, KalamError> {
        let url = self.endpoint();
        let mut delay = self.base_delay;
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying generation request");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }

            match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(status = %status, attempt, "generation response received");
                    if status.is_success() {
                        return response.json().await.map_err(|e| {
                            KalamError::ExternalService {
                                message: format!("failed to parse API response: {e}"),
                            }
                        });
                    }
                    let body = response.text().await.unwrap_or_default();
                    last_error = format!("API returned {status}: {body}");
                }
                Err(e) => {
                    last_error = format!("request failed: {e}");
                }
            }
        }

        Err(KalamError::ExternalService {
            message: format!(
                "generation request failed after {} attempts: {last_error}",
                self.max_attempts
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::types::generation_schema;

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new("test-key", "test-model", base_url)
            .unwrap()
            .with_retry(3, Duration::from_millis(10))
    }

    fn envelope(embedded: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": embedded}]}}]
        })
    }

    const CONVERSATIONS_JSON: &str = r#"[
        {"status": "Qualified", "summary": "s",
         "messages": [{"sender_type": "contact", "text": "salut"}]}
    ]"#;

    #[tokio::test]
    async fn generates_typed_conversations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test-model:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(CONVERSATIONS_JSON)))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let conversations = client
            .generate_conversations("prompt", generation_schema())
            .await
            .unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].status, "Qualified");
        assert_eq!(conversations[0].messages[0].text, "salut");
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(CONVERSATIONS_JSON)))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let conversations = client
            .generate_conversations("prompt", generation_schema())
            .await
            .unwrap();
        assert_eq!(conversations.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_are_external_service_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate_conversations("prompt", generation_schema())
            .await
            .unwrap_err();
        assert!(matches!(err, KalamError::ExternalService { .. }));
        assert!(err.to_string().contains("3 attempts"), "got: {err}");
    }

    #[tokio::test]
    async fn malformed_embedded_json_is_external_service_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope("{not an array")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate_conversations("prompt", generation_schema())
            .await
            .unwrap_err();
        assert!(matches!(err, KalamError::ExternalService { .. }));
    }

    #[tokio::test]
    async fn missing_candidates_are_external_service_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate_conversations("prompt", generation_schema())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no candidate text"), "got: {err}");
    }
}
