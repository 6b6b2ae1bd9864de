// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers for the chatbot endpoint.
//!
//! The endpoint never surfaces internal error detail: callers see only
//! the fixed maintenance and invalid-message bodies (with 503 and 400)
//! or the chatbot's own reply.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

/// Body returned while no chatbot instance is loaded.
pub const MAINTENANCE_RESPONSE: &str =
    "Le chatbot est en maintenance. Veuillez réessayer plus tard.";

/// Body returned for an empty or missing message.
pub const INVALID_MESSAGE_RESPONSE: &str = "Message invalide.";

/// Request body for `POST /chatbot_response`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The customer's message. Missing field reads as empty.
    #[serde(default)]
    pub message: String,
}

/// Response body for every outcome of `POST /chatbot_response`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `POST /chatbot_response`
pub async fn post_chatbot_response(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let Some(chatbot) = state.chatbot.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ChatResponse {
                response: MAINTENANCE_RESPONSE.to_string(),
            }),
        );
    };

    if body.message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatResponse {
                response: INVALID_MESSAGE_RESPONSE.to_string(),
            }),
        );
    }

    let response = chatbot.respond(&body.message);
    (StatusCode::OK, Json(ChatResponse { response }))
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether a chatbot instance is loaded and serving.
    pub chatbot_ready: bool,
}

/// `GET /health`
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chatbot_ready: state.chatbot.is_some(),
    })
}
